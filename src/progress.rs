//! Batch progress reporting.
//!
//! Reports each completed locator during `pdfh batch` so users can see how
//! much of a batch is done and which documents failed. Progress is emitted
//! on **stderr** so stdout remains parseable for scripts.

use std::io::Write;

/// A single progress event for a batch.
#[derive(Clone, Debug)]
pub enum BatchProgressEvent {
    /// Every task has been spawned.
    Started { total: u64 },
    /// The `n`th locator (in completion order) finished.
    Completed {
        locator: String,
        n: u64,
        total: u64,
        /// Error message when the locator failed.
        error: Option<String>,
    },
}

/// Reports batch progress. Implementations write to stderr (human or JSON).
pub trait BatchProgressReporter: Send + Sync {
    fn report(&self, event: BatchProgressEvent);
}

/// Human-friendly progress on stderr: "batch  12 / 1,200  ok  https://…".
pub struct StderrProgress;

impl BatchProgressReporter for StderrProgress {
    fn report(&self, event: BatchProgressEvent) {
        let line = match &event {
            BatchProgressEvent::Started { total } => {
                format!("batch  processing {} documents\n", format_number(*total))
            }
            BatchProgressEvent::Completed {
                locator,
                n,
                total,
                error,
            } => {
                let outcome = match error {
                    None => "ok".to_string(),
                    Some(message) => format!("failed ({})", message),
                };
                format!(
                    "batch  {} / {}  {}  {}\n",
                    format_number(*n),
                    format_number(*total),
                    outcome,
                    locator
                )
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// Machine-readable progress: one JSON object per line on stderr.
pub struct JsonProgress;

impl BatchProgressReporter for JsonProgress {
    fn report(&self, event: BatchProgressEvent) {
        let obj = match &event {
            BatchProgressEvent::Started { total } => serde_json::json!({
                "event": "progress",
                "phase": "started",
                "total": total
            }),
            BatchProgressEvent::Completed {
                locator,
                n,
                total,
                error,
            } => serde_json::json!({
                "event": "progress",
                "phase": "completed",
                "locator": locator,
                "n": n,
                "total": total,
                "ok": error.is_none(),
                "error": error
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
            let _ = std::io::stderr().lock().flush();
        }
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl BatchProgressReporter for NoProgress {
    fn report(&self, _event: BatchProgressEvent) {}
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    let chars: Vec<char> = s.chars().rev().collect();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result.chars().rev().collect()
}

/// Progress mode for the CLI: off, human (stderr), or JSON (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
    Json,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Parses `human`, `json` or `off`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "human" => Some(ProgressMode::Human),
            "json" => Some(ProgressMode::Json),
            "off" | "none" => Some(ProgressMode::Off),
            _ => None,
        }
    }

    pub fn reporter(&self) -> Box<dyn BatchProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
            ProgressMode::Json => Box::new(JsonProgress),
        }
    }
}
