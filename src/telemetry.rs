//! Tracing subscriber setup for the `pdfh` binary.

use tracing_subscriber::EnvFilter;

/// Installs a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise dependencies log at `warn` and this
/// crate at `level`. Calling it twice is harmless.
pub fn init_tracing(level: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("warn,pdf_harvest={},pdfh={}", level, level))
        .unwrap_or_else(|_| EnvFilter::new("warn,pdf_harvest=info,pdfh=info"))
}
