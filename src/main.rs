//! # PDF Harvest CLI (`pdfh`)
//!
//! ## Usage
//!
//! ```bash
//! pdfh [--config ./pdfh.toml] [--log-level info] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pdfh process <locator> --term <t>` | Process one document and print its summary |
//! | `pdfh batch <locator>... --term <t>` | Process many documents concurrently |
//! | `pdfh search <query> --locator <l>... --term <t>` | Process, index, and query documents |
//!
//! Locators are `http(s)://` URLs, `file://` URLs, or local paths.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;

use pdf_harvest::batch::BatchProcessor;
use pdf_harvest::config::{self, Config};
use pdf_harvest::progress::{BatchProgressEvent, ProgressMode};
use pdf_harvest::report;
use pdf_harvest::search::SearchIndex;
use pdf_harvest::telemetry;
use pdf_harvest::{DocumentProcessor, Pipeline};

/// PDF Harvest: download, analyze, and search PDF documents.
#[derive(Parser)]
#[command(name = "pdfh", version, about = "Concurrent PDF ingestion, analysis, and search")]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults apply when
    /// omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for this crate when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single document.
    ///
    /// Prints metadata, analysis, and statistics. Exits non-zero when the
    /// document cannot be processed.
    Process {
        /// Document locator.
        locator: String,

        /// Term to count in the document text.
        #[arg(long)]
        term: String,

        /// Print the result as JSON instead of text.
        #[arg(long)]
        json: bool,

        /// Include the full extracted text in JSON output.
        #[arg(long, requires = "json")]
        full_text: bool,
    },

    /// Process many documents concurrently.
    ///
    /// Results are reported as they complete, followed by a summary.
    Batch {
        /// Document locators.
        #[arg(required = true)]
        locators: Vec<String>,

        #[arg(long)]
        term: String,

        /// Print one JSON object per completed document on stdout.
        #[arg(long)]
        json: bool,

        /// Progress on stderr: `human`, `json`, or `off`. Defaults to
        /// `human` when stderr is a terminal.
        #[arg(long)]
        progress: Option<String>,

        /// Maximum documents in flight. Overrides `pipeline.max_concurrency`.
        #[arg(long)]
        max_concurrency: Option<usize>,
    },

    /// Process documents, index them, and run a query.
    Search {
        /// Query string.
        query: String,

        /// Documents to index. Repeat for each document.
        #[arg(long = "locator", required = true)]
        locators: Vec<String>,

        #[arg(long)]
        term: String,

        /// Maximum number of hits. Defaults to `search.default_limit`.
        #[arg(long)]
        limit: Option<usize>,

        /// Print hits as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing(&cli.log_level);

    let cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Process {
            locator,
            term,
            json,
            full_text,
        } => run_process(&cfg, &locator, &term, json, full_text).await,
        Commands::Batch {
            locators,
            term,
            json,
            progress,
            max_concurrency,
        } => {
            let mode = match progress.as_deref() {
                None => ProgressMode::default_for_tty(),
                Some(value) => ProgressMode::parse(value).with_context(|| {
                    format!("Unknown progress mode: {}. Use human, json, or off.", value)
                })?,
            };
            let limit = max_concurrency.or(cfg.pipeline.max_concurrency);
            run_batch(&cfg, &locators, &term, json, mode, limit).await
        }
        Commands::Search {
            query,
            locators,
            term,
            limit,
            json,
        } => run_search(&cfg, &query, &locators, &term, limit, json).await,
    }
}

async fn run_process(
    cfg: &Config,
    locator: &str,
    term: &str,
    json: bool,
    full_text: bool,
) -> Result<()> {
    let processor = DocumentProcessor::new(cfg);
    let result = processor
        .process(locator, term)
        .await
        .with_context(|| format!("Failed to process {}", locator))?;

    if json {
        let value = report::result_json(&result, full_text);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", report::format_document(&result));
    }
    Ok(())
}

async fn run_batch(
    cfg: &Config,
    locators: &[String],
    term: &str,
    json: bool,
    mode: ProgressMode,
    max_concurrency: Option<usize>,
) -> Result<()> {
    let processor = Arc::new(DocumentProcessor::new(cfg));
    let mut batch = BatchProcessor::new(processor).with_max_concurrency(max_concurrency);
    let reporter = mode.reporter();
    let total = locators.len() as u64;

    reporter.report(BatchProgressEvent::Started { total });
    {
        let mut stream = Box::pin(batch.process_stream(locators, term));
        let mut n = 0u64;
        while let Some(item) = stream.next().await {
            n += 1;
            reporter.report(BatchProgressEvent::Completed {
                locator: item.locator.clone(),
                n,
                total,
                error: item.outcome.as_ref().err().cloned(),
            });
            if json {
                let line = match &item.outcome {
                    Ok(result) => serde_json::json!({
                        "locator": item.locator,
                        "ok": true,
                        "result": report::result_json(result, false)
                    }),
                    Err(message) => serde_json::json!({
                        "locator": item.locator,
                        "ok": false,
                        "error": message
                    }),
                };
                println!("{}", serde_json::to_string(&line)?);
            }
        }
    }

    let summary = batch.summary();
    if json {
        println!(
            "{}",
            serde_json::to_string(&serde_json::json!({ "summary": summary }))?
        );
    } else {
        let mut failed: Vec<(&String, &String)> = batch.errors().iter().collect();
        failed.sort();
        for (locator, message) in failed {
            println!("FAILED {}: {}", locator, message);
        }
        print!("{}", report::format_batch_summary(&summary));
    }
    Ok(())
}

async fn run_search(
    cfg: &Config,
    query: &str,
    locators: &[String],
    term: &str,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        bail!("Search query must not be empty");
    }

    let processor = Arc::new(DocumentProcessor::new(cfg));
    let mut batch =
        BatchProcessor::new(processor).with_max_concurrency(cfg.pipeline.max_concurrency);
    let outcome = batch.process_all(locators, term).await;

    let mut index = SearchIndex::new(&cfg.search);
    let mut indexed: Vec<(&String, _)> = outcome.results.iter().collect();
    indexed.sort_by(|a, b| a.0.cmp(b.0));
    for (locator, result) in indexed {
        index.add_document(
            locator,
            &result.analysis,
            &result.metadata,
            Some(result.full_text.as_str()),
        );
    }
    for (locator, message) in &outcome.errors {
        eprintln!("skipped {}: {}", locator, message);
    }

    let hits = index.search(query, limit.unwrap_or(cfg.search.default_limit));
    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else {
        print!("{}", report::format_search_hits(&hits));
    }
    Ok(())
}
