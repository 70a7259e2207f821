//! Concurrent fan-out of the pipeline over many locators.
//!
//! [`BatchProcessor::process_stream`] spawns one task per locator up front
//! and yields a [`BatchItem`] per locator in completion order. A failing
//! locator becomes an `Err` item; it never stops its siblings. Every yielded
//! item is also recorded in the processor's accumulated success and error
//! maps, which [`BatchProcessor::summary`] reads.
//!
//! [`BatchProcessor::process_all`] is nothing more than draining the stream.
//!
//! Fan-out is unbounded unless a concurrency cap is set, in which case each
//! task waits on a shared semaphore before invoking the pipeline. Dropping
//! the stream does not cancel tasks that were already spawned.

use futures::stream::{FuturesUnordered, Stream, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::models::ProcessingResult;
use crate::pipeline::Pipeline;

/// One completed locator.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub locator: String,
    /// The result, or the error message of the failed invocation.
    pub outcome: Result<ProcessingResult, String>,
}

impl BatchItem {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Aggregate figures over the accumulated results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_processed: usize,
    pub total_errors: usize,
    /// Percentage of successes among all completed locators; 0 when empty.
    pub success_rate: f64,
    /// Mean processing time of successful results in seconds; 0 when none.
    pub average_processing_time: f64,
    pub total_pages_processed: u64,
}

/// Everything a drained batch produced.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: HashMap<String, ProcessingResult>,
    pub errors: HashMap<String, String>,
    pub summary: BatchSummary,
}

pub struct BatchProcessor<P> {
    pipeline: Arc<P>,
    results: HashMap<String, ProcessingResult>,
    errors: HashMap<String, String>,
    limiter: Option<Arc<Semaphore>>,
}

impl<P: Pipeline + 'static> BatchProcessor<P> {
    pub fn new(pipeline: Arc<P>) -> Self {
        Self {
            pipeline,
            results: HashMap::new(),
            errors: HashMap::new(),
            limiter: None,
        }
    }

    /// Caps the number of pipeline invocations in flight. `None` (or `0`)
    /// restores unbounded fan-out.
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.limiter = limit
            .filter(|n| *n > 0)
            .map(|n| Arc::new(Semaphore::new(n)));
        self
    }

    /// Processes every locator concurrently, yielding items as they finish.
    pub fn process_stream(
        &mut self,
        locators: &[String],
        search_term: &str,
    ) -> impl Stream<Item = BatchItem> + '_ {
        let tasks = FuturesUnordered::new();

        for locator in locators.iter().cloned() {
            let pipeline = Arc::clone(&self.pipeline);
            let limiter = self.limiter.clone();
            let term = search_term.to_string();
            let task_locator = locator.clone();

            let handle = tokio::spawn(async move {
                let _permit = match limiter {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                pipeline
                    .process(&task_locator, &term)
                    .await
                    .map_err(|e| e.to_string())
            });

            tasks.push(async move {
                let outcome = match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(format!("Processing task failed: {}", e)),
                };
                BatchItem { locator, outcome }
            });
        }

        tracing::info!(documents = tasks.len(), "batch started");

        tasks.map(move |item| {
            self.record(&item);
            item
        })
    }

    /// Drains [`process_stream`](Self::process_stream) and returns the
    /// accumulated maps with their summary.
    pub async fn process_all(&mut self, locators: &[String], search_term: &str) -> BatchReport {
        self.process_stream(locators, search_term)
            .for_each(|_| async {})
            .await;

        BatchReport {
            results: self.results.clone(),
            errors: self.errors.clone(),
            summary: self.summary(),
        }
    }

    fn record(&mut self, item: &BatchItem) {
        match &item.outcome {
            Ok(result) => {
                tracing::debug!(locator = %item.locator, "batch item succeeded");
                self.results.insert(item.locator.clone(), result.clone());
            }
            Err(message) => {
                tracing::warn!(locator = %item.locator, error = %message, "batch item failed");
                self.errors.insert(item.locator.clone(), message.clone());
            }
        }
    }
}

impl<P> BatchProcessor<P> {
    pub fn results(&self) -> &HashMap<String, ProcessingResult> {
        &self.results
    }

    pub fn errors(&self) -> &HashMap<String, String> {
        &self.errors
    }

    /// Summary over everything recorded so far.
    pub fn summary(&self) -> BatchSummary {
        let total_processed = self.results.len();
        let total_errors = self.errors.len();
        let total = total_processed + total_errors;

        let success_rate = if total == 0 {
            0.0
        } else {
            total_processed as f64 / total as f64 * 100.0
        };

        let average_processing_time = if total_processed == 0 {
            0.0
        } else {
            self.results
                .values()
                .map(|r| r.statistics.processing_time_seconds)
                .sum::<f64>()
                / total_processed as f64
        };

        let total_pages_processed = self
            .results
            .values()
            .map(|r| u64::from(r.metadata.page_count))
            .sum();

        BatchSummary {
            total_processed,
            total_errors,
            success_rate,
            average_processing_time,
            total_pages_processed,
        }
    }

    /// Forgets all accumulated results and errors.
    pub fn clear(&mut self) {
        self.results.clear();
        self.errors.clear();
    }
}
