//! Single-document processing pipeline.
//!
//! One [`Pipeline::process`] call walks a document through
//!
//! ```text
//! cache check ─hit──────────────────────────────────────────────▶ done
//!      │miss
//!      ▼
//! download (retry + backoff) ─▶ validate ─▶ extract ─▶ classify ─▶ analyze ─▶ cache ─▶ done
//! ```
//!
//! Extraction and analysis are CPU bound and run on tokio's blocking pool so
//! concurrent downloads keep making progress. Size and signature failures
//! describe the content itself and are never retried; transport failures
//! and non-2xx responses are.
//!
//! Results are cached by locator, so a document that changes upstream is
//! served stale until the entry expires or [`DocumentProcessor::invalidate`]
//! is called.

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

use crate::analysis::{analyze_document, AnalyzerRegistry};
use crate::cache::{ResultCache, TtlCache};
use crate::config::Config;
use crate::error::ProcessingError;
use crate::extract::{ExtractError, ExtractErrorKind, ExtractionEngine, PdfEngine, RawExtraction};
use crate::models::{
    document_id, AnalysisResult, DocumentMetadata, ExtractionStatus, ProcessingResult,
    ProcessingStatistics,
};
use crate::transport::{DefaultTransport, Transport};
use crate::validate::{validate_signature, validate_size};

/// Anything that turns a locator and a search term into a result.
///
/// The batch orchestrator is generic over this so it can be driven by a
/// stub in tests.
#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn process(
        &self,
        locator: &str,
        search_term: &str,
    ) -> Result<ProcessingResult, ProcessingError>;
}

/// Pipeline states, logged at `debug` on entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Downloading,
    Validating,
    Extracting,
    Classifying,
    Analyzing,
    Done,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Downloading => "downloading",
            PipelineStage::Validating => "validating",
            PipelineStage::Extracting => "extracting",
            PipelineStage::Classifying => "classifying",
            PipelineStage::Analyzing => "analyzing",
            PipelineStage::Done => "done",
        }
    }
}

fn enter(stage: PipelineStage) {
    tracing::debug!(stage = stage.as_str(), "pipeline stage");
}

/// Cache key for a locator: `pdf_analysis_<sha256 hex>`.
pub fn cache_key(locator: &str) -> String {
    format!("pdf_analysis_{}", document_id(locator))
}

/// Short id attached to every log line of one invocation.
pub fn correlation_id(locator: &str) -> String {
    document_id(locator)[..8].to_string()
}

/// The default [`Pipeline`]: transport, extraction engine, cache and
/// per-language analyzers shared by every invocation.
pub struct DocumentProcessor {
    config: Config,
    transport: Arc<dyn Transport>,
    engine: Arc<dyn ExtractionEngine>,
    cache: Arc<dyn ResultCache<Arc<ProcessingResult>>>,
    analyzers: Arc<AnalyzerRegistry>,
}

impl DocumentProcessor {
    /// Processor with the scheme-dispatching transport, the PDF engine, and a
    /// TTL cache sized from `config.cache`.
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            transport: Arc::new(DefaultTransport::new()),
            engine: Arc::new(PdfEngine),
            cache: Arc::new(TtlCache::new(config.cache.ttl())),
            analyzers: Arc::new(AnalyzerRegistry::new()),
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_engine(mut self, engine: Arc<dyn ExtractionEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResultCache<Arc<ProcessingResult>>>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drops the cached result for `locator`, forcing the next call to
    /// download again.
    pub fn invalidate(&self, locator: &str) {
        self.cache.invalidate(&cache_key(locator));
    }

    async fn run(
        &self,
        locator: &str,
        search_term: &str,
    ) -> Result<ProcessingResult, ProcessingError> {
        let key = cache_key(locator);
        if let Some(hit) = self.cache.get(&key) {
            tracing::info!("cache hit");
            return Ok((*hit).clone());
        }

        let start_time = Utc::now();

        enter(PipelineStage::Downloading);
        let bytes = self.download(locator).await?;
        let file_size_bytes = bytes.len() as u64;

        enter(PipelineStage::Extracting);
        let engine = Arc::clone(&self.engine);
        let raw = tokio::task::spawn_blocking(move || engine.extract(&bytes))
            .await
            .map_err(|e| ProcessingError::wrap("Failed to extract PDF content", e))?
            .map_err(extraction_failure)?;

        enter(PipelineStage::Classifying);
        let (status, page_count) = classify(&raw)?;
        let metadata = build_metadata(&raw, file_size_bytes, page_count, status);

        let (analysis, full_text) = if status == ExtractionStatus::Success {
            enter(PipelineStage::Analyzing);
            let registry = Arc::clone(&self.analyzers);
            let analysis_config = self.config.analysis.clone();
            let term = search_term.to_string();
            let text = raw.text;
            tokio::task::spawn_blocking(move || {
                let analysis = analyze_document(&text, &term, &registry, &analysis_config);
                (analysis, text)
            })
            .await
            .map_err(|e| ProcessingError::wrap("Failed to analyze PDF content", e))?
        } else {
            tracing::info!(status = status.as_str(), "analysis skipped");
            (AnalysisResult::skipped(), raw.text)
        };

        let end_time = Utc::now();
        let elapsed = (end_time - start_time)
            .to_std()
            .unwrap_or(Duration::ZERO)
            .as_secs_f64();
        let statistics = ProcessingStatistics {
            end_time: Some(end_time),
            total_pages: page_count,
            processed_pages: page_count,
            total_words: analysis.word_count,
            processing_time_seconds: elapsed,
            ..ProcessingStatistics::started_at(start_time)
        };

        let result = ProcessingResult {
            metadata,
            analysis,
            statistics,
            full_text,
        };
        self.cache.put(&key, Arc::new(result.clone()));

        enter(PipelineStage::Done);
        tracing::info!(
            pages = page_count,
            words = result.analysis.word_count,
            status = status.as_str(),
            seconds = elapsed,
            "document processed"
        );
        Ok(result)
    }

    async fn download(&self, locator: &str) -> Result<Vec<u8>, ProcessingError> {
        let max_retries = self.config.pipeline.max_retries;
        let mut last_error = String::from("no download attempt was made");

        for attempt in 0..max_retries {
            match self.fetch_once(locator).await {
                Ok(bytes) => return Ok(bytes),
                Err(err) if err.is_content_error() => return Err(err),
                Err(err) => {
                    let is_last = attempt + 1 >= max_retries;
                    if !is_last {
                        let delay = self.config.pipeline.backoff_delay(attempt);
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_retries,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "download failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    last_error = err.to_string();
                }
            }
        }

        Err(ProcessingError::wrap("Failed to download PDF", last_error))
    }

    /// One attempt. Transport and status failures come back as
    /// `Processing`; size and signature failures as content errors.
    async fn fetch_once(&self, locator: &str) -> Result<Vec<u8>, ProcessingError> {
        let pipeline = &self.config.pipeline;
        let max_bytes = pipeline.max_document_size_bytes;

        let fetched = self
            .transport
            .fetch(locator, pipeline.download_timeout())
            .await
            .map_err(|e| ProcessingError::Processing(e.to_string()))?;

        if !fetched.is_success() {
            return Err(ProcessingError::Processing(format!(
                "HTTP status {}",
                fetched.status
            )));
        }

        if let Some(advertised) = fetched.content_length() {
            if advertised > max_bytes {
                return Err(ProcessingError::FileTooLarge(format!(
                    "PDF size {} bytes exceeds maximum of {} bytes",
                    advertised, max_bytes
                )));
            }
        }

        if let Some(content_type) = fetched.content_type() {
            let allowed = pipeline
                .allowed_content_types
                .iter()
                .any(|t| t.eq_ignore_ascii_case(content_type));
            if !allowed {
                tracing::warn!(content_type, "unexpected content type, continuing");
            }
        }

        let mut stream = fetched.body;
        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ProcessingError::Processing(e.to_string()))?;
            body.extend_from_slice(&chunk);
            if !validate_size(&body, max_bytes) {
                return Err(ProcessingError::FileTooLarge(format!(
                    "Downloaded PDF exceeds maximum of {} bytes",
                    max_bytes
                )));
            }
        }

        enter(PipelineStage::Validating);
        if !validate_signature(&body) {
            return Err(ProcessingError::InvalidFile(
                "Invalid PDF file: missing %PDF- signature".to_string(),
            ));
        }

        Ok(body)
    }
}

#[async_trait]
impl Pipeline for DocumentProcessor {
    async fn process(
        &self,
        locator: &str,
        search_term: &str,
    ) -> Result<ProcessingResult, ProcessingError> {
        let span = tracing::info_span!("process", id = %correlation_id(locator), locator);
        async {
            let outcome = self.run(locator, search_term).await;
            if let Err(err) = &outcome {
                tracing::error!(kind = err.kind(), error = %err, "processing failed");
            }
            outcome
        }
        .instrument(span)
        .await
    }
}

fn extraction_failure(err: ExtractError) -> ProcessingError {
    match err.kind {
        ExtractErrorKind::PasswordRequired => {
            ProcessingError::EncryptedPdf(format!("PDF is password protected: {}", err.message))
        }
        ExtractErrorKind::Corrupt | ExtractErrorKind::Other => {
            ProcessingError::wrap("Failed to extract PDF content", err)
        }
    }
}

/// Status and page count of an extraction.
///
/// An encrypted document whose page tree is unreadable fails outright; an
/// encrypted document that yielded no text is classified `Encrypted`.
fn classify(raw: &RawExtraction) -> Result<(ExtractionStatus, u32), ProcessingError> {
    let page_count = match raw.page_count {
        Some(n) => n,
        None if raw.encrypted => {
            return Err(ProcessingError::EncryptedPdf(
                "PDF is encrypted and its pages cannot be accessed".to_string(),
            ))
        }
        None => 0,
    };

    let no_text = raw.text.trim().is_empty();
    let status = if raw.encrypted && no_text {
        ExtractionStatus::Encrypted
    } else if no_text {
        ExtractionStatus::ScannedNoText
    } else {
        ExtractionStatus::Success
    };
    Ok((status, page_count))
}

fn build_metadata(
    raw: &RawExtraction,
    file_size_bytes: u64,
    page_count: u32,
    extraction_status: ExtractionStatus,
) -> DocumentMetadata {
    DocumentMetadata {
        title: raw.field("title"),
        author: raw.field("author"),
        subject: raw.field("subject"),
        keywords: raw.field("keywords"),
        creator: raw.field("creator"),
        producer: raw.field("producer"),
        creation_date: raw.field("creation_date"),
        modification_date: raw.field("modification_date"),
        file_size_bytes,
        page_count,
        encrypted: raw.encrypted,
        permissions: raw.permissions,
        extraction_status,
    }
}
