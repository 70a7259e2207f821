//! Shared fixtures: PDF byte builders, scripted transport and engine mocks,
//! and result/analysis builders.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pdf_harvest::config::Config;
use pdf_harvest::extract::{ExtractError, ExtractErrorKind, ExtractionEngine, RawExtraction};
use pdf_harvest::models::{
    AnalysisResult, DocumentMetadata, ExtractionStatus, Keyword, Permissions, ProcessingResult,
    ProcessingStatistics,
};
use pdf_harvest::transport::{Fetched, Transport, TransportError};

/// Config with millisecond backoff so retry tests stay fast.
#[allow(dead_code)]
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.pipeline.backoff_base_ms = 1;
    config.pipeline.max_retries = 3;
    config
}

/// Bytes that pass signature validation. Only meaningful with a mock engine.
#[allow(dead_code)]
pub fn pdf_stub() -> Vec<u8> {
    b"%PDF-1.4\n% stub body for mocked extraction\n%%EOF\n".to_vec()
}

/// Two-page PDF with an information dictionary.
/// Builds body then xref with correct byte offsets so lopdf can parse it.
#[allow(dead_code)]
pub fn two_page_pdf(title: &str, first: &str, second: &str) -> Vec<u8> {
    let content = |text: &str| format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
    let first_stream = content(first);
    let second_stream = content(second);

    let objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R 5 0 R] /Count 2 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 7 0 R >> >> >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            first_stream.len(),
            first_stream
        ),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 6 0 R /Resources << /Font << /F1 7 0 R >> >> >>".to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            second_stream.len(),
            second_stream
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        format!("<< /Title ({}) /Producer (pdf-harvest tests) >>", title),
    ];

    let mut out = Vec::new();
    out.extend_from_slice(b"%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_start = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(format!("{:010} 65535 f \n", 0).as_bytes());
    for offset in &offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer << /Size {} /Root 1 0 R /Info 8 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_start
        )
        .as_bytes(),
    );
    out
}

// ============ Transport ============

/// Transport returning a fixed response, optionally failing the first `n`
/// calls with a network error.
#[allow(dead_code)]
pub struct MockTransport {
    calls: AtomicUsize,
    failures: usize,
    delay: Duration,
    status: u16,
    headers: HashMap<String, String>,
    body: Vec<u8>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn ok(body: Vec<u8>) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/pdf".to_string());
        headers.insert("content-length".to_string(), body.len().to_string());
        Self {
            calls: AtomicUsize::new(0),
            failures: 0,
            delay: Duration::ZERO,
            status: 200,
            headers,
            body,
        }
    }

    pub fn always_failing() -> Self {
        Self::ok(Vec::new()).failing_first(usize::MAX)
    }

    pub fn failing_first(mut self, n: usize) -> Self {
        self.failures = n;
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn without_header(mut self, name: &str) -> Self {
        self.headers.remove(&name.to_ascii_lowercase());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, _locator: &str, _timeout: Duration) -> Result<Fetched, TransportError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if n < self.failures {
            return Err(TransportError::Network("connection reset by peer".to_string()));
        }
        Ok(Fetched::from_bytes(
            self.status,
            self.headers.clone(),
            self.body.clone(),
        ))
    }
}

// ============ Engine ============

/// Engine returning a fixed extraction (or error) and counting calls.
#[allow(dead_code)]
pub struct MockEngine {
    calls: AtomicUsize,
    outcome: Result<RawExtraction, ExtractError>,
}

#[allow(dead_code)]
impl MockEngine {
    pub fn text(text: &str, pages: u32) -> Self {
        Self::raw(RawExtraction {
            text: text.to_string(),
            page_count: Some(pages),
            ..RawExtraction::default()
        })
    }

    pub fn raw(raw: RawExtraction) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: Ok(raw),
        }
    }

    pub fn failing(kind: ExtractErrorKind, message: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            outcome: Err(ExtractError::new(kind, message)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ExtractionEngine for MockEngine {
    fn extract(&self, _bytes: &[u8]) -> Result<RawExtraction, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

// ============ Models ============

#[allow(dead_code)]
pub fn metadata(title: &str, pages: u32) -> DocumentMetadata {
    DocumentMetadata {
        title: Some(title.to_string()),
        author: None,
        subject: None,
        keywords: None,
        creator: None,
        producer: None,
        creation_date: None,
        modification_date: None,
        file_size_bytes: 1024,
        page_count: pages,
        encrypted: false,
        permissions: Permissions::all(),
        extraction_status: ExtractionStatus::Success,
    }
}

/// Analysis whose preview is `preview`, with one keyword.
#[allow(dead_code)]
pub fn analysis(preview: &str) -> AnalysisResult {
    AnalysisResult {
        language: "en".to_string(),
        word_count: preview.split_whitespace().count(),
        character_count: preview.chars().count(),
        sentence_count: 1,
        search_term_count: 0,
        keywords: vec![Keyword {
            term: "sample".to_string(),
            score: 1.0,
        }],
        matching_keywords: Vec::new(),
        readability_score: 50.0,
        text_preview: preview.to_string(),
        top_words: Vec::new(),
    }
}

#[allow(dead_code)]
pub fn result(title: &str, pages: u32, seconds: f64) -> ProcessingResult {
    let mut statistics = ProcessingStatistics::started_at(Utc::now());
    statistics.end_time = Some(statistics.start_time);
    statistics.total_pages = pages;
    statistics.processed_pages = pages;
    statistics.processing_time_seconds = seconds;
    ProcessingResult {
        metadata: metadata(title, pages),
        analysis: analysis("sample text"),
        statistics,
        full_text: "sample text".to_string(),
    }
}
