//! Core data models shared by the pipeline, the batch orchestrator, and the
//! search index.
//!
//! A [`ProcessingResult`] is the unit handed back to callers: the document's
//! [`DocumentMetadata`], its [`AnalysisResult`], the per-invocation
//! [`ProcessingStatistics`], and the full extracted text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Preview text placed in a synthesized analysis when analysis did not run.
pub const ANALYSIS_SKIPPED_PREVIEW: &str = "[Analysis skipped: No extractable text found]";

/// Outcome of text extraction. Only `Success` documents are analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractionStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "failed")]
    Failed,
    /// Pages were readable but carried no non-whitespace text.
    #[serde(rename = "scanned_ocr_required")]
    ScannedNoText,
    /// Encrypted and no text could be read.
    #[serde(rename = "encrypted")]
    Encrypted,
}

impl ExtractionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Success => "success",
            ExtractionStatus::Failed => "failed",
            ExtractionStatus::ScannedNoText => "scanned_ocr_required",
            ExtractionStatus::Encrypted => "encrypted",
        }
    }
}

impl std::fmt::Display for ExtractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document permission flags as declared by the encryption dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub print: bool,
    pub modify: bool,
    pub copy: bool,
    pub annotate: bool,
}

impl Permissions {
    pub fn all() -> Self {
        Self {
            print: true,
            modify: true,
            copy: true,
            annotate: true,
        }
    }

    pub fn none() -> Self {
        Self {
            print: false,
            modify: false,
            copy: false,
            annotate: false,
        }
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::all()
    }
}

/// Structural metadata of a processed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    /// Raw creation timestamp as stored in the document.
    pub creation_date: Option<String>,
    /// Raw modification timestamp as stored in the document.
    pub modification_date: Option<String>,
    pub file_size_bytes: u64,
    pub page_count: u32,
    pub encrypted: bool,
    pub permissions: Permissions,
    pub extraction_status: ExtractionStatus,
}

/// Timing and volume figures for one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStatistics {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_pages: u32,
    pub processed_pages: u32,
    pub total_words: usize,
    pub processing_time_seconds: f64,
    /// Advisory; currently always 0.
    pub memory_used: u64,
}

impl ProcessingStatistics {
    pub fn started_at(start_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time: None,
            total_pages: 0,
            processed_pages: 0,
            total_words: 0,
            processing_time_seconds: 0.0,
            memory_used: 0,
        }
    }
}

/// A ranked keyword and its TF-IDF score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub term: String,
    pub score: f64,
}

/// A frequent word and its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

/// Content analysis of a document's extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// ISO 639-1 code, or `"unknown"`.
    pub language: String,
    pub word_count: usize,
    pub character_count: usize,
    pub sentence_count: usize,
    /// Case-insensitive whole-word occurrences of the search term.
    pub search_term_count: usize,
    /// Ranked descending by score.
    pub keywords: Vec<Keyword>,
    /// Keywords whose term contains the search term.
    pub matching_keywords: Vec<Keyword>,
    /// Flesch reading ease in `[0, 100]`.
    pub readability_score: f64,
    pub text_preview: String,
    pub top_words: Vec<WordCount>,
}

impl AnalysisResult {
    /// Degenerate analysis for documents that were not analyzed.
    ///
    /// The preview carries [`ANALYSIS_SKIPPED_PREVIEW`] so it cannot be
    /// mistaken for a genuine analysis of term-free text.
    pub fn skipped() -> Self {
        Self {
            language: "unknown".to_string(),
            word_count: 0,
            character_count: 0,
            sentence_count: 0,
            search_term_count: 0,
            keywords: Vec::new(),
            matching_keywords: Vec::new(),
            readability_score: 0.0,
            text_preview: ANALYSIS_SKIPPED_PREVIEW.to_string(),
            top_words: Vec::new(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.text_preview == ANALYSIS_SKIPPED_PREVIEW
    }
}

/// Everything produced by one successful pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub metadata: DocumentMetadata,
    pub analysis: AnalysisResult,
    pub statistics: ProcessingStatistics,
    pub full_text: String,
}

/// Stable identifier of a locator: lowercase SHA-256 hex of its bytes.
///
/// Used as the search document id and, prefixed, as the cache key.
pub fn document_id(locator: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(locator.as_bytes());
    hex::encode(hasher.finalize())
}
