//! Plain-text and JSON rendering of results for the CLI.
//!
//! Every function returns the rendered text; printing is left to the caller.

use std::fmt::Write;

use crate::batch::BatchSummary;
use crate::models::ProcessingResult;
use crate::search::SearchHit;

fn push_field(out: &mut String, label: &str, value: &Option<String>) {
    if let Some(value) = value {
        let _ = writeln!(out, "{}: {}", label, value);
    }
}

/// Metadata, analysis and statistics of one processed document.
pub fn format_document(result: &ProcessingResult) -> String {
    let metadata = &result.metadata;
    let analysis = &result.analysis;
    let stats = &result.statistics;
    let mut out = String::new();

    let _ = writeln!(out, "--- PDF Metadata ---");
    let _ = writeln!(
        out,
        "Status: {}",
        metadata.extraction_status.as_str().to_uppercase()
    );
    push_field(&mut out, "Title", &metadata.title);
    push_field(&mut out, "Author", &metadata.author);
    push_field(&mut out, "Subject", &metadata.subject);
    push_field(&mut out, "Keywords", &metadata.keywords);
    push_field(&mut out, "Creator", &metadata.creator);
    push_field(&mut out, "Producer", &metadata.producer);
    push_field(&mut out, "Creation Date", &metadata.creation_date);
    push_field(&mut out, "Modification Date", &metadata.modification_date);
    let _ = writeln!(out, "File Size: {} bytes", metadata.file_size_bytes);
    let _ = writeln!(out, "Page Count: {}", metadata.page_count);
    let _ = writeln!(out, "Encrypted: {}", metadata.encrypted);

    if !analysis.is_skipped() {
        let _ = writeln!(out, "\n--- PDF Analysis ---");
        let _ = writeln!(out, "Language: {}", analysis.language);
        let _ = writeln!(out, "Word Count: {}", analysis.word_count);
        let _ = writeln!(out, "Character Count: {}", analysis.character_count);
        let _ = writeln!(out, "Sentence Count: {}", analysis.sentence_count);
        let _ = writeln!(out, "Search Term Count: {}", analysis.search_term_count);
        let _ = writeln!(out, "Readability Score: {}", analysis.readability_score);
        let _ = writeln!(out, "Keywords:");
        for keyword in &analysis.keywords {
            let _ = writeln!(out, "  {}: {:.2}", keyword.term, keyword.score);
        }
        let _ = writeln!(out, "Top Words:");
        for word in &analysis.top_words {
            let _ = writeln!(out, "  {}: {}", word.word, word.count);
        }
        let _ = writeln!(out, "\nText Preview:");
        let _ = writeln!(out, "{}", analysis.text_preview);
    }

    let _ = writeln!(out, "\n--- Processing Statistics ---");
    let _ = writeln!(out, "Start Time: {}", stats.start_time.to_rfc3339());
    if let Some(end) = stats.end_time {
        let _ = writeln!(out, "End Time: {}", end.to_rfc3339());
    }
    let _ = writeln!(out, "Total Pages: {}", stats.total_pages);
    let _ = writeln!(out, "Processed Pages: {}", stats.processed_pages);
    let _ = writeln!(out, "Total Words: {}", stats.total_words);
    let _ = writeln!(
        out,
        "Processing Time: {:.2} seconds",
        stats.processing_time_seconds
    );
    out
}

pub fn format_batch_summary(summary: &BatchSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Batch Processing Summary ===");
    let _ = writeln!(out, "Total Processed: {}", summary.total_processed);
    let _ = writeln!(out, "Total Errors: {}", summary.total_errors);
    let _ = writeln!(out, "Success Rate: {:.2}%", summary.success_rate);
    let _ = writeln!(
        out,
        "Average Processing Time: {:.2} seconds",
        summary.average_processing_time
    );
    let _ = writeln!(out, "Total Pages Processed: {}", summary.total_pages_processed);
    out
}

pub fn format_search_hits(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return "No results.\n".to_string();
    }
    let mut out = String::new();
    for (i, hit) in hits.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. [{:.3}] {}",
            i + 1,
            hit.relevance_score,
            hit.metadata.title.as_deref().unwrap_or("(untitled)")
        );
        let _ = writeln!(out, "    locator: {}", hit.locator);
        let _ = writeln!(out, "    status: {}", hit.metadata.extraction_status);
        let _ = writeln!(out, "    language: {}", hit.language);
        if !hit.snippet.is_empty() {
            let _ = writeln!(out, "    > {}", hit.snippet);
        }
        let _ = writeln!(out);
    }
    out
}

/// JSON form of a result. The full text is omitted unless requested.
pub fn result_json(result: &ProcessingResult, include_full_text: bool) -> serde_json::Value {
    let mut value = serde_json::json!({
        "metadata": result.metadata,
        "analysis": result.analysis,
        "statistics": result.statistics
    });
    if include_full_text {
        value["full_text"] = serde_json::Value::String(result.full_text.clone());
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnalysisResult, DocumentMetadata, ExtractionStatus, Permissions, ProcessingStatistics,
    };
    use chrono::Utc;

    fn result(analysis: AnalysisResult) -> ProcessingResult {
        ProcessingResult {
            metadata: DocumentMetadata {
                title: Some("Annual Report".into()),
                author: None,
                subject: None,
                keywords: None,
                creator: None,
                producer: None,
                creation_date: None,
                modification_date: None,
                file_size_bytes: 2048,
                page_count: 2,
                encrypted: false,
                permissions: Permissions::all(),
                extraction_status: ExtractionStatus::ScannedNoText,
            },
            analysis,
            statistics: ProcessingStatistics::started_at(Utc::now()),
            full_text: "secret body".into(),
        }
    }

    #[test]
    fn skipped_analysis_section_is_omitted() {
        let text = format_document(&result(AnalysisResult::skipped()));
        assert!(text.contains("Status: SCANNED_OCR_REQUIRED"));
        assert!(text.contains("Title: Annual Report"));
        assert!(!text.contains("Author:"));
        assert!(!text.contains("--- PDF Analysis ---"));
        assert!(text.contains("Page Count: 2"));
    }

    #[test]
    fn batch_summary_formats_percentages() {
        let text = format_batch_summary(&BatchSummary {
            total_processed: 2,
            total_errors: 1,
            success_rate: 200.0 / 3.0,
            average_processing_time: 1.5,
            total_pages_processed: 7,
        });
        assert!(text.contains("Success Rate: 66.67%"));
        assert!(text.contains("Average Processing Time: 1.50 seconds"));
    }

    #[test]
    fn json_omits_full_text_by_default() {
        let r = result(AnalysisResult::skipped());
        let value = result_json(&r, false);
        assert!(value.get("full_text").is_none());
        assert_eq!(value["metadata"]["extraction_status"], "scanned_ocr_required");
        assert_eq!(result_json(&r, true)["full_text"], "secret body");
    }

    #[test]
    fn empty_hits() {
        assert_eq!(format_search_hits(&[]), "No results.\n");
    }
}
