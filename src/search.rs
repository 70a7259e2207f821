//! In-memory inverted index over processed documents.
//!
//! # Scoring
//!
//! Every distinct query token found in the index adds `1 / postings` to each
//! document listed in that token's posting list, so rare tokens weigh more
//! than common ones. Posting lists are append-only: adding the same locator
//! twice lists it twice, and the duplicate raises its score.
//!
//! Documents are ranked by summed score, descending. Equal scores keep the
//! order in which the documents were first reached while scoring (query
//! token order, then posting order).
//!
//! # Snippets
//!
//! A window of `snippet_window` whitespace-separated words slides over the
//! document content; the window with the most query-token matches wins,
//! earliest first on ties, and is returned followed by `...`. A word matches
//! when any token the indexer derives from it is in the query, so
//! `state-of-the-art` matches `state`.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::analysis::tokenize;
use crate::config::SearchConfig;
use crate::models::{document_id, AnalysisResult, DocumentMetadata, Keyword};

/// A document as stored in the index.
#[derive(Debug, Clone, Serialize)]
pub struct SearchDocument {
    pub id: String,
    pub locator: String,
    pub metadata: DocumentMetadata,
    /// Full text when it was supplied, otherwise the analysis preview.
    pub content: String,
    pub keywords: Vec<Keyword>,
    pub matching_keywords: Vec<Keyword>,
    pub search_term_count: usize,
    pub language: String,
}

/// One ranked search result.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub locator: String,
    pub metadata: DocumentMetadata,
    /// Summed score, rounded to three decimals.
    pub relevance_score: f64,
    pub snippet: String,
    pub language: String,
    pub search_term_count: usize,
    pub matching_keywords: Vec<Keyword>,
}

pub struct SearchIndex {
    documents: HashMap<String, SearchDocument>,
    postings: HashMap<String, Vec<String>>,
    snippet_window: usize,
}

impl SearchIndex {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            documents: HashMap::new(),
            postings: HashMap::new(),
            snippet_window: config.snippet_window.max(1),
        }
    }

    /// Indexes a processed document and returns its id.
    ///
    /// `full_text` is preferred as the indexed content; without it (or when
    /// it is blank) the analysis preview is indexed instead.
    pub fn add_document(
        &mut self,
        locator: &str,
        analysis: &AnalysisResult,
        metadata: &DocumentMetadata,
        full_text: Option<&str>,
    ) -> String {
        let id = document_id(locator);
        let content = full_text
            .filter(|text| !text.trim().is_empty())
            .unwrap_or(analysis.text_preview.as_str())
            .to_string();

        let mut seen = HashSet::new();
        for token in tokenize(&content) {
            if seen.insert(token.clone()) {
                self.postings.entry(token).or_default().push(id.clone());
            }
        }

        tracing::debug!(id = %id, tokens = seen.len(), "document indexed");

        self.documents.insert(
            id.clone(),
            SearchDocument {
                id: id.clone(),
                locator: locator.to_string(),
                metadata: metadata.clone(),
                content,
                keywords: analysis.keywords.clone(),
                matching_keywords: analysis.matching_keywords.clone(),
                search_term_count: analysis.search_term_count,
                language: analysis.language.clone(),
            },
        );
        id
    }

    /// Ranked documents for `query`, at most `limit` of them.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let mut query_tokens: Vec<String> = Vec::new();
        for token in tokenize(query) {
            if !query_tokens.contains(&token) {
                query_tokens.push(token);
            }
        }
        if query_tokens.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut order: Vec<&str> = Vec::new();
        let mut scores: HashMap<&str, f64> = HashMap::new();
        for token in &query_tokens {
            let Some(postings) = self.postings.get(token) else {
                continue;
            };
            let weight = 1.0 / postings.len() as f64;
            for id in postings {
                let score = scores.entry(id.as_str()).or_insert_with(|| {
                    order.push(id.as_str());
                    0.0
                });
                *score += weight;
            }
        }

        let mut ranked: Vec<(&str, f64)> =
            order.into_iter().map(|id| (id, scores[id])).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(limit);

        let query_set: HashSet<&str> = query_tokens.iter().map(|t| t.as_str()).collect();
        ranked
            .into_iter()
            .filter_map(|(id, score)| {
                let doc = self.documents.get(id)?;
                Some(SearchHit {
                    id: doc.id.clone(),
                    locator: doc.locator.clone(),
                    metadata: doc.metadata.clone(),
                    relevance_score: (score * 1000.0).round() / 1000.0,
                    snippet: snippet(&doc.content, &query_set, self.snippet_window),
                    language: doc.language.clone(),
                    search_term_count: doc.search_term_count,
                    matching_keywords: doc.matching_keywords.clone(),
                })
            })
            .collect()
    }

    pub fn document(&self, id: &str) -> Option<&SearchDocument> {
        self.documents.get(id)
    }

    /// Number of distinct documents (re-added locators count once).
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Posting list length for `token`.
    pub fn postings_len(&self, token: &str) -> usize {
        self.postings.get(token).map_or(0, Vec::len)
    }
}

/// Best `window`-word span of `content` by query-token matches, plus `...`;
/// empty when no word matches.
///
/// A word matches when any token the indexer would derive from it is in
/// the query, so `state-of-the-art` matches `state`.
fn snippet(content: &str, query: &HashSet<&str>, window: usize) -> String {
    let words: Vec<&str> = content.split_whitespace().collect();
    let hits: Vec<bool> = words
        .iter()
        .map(|w| tokenize(w).iter().any(|t| query.contains(t.as_str())))
        .collect();

    let mut best: Option<(usize, usize)> = None;
    for start in 0..words.len() {
        let end = (start + window).min(words.len());
        let matches = hits[start..end].iter().filter(|hit| **hit).count();
        if matches > best.map_or(0, |(_, top)| top) {
            best = Some((start, matches));
        }
    }

    match best {
        Some((start, _)) => {
            let end = (start + window).min(words.len());
            format!("{}...", words[start..end].join(" "))
        }
        None => String::new(),
    }
}
