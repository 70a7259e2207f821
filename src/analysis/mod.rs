//! Text analysis of extracted document content.
//!
//! Pure, synchronous functions; the pipeline runs them on a blocking worker.
//!
//! | Function | Produces |
//! |----------|----------|
//! | [`tokenize`] | lowercase word tokens |
//! | [`split_sentences`] | sentences split on terminal punctuation |
//! | [`detect_language`] | ISO 639-1 code from stopword overlap |
//! | [`readability`] | Flesch reading ease, clamped to `[0, 100]` |
//! | [`rank_keywords`] | single-document TF-IDF unigrams and bigrams |
//! | [`count_term_occurrences`] | case-insensitive whole-word match count |
//! | [`analyze_text`] | a complete [`AnalysisResult`] |
//!
//! Stopword-dependent steps go through a [`ContentAnalyzer`], built once per
//! language and shared through an [`AnalyzerRegistry`].

pub mod stopwords;

use dashmap::DashMap;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use crate::config::AnalysisConfig;
use crate::models::{AnalysisResult, Keyword, WordCount};

pub use stopwords::LANGUAGES;

/// Reported when no language scores any stopword hit.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\p{L}\p{N}_]+(?:['’][\p{L}]+)*").expect("word pattern is valid")
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

// ============ Tokens and sentences ============

/// Splits `text` into lowercase word tokens. Internal apostrophes are kept
/// (`don't` is one token); all other punctuation separates tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    word_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Splits on runs of `.`, `!` or `?` followed by whitespace or end of text.
///
/// Terminators inside a token (`3.14`, `e.g.x`) do not split.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, next)) = chars.peek() {
            if matches!(next, '.' | '!' | '?') {
                end = j + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        let at_boundary = chars.peek().map_or(true, |&(_, next)| next.is_whitespace());
        if at_boundary {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

// ============ Language ============

/// Guesses the language of `sample` by counting stopword hits per language.
///
/// Returns `None` when no language scores a hit. Ties go to the language
/// listed first in [`LANGUAGES`].
pub fn detect_language(sample: &str) -> Option<&'static str> {
    let tokens = tokenize(sample);
    if tokens.is_empty() {
        return None;
    }

    let mut best: Option<(&'static str, usize)> = None;
    for &lang in LANGUAGES {
        let table: HashSet<&str> = stopwords::stopwords(lang).iter().copied().collect();
        let hits = tokens.iter().filter(|t| table.contains(t.as_str())).count();
        if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
            best = Some((lang, hits));
        }
    }
    best.map(|(lang, _)| lang)
}

// ============ Readability ============

/// Syllable estimate: vowel groups over `aeiouy`, minus one for a trailing
/// `e`, `es` or `ed` when more than one group was found. Never below 1.
pub fn count_syllables(word: &str) -> usize {
    let word = word.trim().to_lowercase();
    let mut count = 0;
    let mut prev_vowel = false;
    for c in word.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    if count > 1 && (word.ends_with('e') || word.ends_with("es") || word.ends_with("ed")) {
        count -= 1;
    }
    count.max(1)
}

/// Flesch reading ease of `text`, clamped to `[0, 100]`, two decimals.
///
/// Words are whitespace-separated; zero words or zero sentences yield `0.0`.
pub fn readability(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    let sentence_count = split_sentences(text).len();
    if words.is_empty() || sentence_count == 0 {
        return 0.0;
    }

    let word_count = words.len() as f64;
    let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();
    let score = 206.835
        - 1.015 * (word_count / sentence_count as f64)
        - 84.6 * (syllables as f64 / word_count);
    round_to(score.clamp(0.0, 100.0), 2)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ============ Keywords ============

/// Ranks unigram and bigram keywords of a single document.
///
/// Tokens shorter than two characters and stopwords are dropped before
/// bigrams are formed. With one document the inverse document frequency is
/// constant, so a term's score is its count divided by the L2 norm of all
/// retained counts. Only the `max_features` most frequent terms are
/// retained. Output is descending by score, ties alphabetical, at most
/// `top_n` long.
pub fn rank_keywords(
    text: &str,
    stopwords: &HashSet<&'static str>,
    max_features: usize,
    top_n: usize,
) -> Vec<Keyword> {
    let tokens: Vec<String> = tokenize(text)
        .into_iter()
        .filter(|t| t.chars().count() >= 2 && !stopwords.contains(t.as_str()))
        .collect();
    if tokens.is_empty() || max_features == 0 || top_n == 0 {
        return Vec::new();
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for token in &tokens {
        *counts.entry(token.clone()).or_insert(0) += 1;
    }
    for pair in tokens.windows(2) {
        *counts.entry(format!("{} {}", pair[0], pair[1])).or_insert(0) += 1;
    }

    let mut features: Vec<(String, usize)> = counts.into_iter().collect();
    features.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    features.truncate(max_features);

    let norm = features
        .iter()
        .map(|(_, count)| (*count as f64).powi(2))
        .sum::<f64>()
        .sqrt();

    // Already ordered by count, which is the score order.
    features
        .into_iter()
        .take(top_n)
        .map(|(term, count)| Keyword {
            term,
            score: count as f64 / norm,
        })
        .collect()
}

// ============ Term counting ============

/// Counts non-overlapping, case-insensitive occurrences of `term` in `text`.
///
/// A match must not be glued to surrounding word characters, but only on
/// the sides where the term itself starts or ends with a word character:
/// `c++` matches in `c++ rocks` while `cat` does not match in `concat`.
pub fn count_term_occurrences(text: &str, term: &str) -> usize {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return 0;
    }
    let haystack = text.to_lowercase();

    let first_is_word = needle.chars().next().is_some_and(is_word_char);
    let last_is_word = needle.chars().next_back().is_some_and(is_word_char);

    haystack
        .match_indices(needle.as_str())
        .filter(|(idx, matched)| {
            let before = haystack[..*idx].chars().next_back();
            let after = haystack[idx + matched.len()..].chars().next();
            let start_ok = !first_is_word || !before.is_some_and(is_word_char);
            let end_ok = !last_is_word || !after.is_some_and(is_word_char);
            start_ok && end_ok
        })
        .count()
}

// ============ Analyzer ============

/// Language-specific analysis state.
#[derive(Debug)]
pub struct ContentAnalyzer {
    language: String,
    stopwords: HashSet<&'static str>,
    keyword_stopwords: HashSet<&'static str>,
}

impl ContentAnalyzer {
    /// Builds an analyzer for `language`. Unknown languages get no stopwords
    /// for word frequencies and the English table for keyword ranking.
    pub fn new(language: &str) -> Self {
        let stopwords: HashSet<&'static str> =
            stopwords::stopwords(language).iter().copied().collect();
        let keyword_stopwords = if stopwords.is_empty() {
            stopwords::stopwords("en").iter().copied().collect()
        } else {
            stopwords.clone()
        };
        Self {
            language: language.to_string(),
            stopwords,
            keyword_stopwords,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn keywords(&self, text: &str, max_features: usize, top_n: usize) -> Vec<Keyword> {
        rank_keywords(text, &self.keyword_stopwords, max_features, top_n)
    }

    /// Most frequent alphabetic non-stopword tokens. Ties keep first-seen
    /// order.
    pub fn top_words(&self, tokens: &[String], n: usize) -> Vec<WordCount> {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for token in tokens {
            if !token.chars().all(char::is_alphabetic) || self.is_stopword(token) {
                continue;
            }
            let count = counts.entry(token.as_str()).or_insert(0);
            if *count == 0 {
                order.push(token.as_str());
            }
            *count += 1;
        }

        let mut ranked: Vec<WordCount> = order
            .into_iter()
            .map(|word| WordCount {
                word: word.to_string(),
                count: counts[word],
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(n);
        ranked
    }
}

/// Lazily built analyzers, one per language, shared across invocations.
#[derive(Debug, Default)]
pub struct AnalyzerRegistry {
    analyzers: DashMap<String, Arc<ContentAnalyzer>>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, language: &str) -> Arc<ContentAnalyzer> {
        self.analyzers
            .entry(language.to_string())
            .or_insert_with(|| Arc::new(ContentAnalyzer::new(language)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn language_sample(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// Detects the language of `text` and analyzes it with the matching
/// analyzer from `registry`.
pub fn analyze_document(
    text: &str,
    search_term: &str,
    registry: &AnalyzerRegistry,
    config: &AnalysisConfig,
) -> AnalysisResult {
    let sample = language_sample(text, config.language_sample_chars);
    let language = detect_language(sample).unwrap_or(UNKNOWN_LANGUAGE);
    let analyzer = registry.get(language);
    analyze_text(text, search_term, &analyzer, config)
}

/// Full analysis of `text` with a fixed analyzer.
pub fn analyze_text(
    text: &str,
    search_term: &str,
    analyzer: &ContentAnalyzer,
    config: &AnalysisConfig,
) -> AnalysisResult {
    let tokens = tokenize(text);
    let keywords = analyzer.keywords(text, config.max_keyword_features, config.keyword_count);

    let needle = search_term.trim().to_lowercase();
    let matching_keywords = keywords
        .iter()
        .filter(|k| k.term.contains(needle.as_str()))
        .cloned()
        .collect();

    AnalysisResult {
        language: analyzer.language().to_string(),
        word_count: tokens.len(),
        character_count: text.chars().count(),
        sentence_count: split_sentences(text).len(),
        search_term_count: count_term_occurrences(text, search_term),
        keywords,
        matching_keywords,
        readability_score: readability(text),
        text_preview: preview(text, config.preview_chars),
        top_words: analyzer.top_words(&tokens, config.top_word_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_keeps_contractions() {
        assert_eq!(
            tokenize("Don't STOP, believing!"),
            vec!["don't", "stop", "believing"]
        );
        assert!(tokenize("  ... ").is_empty());
    }

    #[test]
    fn sentences_split_on_terminators() {
        assert_eq!(
            split_sentences("First one. Second?! Third"),
            vec!["First one.", "Second?!", "Third"]
        );
        assert_eq!(split_sentences("Pi is 3.14 exactly."), vec!["Pi is 3.14 exactly."]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn detects_common_languages() {
        assert_eq!(
            detect_language("The report is about the state of the network and the users."),
            Some("en")
        );
        assert_eq!(
            detect_language("Le rapport est dans le bureau et nous sommes avec les clients."),
            Some("fr")
        );
        assert_eq!(
            detect_language("Der Bericht ist nicht auf dem Tisch und die Kunden sind da."),
            Some("de")
        );
        assert_eq!(detect_language("zzz qqq xyzzy"), None);
        assert_eq!(detect_language(""), None);
    }

    #[test]
    fn syllable_heuristic() {
        assert_eq!(count_syllables("hello"), 2);
        assert_eq!(count_syllables("a"), 1);
        assert_eq!(count_syllables("software"), 2);
        assert_eq!(count_syllables("rhythm"), 1);
        assert_eq!(count_syllables("the"), 1);
    }

    #[test]
    fn readability_edges() {
        assert_eq!(readability(""), 0.0);
        assert_eq!(readability("   "), 0.0);
        // One short sentence of one-syllable words scores above the ceiling.
        assert_eq!(readability("The cat sat."), 100.0);
        let score = readability(
            "Interdisciplinary collaboration necessitates comprehensive organizational restructuring.",
        );
        assert_eq!(score, 0.0);
    }

    #[test]
    fn readability_midrange_is_rounded() {
        let score = readability("The quick brown fox jumps over the lazy dog. It was very happy.");
        assert!(score > 0.0 && score < 100.0);
        assert_eq!(score, round_to(score, 2));
    }

    #[test]
    fn keywords_rank_by_normalized_frequency() {
        let stop: HashSet<&'static str> = stopwords::stopwords("en").iter().copied().collect();
        let kws = rank_keywords(
            "Rust compiler. The rust compiler is fast. Rust!",
            &stop,
            1000,
            3,
        );
        assert_eq!(kws[0].term, "rust");
        assert_eq!(kws[1].term, "compiler");
        assert_eq!(kws[2].term, "rust compiler");

        // counts: rust 3, compiler 2, rust compiler 2, fast 1, compiler fast 1,
        // fast rust 1, compiler rust 1
        let norm = (9.0f64 + 4.0 + 4.0 + 1.0 + 1.0 + 1.0 + 1.0).sqrt();
        assert!((kws[0].score - 3.0 / norm).abs() < 1e-9);
    }

    #[test]
    fn keywords_empty_when_only_stopwords() {
        let stop: HashSet<&'static str> = stopwords::stopwords("en").iter().copied().collect();
        assert!(rank_keywords("the and of a", &stop, 1000, 10).is_empty());
        assert!(rank_keywords("", &stop, 1000, 10).is_empty());
    }

    #[test]
    fn term_counting_is_whole_word_and_case_insensitive() {
        let text = "Consistency matters. consistency, CONSISTENCY! inconsistency";
        assert_eq!(count_term_occurrences(text, "consistency"), 3);
        assert_eq!(count_term_occurrences("concat cat cats", "cat"), 1);
        assert_eq!(count_term_occurrences("I like c++ and C++.", "c++"), 2);
        assert_eq!(count_term_occurrences("anything", "  "), 0);
        assert_eq!(count_term_occurrences("aaaa", "aa"), 0);
        assert_eq!(count_term_occurrences("aa aa", "aa"), 2);
    }

    #[test]
    fn top_words_skip_stopwords_and_keep_first_seen_ties() {
        let analyzer = ContentAnalyzer::new("en");
        let tokens = tokenize("beta alpha the beta gamma alpha delta 42");
        let top = analyzer.top_words(&tokens, 3);
        assert_eq!(
            top,
            vec![
                WordCount { word: "beta".into(), count: 2 },
                WordCount { word: "alpha".into(), count: 2 },
                WordCount { word: "gamma".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn unknown_language_falls_back_for_keywords_only() {
        let analyzer = ContentAnalyzer::new(UNKNOWN_LANGUAGE);
        assert!(!analyzer.is_stopword("the"));
        let kws = analyzer.keywords("the widget the widget", 10, 10);
        assert!(kws.iter().all(|k| !k.term.split(' ').any(|w| w == "the")));
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("héllo", 10), "héllo");
        assert_eq!(preview("héllo", 2), "hé...");
        assert_eq!(preview("abc", 3), "abc");
    }

    #[test]
    fn registry_reuses_analyzers() {
        let registry = AnalyzerRegistry::new();
        let a = registry.get("en");
        let b = registry.get("en");
        assert!(Arc::ptr_eq(&a, &b));
        registry.get("fr");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn registry_builds_one_analyzer_under_contention() {
        let registry = Arc::new(AnalyzerRegistry::new());
        let analyzers: Vec<Arc<ContentAnalyzer>> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.get("de"))
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();
        assert!(analyzers.iter().all(|a| Arc::ptr_eq(a, &analyzers[0])));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn analyze_counts_term_and_matches_keywords() {
        let config = AnalysisConfig::default();
        let text = "Consistency is the key. We value consistency. Consistency wins.";
        let result = analyze_document(text, "Consistency", &AnalyzerRegistry::new(), &config);
        assert_eq!(result.language, "en");
        assert_eq!(result.search_term_count, 3);
        assert_eq!(result.sentence_count, 3);
        assert_eq!(result.word_count, 9);
        assert_eq!(result.text_preview, text);
        assert!(result.matching_keywords.iter().any(|k| k.term == "consistency"));
        assert!(!result.is_skipped());
    }
}
