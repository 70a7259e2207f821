//! TOML configuration.
//!
//! Every key has a default, so an empty file (or no file at all, via
//! [`Config::default`]) yields a working setup:
//!
//! ```toml
//! [pipeline]
//! max_document_size_bytes = 104857600
//! download_timeout_secs = 30
//! max_retries = 3
//! backoff_factor = 2.0
//! backoff_base_ms = 1000
//! allowed_content_types = ["application/pdf", "application/x-pdf"]
//! # max_concurrency = 8
//!
//! [cache]
//! ttl_secs = 3600
//!
//! [analysis]
//! preview_chars = 500
//!
//! [search]
//! default_limit = 10
//! snippet_window = 20
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_max_document_size")]
    pub max_document_size_bytes: u64,
    #[serde(default = "default_timeout_secs")]
    pub download_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Advisory: a mismatch is logged, never rejected.
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
    /// Upper bound on in-flight batch invocations. `None` means unbounded.
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_document_size_bytes: default_max_document_size(),
            download_timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            backoff_factor: default_backoff_factor(),
            backoff_base_ms: default_backoff_base_ms(),
            allowed_content_types: default_allowed_content_types(),
            max_concurrency: None,
        }
    }
}

impl PipelineConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    /// Delay slept after failed attempt `attempt` (0-based): `base * factor^attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let millis = self.backoff_base_ms as f64 * self.backoff_factor.powi(attempt as i32);
        Duration::from_millis(millis.round() as u64)
    }
}

fn default_max_document_size() -> u64 {
    100 * 1024 * 1024
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_factor() -> f64 {
    2.0
}
fn default_backoff_base_ms() -> u64 {
    1000
}
fn default_allowed_content_types() -> Vec<String> {
    vec!["application/pdf".to_string(), "application/x-pdf".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_ttl_secs() -> u64 {
    3600
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
    #[serde(default = "default_language_sample_chars")]
    pub language_sample_chars: usize,
    #[serde(default = "default_keyword_count")]
    pub keyword_count: usize,
    #[serde(default = "default_top_word_count")]
    pub top_word_count: usize,
    #[serde(default = "default_max_keyword_features")]
    pub max_keyword_features: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            preview_chars: default_preview_chars(),
            language_sample_chars: default_language_sample_chars(),
            keyword_count: default_keyword_count(),
            top_word_count: default_top_word_count(),
            max_keyword_features: default_max_keyword_features(),
        }
    }
}

fn default_preview_chars() -> usize {
    500
}
fn default_language_sample_chars() -> usize {
    10_000
}
fn default_keyword_count() -> usize {
    10
}
fn default_top_word_count() -> usize {
    10
}
fn default_max_keyword_features() -> usize {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_snippet_window")]
    pub snippet_window: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            snippet_window: default_snippet_window(),
        }
    }
}

fn default_limit() -> usize {
    10
}
fn default_snippet_window() -> usize {
    20
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<()> {
    let pipeline = &config.pipeline;
    if pipeline.max_document_size_bytes == 0 {
        anyhow::bail!("pipeline.max_document_size_bytes must be > 0");
    }
    if pipeline.max_retries < 1 {
        anyhow::bail!("pipeline.max_retries must be >= 1");
    }
    if !pipeline.backoff_factor.is_finite() || pipeline.backoff_factor < 1.0 {
        anyhow::bail!("pipeline.backoff_factor must be a finite number >= 1.0");
    }
    if pipeline.max_concurrency == Some(0) {
        anyhow::bail!("pipeline.max_concurrency must be > 0 when set");
    }

    if config.cache.ttl_secs == 0 {
        anyhow::bail!("cache.ttl_secs must be > 0");
    }

    if config.search.snippet_window == 0 {
        anyhow::bail!("search.snippet_window must be > 0");
    }
    if config.search.default_limit == 0 {
        anyhow::bail!("search.default_limit must be > 0");
    }

    Ok(())
}
