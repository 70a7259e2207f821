//! # PDF Harvest
//!
//! Concurrent PDF ingestion, content analysis, and in-memory full-text
//! search.
//!
//! A document locator (HTTP(S) URL, `file://` URL, or local path) goes
//! through a pipeline that downloads it with retry and backoff, validates the
//! payload, extracts text and structure, classifies it, analyzes the text
//! for a search term, and caches the result. Many locators can be processed
//! concurrently with per-item failure isolation, and finished results can be
//! fed into an inverted index for ranked search.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────────────────┐   ┌─────────────┐
//! │ Transport │──▶│ Pipeline                     │──▶│ SearchIndex │
//! │ HTTP/File │   │ validate → extract → analyze │   │ inverted    │
//! └───────────┘   └──────────────┬───────────────┘   └─────────────┘
//!                                │
//!                  ┌─────────────┴──────────┐
//!                  ▼                        ▼
//!            ┌──────────┐            ┌────────────┐
//!            │ TtlCache │            │   Batch    │
//!            └──────────┘            │ fan-out    │
//!                                    └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! pdfh process https://example.com/report.pdf --term consistency
//! pdfh batch a.pdf b.pdf c.pdf --term consistency --progress human
//! pdfh search "network latency" --locator a.pdf --locator b.pdf --term latency
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Processing error family |
//! | [`models`] | Core data types |
//! | [`validate`] | Signature and size checks on raw bytes |
//! | [`cache`] | Result cache trait and TTL store |
//! | [`transport`] | HTTP and filesystem fetching |
//! | [`extract`] | PDF text and structure extraction |
//! | [`analysis`] | Language, keywords, readability, term counts |
//! | [`pipeline`] | Single-document processing |
//! | [`batch`] | Concurrent multi-document processing |
//! | [`search`] | Inverted index and ranking |
//! | [`progress`] | Batch progress on stderr |
//! | [`report`] | Text and JSON rendering |
//! | [`telemetry`] | Tracing setup |

pub mod analysis;
pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod search;
pub mod telemetry;
pub mod transport;
pub mod validate;

pub use error::ProcessingError;
pub use pipeline::{DocumentProcessor, Pipeline};
