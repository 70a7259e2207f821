//! Error types surfaced by the processing pipeline.
//!
//! [`ProcessingError`] is the single failure family returned by a pipeline
//! invocation. Callers can match a specific variant or treat every variant
//! alike through [`ProcessingError::kind`] and `Display`.
//!
//! | Variant | Raised when | Retried |
//! |---------|-------------|---------|
//! | [`InvalidFile`](ProcessingError::InvalidFile) | `%PDF-` signature missing | no |
//! | [`FileTooLarge`](ProcessingError::FileTooLarge) | size ceiling breached (header or body) | no |
//! | [`EncryptedPdf`](ProcessingError::EncryptedPdf) | content strictly inaccessible | no |
//! | [`Processing`](ProcessingError::Processing) | download exhaustion, engine failure, anything else | n/a |

use std::fmt::Display;

/// Failure of a single-document pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProcessingError {
    /// The payload does not carry a PDF signature in its first 1024 bytes.
    #[error("{0}")]
    InvalidFile(String),

    /// The advertised or actual size exceeds the configured ceiling.
    #[error("{0}")]
    FileTooLarge(String),

    /// The document is encrypted and its pages cannot be read.
    #[error("{0}")]
    EncryptedPdf(String),

    /// Generic failure. The message embeds the underlying cause.
    #[error("{0}")]
    Processing(String),
}

impl ProcessingError {
    /// Wrap an arbitrary cause as a generic processing failure.
    pub fn wrap(context: &str, cause: impl Display) -> Self {
        ProcessingError::Processing(format!("{}: {}", context, cause))
    }

    /// Stable snake_case tag for the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingError::InvalidFile(_) => "invalid_file",
            ProcessingError::FileTooLarge(_) => "file_too_large",
            ProcessingError::EncryptedPdf(_) => "encrypted_pdf",
            ProcessingError::Processing(_) => "processing",
        }
    }

    /// Validation failures describe bad content and must never be retried.
    pub fn is_content_error(&self) -> bool {
        !matches!(self, ProcessingError::Processing(_))
    }
}
