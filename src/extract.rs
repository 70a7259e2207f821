//! Document extraction engine: raw PDF bytes in, text and structure out.
//!
//! The pipeline consumes extraction through [`ExtractionEngine`] and never
//! inspects error messages: an engine reports *why* it failed through
//! [`ExtractErrorKind`], so a password-protected document is distinguished
//! from a corrupt one structurally.
//!
//! [`PdfEngine`] reads document structure (page tree, information
//! dictionary, encryption dictionary) with `lopdf` and the text layer with
//! `pdf-extract`, falling back to `lopdf`'s own text extraction when
//! `pdf-extract` cannot handle a file.

use std::collections::HashMap;

use lopdf::{Document, Object};

use crate::models::Permissions;

/// Standard security handler permission bits (PDF 32000-1, table 22).
const PERM_PRINT: i64 = 1 << 2;
const PERM_MODIFY: i64 = 1 << 3;
const PERM_COPY: i64 = 1 << 4;
const PERM_ANNOTATE: i64 = 1 << 5;

/// Information dictionary keys and the field names they are reported under.
const INFO_FIELDS: &[(&[u8], &str)] = &[
    (b"Title", "title"),
    (b"Author", "author"),
    (b"Subject", "subject"),
    (b"Keywords", "keywords"),
    (b"Creator", "creator"),
    (b"Producer", "producer"),
    (b"CreationDate", "creation_date"),
    (b"ModDate", "modification_date"),
];

/// Why extraction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractErrorKind {
    /// The document cannot be opened without a password.
    PasswordRequired,
    /// The bytes do not form a readable document.
    Corrupt,
    Other,
}

/// Extraction failure with a structured kind.
#[derive(Debug, Clone)]
pub struct ExtractError {
    pub kind: ExtractErrorKind,
    pub message: String,
}

impl ExtractError {
    pub fn new(kind: ExtractErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            ExtractErrorKind::PasswordRequired => {
                write!(f, "PDF requires a password: {}", self.message)
            }
            ExtractErrorKind::Corrupt => write!(f, "PDF parsing failed: {}", self.message),
            ExtractErrorKind::Other => write!(f, "PDF extraction failed: {}", self.message),
        }
    }
}

impl std::error::Error for ExtractError {}

/// What an engine read out of a document.
#[derive(Debug, Clone, Default)]
pub struct RawExtraction {
    /// Concatenated page text.
    pub text: String,
    /// `None` when the page tree could not be read at all.
    pub page_count: Option<u32>,
    pub encrypted: bool,
    /// Information dictionary fields, keyed `title`, `author`, `subject`,
    /// `keywords`, `creator`, `producer`, `creation_date`,
    /// `modification_date`.
    pub fields: HashMap<String, Option<String>>,
    pub permissions: Permissions,
}

impl RawExtraction {
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned().flatten()
    }
}

/// Turns raw document bytes into text and structural metadata.
///
/// Called from a blocking worker thread; implementations may be CPU heavy.
pub trait ExtractionEngine: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<RawExtraction, ExtractError>;
}

/// `lopdf` + `pdf-extract` backed engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfEngine;

impl ExtractionEngine for PdfEngine {
    fn extract(&self, bytes: &[u8]) -> Result<RawExtraction, ExtractError> {
        let has_encrypt_marker = contains(bytes, b"/Encrypt");

        let doc = match Document::load_mem(bytes) {
            Ok(doc) => doc,
            Err(e) if has_encrypt_marker => {
                return Err(ExtractError::new(
                    ExtractErrorKind::PasswordRequired,
                    e.to_string(),
                ))
            }
            Err(e) => return Err(ExtractError::new(ExtractErrorKind::Corrupt, e.to_string())),
        };

        let encrypted = doc.is_encrypted() || has_encrypt_marker;
        let permissions = read_permissions(&doc, encrypted);
        let fields = read_info_fields(&doc);

        let pages = doc.get_pages();
        if pages.is_empty() && encrypted {
            return Ok(RawExtraction {
                text: String::new(),
                page_count: None,
                encrypted,
                fields,
                permissions,
            });
        }
        let page_numbers: Vec<u32> = pages.keys().copied().collect();

        let text = match extract_text_layer(bytes, &doc, &page_numbers) {
            Ok(text) => text,
            // Encrypted documents whose text layer is unreadable are still
            // reported; the pipeline classifies them.
            Err(_) if encrypted => String::new(),
            Err(e) => return Err(e),
        };

        Ok(RawExtraction {
            text,
            page_count: Some(page_numbers.len() as u32),
            encrypted,
            fields,
            permissions,
        })
    }
}

fn extract_text_layer(
    bytes: &[u8],
    doc: &Document,
    page_numbers: &[u32],
) -> Result<String, ExtractError> {
    let primary = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    match primary {
        Ok(Ok(text)) => return Ok(text),
        Ok(Err(e)) => tracing::debug!(error = %e, "pdf-extract failed, using lopdf text layer"),
        Err(_) => tracing::debug!("pdf-extract panicked, using lopdf text layer"),
    }

    let mut out = String::new();
    for page in page_numbers {
        let page_text = doc
            .extract_text(&[*page])
            .map_err(|e| ExtractError::new(ExtractErrorKind::Corrupt, e.to_string()))?;
        out.push_str(&page_text);
    }
    Ok(out)
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn read_info_fields(doc: &Document) -> HashMap<String, Option<String>> {
    let info = doc
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok());

    INFO_FIELDS
        .iter()
        .map(|(key, name)| {
            let value = info
                .and_then(|dict| dict.get(key).ok())
                .and_then(|obj| resolve(doc, obj))
                .and_then(|obj| obj.as_str().ok())
                .map(decode_text_string)
                .filter(|s| !s.is_empty());
            (name.to_string(), value)
        })
        .collect()
}

fn read_permissions(doc: &Document, encrypted: bool) -> Permissions {
    if !encrypted {
        return Permissions::all();
    }
    let flags = doc
        .trailer
        .get(b"Encrypt")
        .ok()
        .and_then(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
        .and_then(|dict| dict.get(b"P").ok())
        .and_then(|obj| obj.as_i64().ok());

    match flags {
        Some(p) => Permissions {
            print: p & PERM_PRINT != 0,
            modify: p & PERM_MODIFY != 0,
            copy: p & PERM_COPY != 0,
            annotate: p & PERM_ANNOTATE != 0,
        },
        None => Permissions::none(),
    }
}

/// Decodes a PDF text string: UTF-16BE with BOM, otherwise byte-per-char.
fn decode_text_string(raw: &[u8]) -> String {
    if raw.len() >= 2 && raw[0] == 0xFE && raw[1] == 0xFF {
        let units: Vec<u16> = raw[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units).trim().to_string();
    }
    raw.iter()
        .map(|&b| b as char)
        .collect::<String>()
        .trim()
        .to_string()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_is_corrupt() {
        let err = PdfEngine.extract(b"not a pdf").unwrap_err();
        assert_eq!(err.kind, ExtractErrorKind::Corrupt);
        assert!(err.to_string().starts_with("PDF parsing failed"));
    }

    #[test]
    fn unreadable_encrypted_is_password_required() {
        match PdfEngine.extract(b"%PDF-1.7\ntrailer << /Encrypt 9 0 R >>\n%%EOF") {
            Err(err) => assert_eq!(err.kind, ExtractErrorKind::PasswordRequired),
            Ok(raw) => {
                assert!(raw.encrypted);
                assert_eq!(raw.page_count, None);
            }
        }
    }

    #[test]
    fn decodes_utf16_and_latin1_strings() {
        assert_eq!(
            decode_text_string(&[0xFE, 0xFF, 0x00, b'H', 0x00, b'i']),
            "Hi"
        );
        assert_eq!(decode_text_string(b" Report "), "Report");
        assert_eq!(decode_text_string(&[0x43, 0x61, 0x66, 0xE9]), "Café");
    }

    #[test]
    fn field_lookup_flattens() {
        let mut raw = RawExtraction::default();
        raw.fields.insert("title".into(), Some("T".into()));
        raw.fields.insert("author".into(), None);
        assert_eq!(raw.field("title").as_deref(), Some("T"));
        assert_eq!(raw.field("author"), None);
        assert_eq!(raw.field("subject"), None);
    }
}
