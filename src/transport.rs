//! Fetching raw document bytes from a locator.
//!
//! The pipeline sees the network only through [`Transport`]: one call per
//! attempt. A fetch resolves as soon as the status line and headers are
//! known and hands back the body as a lazy stream of chunks, so the caller
//! can reject an oversized document from its headers before reading any of
//! it, and stop reading the moment a body outgrows the ceiling. Status
//! handling, size ceilings, and retries belong to the pipeline, not the
//! transport.
//!
//! | Implementation | Locators |
//! |----------------|----------|
//! | [`HttpTransport`] | `http://`, `https://` (reqwest, rustls) |
//! | [`FileTransport`] | `file://` URLs and bare filesystem paths |
//! | [`DefaultTransport`] | dispatches to one of the above by scheme |

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Transport-level failure. Every variant is treated as transient.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported locator scheme: {0}")]
    UnsupportedScheme(String),
}

/// Body chunks, pulled on demand. Dropping the stream abandons the transfer.
pub type BodyStream = BoxStream<'static, Result<Vec<u8>, TransportError>>;

/// Response head plus an unread body.
pub struct Fetched {
    pub status: u16,
    /// Header names are lowercase.
    pub headers: HashMap<String, String>,
    pub body: BodyStream,
}

impl Fetched {
    pub fn new(status: u16, headers: HashMap<String, String>, body: BodyStream) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Response whose body is already in memory, delivered as one chunk.
    pub fn from_bytes(status: u16, headers: HashMap<String, String>, bytes: Vec<u8>) -> Self {
        Self::new(status, headers, stream::once(async move { Ok(bytes) }).boxed())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parsed `Content-Length`, ignoring malformed values.
    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length")
            .and_then(|v| v.trim().parse::<u64>().ok())
    }

    /// `Content-Type` without parameters.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
            .map(|v| v.split(';').next().unwrap_or("").trim())
    }

    /// Reads the whole body with no size limit.
    pub async fn bytes(mut self) -> Result<Vec<u8>, TransportError> {
        let mut out = Vec::new();
        while let Some(chunk) = self.body.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }
}

impl std::fmt::Debug for Fetched {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetched")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Opens the bytes behind a locator.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Resolves once the response head is available. `timeout` bounds the
    /// whole exchange, body included.
    async fn fetch(&self, locator: &str, timeout: Duration) -> Result<Fetched, TransportError>;
}

// ============ HTTP ============

/// HTTP(S) transport backed by a shared `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, locator: &str, timeout: Duration) -> Result<Fetched, TransportError> {
        let response = self
            .client
            .get(locator)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let body = response
            .bytes_stream()
            .map(move |chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| map_reqwest_error(e, timeout))
            })
            .boxed();

        Ok(Fetched::new(status, headers, body))
    }
}

fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(timeout)
    } else {
        TransportError::Network(err.to_string())
    }
}

// ============ Filesystem ============

/// Reads local files. Accepts `file://` URLs and plain paths.
pub struct FileTransport;

impl FileTransport {
    fn resolve(locator: &str) -> PathBuf {
        PathBuf::from(locator.strip_prefix("file://").unwrap_or(locator))
    }
}

#[async_trait]
impl Transport for FileTransport {
    async fn fetch(&self, locator: &str, timeout: Duration) -> Result<Fetched, TransportError> {
        let path = Self::resolve(locator);
        let metadata = tokio::time::timeout(timeout, tokio::fs::metadata(&path))
            .await
            .map_err(|_| TransportError::Timeout(timeout))??;

        let mut headers = HashMap::new();
        headers.insert("content-length".to_string(), metadata.len().to_string());
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf {
            headers.insert("content-type".to_string(), "application/pdf".to_string());
        }

        // Read only if the caller accepts the advertised size.
        let body = stream::once(async move {
            match tokio::time::timeout(timeout, tokio::fs::read(&path)).await {
                Ok(read) => read.map_err(TransportError::from),
                Err(_) => Err(TransportError::Timeout(timeout)),
            }
        })
        .boxed();

        Ok(Fetched::new(200, headers, body))
    }
}

// ============ Scheme dispatch ============

/// Routes `http`/`https` to [`HttpTransport`] and everything file-like to
/// [`FileTransport`].
#[derive(Default)]
pub struct DefaultTransport {
    http: HttpTransport,
}

impl DefaultTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for DefaultTransport {
    async fn fetch(&self, locator: &str, timeout: Duration) -> Result<Fetched, TransportError> {
        match scheme_of(locator) {
            Some("http") | Some("https") => self.http.fetch(locator, timeout).await,
            Some("file") | None => FileTransport.fetch(locator, timeout).await,
            Some(other) => Err(TransportError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Lowercase-insensitive scheme of a URL-like locator, or `None` for paths.
fn scheme_of(locator: &str) -> Option<&str> {
    let (scheme, _) = locator.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.');
    if !valid {
        return None;
    }
    match scheme.to_ascii_lowercase().as_str() {
        "http" => Some("http"),
        "https" => Some("https"),
        "file" => Some("file"),
        _ => Some(scheme),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_detection() {
        assert_eq!(scheme_of("https://example.com/a.pdf"), Some("https"));
        assert_eq!(scheme_of("HTTP://example.com/a.pdf"), Some("http"));
        assert_eq!(scheme_of("file:///tmp/a.pdf"), Some("file"));
        assert_eq!(scheme_of("/tmp/a.pdf"), None);
        assert_eq!(scheme_of("ftp://host/a.pdf"), Some("ftp"));
    }

    #[test]
    fn header_helpers() {
        let mut headers = HashMap::new();
        headers.insert("content-length".to_string(), " 42 ".to_string());
        headers.insert(
            "content-type".to_string(),
            "application/pdf; charset=binary".to_string(),
        );
        let fetched = Fetched::from_bytes(204, headers, Vec::new());
        assert!(fetched.is_success());
        assert_eq!(fetched.content_length(), Some(42));
        assert_eq!(fetched.content_type(), Some("application/pdf"));
        assert!(fetched.header("Content-Type").is_some());
    }

    #[tokio::test]
    async fn file_transport_reads_path_and_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.4 body").unwrap();

        let by_path = FileTransport
            .fetch(path.to_str().unwrap(), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(by_path.status, 200);
        assert_eq!(by_path.content_type(), Some("application/pdf"));
        assert_eq!(by_path.content_length(), Some(13));
        assert_eq!(by_path.bytes().await.unwrap(), b"%PDF-1.4 body");

        let url = format!("file://{}", path.display());
        let by_url = DefaultTransport::new()
            .fetch(&url, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(by_url.bytes().await.unwrap(), b"%PDF-1.4 body");
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = FileTransport
            .fetch("/definitely/not/here.pdf", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[tokio::test]
    async fn unknown_scheme_rejected() {
        let err = DefaultTransport::new()
            .fetch("gopher://host/doc.pdf", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedScheme(s) if s == "gopher"));
    }
}
