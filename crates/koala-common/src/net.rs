//! Resource fetching for the Koala box-tree builder.
//!
//! Provides blocking loaders for `data:`, `file:` and `http(s):` URLs, and
//! the two [`ImageFetcher`] implementations used by the builder: a caching
//! [`ResourceFetcher`] and an [`InMemoryFetcher`] for tests.
//!
//! TODO: Implement proper Fetch Standard (<https://fetch.spec.whatwg.org/>)
use base64::Engine;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use crate::image::{Image, ImageFetcher, ImageOrientation};

/// User-Agent header sent with all requests.
const USER_AGENT: &str = concat!("koala-boxes/", env!("CARGO_PKG_VERSION"));

/// Default request timeout.
const TIMEOUT: Duration = Duration::from_secs(30);

/// Why a resource could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The `data:` URL is malformed.
    #[error("invalid data URL: {0}")]
    InvalidDataUrl(String),
    /// The HTTP request failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),
    /// The file could not be read.
    #[error("cannot read {path}: {reason}")]
    Io {
        /// Local path that was read.
        path: String,
        /// Operating system error message.
        reason: String,
    },
    /// The resource is not an image format we recognise.
    #[error("unsupported image format at {0}")]
    UnsupportedFormat(String),
    /// No resource is registered under this URL.
    #[error("no resource at {0}")]
    NotFound(String),
}

/// A parsed `data:` URL that can be decoded into raw bytes.
///
/// [RFC 2397](https://www.rfc-editor.org/rfc/rfc2397)
pub struct DataURL<'a> {
    /// The media type and parameters before the comma, without `;base64`.
    pub media_type: &'a str,
    /// Whether the payload is base64 encoded.
    pub base64: bool,
    /// The encoded payload after the comma.
    pub payload: &'a str,
}

impl<'a> DataURL<'a> {
    /// Split a raw `data:` URL into its parts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidDataUrl`] if the scheme or the comma
    /// separator is missing.
    pub fn parse(raw: &'a str) -> Result<Self, FetchError> {
        let rest = raw
            .strip_prefix("data:")
            .ok_or_else(|| FetchError::InvalidDataUrl("missing data: scheme".to_string()))?;
        let (metadata, payload) = rest
            .split_once(',')
            .ok_or_else(|| FetchError::InvalidDataUrl("missing comma".to_string()))?;
        let (media_type, base64) = metadata
            .strip_suffix(";base64")
            .map_or((metadata, false), |media_type| (media_type, true));
        Ok(Self {
            media_type,
            base64,
            payload,
        })
    }

    /// Decode the data URL payload into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidDataUrl`] if base64 decoding fails.
    pub fn decode(&self) -> Result<Vec<u8>, FetchError> {
        if self.base64 {
            let compact: String = self.payload.split_whitespace().collect();
            base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| FetchError::InvalidDataUrl(format!("base64 decode error: {e}")))
        } else {
            Ok(percent_decode(self.payload))
        }
    }
}

/// [URL Standard § 1.3 Percent-encoded bytes](https://url.spec.whatwg.org/#percent-decode)
fn percent_decode(input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut output = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let decoded = (bytes[i] == b'%')
            .then(|| bytes.get(i + 1..i + 3))
            .flatten()
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        if let Some(byte) = decoded {
            output.push(byte);
            i += 3;
        } else {
            output.push(bytes[i]);
            i += 1;
        }
    }
    output
}

/// Fetch a URL over HTTP and return its body as raw bytes.
///
/// # Errors
///
/// Returns [`FetchError::Http`] if the HTTP client cannot be created, the
/// request fails, the response has a non-success status, or the body cannot
/// be read.
pub fn fetch_http_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(TIMEOUT)
        .build()
        .map_err(|e| FetchError::Http(format!("failed to create HTTP client: {e}")))?;

    let response = client
        .get(url)
        .header("User-Agent", USER_AGENT)
        .send()
        .map_err(|e| FetchError::Http(format!("request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(FetchError::Http(response.status().to_string()));
    }

    response
        .bytes()
        .map(|b| b.to_vec())
        .map_err(|e| FetchError::Http(format!("failed to read response body: {e}")))
}

/// Load the resource at `url`, dispatching on its scheme.
///
/// `data:` URLs are decoded in place, `http(s):` URLs are fetched with a
/// blocking client, and `file:` URLs or plain paths are read from disk.
///
/// # Errors
///
/// Returns the [`FetchError`] of the underlying loader.
pub fn fetch_bytes(url: &str) -> Result<Vec<u8>, FetchError> {
    if url.starts_with("data:") {
        return DataURL::parse(url)?.decode();
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return fetch_http_bytes(url);
    }
    let path = url.strip_prefix("file://").unwrap_or(url);
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let decoded = String::from_utf8_lossy(&percent_decode(path)).into_owned();
    std::fs::read(Path::new(&decoded)).map_err(|e| FetchError::Io {
        path: decoded,
        reason: e.to_string(),
    })
}

/// Media type of a `data:` URL, used as the default MIME hint.
fn data_url_media_type(url: &str) -> Option<&str> {
    DataURL::parse(url)
        .ok()
        .map(|data| data.media_type)
        .filter(|media_type| !media_type.is_empty())
}

/// Image fetcher that loads real resources and caches results by URL.
///
/// Failures are cached too, so a broken image referenced many times is only
/// requested once.
#[derive(Default)]
pub struct ResourceFetcher {
    cache: RefCell<HashMap<String, Result<Rc<Image>, FetchError>>>,
}

impl ResourceFetcher {
    /// Create a fetcher with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ImageFetcher for ResourceFetcher {
    fn fetch_image(
        &self,
        url: &str,
        mime_hint: Option<&str>,
        orientation: ImageOrientation,
    ) -> Result<Rc<Image>, FetchError> {
        if let Some(cached) = self.cache.borrow().get(url) {
            return cached.clone();
        }
        let mime_hint = mime_hint
            .filter(|hint| !hint.is_empty())
            .or_else(|| data_url_media_type(url));
        let result = fetch_bytes(url)
            .and_then(|bytes| Image::from_bytes(url, bytes, mime_hint, orientation))
            .map(Rc::new);
        let _ = self
            .cache
            .borrow_mut()
            .insert(url.to_string(), result.clone());
        result
    }
}

/// Image fetcher serving resources registered in memory.
///
/// `data:` URLs are still decoded, so documents can inline images.
#[derive(Default)]
pub struct InMemoryFetcher {
    resources: HashMap<String, Vec<u8>>,
}

impl InMemoryFetcher {
    /// Create an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `url`.
    #[must_use]
    pub fn with_resource(mut self, url: &str, bytes: &[u8]) -> Self {
        let _ = self.resources.insert(url.to_string(), bytes.to_vec());
        self
    }
}

impl ImageFetcher for InMemoryFetcher {
    fn fetch_image(
        &self,
        url: &str,
        mime_hint: Option<&str>,
        orientation: ImageOrientation,
    ) -> Result<Rc<Image>, FetchError> {
        let bytes = if url.starts_with("data:") {
            DataURL::parse(url)?.decode()?
        } else {
            self.resources
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::NotFound(url.to_string()))?
        };
        let mime_hint = mime_hint
            .filter(|hint| !hint.is_empty())
            .or_else(|| data_url_media_type(url));
        Image::from_bytes(url, bytes, mime_hint, orientation).map(Rc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageFormat;

    #[test]
    fn decodes_base64_data_url() {
        let data = DataURL::parse("data:text/plain;base64,aGVsbG8=").unwrap();
        assert_eq!(data.media_type, "text/plain");
        assert_eq!(data.decode().unwrap(), b"hello");
    }

    #[test]
    fn decodes_percent_encoded_data_url() {
        let data = DataURL::parse("data:image/svg+xml,%3Csvg%3E%3C/svg%3E").unwrap();
        assert!(!data.base64);
        assert_eq!(data.decode().unwrap(), b"<svg></svg>");
    }

    #[test]
    fn rejects_data_url_without_comma() {
        assert!(matches!(
            DataURL::parse("data:image/png"),
            Err(FetchError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn in_memory_fetcher_serves_and_misses() {
        let fetcher = InMemoryFetcher::new().with_resource("a.gif", b"GIF89a\x02\0\x03\0");
        let image = fetcher
            .fetch_image("a.gif", None, ImageOrientation::None)
            .unwrap();
        assert_eq!(image.format(), ImageFormat::Gif);
        assert_eq!(image.intrinsic_size(), Some((2, 3)));
        assert_eq!(
            fetcher.fetch_image("b.gif", None, ImageOrientation::None),
            Err(FetchError::NotFound("b.gif".to_string()))
        );
    }

    #[test]
    fn resource_fetcher_caches_failures() {
        let fetcher = ResourceFetcher::new();
        let first = fetcher.fetch_image("/nonexistent/koala.png", None, ImageOrientation::None);
        assert!(matches!(first, Err(FetchError::Io { .. })));
        assert_eq!(fetcher.cache.borrow().len(), 1);
    }
}
