use http::header::{CONTENT_LENGTH, HOST};
use http::{HeaderMap, Method, Uri, Version};

/// Read-only view of an inbound request head: everything a handler (or the
/// size estimator) needs, without the body.
///
/// `host` lives outside the header map and `content-length` is surfaced as
/// `None` when the client did not declare one.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    /// Request target as received on the wire (origin-form for servers).
    pub target: Uri,
    pub version: Version,
    pub headers: HeaderMap,
    pub host: String,
    pub content_length: Option<u64>,
}

impl RequestHead {
    /// Build a head from its raw pieces.
    ///
    /// The `host` header is moved out of `headers` into its own field;
    /// `content-length` is parsed but the header itself stays in the map.
    pub fn new(method: Method, target: Uri, version: Version, mut headers: HeaderMap) -> Self {
        let host = headers
            .remove(HOST)
            .and_then(|v| v.to_str().ok().map(str::to_owned))
            .or_else(|| target.host().map(str::to_owned))
            .unwrap_or_default();

        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());

        Self {
            method,
            target,
            version,
            headers,
            host,
            content_length,
        }
    }

    /// Interop constructor for callers that already hold `http` request parts.
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        Self::new(
            parts.method.clone(),
            parts.uri.clone(),
            parts.version,
            parts.headers.clone(),
        )
    }

    /// Wire token for the protocol version ("HTTP/1.1" and friends).
    pub fn version_token(&self) -> &'static str {
        match self.version {
            Version::HTTP_09 => "HTTP/0.9",
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_11 => "HTTP/1.1",
            Version::HTTP_2 => "HTTP/2.0",
            Version::HTTP_3 => "HTTP/3.0",
            _ => "HTTP/1.1",
        }
    }
}
