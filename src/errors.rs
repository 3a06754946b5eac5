use http::StatusCode;
use thiserror::Error;

/// Failures while reading a request head off the wire.
///
/// The instrumentation core itself adds no error kind: sink failures travel
/// through it as the sink's own `std::io::Error`. This taxonomy only covers
/// the parsing/serving surface around the core.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("connection closed before a complete request head")]
    UnexpectedEof,

    #[error("malformed request line: {0:?}")]
    RequestLine(String),

    #[error("malformed header line: {0:?}")]
    Header(String),

    #[error("unsupported protocol version: {0:?}")]
    UnsupportedVersion(String),

    #[error("request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    #[error("i/o while reading request head")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Status for the error response sent back to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::UnsupportedVersion(_) => StatusCode::HTTP_VERSION_NOT_SUPPORTED,
            ParseError::HeadTooLarge(_) => StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
            ParseError::UnexpectedEof
            | ParseError::RequestLine(_)
            | ParseError::Header(_)
            | ParseError::Io(_) => StatusCode::BAD_REQUEST,
        }
    }
}
