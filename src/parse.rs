//! Minimal HTTP/1.1 request-head reader.
//!
//! Reads the request line and headers up to the blank line and nothing
//! more; the body stays in the reader for whoever needs it (nothing in this
//! crate does).

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Uri, Version};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::errors::ParseError;
use crate::request::RequestHead;

/// Read one request head from `reader`, enforcing `max_head_bytes` over the
/// whole head (request line plus headers, terminators included).
pub async fn read_head<R>(reader: &mut R, max_head_bytes: usize) -> Result<RequestHead, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut taken = 0usize;

    let line = read_line(reader, &mut taken, max_head_bytes)
        .await?
        .ok_or(ParseError::UnexpectedEof)?;
    let line = String::from_utf8_lossy(&line).into_owned();

    let mut parts = line.split(' ');
    let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next())
    {
        (Some(m), Some(t), Some(v), None) if !m.is_empty() && !t.is_empty() => (m, t, v),
        _ => return Err(ParseError::RequestLine(line.clone())),
    };

    let method =
        Method::from_bytes(method.as_bytes()).map_err(|_| ParseError::RequestLine(line.clone()))?;
    let target: Uri = target
        .parse()
        .map_err(|_| ParseError::RequestLine(line.clone()))?;
    let version = match version {
        "HTTP/1.1" => Version::HTTP_11,
        "HTTP/1.0" => Version::HTTP_10,
        other => return Err(ParseError::UnsupportedVersion(other.to_string())),
    };

    let mut headers = HeaderMap::new();
    loop {
        let line = read_line(reader, &mut taken, max_head_bytes)
            .await?
            .ok_or(ParseError::UnexpectedEof)?;
        if line.is_empty() {
            break;
        }

        let colon = line
            .iter()
            .position(|&b| b == b':')
            .ok_or_else(|| ParseError::Header(String::from_utf8_lossy(&line).into_owned()))?;
        let (name, rest) = line.split_at(colon);
        let value = trim_ows(&rest[1..]);

        let name = HeaderName::from_bytes(name)
            .map_err(|_| ParseError::Header(String::from_utf8_lossy(&line).into_owned()))?;
        let value = HeaderValue::from_bytes(value)
            .map_err(|_| ParseError::Header(String::from_utf8_lossy(&line).into_owned()))?;
        headers.append(name, value);
    }

    Ok(RequestHead::new(method, target, version, headers))
}

/// One CRLF-terminated line with the terminator stripped; `None` on a clean
/// EOF before the first byte.
async fn read_line<R>(
    reader: &mut R,
    taken: &mut usize,
    max: usize,
) -> Result<Option<Vec<u8>>, ParseError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    // Cap the read at the remaining budget so a newline-free flood cannot
    // buffer without bound; one extra byte distinguishes "over budget" from
    // "exactly at it".
    let budget = (max - *taken) as u64 + 1;
    let n = reader.take(budget).read_until(b'\n', &mut line).await?;
    if n == 0 {
        return Ok(None);
    }

    *taken += n;
    if *taken > max {
        return Err(ParseError::HeadTooLarge(max));
    }
    if line.last() != Some(&b'\n') {
        // Stream ended mid-line.
        return Err(ParseError::UnexpectedEof);
    }

    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    Ok(Some(line))
}

fn trim_ows(mut v: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = v {
        v = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = v {
        v = rest;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{ACCEPT, CONTENT_LENGTH, HOST};
    use tokio::io::AsyncReadExt;

    const MAX: usize = 8 * 1024;

    #[tokio::test]
    async fn parses_a_simple_get() {
        let raw: &[u8] =
            b"GET /search?q=rust HTTP/1.1\r\nhost: example.com\r\naccept: */*\r\ncontent-length: 5\r\n\r\nhello";
        let mut reader = raw;

        let head = read_head(&mut reader, MAX).await.unwrap();

        assert_eq!(head.method, Method::GET);
        assert_eq!(head.target.path(), "/search");
        assert_eq!(head.target.query(), Some("q=rust"));
        assert_eq!(head.version, Version::HTTP_11);
        assert_eq!(head.host, "example.com");
        assert!(!head.headers.contains_key(HOST));
        assert_eq!(head.headers.get(ACCEPT).unwrap(), "*/*");
        assert_eq!(head.content_length, Some(5));
        assert!(head.headers.contains_key(CONTENT_LENGTH));

        // The body must still be in the reader, untouched.
        let mut body = Vec::new();
        reader.read_to_end(&mut body).await.unwrap();
        assert_eq!(body, b"hello");
    }

    #[tokio::test]
    async fn header_values_are_ows_trimmed() {
        let raw: &[u8] = b"GET / HTTP/1.1\r\nx-padded: \t spaced out \t\r\n\r\n";
        let mut reader = raw;

        let head = read_head(&mut reader, MAX).await.unwrap();

        assert_eq!(head.headers.get("x-padded").unwrap(), "spaced out");
    }

    #[tokio::test]
    async fn rejects_a_malformed_request_line() {
        let raw: &[u8] = b"NOT-A-REQUEST\r\n\r\n";
        let mut reader = raw;

        let err = read_head(&mut reader, MAX).await.unwrap_err();

        assert!(matches!(err, ParseError::RequestLine(_)));
    }

    #[tokio::test]
    async fn rejects_an_unsupported_version() {
        let raw: &[u8] = b"GET / HTTP/9.9\r\n\r\n";
        let mut reader = raw;

        let err = read_head(&mut reader, MAX).await.unwrap_err();

        assert!(matches!(err, ParseError::UnsupportedVersion(_)));
    }

    #[tokio::test]
    async fn rejects_an_oversized_head() {
        let raw: &[u8] = b"GET /a/very/long/target/that/keeps/going HTTP/1.1\r\n\r\n";
        let mut reader = raw;

        let err = read_head(&mut reader, 16).await.unwrap_err();

        assert!(matches!(err, ParseError::HeadTooLarge(16)));
    }

    #[tokio::test]
    async fn rejects_truncated_input() {
        let raw: &[u8] = b"GET / HTTP/1.1\r\nhost: exam";
        let mut reader = raw;

        let err = read_head(&mut reader, MAX).await.unwrap_err();

        assert!(matches!(err, ParseError::UnexpectedEof));
    }

    #[tokio::test]
    async fn rejects_empty_input() {
        let raw: &[u8] = b"";
        let mut reader = raw;

        let err = read_head(&mut reader, MAX).await.unwrap_err();

        assert!(matches!(err, ParseError::UnexpectedEof));
    }
}
