//! HTTP/1.1 response serialization over any async stream.

use std::io;

use async_trait::async_trait;
use bytes::BytesMut;
use http::header::{CONNECTION, HeaderValue};
use http::{HeaderMap, StatusCode};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

/// [`ResponseSink`] that writes an HTTP/1.1 response to `io`.
///
/// The head (status line plus headers) is buffered until the first body
/// write forces it out; a handler that never writes nor commits still gets
/// a bare `200 OK` head from [`finish`](Self::finish). Responses are framed
/// by connection close unless the handler set its own `content-length`, so
/// a `connection: close` header is added when absent.
///
/// [`ResponseSink`]: crate::sink::ResponseSink
pub struct WireSink<W> {
    io: W,
    headers: HeaderMap,
    pending: Option<StatusCode>,
    head_sent: bool,
}

impl<W: AsyncWrite + Unpin + Send> WireSink<W> {
    pub fn new(io: W) -> Self {
        Self {
            io,
            headers: HeaderMap::new(),
            pending: None,
            head_sent: false,
        }
    }

    async fn send_head(&mut self) -> io::Result<()> {
        let status = self.pending.unwrap_or(StatusCode::OK);

        if !self.headers.contains_key(CONNECTION) {
            self.headers
                .insert(CONNECTION, HeaderValue::from_static("close"));
        }

        let mut head = BytesMut::with_capacity(256);
        head.extend_from_slice(b"HTTP/1.1 ");
        head.extend_from_slice(status.as_str().as_bytes());
        head.extend_from_slice(b" ");
        head.extend_from_slice(status.canonical_reason().unwrap_or("").as_bytes());
        head.extend_from_slice(b"\r\n");
        for (name, value) in self.headers.iter() {
            head.extend_from_slice(name.as_str().as_bytes());
            head.extend_from_slice(b": ");
            head.extend_from_slice(value.as_bytes());
            head.extend_from_slice(b"\r\n");
        }
        head.extend_from_slice(b"\r\n");

        self.io.write_all(&head).await?;
        self.head_sent = true;
        Ok(())
    }

    /// Flush anything still buffered and hand the stream back. Emits the
    /// implicit `200 OK` head if the handler never triggered one.
    pub async fn finish(mut self) -> io::Result<W> {
        if !self.head_sent {
            self.send_head().await?;
        }
        self.io.flush().await?;
        Ok(self.io)
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> crate::sink::ResponseSink for WireSink<W> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.head_sent || self.pending.is_some() {
            warn!(code = status.as_u16(), "status already committed; ignoring");
            return;
        }
        self.pending = Some(status);
    }

    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.head_sent {
            self.send_head().await?;
        }
        self.io.write(buf).await
    }
}
