use std::io;

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use tracing::warn;

use crate::sink::ResponseSink;

/// In-memory [`ResponseSink`] that captures the response instead of sending
/// it anywhere. Handy in tests and for embedders that post-process
/// responses.
///
/// The recorder is a well-behaved sink: the first committed status wins and
/// repeats are ignored with a warning. Writing without a commit records the
/// implicit 200.
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    headers: HeaderMap,
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

#[async_trait]
impl ResponseSink for ResponseRecorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.status.is_some() {
            warn!(code = status.as_u16(), "ignoring repeated status commit");
            return;
        }
        self.status = Some(status);
    }

    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }
}
