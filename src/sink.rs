use std::io;

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};

/// Destination for a single HTTP response.
///
/// Implementations decide how a response actually leaves the process
/// ([`crate::wire::WireSink`] serializes HTTP/1.1 onto a stream,
/// [`crate::recorder::ResponseRecorder`] buffers in memory). The
/// instrumentation layer wraps any of them without changing behavior.
///
/// `Send` is a supertrait so a `&mut dyn ResponseSink` can be held across
/// await points inside handlers.
#[async_trait]
pub trait ResponseSink: Send {
    /// Response headers, by reference. Mutations are visible to the sink
    /// until the status is committed; what happens to later mutations is the
    /// sink's own contract.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Commit the response status. A well-behaved sink accepts the first
    /// commit and rejects (or ignores) repeats.
    fn write_status(&mut self, status: StatusCode);

    /// Write body bytes, returning how many were accepted. May be short.
    /// Errors are the sink's own and are never translated by wrappers.
    async fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}
