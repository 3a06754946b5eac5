//! The instrumentation wrapper itself.
//!
//! One [`InstrumentedExchange`] instruments exactly one request/response
//! cycle: the caller hands it a real sink and a request head, the wrapped
//! handler runs against a recording proxy that forwards every operation to
//! the real sink, and once the handler returns the four captured values are
//! stable and readable. Create a fresh exchange for every request.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use http::{HeaderMap, StatusCode};

use crate::estimate;
use crate::handler::Handler;
use crate::request::RequestHead;
use crate::sink::ResponseSink;

/// Wraps a handler and captures response status, response body size,
/// estimated request size, and handling duration.
///
/// Until [`invoke`](Self::invoke) returns, the accessors report the unset
/// state (`None` status, zero sizes and duration). The real sink is never
/// stored here; it is only borrowed for the duration of the handler call,
/// so there is no half-bound state to misuse.
pub struct InstrumentedExchange<H> {
    delegate: H,
    status: Option<StatusCode>,
    body_bytes: u64,
    request_bytes: u64,
    elapsed: Duration,
}

impl<H: Handler> InstrumentedExchange<H> {
    pub fn new(delegate: H) -> Self {
        Self {
            delegate,
            status: None,
            body_bytes: 0,
            request_bytes: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Run the wrapped handler against `sink`, recording as it goes.
    ///
    /// The size estimator is launched on its own task before the handler
    /// starts; its result is awaited only after the handler has returned, so
    /// the two never contend. Handler panics are not caught here and
    /// propagate to the caller, exactly as an unwrapped call would.
    pub async fn invoke<S: ResponseSink>(&mut self, sink: &mut S, head: Arc<RequestHead>) {
        let estimate = estimate::spawn(Arc::clone(&head));

        let started;
        {
            let mut recording = RecordingSink {
                sink,
                status: &mut self.status,
                body_bytes: &mut self.body_bytes,
            };
            started = Instant::now();
            self.delegate.handle(&mut recording, &head).await;
        }
        self.elapsed = started.elapsed();

        // The sender is only ever dropped without sending if the runtime is
        // tearing the task down; record zero rather than wedge.
        self.request_bytes = estimate.await.unwrap_or(0);
    }

    /// Committed response status; `None` if the handler neither wrote nor
    /// committed one. When a handler commits explicitly more than once, the
    /// last commit is the recorded value.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Response body bytes the sink reported as accepted.
    pub fn body_bytes(&self) -> u64 {
        self.body_bytes
    }

    /// Estimated inbound request size; see [`estimate::request_size`].
    pub fn request_bytes(&self) -> u64 {
        self.request_bytes
    }

    /// Wall-clock duration of the handler call.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Pass-through sink handed to the handler: same capability surface as the
/// real sink, with observations recorded on the way through.
struct RecordingSink<'a, S> {
    sink: &'a mut S,
    status: &'a mut Option<StatusCode>,
    body_bytes: &'a mut u64,
}

#[async_trait]
impl<'a, S: ResponseSink> ResponseSink for RecordingSink<'a, S> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.sink.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        // Forward even if a status was already recorded; whether to reject a
        // repeat commit is the real sink's call, this layer only mirrors.
        self.sink.write_status(status);
        *self.status = Some(status);
    }

    async fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // First write without an explicit commit means implicit 200, and the
        // convention commits it before any bytes move.
        if self.status.is_none() {
            *self.status = Some(StatusCode::OK);
        }
        let written = self.sink.write(buf).await?;
        *self.body_bytes += written as u64;
        Ok(written)
    }
}
