//! Per-request HTTP instrumentation.
//!
//! [`InstrumentedExchange`] wraps a [`Handler`] and, for a single
//! request/response cycle, captures the committed status code, the response
//! body size, an estimate of the inbound request size, and the handler's
//! wall-clock duration. The wrapper poses as the response destination, so
//! the handler cannot tell it is being observed; the real sink sees every
//! operation unchanged.
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use http::{HeaderMap, Method, StatusCode, Uri, Version};
//! use reqlens::{Handler, InstrumentedExchange, RequestHead, ResponseRecorder, ResponseSink};
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Handler for Hello {
//!     async fn handle(&self, sink: &mut dyn ResponseSink, _head: &RequestHead) {
//!         let _ = sink.write(b"hello").await;
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let head = Arc::new(RequestHead::new(
//!     Method::GET,
//!     Uri::from_static("/hello"),
//!     Version::HTTP_11,
//!     HeaderMap::new(),
//! ));
//!
//! let mut recorder = ResponseRecorder::new();
//! let mut exchange = InstrumentedExchange::new(Hello);
//! exchange.invoke(&mut recorder, head).await;
//!
//! assert_eq!(exchange.status(), Some(StatusCode::OK));
//! assert_eq!(exchange.body_bytes(), 5);
//! assert_eq!(recorder.body(), b"hello");
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod estimate;
pub mod exchange;
pub mod handler;
pub mod parse;
pub mod recorder;
pub mod request;
pub mod server;
pub mod sink;
pub mod wire;

pub use exchange::InstrumentedExchange;
pub use handler::Handler;
pub use recorder::ResponseRecorder;
pub use request::RequestHead;
pub use sink::ResponseSink;
pub use wire::WireSink;
