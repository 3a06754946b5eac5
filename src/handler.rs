use std::sync::Arc;

use async_trait::async_trait;

use crate::request::RequestHead;
use crate::sink::ResponseSink;

/// A unit of request-handling work.
///
/// Handlers write zero or more times to the sink and may commit a status
/// before the first write; they return nothing. A handler panic is not
/// caught anywhere in this crate and propagates to the caller.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, sink: &mut dyn ResponseSink, head: &RequestHead);
}

/// Shared handlers can be bound per-request without wrapper types.
#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn handle(&self, sink: &mut dyn ResponseSink, head: &RequestHead) {
        (**self).handle(sink, head).await;
    }
}
