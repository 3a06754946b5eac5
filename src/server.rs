//! TCP accept loop wiring the parser, the instrumentation wrapper, and the
//! wire sink together: one request per connection, one structured log line
//! per completed exchange.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use http::StatusCode;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::errors::ParseError;
use crate::exchange::InstrumentedExchange;
use crate::handler::Handler;
use crate::parse;
use crate::sink::ResponseSink;
use crate::wire::WireSink;

/// Accept connections until `shutdown` resolves. Each connection gets its
/// own task and exactly one instrumented exchange.
pub async fn serve(
    listener: TcpListener,
    handler: Arc<dyn Handler>,
    max_head_bytes: usize,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = accepted.context("accept failed")?;
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    handle_connection(stream, peer, handler, max_head_bytes).await;
                });
            }
            _ = &mut shutdown => {
                info!("shutdown signal received; no longer accepting connections");
                return Ok(());
            }
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    handler: Arc<dyn Handler>,
    max_head_bytes: usize,
) {
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let head = match parse::read_head(&mut reader, max_head_bytes).await {
        Ok(head) => Arc::new(head),
        Err(err) => {
            warn!(%peer, error = %err, "rejecting request");
            send_error(write_half, &err, peer).await;
            return;
        }
    };

    let mut sink = WireSink::new(write_half);
    let mut exchange = InstrumentedExchange::new(handler);
    exchange.invoke(&mut sink, Arc::clone(&head)).await;
    if let Err(err) = sink.finish().await {
        debug!(%peer, error = %err, "failed to finish response");
    }

    info!(
        method = %head.method,
        target = %head.target,
        status = exchange
            .status()
            .unwrap_or(StatusCode::OK)
            .as_u16(),
        bytes_out = exchange.body_bytes(),
        bytes_in = exchange.request_bytes(),
        elapsed_ms = exchange.elapsed().as_millis() as u64,
        "request completed"
    );
}

async fn send_error<W>(io: W, err: &ParseError, peer: SocketAddr)
where
    W: tokio::io::AsyncWrite + Unpin + Send,
{
    let mut sink = WireSink::new(io);
    sink.write_status(err.status());
    let body = format!("{err}\n");
    if let Err(e) = sink.write(body.as_bytes()).await {
        debug!(%peer, error = %e, "failed to send error response");
        return;
    }
    if let Err(e) = sink.finish().await {
        debug!(%peer, error = %e, "failed to finish error response");
    }
}
