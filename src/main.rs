use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use http::StatusCode;
use tokio::signal;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use reqlens::config::{Config, LogFormat};
use reqlens::{Handler, RequestHead, ResponseSink, server};

/// Demo handler: a JSON echo of the request line, plus a plain-text
/// liveness probe.
struct EchoHandler;

#[async_trait]
impl Handler for EchoHandler {
    async fn handle(&self, sink: &mut dyn ResponseSink, head: &RequestHead) {
        if head.target.path() == "/healthz" {
            sink.write_status(StatusCode::OK);
            let _ = sink.write(b"ok\n").await;
            return;
        }

        let body = serde_json::json!({
            "message": "ok",
            "method": head.method.as_str(),
            "target": head.target.to_string(),
        })
        .to_string();

        sink.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        sink.headers_mut()
            .insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        if let Err(err) = sink.write(body.as_bytes()).await {
            debug!(error = %err, "client went away before the response was written");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.http.addr,
        "Starting reqlens demo server"
    );

    let listener = build_listener(&config)?;

    info!(
        addr = %config.http.addr,
        tcp_nodelay = config.http.tcp_nodelay,
        tcp_keepalive = ?config.http.tcp_keepalive_secs,
        "HTTP server listening"
    );

    server::serve(
        listener,
        Arc::new(EchoHandler),
        config.http.max_head_bytes,
        shutdown_signal(),
    )
    .await?;

    info!("Shutdown complete");
    Ok(())
}

/// TCP listener with the socket options applied before binding.
fn build_listener(config: &Config) -> anyhow::Result<tokio::net::TcpListener> {
    use socket2::{Domain, Protocol, Socket, Type};

    let addr = config.http.addr;
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket =
        Socket::new(domain, Type::STREAM, Some(Protocol::TCP)).context("Failed to create socket")?;

    // SO_REUSEADDR for faster restarts
    socket
        .set_reuse_address(true)
        .context("Failed to set SO_REUSEADDR")?;

    // TCP_NODELAY for lower latency (disables Nagle's algorithm)
    if config.http.tcp_nodelay {
        socket
            .set_tcp_nodelay(true)
            .context("Failed to set TCP_NODELAY")?;
    }

    if let Some(keepalive_secs) = config.http.tcp_keepalive_secs {
        let keepalive =
            socket2::TcpKeepalive::new().with_time(Duration::from_secs(keepalive_secs));
        socket
            .set_tcp_keepalive(&keepalive)
            .context("Failed to set TCP keepalive")?;
    }

    socket
        .set_nonblocking(true)
        .context("Failed to set non-blocking")?;
    socket.bind(&addr.into()).context("Failed to bind")?;
    socket.listen(1024).context("Failed to listen")?;

    tokio::net::TcpListener::from_std(socket.into()).context("Failed to convert to tokio listener")
}

/// Initialize logging based on configuration
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
