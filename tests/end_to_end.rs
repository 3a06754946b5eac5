//! Drives a real served socket: the parser, the instrumented exchange, and
//! the wire sink all participate, with reqwest as the client.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use reqlens::{Handler, RequestHead, ResponseSink, server};

struct ApiHandler;

#[async_trait]
impl Handler for ApiHandler {
    async fn handle(&self, sink: &mut dyn ResponseSink, head: &RequestHead) {
        match head.target.path() {
            "/missing" => {
                sink.write_status(StatusCode::NOT_FOUND);
            }
            path => {
                let body = serde_json::json!({
                    "message": "ok",
                    "path": path,
                })
                .to_string();
                sink.headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                sink.headers_mut()
                    .insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
                let _ = sink.write(body.as_bytes()).await;
            }
        }
    }
}

/// Read until EOF, keeping whatever arrived if the server resets the
/// connection after its response.
async fn read_response(stream: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => raw.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}

async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        server::serve(listener, Arc::new(ApiHandler), 8 * 1024, std::future::pending())
            .await
            .unwrap();
    });
    addr
}

#[tokio::test]
async fn serves_json_with_implicit_ok() {
    let addr = spawn_server().await;

    let response = reqwest::get(format!("http://{addr}/echo")).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/json"
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "ok");
    assert_eq!(body["path"], "/echo");
}

#[tokio::test]
async fn explicit_status_reaches_the_client() {
    let addr = spawn_server().await;

    let response = reqwest::get(format!("http://{addr}/missing")).await.unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_request_gets_bad_request() {
    let addr = spawn_server().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    // Single line only: the server rejects it after the first read, so no
    // unread bytes are left to turn the close into a reset.
    stream.write_all(b"NOT-A-REQUEST\r\n").await.unwrap();
    stream.flush().await.unwrap();

    let text = read_response(&mut stream).await;

    assert!(text.starts_with("HTTP/1.1 400 Bad Request\r\n"), "got: {text}");
}

#[tokio::test]
async fn oversized_head_is_rejected_with_431() {
    let addr = spawn_server().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    // Oversize the request line itself so the whole payload is consumed
    // before the server gives up on it.
    let padding = "x".repeat(12 * 1024);
    stream
        .write_all(format!("GET /{padding} HTTP/1.1\r\n").as_bytes())
        .await
        .unwrap();
    stream.flush().await.unwrap();

    let text = read_response(&mut stream).await;

    assert!(
        text.starts_with("HTTP/1.1 431 Request Header Fields Too Large\r\n"),
        "got: {text}"
    );
}
