//! Best-effort request size estimation.
//!
//! The estimate is a pure sum over the request head: target, method token,
//! protocol token, every header name and value, the host, plus the declared
//! content length when the client sent one. The body itself is never read,
//! so form data is only reflected through the target or the declared length.

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::request::RequestHead;

/// Estimated size in bytes of an inbound request.
///
/// Header names count once per name even when the header carries multiple
/// values; the sum is order-independent. An unknown content length
/// contributes nothing.
pub fn request_size(head: &RequestHead) -> u64 {
    let mut total = head.target.to_string().len() as u64
        + head.method.as_str().len() as u64
        + head.version_token().len() as u64
        + head.host.len() as u64;

    for name in head.headers.keys() {
        total += name.as_str().len() as u64;
        for value in head.headers.get_all(name) {
            total += value.as_bytes().len() as u64;
        }
    }

    total + head.content_length.unwrap_or(0)
}

/// Run the estimate on its own task, handing the single result back through
/// a one-shot channel. The task reads nothing but the immutable head.
pub(crate) fn spawn(head: Arc<RequestHead>) -> oneshot::Receiver<u64> {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let _ = tx.send(request_size(&head));
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderName, HeaderValue, HOST};
    use http::{HeaderMap, Method, Uri, Version};

    fn head(target: &str, headers: HeaderMap) -> RequestHead {
        RequestHead::new(
            Method::GET,
            target.parse::<Uri>().unwrap(),
            Version::HTTP_11,
            headers,
        )
    }

    #[test]
    fn sums_every_head_component() {
        // 20-byte target, GET (3), HTTP/1.1 (8), one header a: bc (1 + 2),
        // host h (1), no content length.
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("h"));
        headers.insert(
            HeaderName::from_static("a"),
            HeaderValue::from_static("bc"),
        );

        let head = head("/search?q=0123456789", headers);

        assert_eq!(request_size(&head), 20 + 3 + 8 + 3 + 1);
    }

    #[test]
    fn declared_content_length_is_added() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("content-length"),
            HeaderValue::from_static("10"),
        );

        let head = head("/", headers);

        // target 1 + method 3 + proto 8 + header name 14 + value 2 + 10 declared
        assert_eq!(request_size(&head), 1 + 3 + 8 + 14 + 2 + 10);
    }

    #[test]
    fn multi_value_header_counts_its_name_once() {
        let mut headers = HeaderMap::new();
        let name = HeaderName::from_static("x-tag");
        headers.append(name.clone(), HeaderValue::from_static("aa"));
        headers.append(name, HeaderValue::from_static("bb"));

        let head = head("/", headers);

        // target 1 + method 3 + proto 8 + name 5 + values 2 + 2
        assert_eq!(request_size(&head), 1 + 3 + 8 + 5 + 4);
    }

    #[tokio::test]
    async fn spawned_estimate_delivers_exactly_one_value() {
        let head = Arc::new(head("/", HeaderMap::new()));
        let expected = request_size(&head);

        let rx = spawn(head);

        assert_eq!(rx.await.unwrap(), expected);
    }
}
