//! HTTP request and response types used across the server.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;

/// The HTTP request type handed to middleware and pages.
///
/// The body is collected before the pipeline runs.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by middleware and pages.
pub type Response = http::Response<Full<Bytes>>;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Constructors for the small set of responses the server builds itself.
pub trait ResponseExt {
    /// A response with the given status and an empty body.
    fn empty(status: StatusCode) -> Response;

    /// A response with a body and a fixed content type.
    fn with_body(status: StatusCode, content_type: &'static str, body: impl Into<Bytes>)
        -> Response;

    /// A `text/plain` error response carrying a short message.
    fn error(status: StatusCode, message: &str) -> Response;

    /// A `text/html` response.
    fn html(body: impl Into<Bytes>) -> Response;
}

impl ResponseExt for Response {
    fn empty(status: StatusCode) -> Response {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }

    fn with_body(
        status: StatusCode,
        content_type: &'static str,
        body: impl Into<Bytes>,
    ) -> Response {
        let mut response = http::Response::new(Full::new(body.into()));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        response
    }

    fn error(status: StatusCode, message: &str) -> Response {
        Self::with_body(status, "text/plain; charset=utf-8", message.to_owned())
    }

    fn html(body: impl Into<Bytes>) -> Response {
        Self::with_body(StatusCode::OK, "text/html; charset=utf-8", body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_empty_response_has_no_content_type() {
        let response = Response::empty(StatusCode::NO_CONTENT);
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_error_response() {
        let response = Response::error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_html_response_body() {
        let response = Response::html("<p>hi</p>");
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"<p>hi</p>");
    }
}
