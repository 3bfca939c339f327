//! Request ID handling.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Expose the ID to handlers via request extensions
//! - Mirror the ID onto the response
//!
//! # Design Decisions
//! - The ID is added as early as possible so every log line can carry it
//! - Client-supplied IDs are trusted and passed through unchanged

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::response::Response;
use tower::{Layer, Service};
use uuid::Uuid;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The request's correlation ID, stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Convenience accessor for handlers.
pub trait RequestIdExt {
    /// The request ID, or `"unknown"` if the layer is not installed.
    fn request_id(&self) -> &str;
}

impl RequestIdExt for Request<Body> {
    fn request_id(&self) -> &str {
        self.extensions()
            .get::<RequestId>()
            .map(|id| id.0.as_str())
            .unwrap_or("unknown")
    }
}

/// Tower layer installing [`RequestIdService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Middleware that guarantees a request ID on the way in and out.
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for RequestIdService<S>
where
    S: Service<Request<Body>, Response = Response>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), S::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // UUIDs and previously accepted header values are always valid.
        let header_value =
            HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("unknown"));
        request.headers_mut().insert(X_REQUEST_ID, header_value.clone());
        request.extensions_mut().insert(RequestId(id));

        let future = self.inner.call(request);
        Box::pin(async move {
            let mut response = future.await?;
            response.headers_mut().insert(X_REQUEST_ID, header_value);
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_id_reads_unknown() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(request.request_id(), "unknown");
    }

    #[test]
    fn test_extension_id_is_read() {
        let mut request = Request::builder().body(Body::empty()).unwrap();
        request.extensions_mut().insert(RequestId("abc-123".into()));
        assert_eq!(request.request_id(), "abc-123");
    }
}
