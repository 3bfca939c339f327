//! Response composition.
//!
//! # Responsibilities
//! - Assemble image, `/info/` JSON, and passthrough responses
//! - Apply the configured cache-expiry policy
//! - Strip hop-by-hop headers from passthrough responses
//!
//! # Design Decisions
//! - Passthrough preserves origin status, content type, and body; only
//!   hop-by-hop headers and `Content-Length` are dropped (the server
//!   re-frames the streamed body)
//! - Resized CDN assets are immutable per fingerprinted URL, so the
//!   default policy is a far-future expiry

use axum::body::Body;
use axum::http::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL, CONTENT_TYPE, EXPIRES};
use axum::http::StatusCode;
use axum::response::Response;
use bytes::Bytes;

use crate::imaging::ImageInfo;

/// Ten years of seconds, rendered as the far-future `Cache-Control`.
const CACHE_CONTROL_FAR_FUTURE: &str = "max-age=315360000";

/// The literal far-future `Expires` value the legacy server emitted.
pub const EXPIRES_FAR_FUTURE: &str = "Thu, 31 Dec 2037 23:55:55 GMT";

/// Headers that describe the connection, not the resource.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Cache-expiry policy for composed (resize/info) responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Far-future `Cache-Control` plus the fixed `Expires` constant.
    Max,
    /// No caching headers.
    Off,
    /// `Cache-Control: max-age=N`.
    Seconds(u64),
}

impl CachePolicy {
    /// Parse the validated `cache.expires` config value. Unrecognized
    /// input (impossible after validation) falls back to `Max`.
    pub fn from_config(value: &str) -> Self {
        match value {
            "max" => CachePolicy::Max,
            "off" => CachePolicy::Off,
            other => other.parse().map(CachePolicy::Seconds).unwrap_or(CachePolicy::Max),
        }
    }

    fn apply(self, headers: &mut HeaderMap) {
        match self {
            CachePolicy::Max => {
                headers.insert(
                    CACHE_CONTROL,
                    HeaderValue::from_static(CACHE_CONTROL_FAR_FUTURE),
                );
                headers.insert(EXPIRES, HeaderValue::from_static(EXPIRES_FAR_FUTURE));
            }
            CachePolicy::Off => {}
            CachePolicy::Seconds(secs) => {
                // Value is digits-only, always a valid header.
                if let Ok(value) = HeaderValue::from_str(&format!("max-age={}", secs)) {
                    headers.insert(CACHE_CONTROL, value);
                }
            }
        }
    }
}

/// A transformed image body with caching headers.
pub fn image_response(bytes: Vec<u8>, content_type: &str, policy: CachePolicy) -> Response {
    let mut response = Response::new(Body::from(bytes));
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    policy.apply(headers);
    response
}

/// The `/info/` JSON document.
pub fn info_response(info: &ImageInfo, policy: CachePolicy) -> Response {
    let body = serde_json::json!({
        "width": info.width,
        "height": info.height,
        "type": info.format,
    });
    let mut response = Response::new(Body::from(body.to_string()));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    policy.apply(headers);
    response
}

/// Relay a non-success buffered origin answer unchanged (transparent
/// proxy: the proxy synthesizes no error pages for the origin).
pub fn origin_status_response(
    status: StatusCode,
    content_type: Option<&str>,
    body: Bytes,
) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    if let Some(ct) = content_type {
        if let Ok(value) = HeaderValue::from_str(ct) {
            response.headers_mut().insert(CONTENT_TYPE, value);
        }
    }
    response
}

/// Stream an origin response straight through, minus hop-by-hop headers.
pub fn passthrough_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let mut headers = HeaderMap::new();
    for (name, value) in upstream.headers() {
        if is_end_to_end(name) {
            headers.insert(name.clone(), value.clone());
        }
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn is_end_to_end(name: &HeaderName) -> bool {
    let name = name.as_str();
    // Content-Length is dropped because the body is re-framed.
    name != "content-length" && !HOP_BY_HOP.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!(CachePolicy::from_config("max"), CachePolicy::Max);
        assert_eq!(CachePolicy::from_config("off"), CachePolicy::Off);
        assert_eq!(CachePolicy::from_config("3600"), CachePolicy::Seconds(3600));
    }

    #[test]
    fn test_max_policy_headers() {
        let response = image_response(vec![1, 2, 3], "image/jpeg", CachePolicy::Max);
        let headers = response.headers();
        assert_eq!(headers[CACHE_CONTROL], "max-age=315360000");
        assert_eq!(headers[EXPIRES], EXPIRES_FAR_FUTURE);
        assert_eq!(headers[CONTENT_TYPE], "image/jpeg");
    }

    #[test]
    fn test_off_policy_emits_nothing() {
        let response = image_response(vec![], "image/png", CachePolicy::Off);
        assert!(response.headers().get(CACHE_CONTROL).is_none());
        assert!(response.headers().get(EXPIRES).is_none());
    }

    #[test]
    fn test_seconds_policy() {
        let response = image_response(vec![], "image/png", CachePolicy::Seconds(60));
        assert_eq!(response.headers()[CACHE_CONTROL], "max-age=60");
        assert!(response.headers().get(EXPIRES).is_none());
    }

    #[test]
    fn test_info_document_shape() {
        let info = ImageInfo {
            width: 640,
            height: 480,
            format: "jpeg",
        };
        let response = info_response(&info, CachePolicy::Off);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_hop_by_hop_filtering() {
        assert!(!is_end_to_end(&HeaderName::from_static("connection")));
        assert!(!is_end_to_end(&HeaderName::from_static("transfer-encoding")));
        assert!(!is_end_to_end(&HeaderName::from_static("content-length")));
        assert!(is_end_to_end(&HeaderName::from_static("content-type")));
        assert!(is_end_to_end(&HeaderName::from_static("etag")));
    }

    #[test]
    fn test_origin_status_relay() {
        let response = origin_status_response(
            StatusCode::NOT_FOUND,
            Some("text/plain"),
            Bytes::from_static(b"missing"),
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }
}
