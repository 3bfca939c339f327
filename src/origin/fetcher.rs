//! Origin HTTP fetcher.
//!
//! # Responsibilities
//! - Build origin URLs from the configured protocol/host/port/base-path
//! - Issue GETs with pinned resolver addresses and timeouts
//! - Bound concurrent fetches with a semaphore
//! - Classify transport failures (timeout vs unreachable)
//!
//! # Design Decisions
//! - Redirects are not followed: 3xx propagates unchanged, transparent
//!   proxy semantics
//! - Origin 404/5xx are not errors here; the status travels back as-is
//! - Transform sources are buffered with a size guard; passthrough
//!   bodies stream and skip the guard

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use tokio::sync::Semaphore;

use crate::config::schema::{FetchConfig, OriginConfig};
use crate::error::ProxyError;
use crate::observability::metrics;

/// A fully buffered origin response.
#[derive(Debug, Clone)]
pub struct OriginResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// HTTP client for the configured origin.
///
/// The logical hostname appears in every URL, so reqwest derives the
/// `Host` header from it; `resolve` entries only redirect the connection,
/// which is exactly what virtual-hosted object stores need.
pub struct OriginFetcher {
    client: reqwest::Client,
    base: String,
    permits: Arc<Semaphore>,
    max_body_bytes: usize,
}

impl OriginFetcher {
    /// Build the client. Fails only if the TLS/connector setup fails.
    pub fn new(origin: &OriginConfig, fetch: &FetchConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(fetch.timeout_secs))
            .connect_timeout(Duration::from_secs(fetch.connect_timeout_secs));

        for addr in &origin.resolve {
            // Validation guarantees these parse; skip rather than panic if
            // the fetcher is built from an unvalidated config.
            if let Ok(ip) = addr.parse::<IpAddr>() {
                builder = builder.resolve(&origin.host, SocketAddr::new(ip, origin.port));
            }
        }

        Ok(Self {
            client: builder.build()?,
            base: format!(
                "{}://{}:{}{}",
                origin.protocol, origin.host, origin.port, origin.base_path
            ),
            permits: Arc::new(Semaphore::new(fetch.max_in_flight)),
            max_body_bytes: fetch.max_body_bytes,
        })
    }

    fn url_for(&self, path: &str, query: Option<&str>) -> String {
        let mut url = format!("{}/{}", self.base, path.trim_start_matches('/'));
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    async fn get(
        &self,
        path: &str,
        query: Option<&str>,
    ) -> Result<(reqwest::Response, tokio::sync::OwnedSemaphorePermit), ProxyError> {
        // Never closed; acquisition only fails after close.
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .expect("fetch semaphore closed");
        metrics::set_inflight_fetches(self.permits.available_permits());

        let start = Instant::now();
        match self.client.get(self.url_for(path, query)).send().await {
            Ok(response) => {
                metrics::record_origin_fetch("ok", start);
                Ok((response, permit))
            }
            Err(e) => {
                let error = classify(e);
                metrics::record_origin_fetch(error.kind(), start);
                Err(error)
            }
        }
    }

    /// Fetch and buffer a source for the transform/info paths, enforcing
    /// the body size guard. The concurrency permit is held until the body
    /// is fully read.
    pub async fn fetch_buffered(
        &self,
        path: &str,
        query: Option<&str>,
    ) -> Result<OriginResponse, ProxyError> {
        let (response, _permit) = self.get(path, query).await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut body = BytesMut::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(classify)?;
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(ProxyError::ImagingBackendFailure(format!(
                    "source exceeds {} byte limit",
                    self.max_body_bytes
                )));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(OriginResponse {
            status,
            content_type,
            body: body.freeze(),
        })
    }

    /// Fetch for passthrough: the caller streams the body straight to the
    /// client, headers and status untouched. The permit covers connection
    /// and headers; the streamed body is framed by the client connection.
    pub async fn fetch_streaming(
        &self,
        path: &str,
        query: Option<&str>,
    ) -> Result<reqwest::Response, ProxyError> {
        let (response, _permit) = self.get(path, query).await?;
        Ok(response)
    }
}

fn classify(error: reqwest::Error) -> ProxyError {
    if error.is_timeout() {
        ProxyError::OriginTimeout
    } else {
        ProxyError::OriginUnreachable(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher_with_base(base_path: &str) -> OriginFetcher {
        let mut origin = OriginConfig::default();
        origin.host = "assets.example.com".into();
        origin.port = 8443;
        origin.protocol = "https".into();
        origin.base_path = base_path.into();
        OriginFetcher::new(&origin, &FetchConfig::default()).unwrap()
    }

    #[test]
    fn test_url_building() {
        let fetcher = fetcher_with_base("/bucket");
        assert_eq!(
            fetcher.url_for("a/b.jpg", None),
            "https://assets.example.com:8443/bucket/a/b.jpg"
        );
        assert_eq!(
            fetcher.url_for("/a/b.jpg", Some("v=2")),
            "https://assets.example.com:8443/bucket/a/b.jpg?v=2"
        );
    }

    #[test]
    fn test_url_building_without_base_path() {
        let fetcher = fetcher_with_base("");
        assert_eq!(
            fetcher.url_for("x.png", None),
            "https://assets.example.com:8443/x.png"
        );
    }
}
