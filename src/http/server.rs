//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch matched routes through normalize → fetch → transform
//! - Map request-path errors to their HTTP statuses
//! - Observability (metrics, correlation IDs)
//!
//! # Design Decisions
//! - One task per request; the only shared state is immutable and behind
//!   `Arc`, so requests never contend
//! - Origin fetches run inside the handler future: a client disconnect
//!   drops the future and cancels the in-flight fetch
//! - CPU-bound image work runs on the blocking pool

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::request::{RequestIdExt, RequestIdLayer};
use crate::http::response::{self, CachePolicy};
use crate::imaging::{GdEngine, ImagingBackend};
use crate::net::BoundedListener;
use crate::observability::metrics;
use crate::origin::{OriginFetcher, OriginResponse};
use crate::resize::{ResizeDirective, ResizeRequest};
use crate::routing::{RouteMatch, RouteTable, SkuReference};

/// Application state injected into the handler. Built once, shared
/// read-only across all requests.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub fetcher: Arc<OriginFetcher>,
    pub backend: Arc<dyn ImagingBackend>,
    pub config: Arc<ProxyConfig>,
    pub cache: CachePolicy,
}

/// HTTP server for the resize proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Wire up all subsystems. Fails only if the origin client cannot be
    /// constructed.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let table = Arc::new(RouteTable::new(&config.routes));
        let fetcher = Arc::new(OriginFetcher::new(&config.origin, &config.fetch)?);
        let backend: Arc<dyn ImagingBackend> = Arc::new(GdEngine::new(&config.imaging));
        let cache = CachePolicy::from_config(&config.cache.expires);

        let state = AppState {
            table,
            fetcher,
            backend,
            cache,
            config: Arc::new(config),
        };

        let request_timeout = state.config.listener.request_timeout_secs;
        let router = Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(request_timeout),
            ))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http());

        Ok(Self { router })
    }

    /// Run the server until the shutdown signal fires, then drain
    /// in-flight requests.
    pub async fn run(
        self,
        listener: BoundedListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = shutdown.recv() => {}
                }
                tracing::info!("Shutdown signal received, draining requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all proxy handler: route, dispatch, compose.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request.request_id().to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    // Read-only CDN surface.
    if method != Method::GET && method != Method::HEAD {
        metrics::record_request(method.as_str(), 405, "none", start);
        return (StatusCode::METHOD_NOT_ALLOWED, "method not allowed").into_response();
    }

    let matched = state.table.match_path(&path);
    let route = RouteTable::label(&matched);
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = route,
        "Dispatching request"
    );

    let result = dispatch(&state, matched, query.as_deref()).await;
    let response = match result {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(
                request_id = %request_id,
                path = %path,
                route = route,
                error = %error,
                kind = error.kind(),
                "Request failed"
            );
            error.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), route, start);
    response
}

async fn dispatch(
    state: &AppState,
    matched: RouteMatch,
    query: Option<&str>,
) -> Result<Response, ProxyError> {
    match matched {
        RouteMatch::Info { path } => {
            let origin = state.fetcher.fetch_buffered(&path, query).await?;
            if !origin.status.is_success() {
                return Ok(relay(origin));
            }
            let backend = state.backend.clone();
            let info = run_imaging(move || backend.inspect(&origin.body)).await?;
            Ok(response::info_response(&info, state.cache))
        }

        RouteMatch::Resize {
            width,
            height,
            path,
        } => {
            let request = ResizeRequest::bounding_box(&width, &height, path)?;
            let directive = ResizeDirective::from_request(&request, &state.config.imaging);
            transform(state, &request.source_path, query, directive).await
        }

        RouteMatch::Pad {
            width,
            height,
            color,
            path,
        } => {
            let request = ResizeRequest::pad(&width, &height, color.as_deref(), path)?;
            let directive = ResizeDirective::from_request(&request, &state.config.imaging);
            transform(state, &request.source_path, query, directive).await
        }

        RouteMatch::RawDirective { directive, path } => {
            let directive = ResizeDirective::parse(&directive, &state.config.imaging)?;
            transform(state, &path, query, directive).await
        }

        RouteMatch::Product {
            code,
            index,
            extension,
        } => {
            let sku = SkuReference::parse(&code, index, &extension)?;
            let upstream = state
                .fetcher
                .fetch_streaming(&sku.storage_path(), query)
                .await?;
            Ok(response::passthrough_response(upstream))
        }

        RouteMatch::Passthrough { path } => {
            let upstream = state.fetcher.fetch_streaming(&path, query).await?;
            Ok(response::passthrough_response(upstream))
        }
    }
}

/// Fetch, transform, compose. Shared by the resize, pad, and raw
/// directive routes.
async fn transform(
    state: &AppState,
    path: &str,
    query: Option<&str>,
    directive: ResizeDirective,
) -> Result<Response, ProxyError> {
    let origin = state.fetcher.fetch_buffered(path, query).await?;
    if !origin.status.is_success() {
        return Ok(relay(origin));
    }

    let backend = state.backend.clone();
    let format_converted = directive.output_format.is_some();
    let source_content_type = origin.content_type.clone();
    let transformed = run_imaging(move || backend.transform(&origin.body, &directive)).await?;

    // A format conversion (of=) must relabel the bytes; otherwise the
    // origin's content type is inherited.
    let content_type = if format_converted {
        transformed.content_type.to_string()
    } else {
        source_content_type.unwrap_or_else(|| transformed.content_type.to_string())
    };

    Ok(response::image_response(
        transformed.bytes,
        &content_type,
        state.cache,
    ))
}

fn relay(origin: OriginResponse) -> Response {
    response::origin_status_response(origin.status, origin.content_type.as_deref(), origin.body)
}

/// Run CPU-bound imaging work on the blocking pool.
async fn run_imaging<T, F>(work: F) -> Result<T, ProxyError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, crate::imaging::ImagingError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ProxyError::ImagingBackendFailure(format!("imaging task failed: {}", e)))?
        .map_err(ProxyError::from)
}
