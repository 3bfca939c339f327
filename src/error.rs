//! Request-path error taxonomy.
//!
//! # Responsibilities
//! - Classify every way a proxied request can fail
//! - Map each failure class to exactly one HTTP status
//! - Render short plain-text error bodies (never a partial image)
//!
//! # Design Decisions
//! - One enum for the whole request path; subsystem errors convert into it
//! - No error is fatal to the process: a failed request never affects others
//! - Bodies are deliberately terse; diagnosis happens through logs, which
//!   always carry the original request path and request id

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::routing::sku::SkuError;

/// Everything that can go wrong while serving a proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Malformed numeric or hex capture (zero dimension, bad color length).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// SKU fragment failed its charset/length constraints.
    ///
    /// Surfaced as 404 rather than 400: SKU paths are public-facing, and a
    /// malformed code is indistinguishable from a product that does not
    /// exist.
    #[error("invalid sku: {0}")]
    InvalidSku(#[from] SkuError),

    /// The origin could not be reached (connect/transport failure).
    #[error("origin unreachable: {0}")]
    OriginUnreachable(#[source] reqwest::Error),

    /// The origin did not answer within the configured fetch timeout.
    #[error("origin timed out")]
    OriginTimeout,

    /// The imaging backend rejected or failed to process the source bytes.
    #[error("imaging backend failure: {0}")]
    ImagingBackendFailure(String),
}

impl ProxyError {
    /// HTTP status for this failure class.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ProxyError::InvalidSku(_) => StatusCode::NOT_FOUND,
            ProxyError::OriginUnreachable(_) => StatusCode::BAD_GATEWAY,
            ProxyError::OriginTimeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::ImagingBackendFailure(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::InvalidParameter(_) => "invalid_parameter",
            ProxyError::InvalidSku(_) => "invalid_sku",
            ProxyError::OriginUnreachable(_) => "origin_unreachable",
            ProxyError::OriginTimeout => "origin_timeout",
            ProxyError::ImagingBackendFailure(_) => "imaging_failure",
        }
    }

    /// Body text sent to the client. Intentionally does not echo internal
    /// error details back to the caller.
    pub fn public_message(&self) -> &'static str {
        match self {
            ProxyError::InvalidParameter(_) => "invalid resize parameters",
            ProxyError::InvalidSku(_) => "not found",
            ProxyError::OriginUnreachable(_) => "origin unreachable",
            ProxyError::OriginTimeout => "origin timeout",
            ProxyError::ImagingBackendFailure(_) => "image processing failed",
        }
    }
}

impl From<crate::imaging::ImagingError> for ProxyError {
    fn from(error: crate::imaging::ImagingError) -> Self {
        ProxyError::ImagingBackendFailure(error.to_string())
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}
