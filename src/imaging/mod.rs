//! Imaging backend adapter.
//!
//! # Data Flow
//! ```text
//! Source bytes + ResizeDirective
//!     → ImagingBackend::transform (decode → resize/pad → encode)
//!     → TransformedImage (bytes + content type)
//!
//! Source bytes
//!     → ImagingBackend::inspect (header-only probe)
//!     → ImageInfo (width, height, format)
//! ```
//!
//! # Design Decisions
//! - The backend sits behind a trait so the in-process engine can be
//!   replaced by an out-of-process one without touching dispatch
//! - Transforms are CPU-bound and synchronous; callers run them on the
//!   blocking pool

pub mod gd;

use thiserror::Error;

use crate::resize::ResizeDirective;

/// Why the backend could not process the source bytes.
#[derive(Debug, Error)]
pub enum ImagingError {
    /// The bytes are not a decodable image.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The format is recognized but not supported for this operation.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The decoded image exceeds the configured pixel budget.
    #[error("image too large: {pixels} pixels exceeds limit {limit}")]
    TooLarge { pixels: u64, limit: u64 },

    /// Encoding the result failed.
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Metadata from a header-only inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Lowercase short format name ("jpeg", "png", ...).
    pub format: &'static str,
}

/// A finished transform.
#[derive(Debug, Clone)]
pub struct TransformedImage {
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`. Differs from the source's only when the
    /// directive converted the format.
    pub content_type: &'static str,
}

/// The operations the proxy needs from an imaging backend.
pub trait ImagingBackend: Send + Sync {
    /// Apply a directive to source bytes, producing encoded output.
    fn transform(
        &self,
        source: &[u8],
        directive: &ResizeDirective,
    ) -> Result<TransformedImage, ImagingError>;

    /// Probe dimensions and format without a full decode.
    fn inspect(&self, source: &[u8]) -> Result<ImageInfo, ImagingError>;
}

pub use gd::GdEngine;
