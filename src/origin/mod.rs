//! Origin access subsystem.
//!
//! # Data Flow
//! ```text
//! Resolved asset path
//!     → fetcher.rs (URL build, permit, HTTP GET)
//!     → buffered bytes (transform/info) or streaming response (passthrough)
//! ```
//!
//! # Design Decisions
//! - No retries here; the origin's answer is the answer
//! - Virtual-hosted addressing: the logical hostname travels in the URL
//!   (and therefore the Host header) while connections may be pinned to
//!   configured resolver addresses

pub mod fetcher;

pub use fetcher::{OriginFetcher, OriginResponse};
