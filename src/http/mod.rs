//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, per-request dispatch)
//!     → request.rs (request ID generation and propagation)
//!     → [routing → normalize → fetch → transform]
//!     → response.rs (compose image/info/passthrough responses)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestId, RequestIdExt, RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
