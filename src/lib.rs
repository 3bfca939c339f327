//! CDN-facing image-resizing reverse proxy.
//!
//! Inbound paths encode resize instructions (`/120x90/...`,
//! `/64x64-pad-00ff00/...`, `/info/...`); the proxy fetches the original
//! asset from the configured origin, transforms it through the imaging
//! backend, and answers with far-future caching headers. Anything no rule
//! claims passes through to the origin unchanged.

// Core subsystems
pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod routing;

// Request pipeline
pub mod imaging;
pub mod origin;
pub mod resize;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use net::BoundedListener;
