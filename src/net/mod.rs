//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - The connection permit rides inside the I/O type, so the slot frees
//!   exactly when the connection closes

pub mod listener;

pub use listener::BoundedListener;
