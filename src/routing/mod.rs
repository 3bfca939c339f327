//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → rules.rs (ordered pattern table, first match wins)
//!     → RouteMatch with raw captures
//!     → product matches continue through sku.rs (path derivation)
//!
//! Rule Compilation (at startup):
//!     RouteOptions (variant flags)
//!     → compile enabled patterns in priority order
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - One parameterized table replaces per-variant config copies
//! - Rules compiled at startup, immutable at runtime
//! - Deterministic: same path always matches the same rule
//! - Explicit passthrough result rather than silent default

pub mod rules;
pub mod sku;

pub use rules::{RouteMatch, RouteTable};
pub use sku::{SkuError, SkuReference};
