//! Resize parameter handling.
//!
//! # Data Flow
//! ```text
//! Raw route captures (strings)
//!     → params.rs (typed ResizeRequest, defaults, rejection)
//!     → directive.rs (ResizeDirective, backend wire syntax)
//!     → imaging backend
//! ```
//!
//! # Design Decisions
//! - Captures are typed exactly once, here; downstream code never sees
//!   raw strings
//! - The backend wire syntax (`small_light(...)`) exists only inside
//!   directive.rs, so a backend swap touches one file

pub mod directive;
pub mod params;

pub use directive::{CanvasBox, ResizeDirective};
pub use params::{CanvasMode, PadColor, ResizeRequest};
