//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Initialize subsystems → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain requests → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then the listener
//! - Shutdown drains in-flight requests before exit

pub mod shutdown;

pub use shutdown::Shutdown;
