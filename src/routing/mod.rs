//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     RouteTable::get / any / route
//!     → record (pattern, methods) in order
//!     → axum Router for dispatch
//!     → Arc<[Route]> snapshot
//!     → introspect.rs (route listing handler)
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Listing reflects registration order

pub mod introspect;
pub mod router;

pub use introspect::{list_paths, PathsResponse};
pub use router::{Route, RouteTable};
