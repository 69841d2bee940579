//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Location (path, name + params, or resolved target)
//!     → router.rs (route table lookup)
//!     → matcher.rs (pattern matching, param extraction)
//!     → Return: RouteTarget with matched records, or None
//!
//! Route Compilation (at startup):
//!     RouteDef[] (from config)
//!     → Flatten nested children into record chains
//!     → Rank patterns by specificity
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex (segment matching only)
//! - Deterministic: same input always matches same route
//! - Most specific match wins

pub mod matcher;
pub mod router;
pub mod target;

pub use router::{RouteDef, RouteTable, Router};
pub use target::{Location, ResolveError, RouteMeta, RouteRecord, RouteTarget};
