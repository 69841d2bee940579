//! Route prefetching subsystem.
//!
//! # Data Flow
//! ```text
//! prefetch_route(location)
//!     → prefetcher.rs (resolve via Router, path-level short-circuit)
//!     → per matched record, concurrently:
//!         loader.rs (ComponentRef → ComponentLoader, lazy accessors)
//!         state.rs (claim loader identity, invoke once, settle)
//!     → mark full path resolved
//! ```
//!
//! # Design Decisions
//! - Failures are caught where they happen and logged as warnings
//! - State grows monotonically for the life of the prefetcher
//! - Loader identity, not chunk name, is the dedup key

pub mod loader;
pub mod prefetcher;
pub mod state;

pub use loader::{ComponentLoader, ComponentRef, LazyAccessor, LoadError, LoaderId, ViewModule};
pub use prefetcher::RoutePrefetcher;
pub use state::PrefetchState;
