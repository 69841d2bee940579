//! Chunk loading subsystem.
//!
//! # Data Flow
//! ```text
//! RouteConfig.chunk
//!     → registry.rs (one ComponentLoader per chunk name, lazy accessors)
//!     → fetch.rs (HTTP GET against the asset base, or a read from disk)
//!     → ViewModule
//! ```
//!
//! # Design Decisions
//! - Routes sharing a chunk share one loader identity
//! - Every fetch is bounded by the configured timeout
//! - Non-success HTTP statuses are load failures

pub mod fetch;
pub mod registry;

pub use fetch::{ChunkFetcher, ChunkSource};
pub use registry::ChunkRegistry;
