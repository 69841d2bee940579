//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Chunk registry → Route table → Prefetcher
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then routing, then the prefetcher
//! - A disabled prefetch config yields an unbound prefetcher, not an error

pub mod startup;

pub use startup::Site;
