//! Route prefetch cache for a statically generated marketing site.
//!
//! Resolves navigation targets through a route table and warms the lazily
//! loaded view chunks behind them, remembering warmed paths and loaders so
//! repeated requests cost nothing.

pub mod assets;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod prefetch;
pub mod routing;

pub use config::schema::SiteConfig;
pub use lifecycle::Site;
pub use prefetch::{
    ComponentLoader, ComponentRef, LazyAccessor, LoadError, RoutePrefetcher, ViewModule,
};
pub use routing::{Location, RouteTable, RouteTarget, Router};
