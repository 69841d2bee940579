//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems from a validated configuration
//! - Compute the list of locations to warm
//!
//! # Design Decisions
//! - Fail fast: a route table that does not compile is fatal
//! - Subsystems initialize in order, not concurrently

use std::collections::HashSet;
use std::sync::Arc;

use crate::assets::registry::build_route_table;
use crate::assets::{ChunkFetcher, ChunkRegistry};
use crate::config::SiteConfig;
use crate::prefetch::RoutePrefetcher;
use crate::routing::{Location, ResolveError, RouteTable, Router};

/// Everything needed to resolve and prefetch the site's routes.
#[derive(Debug)]
pub struct Site {
    pub config: SiteConfig,
    pub registry: Arc<ChunkRegistry>,
    pub table: Arc<RouteTable>,
    pub prefetcher: RoutePrefetcher,
}

impl Site {
    /// Build the site from a validated configuration.
    pub fn start(config: SiteConfig) -> Result<Self, ResolveError> {
        let registry = ChunkRegistry::new(ChunkFetcher::new(&config.assets));
        let table = Arc::new(build_route_table(&config, &registry)?);

        let prefetcher = if config.prefetch.enabled {
            RoutePrefetcher::new(table.clone() as Arc<dyn Router>)
        } else {
            tracing::info!("Prefetching disabled, prefetcher left unbound");
            RoutePrefetcher::unbound()
        };

        tracing::info!(
            routes = table.len(),
            chunks = registry.len(),
            asset_source = ?registry.source(),
            "Site initialized"
        );

        Ok(Self {
            config,
            registry,
            table,
            prefetcher,
        })
    }

    /// Locations to warm when none are requested explicitly: the configured
    /// warm list, then static routes, then extra paths, without duplicates.
    pub fn warm_locations(&self) -> Vec<Location> {
        let prefetch = &self.config.prefetch;
        let statics = if prefetch.include_static {
            self.table.static_paths()
        } else {
            Vec::new()
        };

        let mut seen = HashSet::new();
        prefetch
            .warm
            .iter()
            .cloned()
            .chain(statics)
            .chain(prefetch.extra_paths.iter().cloned())
            .filter(|path| seen.insert(path.clone()))
            .map(Location::Path)
            .collect()
    }
}
