//! Chunk loader registry.
//!
//! # Responsibilities
//! - Hand out exactly one `ComponentLoader` per chunk name
//! - Build lazy accessors for routes configured with `lazy = true`
//! - Turn route configuration into route definitions

use std::sync::Arc;

use dashmap::DashMap;

use crate::assets::fetch::{ChunkFetcher, ChunkSource};
use crate::config::{RouteConfig, SiteConfig};
use crate::prefetch::loader::{ComponentLoader, ComponentRef, LazyAccessor};
use crate::routing::{ResolveError, RouteDef, RouteMeta, RouteTable};

/// Shared registry of chunk loaders.
#[derive(Debug)]
pub struct ChunkRegistry {
    fetcher: ChunkFetcher,
    loaders: DashMap<String, ComponentLoader>,
}

impl ChunkRegistry {
    pub fn new(fetcher: ChunkFetcher) -> Arc<Self> {
        Arc::new(Self {
            fetcher,
            loaders: DashMap::new(),
        })
    }

    /// Loader for a chunk, created on first use.
    pub fn loader(&self, chunk: &str) -> ComponentLoader {
        self.loaders
            .entry(chunk.to_string())
            .or_insert_with(|| {
                let fetcher = self.fetcher.clone();
                let name = chunk.to_string();
                ComponentLoader::new(chunk, move || {
                    let fetcher = fetcher.clone();
                    let name = name.clone();
                    async move { fetcher.fetch(&name).await }
                })
            })
            .value()
            .clone()
    }

    /// Accessor that looks the chunk's loader up when first needed.
    pub fn lazy(self: &Arc<Self>, chunk: &str) -> LazyAccessor {
        let registry = Arc::clone(self);
        let name = chunk.to_string();
        LazyAccessor::new(chunk, move || {
            let registry = registry.clone();
            let name = name.clone();
            async move { Ok(Some(registry.loader(&name))) }
        })
    }

    pub fn source(&self) -> &ChunkSource {
        self.fetcher.source()
    }

    /// Number of loaders handed out so far.
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Component reference for one configured route.
    pub fn component_ref(self: &Arc<Self>, route: &RouteConfig) -> ComponentRef {
        match (&route.chunk, &route.component) {
            (Some(chunk), _) if route.lazy => ComponentRef::Lazy(self.lazy(chunk)),
            (Some(chunk), _) => ComponentRef::Loader(self.loader(chunk)),
            (None, Some(component)) => ComponentRef::Static(component.clone()),
            (None, None) => ComponentRef::None,
        }
    }

    /// Route definitions for configured routes, children included.
    pub fn route_defs(self: &Arc<Self>, routes: &[RouteConfig]) -> Vec<RouteDef> {
        routes
            .iter()
            .map(|route| RouteDef {
                path: route.path.clone(),
                name: route.name.clone(),
                component: self.component_ref(route),
                redirect: route.redirect.clone(),
                meta: RouteMeta {
                    title: route.title.clone(),
                    hide_nav: route.hide_nav,
                },
                children: self.route_defs(&route.children),
            })
            .collect()
    }
}

/// Compile the configured routes into a route table backed by the registry.
pub fn build_route_table(
    config: &SiteConfig,
    registry: &Arc<ChunkRegistry>,
) -> Result<RouteTable, ResolveError> {
    RouteTable::new(registry.route_defs(&config.routes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{Location, Router};
    use std::time::Duration;

    fn registry() -> Arc<ChunkRegistry> {
        ChunkRegistry::new(ChunkFetcher::with_source(
            ChunkSource::Dir("dist/assets".into()),
            Duration::from_secs(1),
        ))
    }

    #[test]
    fn test_one_loader_per_chunk() {
        let registry = registry();
        let a = registry.loader("Services.js");
        let b = registry.loader("Services.js");
        let c = registry.loader("Contact.js");

        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_lazy_resolves_to_shared_loader() {
        let registry = registry();
        let direct = registry.loader("Insights.js");
        let lazy = registry.lazy("Insights.js");

        let resolved = lazy.resolve().await.unwrap().unwrap();
        assert_eq!(resolved.id(), direct.id());
    }

    #[test]
    fn test_component_ref_kinds() {
        let registry = registry();
        let routes = crate::config::schema::default_routes();
        let kinds: Vec<&str> = routes.iter().map(|r| registry.component_ref(r).kind()).collect();

        assert_eq!(kinds.first(), Some(&"static"));
        assert_eq!(kinds.last(), Some(&"none"));
        assert!(kinds[1..kinds.len() - 1].iter().all(|k| *k == "loader"));
    }

    #[test]
    fn test_build_default_table() {
        let registry = registry();
        let table = build_route_table(&SiteConfig::default(), &registry).unwrap();

        assert_eq!(table.len(), 11);
        let target = table.resolve(&Location::path("/not-found")).unwrap().unwrap();
        assert!(target.hide_nav());
        assert_eq!(target.title("x"), "Legal Crest - Page Not Found");
    }
}
