//! Route prefetcher.
//!
//! # Responsibilities
//! - Resolve a location through the bound router
//! - Warm every loader referenced by the matched records
//! - Remember warmed paths and loader identities
//!
//! # Design Decisions
//! - Best effort: nothing here ever fails the caller
//! - A path is marked resolved once all its records settle, even if some
//!   loads failed; failed loaders stay eligible for other paths
//! - Concurrent requests for an in-flight loader share one invocation
//! - A load outlives the prefetch that started it; dropping or aborting a
//!   prefetch never leaves a loader stuck in flight

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::task::JoinHandle;

use crate::observability::metrics;
use crate::prefetch::loader::{ComponentLoader, ComponentRef, LoaderId};
use crate::prefetch::state::{Claim, PrefetchState};
use crate::routing::{Location, RouteRecord, RouteTarget, Router};

struct Inner {
    router: Option<Arc<dyn Router>>,
    state: PrefetchState,
}

/// Speculatively warms component loaders ahead of navigation.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct RoutePrefetcher {
    inner: Arc<Inner>,
}

impl RoutePrefetcher {
    /// Create a prefetcher bound to a router.
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self::with_router(Some(router))
    }

    /// Create a prefetcher with no router. Every prefetch is a no-op.
    pub fn unbound() -> Self {
        Self::with_router(None)
    }

    fn with_router(router: Option<Arc<dyn Router>>) -> Self {
        Self {
            inner: Arc::new(Inner {
                router,
                state: PrefetchState::new(),
            }),
        }
    }

    pub fn has_router(&self) -> bool {
        self.inner.router.is_some()
    }

    pub fn state(&self) -> &PrefetchState {
        &self.inner.state
    }

    pub fn is_path_resolved(&self, full_path: &str) -> bool {
        self.inner.state.is_path_resolved(full_path)
    }

    pub fn is_loader_loaded(&self, id: LoaderId) -> bool {
        self.inner.state.is_loader_loaded(id)
    }

    pub fn resolved_path_count(&self) -> usize {
        self.inner.state.resolved_path_count()
    }

    pub fn loaded_loader_count(&self) -> usize {
        self.inner.state.loaded_loader_count()
    }

    /// Prefetch the components for one location.
    ///
    /// Never fails. `None` and empty paths are no-ops.
    pub async fn prefetch_route<L>(&self, location: L)
    where
        L: Into<Option<Location>>,
    {
        let location: Option<Location> = location.into();
        let Some(location) = location.filter(|l| !l.is_empty()) else {
            metrics::record_prefetch("skipped");
            return;
        };

        let Some(target) = self.resolve(location) else {
            return;
        };

        let state = &self.inner.state;
        if state.is_path_resolved(&target.full_path) {
            tracing::trace!(path = %target.full_path, "Route already prefetched");
            metrics::record_prefetch("cached");
            return;
        }

        join_all(target.matched.iter().map(|record| self.prefetch_record(record))).await;

        state.mark_path_resolved(&target.full_path);
        metrics::record_resolved_paths(state.resolved_path_count());
        metrics::record_prefetch("completed");
        tracing::debug!(
            path = %target.full_path,
            records = target.matched.len(),
            "Route prefetched"
        );
    }

    /// Prefetch several locations concurrently and wait for all of them.
    pub async fn prefetch_routes<I>(&self, locations: I)
    where
        I: IntoIterator,
        I::Item: Into<Option<Location>>,
    {
        join_all(locations.into_iter().map(|l| self.prefetch_route(l))).await;
    }

    /// Fire-and-forget prefetch on the tokio runtime.
    pub fn spawn_prefetch(&self, location: impl Into<Option<Location>>) -> JoinHandle<()> {
        let this = self.clone();
        let location: Option<Location> = location.into();
        tokio::spawn(async move { this.prefetch_route(location).await })
    }

    fn resolve(&self, location: Location) -> Option<RouteTarget> {
        let Some(router) = &self.inner.router else {
            tracing::debug!("No router bound, skipping prefetch");
            metrics::record_prefetch("skipped");
            return None;
        };

        let location = match location {
            Location::Resolved(target) => return Some(target),
            other => other,
        };

        match router.resolve(&location) {
            Ok(Some(target)) => Some(target),
            Ok(None) => {
                tracing::debug!(location = %location, "No route matched, skipping prefetch");
                metrics::record_prefetch("unresolved");
                None
            }
            Err(e) => {
                tracing::debug!(
                    location = %location,
                    error = %e,
                    "Location not resolvable, skipping prefetch"
                );
                metrics::record_prefetch("unresolved");
                None
            }
        }
    }

    async fn prefetch_record(&self, record: &RouteRecord) {
        let loader = match &record.component {
            ComponentRef::Loader(loader) => loader.clone(),
            ComponentRef::Lazy(accessor) => match accessor.resolve().await {
                Ok(Some(loader)) => loader,
                Ok(None) => return,
                Err(e) => {
                    tracing::warn!(
                        route = %record.path,
                        component = %accessor.label(),
                        error = %e,
                        "Prefetch failed: lazy component resolution"
                    );
                    metrics::record_lazy_failure();
                    return;
                }
            },
            ComponentRef::Static(_) | ComponentRef::None => return,
        };

        self.warm_loader(&loader, &record.path).await;
    }

    /// Wait for a loader to settle, starting it if nobody has.
    ///
    /// Cancelling this future does not cancel the load.
    async fn warm_loader(&self, loader: &ComponentLoader, route: &str) {
        match self.inner.state.claim(loader, route) {
            Claim::Loaded => {
                tracing::trace!(loader = %loader.id(), "Loader already warm");
            }
            Claim::Waiting(outcome) => {
                tracing::trace!(loader = %loader.id(), route = %route, "Joining in-flight load");
                let _ = outcome.await;
            }
            Claim::Started(outcome) => {
                let _ = outcome.await;
            }
        }
    }
}

impl std::fmt::Debug for RoutePrefetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutePrefetcher")
            .field("has_router", &self.has_router())
            .field("state", &self.inner.state)
            .finish()
    }
}
