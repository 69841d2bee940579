//! Prefetch bookkeeping.
//!
//! Two monotonically growing membership sets: loader identities that were
//! loaded (or are in flight) and full paths that were prefetched. Nothing
//! is ever evicted.
//!
//! A loader invocation runs on its own task and settles its slot there, so
//! the slot never outlives the invocation even when every caller stops
//! waiting on it.

use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;

use crate::observability::metrics;
use crate::prefetch::loader::{ComponentLoader, LoadError, LoaderId};

/// Shared outcome of one loader invocation.
pub(crate) type LoadOutcome = Shared<BoxFuture<'static, Result<usize, Arc<LoadError>>>>;

type LoaderSlots = DashMap<LoaderId, LoaderSlot>;

enum LoaderSlot {
    InFlight(LoadOutcome),
    Loaded,
}

/// What a caller should do about a loader.
pub(crate) enum Claim {
    /// Already loaded; nothing to do.
    Loaded,
    /// An invocation started by someone else is in flight.
    Waiting(LoadOutcome),
    /// This caller started the invocation.
    Started(LoadOutcome),
}

#[derive(Default)]
pub struct PrefetchState {
    loaders: Arc<LoaderSlots>,
    resolved_paths: DashSet<String>,
}

impl PrefetchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_path_resolved(&self, full_path: &str) -> bool {
        self.resolved_paths.contains(full_path)
    }

    /// Mark a path as prefetched. Returns false if it already was.
    pub fn mark_path_resolved(&self, full_path: &str) -> bool {
        self.resolved_paths.insert(full_path.to_string())
    }

    pub fn resolved_path_count(&self) -> usize {
        self.resolved_paths.len()
    }

    pub fn is_loader_loaded(&self, id: LoaderId) -> bool {
        matches!(
            self.loaders.get(&id).as_deref(),
            Some(LoaderSlot::Loaded)
        )
    }

    pub fn loaded_loader_count(&self) -> usize {
        self.loaders
            .iter()
            .filter(|e| matches!(e.value(), LoaderSlot::Loaded))
            .count()
    }

    /// Claim a loader, starting its invocation if nobody has.
    ///
    /// Must be called from within a tokio runtime. `route` is the route
    /// that asked for the load and only appears in logs.
    pub(crate) fn claim(&self, loader: &ComponentLoader, route: &str) -> Claim {
        match self.loaders.entry(loader.id()) {
            Entry::Occupied(e) => match e.get() {
                LoaderSlot::Loaded => Claim::Loaded,
                LoaderSlot::InFlight(outcome) => Claim::Waiting(outcome.clone()),
            },
            Entry::Vacant(v) => {
                let slots = Arc::clone(&self.loaders);
                let outcome = spawn_load(slots, loader.clone(), route.to_string());
                v.insert(LoaderSlot::InFlight(outcome.clone()));
                Claim::Started(outcome)
            }
        }
    }
}

/// Invoke a loader on its own task and settle its slot when it finishes.
///
/// The loader closure first runs on that task, never under the map guard
/// held by `claim`.
fn spawn_load(slots: Arc<LoaderSlots>, loader: ComponentLoader, route: String) -> LoadOutcome {
    let task = tokio::spawn(async move {
        let guard = SlotGuard::new(slots, loader.id());
        let started = Instant::now();
        let result = loader.load().await;

        metrics::record_loader_invocation(result.is_ok());
        metrics::record_load_duration(started.elapsed());
        match &result {
            Ok(module) => tracing::debug!(
                route = %route,
                component = %loader.label(),
                bytes = module.size,
                "Component prefetched"
            ),
            Err(e) => tracing::warn!(
                route = %route,
                component = %loader.label(),
                error = %e,
                "Prefetch failed"
            ),
        }

        guard.settle(result.is_ok());
        result.map(|module| module.size).map_err(Arc::new)
    });

    async move {
        match task.await {
            Ok(result) => result,
            Err(e) => {
                let message = format!("load task failed: {}", e);
                Err(Arc::new(LoadError::Other(message)))
            }
        }
    }
    .boxed()
    .shared()
}

/// Settles a loader slot: loaded on success, forgotten otherwise.
///
/// Dropping the guard unsettled (a panicking loader, runtime shutdown)
/// forgets the slot so a later prefetch may try again.
struct SlotGuard {
    slots: Arc<LoaderSlots>,
    id: LoaderId,
    settled: bool,
}

impl SlotGuard {
    fn new(slots: Arc<LoaderSlots>, id: LoaderId) -> Self {
        Self {
            slots,
            id,
            settled: false,
        }
    }

    fn settle(mut self, loaded: bool) {
        if loaded {
            self.slots.insert(self.id, LoaderSlot::Loaded);
        } else {
            self.slots.remove(&self.id);
        }
        self.settled = true;
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.slots.remove(&self.id);
        }
    }
}

impl std::fmt::Debug for PrefetchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefetchState")
            .field("loaded_loaders", &self.loaded_loader_count())
            .field("resolved_paths", &self.resolved_path_count())
            .finish()
    }
}
