//! Component loaders and component references.
//!
//! # Responsibilities
//! - Wrap an async view-module load behind a cloneable handle
//! - Give every loader a stable identity shared by its clones
//! - Describe what a route record carries (loader, lazy accessor, static, none)

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;

static NEXT_LOADER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a component loader.
///
/// Assigned once when the loader is constructed; clones share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoaderId(u64);

impl LoaderId {
    fn next() -> Self {
        Self(NEXT_LOADER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LoaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loader#{}", self.0)
    }
}

/// A loaded view module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModule {
    /// Chunk the module came from.
    pub chunk: String,
    /// Size of the chunk in bytes.
    pub size: usize,
}

impl ViewModule {
    pub fn new(chunk: impl Into<String>, size: usize) -> Self {
        Self {
            chunk: chunk.into(),
            size,
        }
    }
}

/// Errors raised while loading a component.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// Chunk server answered with a non-success status.
    #[error("chunk {chunk} returned HTTP {status}")]
    Http { chunk: String, status: u16 },

    /// Request could not be sent or the body could not be read.
    #[error("transport error fetching {chunk}: {message}")]
    Transport { chunk: String, message: String },

    /// Chunk could not be read from disk.
    #[error("IO error reading {chunk}: {message}")]
    Io { chunk: String, message: String },

    /// Fetch exceeded the configured timeout.
    #[error("fetching {chunk} timed out after {secs} seconds")]
    Timeout { chunk: String, secs: u64 },

    /// A lazy accessor failed to produce a component reference.
    #[error("lazy component resolution failed: {0}")]
    Lazy(String),

    #[error("{0}")]
    Other(String),
}

type LoadFn = dyn Fn() -> BoxFuture<'static, Result<ViewModule, LoadError>> + Send + Sync;
type LazyFn =
    dyn Fn() -> BoxFuture<'static, Result<Option<ComponentLoader>, LoadError>> + Send + Sync;

/// Handle to an async operation that produces a view module.
#[derive(Clone)]
pub struct ComponentLoader {
    id: LoaderId,
    label: Arc<str>,
    load: Arc<LoadFn>,
}

impl ComponentLoader {
    /// Create a loader from an async closure.
    pub fn new<F, Fut>(label: impl Into<String>, load: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ViewModule, LoadError>> + Send + 'static,
    {
        Self {
            id: LoaderId::next(),
            label: Arc::from(label.into()),
            load: Arc::new(move || load().boxed()),
        }
    }

    pub fn id(&self) -> LoaderId {
        self.id
    }

    /// Human-readable label, usually the chunk name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Invoke the loader.
    pub fn load(&self) -> BoxFuture<'static, Result<ViewModule, LoadError>> {
        (self.load)()
    }
}

impl fmt::Debug for ComponentLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentLoader")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish()
    }
}

/// Async accessor that yields a loader on demand.
#[derive(Clone)]
pub struct LazyAccessor {
    label: Arc<str>,
    resolve: Arc<LazyFn>,
}

impl LazyAccessor {
    pub fn new<F, Fut>(label: impl Into<String>, resolve: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<ComponentLoader>, LoadError>> + Send + 'static,
    {
        Self {
            label: Arc::from(label.into()),
            resolve: Arc::new(move || resolve().boxed()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn resolve(&self) -> BoxFuture<'static, Result<Option<ComponentLoader>, LoadError>> {
        (self.resolve)()
    }
}

impl fmt::Debug for LazyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyAccessor")
            .field("label", &self.label)
            .finish()
    }
}

/// What a route record exposes as its component.
#[derive(Debug, Clone, Default)]
pub enum ComponentRef {
    /// Lazily loaded view module.
    Loader(ComponentLoader),
    /// Loader obtained through an async accessor.
    Lazy(LazyAccessor),
    /// Eagerly bundled component; nothing to load.
    Static(String),
    /// Record has no component (e.g. a redirect).
    #[default]
    None,
}

impl ComponentRef {
    /// Short tag used in logs and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            ComponentRef::Loader(_) => "loader",
            ComponentRef::Lazy(_) => "lazy",
            ComponentRef::Static(_) => "static",
            ComponentRef::None => "none",
        }
    }
}
