//! Locations, resolved targets and route records.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::prefetch::loader::ComponentRef;

/// Errors produced while resolving a location.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// No route carries the requested name.
    #[error("no route named '{0}'")]
    UnknownRoute(String),

    /// A named location did not supply a required path parameter.
    #[error("route '{route}' requires param '{param}'")]
    MissingParam { route: String, param: String },

    /// A route pattern or path could not be parsed.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

/// Route metadata used by the page shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Document title for the page.
    pub title: Option<String>,
    /// Hide the main navigation on this page.
    pub hide_nav: bool,
}

/// One matched segment of a resolved target.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    /// Full pattern of the record, including parent prefixes.
    pub path: String,
    pub name: Option<String>,
    pub component: ComponentRef,
    /// Redirect target; redirect records are matched but not followed.
    pub redirect: Option<String>,
    pub meta: RouteMeta,
}

/// Result of resolving a navigation request.
#[derive(Debug, Clone)]
pub struct RouteTarget {
    /// Normalized path with query and hash. Used as the prefetch dedup key.
    pub full_path: String,
    pub path: String,
    pub query: Option<String>,
    pub hash: Option<String>,
    pub name: Option<String>,
    pub params: BTreeMap<String, String>,
    /// Matched records, outermost first.
    pub matched: Vec<Arc<RouteRecord>>,
}

impl RouteTarget {
    /// Build a target, deriving the full path from its parts.
    pub fn new(
        path: impl Into<String>,
        query: Option<String>,
        hash: Option<String>,
        matched: Vec<Arc<RouteRecord>>,
    ) -> Self {
        let path = path.into();
        let full_path = compose_full_path(&path, query.as_deref(), hash.as_deref());
        let name = matched.last().and_then(|r| r.name.clone());
        Self {
            full_path,
            path,
            query,
            hash,
            name,
            params: BTreeMap::new(),
            matched,
        }
    }

    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    /// Page title: the deepest matched record's title, else `default`.
    pub fn title<'a>(&'a self, default: &'a str) -> &'a str {
        self.matched
            .iter()
            .rev()
            .find_map(|r| r.meta.title.as_deref())
            .unwrap_or(default)
    }

    /// Whether any matched record hides the navigation.
    pub fn hide_nav(&self) -> bool {
        self.matched.iter().any(|r| r.meta.hide_nav)
    }
}

/// A navigation request.
#[derive(Debug, Clone)]
pub enum Location {
    /// Raw path, optionally with `?query` and `#hash`.
    Path(String),
    /// Named route plus path params.
    Named {
        name: String,
        params: BTreeMap<String, String>,
    },
    /// Already resolved target; the router is bypassed.
    Resolved(RouteTarget),
}

impl Location {
    pub fn path(path: impl Into<String>) -> Self {
        Location::Path(path.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        Location::Named {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a param to a named location. No effect on other variants.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Location::Named { params, .. } = &mut self {
            params.insert(key.into(), value.into());
        }
        self
    }

    /// An empty path string counts as no location at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Location::Path(p) => p.trim().is_empty(),
            Location::Named { name, .. } => name.is_empty(),
            Location::Resolved(_) => false,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Path(path) => write!(f, "{}", path),
            Location::Named { name, params } => {
                write!(f, "{}", name)?;
                if !params.is_empty() {
                    let pairs: Vec<String> =
                        params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                    write!(f, "({})", pairs.join(", "))?;
                }
                Ok(())
            }
            Location::Resolved(target) => write!(f, "{}", target.full_path),
        }
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Location::Path(path.to_string())
    }
}

impl From<String> for Location {
    fn from(path: String) -> Self {
        Location::Path(path)
    }
}

impl From<RouteTarget> for Location {
    fn from(target: RouteTarget) -> Self {
        Location::Resolved(target)
    }
}

/// Split a raw location into path, query and hash.
pub fn split_location(raw: &str) -> (String, Option<String>, Option<String>) {
    let (rest, hash) = match raw.split_once('#') {
        Some((rest, hash)) => (rest, non_empty(hash)),
        None => (raw, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, non_empty(query)),
        None => (rest, None),
    };
    (normalize_path(path), query, hash)
}

/// Normalize a path: leading slash, no repeated slashes, no trailing slash.
pub fn normalize_path(path: &str) -> String {
    let joined = path
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}", joined)
}

fn compose_full_path(path: &str, query: Option<&str>, hash: Option<&str>) -> String {
    let mut full = path.to_string();
    if let Some(q) = query {
        full.push('?');
        full.push_str(q);
    }
    if let Some(h) = hash {
        full.push('#');
        full.push_str(h);
    }
    full
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
