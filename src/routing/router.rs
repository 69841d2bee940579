//! Route lookup.
//!
//! # Responsibilities
//! - Define the `Router` seam the prefetcher resolves locations through
//! - Compile route definitions (with nested children) into a route table
//! - Resolve paths and named locations into `RouteTarget`s
//!
//! # Design Decisions
//! - Immutable after construction (shareable via Arc without locks)
//! - Most specific pattern wins, declaration order breaks ties
//! - Redirect records are matched, never followed
//! - Unmatched paths resolve to `None`, not an error

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::prefetch::loader::ComponentRef;
use crate::routing::matcher::PathPattern;
use crate::routing::target::{
    split_location, Location, ResolveError, RouteMeta, RouteRecord, RouteTarget,
};

/// Resolves navigation requests into matched route records.
pub trait Router: Send + Sync {
    fn resolve(&self, location: &Location) -> Result<Option<RouteTarget>, ResolveError>;
}

/// A route definition before compilation.
#[derive(Debug, Clone, Default)]
pub struct RouteDef {
    /// Absolute pattern, or relative to the parent for children.
    pub path: String,
    pub name: Option<String>,
    pub component: ComponentRef,
    pub redirect: Option<String>,
    pub meta: RouteMeta,
    pub children: Vec<RouteDef>,
}

impl RouteDef {
    pub fn new(path: impl Into<String>, component: ComponentRef) -> Self {
        Self {
            path: path.into(),
            component,
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.meta.title = Some(title.into());
        self
    }

    pub fn redirect(mut self, to: impl Into<String>) -> Self {
        self.redirect = Some(to.into());
        self
    }

    pub fn child(mut self, child: RouteDef) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug)]
struct CompiledRoute {
    pattern: PathPattern,
    chain: Vec<Arc<RouteRecord>>,
    declared: usize,
}

/// Compiled, immutable route table.
#[derive(Debug)]
pub struct RouteTable {
    /// Sorted by rank, most specific first.
    routes: Vec<CompiledRoute>,
    by_name: HashMap<String, usize>,
}

impl RouteTable {
    /// Compile route definitions into a table.
    pub fn new(defs: Vec<RouteDef>) -> Result<Self, ResolveError> {
        let mut routes = Vec::new();
        for def in defs {
            flatten(def, "", &[], &mut routes)?;
        }

        // Stable sort keeps declaration order among equally ranked patterns.
        routes.sort_by(|a, b| b.pattern.compare_rank(&a.pattern));

        let mut by_name = HashMap::new();
        for (idx, route) in routes.iter().enumerate() {
            if let Some(name) = route.chain.last().and_then(|r| r.name.clone()) {
                by_name.entry(name).or_insert(idx);
            }
        }

        tracing::debug!(routes = routes.len(), named = by_name.len(), "Route table compiled");

        Ok(Self { routes, by_name })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Record chains in declaration order.
    pub fn records(&self) -> Vec<Arc<RouteRecord>> {
        let mut routes: Vec<&CompiledRoute> = self.routes.iter().collect();
        routes.sort_by_key(|r| r.declared);
        routes
            .into_iter()
            .filter_map(|r| r.chain.last().cloned())
            .collect()
    }

    /// Paths of parameterless, non-redirect routes, in declaration order.
    pub fn static_paths(&self) -> Vec<String> {
        let mut routes: Vec<&CompiledRoute> = self
            .routes
            .iter()
            .filter(|r| r.pattern.is_static())
            .filter(|r| r.chain.last().map(|rec| rec.redirect.is_none()).unwrap_or(false))
            .collect();
        routes.sort_by_key(|r| r.declared);
        routes.into_iter().map(|r| r.pattern.as_str().to_string()).collect()
    }

    fn resolve_path(&self, raw: &str) -> Option<RouteTarget> {
        let (path, query, hash) = split_location(raw);
        self.routes.iter().find_map(|route| {
            route.pattern.matches(&path).map(|params| {
                RouteTarget::new(path.clone(), query.clone(), hash.clone(), route.chain.clone())
                    .with_params(params)
            })
        })
    }

    fn resolve_named(
        &self,
        name: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<RouteTarget, ResolveError> {
        let route = self
            .by_name
            .get(name)
            .map(|&idx| &self.routes[idx])
            .ok_or_else(|| ResolveError::UnknownRoute(name.to_string()))?;

        let path = route.pattern.build(params).map_err(|param| ResolveError::MissingParam {
            route: name.to_string(),
            param,
        })?;

        let used = route.pattern.matches(&path).unwrap_or_default();

        Ok(RouteTarget::new(path, None, None, route.chain.clone()).with_params(used))
    }
}

impl Router for RouteTable {
    fn resolve(&self, location: &Location) -> Result<Option<RouteTarget>, ResolveError> {
        match location {
            Location::Path(raw) => Ok(self.resolve_path(raw)),
            Location::Named { name, params } => self.resolve_named(name, params).map(Some),
            Location::Resolved(target) => Ok(Some(target.clone())),
        }
    }
}

fn flatten(
    def: RouteDef,
    parent: &str,
    parent_chain: &[Arc<RouteRecord>],
    out: &mut Vec<CompiledRoute>,
) -> Result<(), ResolveError> {
    let full = join_pattern(parent, &def.path);
    let pattern = PathPattern::parse(&full)?;

    let record = Arc::new(RouteRecord {
        path: full.clone(),
        name: def.name,
        component: def.component,
        redirect: def.redirect,
        meta: def.meta,
    });

    let mut chain = parent_chain.to_vec();
    chain.push(record);

    let declared = out.len();
    out.push(CompiledRoute {
        pattern,
        chain: chain.clone(),
        declared,
    });

    for child in def.children {
        flatten(child, &full, &chain, out)?;
    }
    Ok(())
}

pub(crate) fn join_pattern(parent: &str, path: &str) -> String {
    if path.starts_with('/') || parent.is_empty() {
        return path.to_string();
    }
    if path.is_empty() {
        return parent.to_string();
    }
    format!("{}/{}", parent.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefetch::loader::{ComponentLoader, ViewModule};

    fn loader(name: &'static str) -> ComponentRef {
        ComponentRef::Loader(ComponentLoader::new(name, move || async move {
            Ok(ViewModule::new(name, 1))
        }))
    }

    fn site() -> RouteTable {
        RouteTable::new(vec![
            RouteDef::new("/", ComponentRef::Static("Home".into())).name("Home"),
            RouteDef::new("/services", loader("Services.js")).name("Services"),
            RouteDef::new("/services/:slug", loader("ServiceDetail.js"))
                .name("ServiceDetail")
                .title("Legal Crest - Service Details"),
            RouteDef::new("/insights/featured", loader("Featured.js")).name("Featured"),
            RouteDef::new("/insights/:slug", loader("ArticleDetail.js")).name("ArticleDetail"),
            RouteDef::new("/not-found", loader("NotFound.js")).name("NotFound"),
            RouteDef::new("/:pathMatch(.*)*", ComponentRef::None).redirect("/not-found"),
        ])
        .unwrap()
    }

    #[test]
    fn test_resolve_path() {
        let table = site();
        let target = table.resolve(&Location::path("/services/probate/")).unwrap().unwrap();
        assert_eq!(target.full_path, "/services/probate");
        assert_eq!(target.name.as_deref(), Some("ServiceDetail"));
        assert_eq!(target.params["slug"], "probate");
        assert_eq!(target.matched.len(), 1);
        assert_eq!(target.title("Default"), "Legal Crest - Service Details");
    }

    #[test]
    fn test_static_beats_param() {
        let table = site();
        let target = table.resolve(&Location::path("/insights/featured")).unwrap().unwrap();
        assert_eq!(target.name.as_deref(), Some("Featured"));
    }

    #[test]
    fn test_catch_all_redirect_not_followed() {
        let table = site();
        let target = table.resolve(&Location::path("/missing/page")).unwrap().unwrap();
        assert_eq!(target.full_path, "/missing/page");
        assert_eq!(target.matched[0].redirect.as_deref(), Some("/not-found"));
        assert!(matches!(target.matched[0].component, ComponentRef::None));
    }

    #[test]
    fn test_unmatched_is_none() {
        let table = RouteTable::new(vec![RouteDef::new("/contact", loader("Contact.js"))]).unwrap();
        assert!(table.resolve(&Location::path("/other")).unwrap().is_none());
    }

    #[test]
    fn test_resolve_named() {
        let table = site();
        let target = table
            .resolve(&Location::named("ArticleDetail").param("slug", "hiring-counsel"))
            .unwrap()
            .unwrap();
        assert_eq!(target.full_path, "/insights/hiring-counsel");

        let err = table.resolve(&Location::named("ArticleDetail")).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingParam {
                route: "ArticleDetail".into(),
                param: "slug".into()
            }
        );

        let err = table.resolve(&Location::named("Nope")).unwrap_err();
        assert_eq!(err, ResolveError::UnknownRoute("Nope".into()));
    }

    #[test]
    fn test_nested_children() {
        let faq = RouteDef::new("faq", loader("Faq.js")).name("AreaFaq");
        let area = RouteDef::new(":area", loader("Area.js")).name("Area").child(faq);
        let practice = RouteDef::new("/practice", loader("Practice.js"))
            .name("Practice")
            .child(area);
        let table = RouteTable::new(vec![practice]).unwrap();

        let target = table.resolve(&Location::path("/practice/family/faq")).unwrap().unwrap();
        let paths: Vec<&str> = target.matched.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/practice", "/practice/:area", "/practice/:area/faq"]);
        assert_eq!(target.name.as_deref(), Some("AreaFaq"));
    }

    #[test]
    fn test_static_paths() {
        let table = site();
        assert_eq!(
            table.static_paths(),
            vec!["/", "/services", "/insights/featured", "/not-found"]
        );
    }

    #[test]
    fn test_invalid_definition() {
        let err = RouteTable::new(vec![RouteDef::new("services", ComponentRef::None)]).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidPath(_)));
    }
}
