//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the site's
//! prefetcher. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site-wide page settings.
    pub site: SiteMetaConfig,

    /// Where view-module chunks are fetched from.
    pub assets: AssetConfig,

    /// Prefetch behaviour.
    pub prefetch: PrefetchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route table.
    pub routes: Vec<RouteConfig>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site: SiteMetaConfig::default(),
            assets: AssetConfig::default(),
            prefetch: PrefetchConfig::default(),
            observability: ObservabilityConfig::default(),
            routes: default_routes(),
        }
    }
}

/// Site-wide page settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteMetaConfig {
    /// Title used when a route has none.
    pub default_title: String,
}

impl Default for SiteMetaConfig {
    fn default() -> Self {
        Self {
            default_title: "Legal Crest - Legal Marketing Studio".to_string(),
        }
    }
}

/// Chunk source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Base URL (http/https) or directory holding the built chunks.
    pub base: String,

    /// Per-chunk fetch timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base: "dist/assets".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Prefetch behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// Enable prefetching. When false the prefetcher is left unbound.
    pub enabled: bool,

    /// Locations warmed when none are given explicitly.
    pub warm: Vec<String>,

    /// Also warm every parameterless route.
    pub include_static: bool,

    /// Extra concrete paths for dynamic routes (e.g. service detail pages).
    pub extra_paths: Vec<String>,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warm: Vec::new(),
            include_static: true,
            extra_paths: Vec::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// One route definition.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Pattern, e.g. `/services/:slug`. Children may be relative.
    pub path: String,

    /// Route name for named navigation.
    #[serde(default)]
    pub name: Option<String>,

    /// Lazily loaded chunk backing the page.
    #[serde(default)]
    pub chunk: Option<String>,

    /// Resolve the chunk loader through a lazy accessor.
    #[serde(default)]
    pub lazy: bool,

    /// Eagerly bundled component; nothing to prefetch.
    #[serde(default)]
    pub component: Option<String>,

    /// Redirect target path.
    #[serde(default)]
    pub redirect: Option<String>,

    /// Page title.
    #[serde(default)]
    pub title: Option<String>,

    /// Hide the main navigation.
    #[serde(default)]
    pub hide_nav: bool,

    /// Nested routes.
    #[serde(default)]
    pub children: Vec<RouteConfig>,
}

impl RouteConfig {
    fn page(path: &str, name: &str, chunk: &str, title: &str) -> Self {
        Self {
            path: path.to_string(),
            name: Some(name.to_string()),
            chunk: Some(chunk.to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }
}

/// The marketing site's route table.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig {
            path: "/".to_string(),
            name: Some("Home".to_string()),
            component: Some("Home".to_string()),
            title: Some("Legal Crest - Legal Marketing Studio".to_string()),
            ..Default::default()
        },
        RouteConfig::page("/services", "Services", "Services.js", "Legal Crest - Services"),
        RouteConfig::page(
            "/services/:slug",
            "ServiceDetail",
            "ServiceDetail.js",
            "Legal Crest - Service Details",
        ),
        RouteConfig::page("/process", "Process", "Process.js", "Legal Crest - Process"),
        RouteConfig::page(
            "/case-results",
            "CaseResults",
            "CaseResults.js",
            "Legal Crest - Case Results",
        ),
        RouteConfig::page("/insights", "Insights", "Insights.js", "Legal Crest - Insights"),
        RouteConfig::page(
            "/insights/:slug",
            "ArticleDetail",
            "ArticleDetail.js",
            "Legal Crest - Article",
        ),
        RouteConfig::page("/contact", "Contact", "Contact.js", "Legal Crest - Contact"),
        RouteConfig::page(
            "/book-consultation",
            "BookConsultation",
            "BookConsultation.js",
            "Legal Crest - Book Consultation",
        ),
        RouteConfig {
            hide_nav: true,
            ..RouteConfig::page(
                "/not-found",
                "NotFound",
                "NotFound.js",
                "Legal Crest - Page Not Found",
            )
        },
        RouteConfig {
            path: "/:pathMatch(.*)*".to_string(),
            redirect: Some("/not-found".to_string()),
            ..Default::default()
        },
    ]
}
