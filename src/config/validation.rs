//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route patterns parse and route names are unique
//! - Check redirects point at a path some route serves
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{RouteConfig, SiteConfig};
use crate::routing::matcher::PathPattern;
use crate::routing::router::join_pattern;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route '{path}': {reason}")]
    InvalidRoute { path: String, reason: String },

    #[error("duplicate route name '{0}'")]
    DuplicateName(String),

    #[error("route '{path}' redirects to '{target}', which no route serves")]
    UnknownRedirect { path: String, target: String },

    #[error("assets.base must not be empty")]
    EmptyAssetBase,

    #[error("assets.timeout_secs must be greater than 0")]
    ZeroTimeout,

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("prefetch path '{0}' must start with '/'")]
    RelativePrefetchPath(String),
}

struct FlatRoute<'a> {
    full_path: String,
    pattern: Option<PathPattern>,
    config: &'a RouteConfig,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut flat = Vec::new();
    for route in &config.routes {
        flatten(route, "", &mut flat);
    }

    let mut names = HashSet::new();
    for route in &flat {
        check_route(route, &mut errors);
        if let Some(name) = &route.config.name {
            if !names.insert(name.as_str()) {
                errors.push(ValidationError::DuplicateName(name.clone()));
            }
        }
    }

    for route in &flat {
        let Some(target) = &route.config.redirect else {
            continue;
        };
        let served = flat.iter().any(|other| {
            other.config.redirect.is_none()
                && other.pattern.as_ref().is_some_and(|p| p.matches(target).is_some())
        });
        if !served {
            errors.push(ValidationError::UnknownRedirect {
                path: route.full_path.clone(),
                target: target.clone(),
            });
        }
    }

    if config.assets.base.trim().is_empty() {
        errors.push(ValidationError::EmptyAssetBase);
    }
    if config.assets.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for path in config.prefetch.warm.iter().chain(&config.prefetch.extra_paths) {
        if !path.starts_with('/') {
            errors.push(ValidationError::RelativePrefetchPath(path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn flatten<'a>(route: &'a RouteConfig, parent: &str, out: &mut Vec<FlatRoute<'a>>) {
    let full_path = join_pattern(parent, &route.path);
    out.push(FlatRoute {
        pattern: PathPattern::parse(&full_path).ok(),
        full_path: full_path.clone(),
        config: route,
    });
    for child in &route.children {
        flatten(child, &full_path, out);
    }
}

fn check_route(route: &FlatRoute<'_>, errors: &mut Vec<ValidationError>) {
    let mut invalid = |reason: &str| {
        errors.push(ValidationError::InvalidRoute {
            path: route.full_path.clone(),
            reason: reason.to_string(),
        })
    };

    if let Err(e) = PathPattern::parse(&route.full_path) {
        invalid(&e.to_string());
    }

    let config = route.config;
    let targets = [
        config.chunk.is_some(),
        config.component.is_some(),
        config.redirect.is_some(),
    ]
    .iter()
    .filter(|set| **set)
    .count();

    if targets > 1 {
        invalid("only one of chunk, component or redirect may be set");
    }
    if targets == 0 && config.children.is_empty() {
        invalid("needs a chunk, component, redirect or children");
    }
    if config.lazy && config.chunk.is_none() {
        invalid("lazy routes need a chunk");
    }
    if config.chunk.as_deref().is_some_and(|c| c.trim().is_empty()) {
        invalid("chunk name is empty");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SiteConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = SiteConfig::default();
        config.assets.timeout_secs = 0;
        config.prefetch.warm.push("services".to_string());
        config.routes.push(RouteConfig {
            path: "/extra".to_string(),
            name: Some("Contact".to_string()),
            chunk: Some("Extra.js".to_string()),
            component: Some("Extra".to_string()),
            ..Default::default()
        });

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert!(errors.contains(&ValidationError::DuplicateName("Contact".to_string())));
        assert!(errors.contains(&ValidationError::RelativePrefetchPath("services".to_string())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidRoute { path, .. } if path == "/extra")));
    }

    #[test]
    fn test_unknown_redirect() {
        let mut config = SiteConfig::default();
        config.routes = vec![RouteConfig {
            path: "/old".to_string(),
            redirect: Some("/new".to_string()),
            ..Default::default()
        }];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnknownRedirect {
                path: "/old".to_string(),
                target: "/new".to_string()
            }]
        );
    }

    #[test]
    fn test_bad_pattern_and_lazy_without_chunk() {
        let mut config = SiteConfig::default();
        config.routes = vec![
            RouteConfig {
                path: "relative".to_string(),
                component: Some("X".to_string()),
                ..Default::default()
            },
            RouteConfig {
                path: "/lazy".to_string(),
                lazy: true,
                component: Some("Y".to_string()),
                ..Default::default()
            },
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = SiteConfig::default();
        config.observability.metrics_address = "not-an-address".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::MetricsAddress("not-an-address".to_string())]);
    }
}
