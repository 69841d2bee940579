//! Route prefetch CLI.
//!
//! ```text
//! route-prefetch [--config site.toml] routes
//! route-prefetch [--config site.toml] resolve /insights/some-article
//! route-prefetch [--config site.toml] resolve --name ServiceDetail --param slug=probate
//! route-prefetch [--config site.toml] warm [LOCATION...]
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use route_prefetch::config::{load_config, SiteConfig};
use route_prefetch::observability::{logging, metrics};
use route_prefetch::routing::{Location, RouteTarget, Router};
use route_prefetch::Site;

#[derive(Parser)]
#[command(name = "route-prefetch")]
#[command(about = "Resolve and prefetch the site's lazily loaded routes", long_about = None)]
struct Cli {
    /// Site configuration (TOML). Built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the route table and the pre-render path list
    Routes,
    /// Resolve a location and print the target as JSON
    Resolve {
        /// Path to resolve (ignored when --name is given)
        location: Option<String>,
        /// Resolve a named route instead of a path
        #[arg(long)]
        name: Option<String>,
        /// Route param as key=value (repeatable)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// Prefetch locations (or the configured warm list)
    Warm {
        locations: Vec<String>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SiteConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("route-prefetch v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let site = Site::start(config)?;

    match cli.command {
        Commands::Routes => print_routes(&site),
        Commands::Resolve {
            location,
            name,
            params,
        } => {
            let location = match (name, location) {
                (Some(name), _) => params
                    .into_iter()
                    .fold(Location::named(name), |loc, (k, v)| loc.param(k, v)),
                (None, Some(path)) => Location::path(path),
                (None, None) => return Err("resolve needs a location or --name".into()),
            };
            match site.table.resolve(&location)? {
                Some(target) => {
                    let json = target_json(&site, &target);
                    println!("{}", serde_json::to_string_pretty(&json)?);
                }
                None => println!("null"),
            }
        }
        Commands::Warm { locations } => warm(&site, locations).await?,
    }

    Ok(())
}

fn print_routes(site: &Site) {
    for record in site.table.records() {
        println!(
            "{:<24} {:<18} {}",
            record.path,
            record.name.as_deref().unwrap_or("-"),
            record
                .redirect
                .as_deref()
                .map(|to| format!("redirect -> {}", to))
                .unwrap_or_else(|| record.component.kind().to_string()),
        );
    }
    println!();
    println!("pre-render paths:");
    for path in site.table.static_paths() {
        println!("  {}", path);
    }
}

fn target_json(site: &Site, target: &RouteTarget) -> Value {
    json!({
        "full_path": target.full_path,
        "path": target.path,
        "query": target.query,
        "hash": target.hash,
        "name": target.name,
        "params": target.params,
        "title": target.title(&site.config.site.default_title),
        "hide_nav": target.hide_nav(),
        "matched": target.matched.iter().map(|r| json!({
            "path": r.path,
            "name": r.name,
            "component": r.component.kind(),
            "redirect": r.redirect,
        })).collect::<Vec<_>>(),
    })
}

async fn warm(site: &Site, requested: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let locations: Vec<Location> = if requested.is_empty() {
        site.warm_locations()
    } else {
        requested.into_iter().map(Location::Path).collect()
    };

    if !site.prefetcher.has_router() {
        tracing::warn!("Prefetching is disabled in the configuration");
    }

    tracing::info!(locations = locations.len(), "Warming routes");

    tokio::select! {
        _ = site.prefetcher.prefetch_routes(locations.clone()) => {}
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, reporting partial results");
        }
    }

    let mut report = Vec::with_capacity(locations.len());
    for location in &locations {
        let target = site.table.resolve(location).ok().flatten();
        let status = match &target {
            Some(t) if site.prefetcher.is_path_resolved(&t.full_path) => "warmed",
            Some(_) => "pending",
            None => "unresolved",
        };
        report.push(json!({
            "location": location.to_string(),
            "full_path": target.as_ref().map(|t| t.full_path.clone()),
            "status": status,
        }));
    }

    let summary = json!({
        "locations": report,
        "resolved_paths": site.prefetcher.resolved_path_count(),
        "loaded_components": site.prefetcher.loaded_loader_count(),
        "known_chunks": site.registry.len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
