//! Chunk fetching against a local chunk server, end to end through the site.

use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::time::Duration;

use route_prefetch::assets::{ChunkFetcher, ChunkSource};
use route_prefetch::config::parse_config;
use route_prefetch::routing::Location;
use route_prefetch::{LoadError, Site};

mod common;

fn http_fetcher(addr: SocketAddr, timeout: Duration) -> ChunkFetcher {
    let base = format!("http://{}/assets", addr);
    ChunkFetcher::with_source(ChunkSource::parse(&base), timeout)
}

#[tokio::test]
async fn test_fetch_chunk_over_http() {
    let addr: SocketAddr = "127.0.0.1:28381".parse().unwrap();
    let hits = common::start_chunk_server(addr, 200, "export default {name:'Services'}").await;

    let fetcher = http_fetcher(addr, Duration::from_secs(5));
    let module = fetcher.fetch("Services.js").await.unwrap();

    assert_eq!(module.chunk, "Services.js");
    assert_eq!(module.size, 32);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_error_status_is_load_failure() {
    let addr: SocketAddr = "127.0.0.1:28382".parse().unwrap();
    common::start_chunk_server(addr, 503, "unavailable").await;

    let fetcher = http_fetcher(addr, Duration::from_secs(5));
    let err = fetcher.fetch("Process.js").await.unwrap_err();

    assert_eq!(
        err,
        LoadError::Http {
            chunk: "Process.js".to_string(),
            status: 503
        }
    );
}

#[tokio::test]
async fn test_unresponsive_server_times_out() {
    let addr: SocketAddr = "127.0.0.1:28383".parse().unwrap();
    // Accepts connections into the backlog but never answers.
    let _listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    let fetcher = http_fetcher(addr, Duration::from_secs(1));
    let err = fetcher.fetch("Insights.js").await.unwrap_err();

    assert!(matches!(err, LoadError::Timeout { secs: 1, .. }));
}

#[tokio::test]
async fn test_site_warm_over_http() {
    let addr: SocketAddr = "127.0.0.1:28384".parse().unwrap();
    let hits = common::start_chunk_server(addr, 200, "export default {}").await;

    let config = parse_config(&format!(
        r#"
        [assets]
        base = "http://{}/assets/"
        timeout_secs = 5

        [prefetch]
        include_static = false
        warm = ["/services", "/services/probate", "/insights/foo"]
        "#,
        addr
    ))
    .unwrap();

    let site = Site::start(config).unwrap();
    site.prefetcher.prefetch_routes(site.warm_locations()).await;

    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(site.prefetcher.loaded_loader_count(), 3);
    assert_eq!(site.prefetcher.resolved_path_count(), 3);

    // Second pass is answered from the prefetch state, not the server.
    site.prefetcher.prefetch_routes(site.warm_locations()).await;
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_site_warm_with_failing_server() {
    let addr: SocketAddr = "127.0.0.1:28385".parse().unwrap();
    let hits = common::start_chunk_server(addr, 404, "missing").await;

    let config = parse_config(&format!(
        r#"
        [assets]
        base = "http://{}/assets/"
        "#,
        addr
    ))
    .unwrap();

    let site = Site::start(config).unwrap();
    site.prefetcher.prefetch_route(Location::path("/contact")).await;

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(site.prefetcher.loaded_loader_count(), 0);
    assert!(site.prefetcher.is_path_resolved("/contact"));
}

#[tokio::test]
async fn test_lazy_routes_from_config() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("PracticeArea.js"), b"export default {}").unwrap();

    let config = parse_config(&format!(
        r#"
        [assets]
        base = "{}"

        [[routes]]
        path = "/practice"
        component = "PracticeShell"

        [[routes.children]]
        path = ":area"
        name = "PracticeArea"
        chunk = "PracticeArea.js"
        lazy = true
        "#,
        dir.path().display()
    ))
    .unwrap();

    let site = Site::start(config).unwrap();
    // Lazy routes create their loader only when resolved.
    assert_eq!(site.registry.len(), 0);

    site.prefetcher
        .prefetch_route(Location::named("PracticeArea").param("area", "family"))
        .await;

    assert_eq!(site.registry.len(), 1);
    assert_eq!(site.prefetcher.loaded_loader_count(), 1);
    assert!(site.prefetcher.is_path_resolved("/practice/family"));
}
