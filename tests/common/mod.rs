//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use route_prefetch::routing::{Location, ResolveError, RouteTable, RouteTarget, Router};
use route_prefetch::{ComponentLoader, LoadError, ViewModule};

/// A loader that counts its invocations.
pub fn counting_loader(name: &'static str, calls: Arc<AtomicUsize>) -> ComponentLoader {
    ComponentLoader::new(name, move || {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(ViewModule::new(name, 128))
        }
    })
}

/// A loader that counts its invocations and always fails.
pub fn failing_loader(name: &'static str, calls: Arc<AtomicUsize>) -> ComponentLoader {
    ComponentLoader::new(name, move || {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(LoadError::Http {
                chunk: name.to_string(),
                status: 503,
            })
        }
    })
}

/// A loader that counts its invocations and settles after `delay`.
pub fn slow_loader(
    name: &'static str,
    calls: Arc<AtomicUsize>,
    delay: Duration,
    succeed: bool,
) -> ComponentLoader {
    ComponentLoader::new(name, move || {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            if succeed {
                Ok(ViewModule::new(name, 256))
            } else {
                Err(LoadError::Timeout {
                    chunk: name.to_string(),
                    secs: 0,
                })
            }
        }
    })
}

/// Router wrapper that counts `resolve` calls and fails for one path.
pub struct CountingRouter {
    inner: RouteTable,
    pub calls: AtomicUsize,
    fail_on: Option<String>,
}

impl CountingRouter {
    pub fn new(inner: RouteTable) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            fail_on: None,
        }
    }

    pub fn failing_on(mut self, path: &str) -> Self {
        self.fail_on = Some(path.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Router for CountingRouter {
    fn resolve(&self, location: &Location) -> Result<Option<RouteTarget>, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let (Some(fail), Location::Path(path)) = (&self.fail_on, location) {
            if fail == path {
                return Err(ResolveError::InvalidPath(path.clone()));
            }
        }
        self.inner.resolve(location)
    }
}

/// Start a chunk server answering every request with `status` and `body`.
/// Returns a counter of accepted requests.
pub async fn start_chunk_server(
    addr: SocketAddr,
    status: u16,
    body: &'static str,
) -> Arc<AtomicUsize> {
    let listener = TcpListener::bind(addr).await.unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;

                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            503 => "503 Service Unavailable",
                            _ => "500 Internal Server Error",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    hits
}
