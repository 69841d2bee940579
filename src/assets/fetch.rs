//! Chunk fetching over HTTP or from disk.
//!
//! # Responsibilities
//! - Decide whether the asset base is a URL or a directory
//! - Fetch a named chunk with a timeout
//! - Map transport, status and IO failures to `LoadError`

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::timeout;
use url::Url;

use crate::config::AssetConfig;
use crate::observability::metrics;
use crate::prefetch::loader::{LoadError, ViewModule};

/// Where chunks live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkSource {
    Http(Url),
    Dir(PathBuf),
}

impl ChunkSource {
    /// `http://` and `https://` bases are URLs; anything else is a directory.
    pub fn parse(base: &str) -> Self {
        if base.starts_with("http://") || base.starts_with("https://") {
            // Without a trailing slash `join` would replace the last segment.
            let normalized = if base.ends_with('/') {
                base.to_string()
            } else {
                format!("{}/", base)
            };
            if let Ok(url) = Url::parse(&normalized) {
                return ChunkSource::Http(url);
            }
            tracing::warn!(
                base = %base,
                "Asset base looks like a URL but does not parse, treating as a path"
            );
        }
        ChunkSource::Dir(PathBuf::from(base))
    }
}

/// Fetches chunks from the configured source.
#[derive(Debug, Clone)]
pub struct ChunkFetcher {
    source: ChunkSource,
    client: reqwest::Client,
    timeout: Duration,
}

impl ChunkFetcher {
    pub fn new(config: &AssetConfig) -> Self {
        Self::with_source(
            ChunkSource::parse(&config.base),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_source(source: ChunkSource, timeout: Duration) -> Self {
        Self {
            source,
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn source(&self) -> &ChunkSource {
        &self.source
    }

    /// Fetch a chunk and return it as a view module.
    pub async fn fetch(&self, chunk: &str) -> Result<ViewModule, LoadError> {
        let fut = async {
            match &self.source {
                ChunkSource::Http(base) => self.fetch_http(base, chunk).await,
                ChunkSource::Dir(dir) => self.fetch_file(dir, chunk).await,
            }
        };

        let size = match timeout(self.timeout, fut).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(LoadError::Timeout {
                    chunk: chunk.to_string(),
                    secs: self.timeout.as_secs(),
                })
            }
        };

        metrics::record_chunk_bytes(size);
        tracing::trace!(chunk = %chunk, bytes = size, "Chunk fetched");
        Ok(ViewModule::new(chunk, size))
    }

    async fn fetch_http(&self, base: &Url, chunk: &str) -> Result<usize, LoadError> {
        let transport = |message: String| LoadError::Transport {
            chunk: chunk.to_string(),
            message,
        };

        let url = base.join(chunk).map_err(|e| transport(e.to_string()))?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Http {
                chunk: chunk.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| transport(e.to_string()))?;
        Ok(body.len())
    }

    async fn fetch_file(&self, dir: &Path, chunk: &str) -> Result<usize, LoadError> {
        let data = tokio::fs::read(dir.join(chunk))
            .await
            .map_err(|e| LoadError::Io {
                chunk: chunk.to_string(),
                message: e.to_string(),
            })?;
        Ok(data.len())
    }
}
