//! Rotating egress proxy pool
//!
//! The proxy list is sourced once per process: read from the local cache
//! file when present, otherwise fetched from the upstream listing service
//! and written to the cache before first use. It is never re-validated.

use rand::seq::SliceRandom;
use reqwest::Client;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::OnceCell;

/// Errors raised while sourcing the proxy list
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("proxy list request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("proxy list service returned HTTP {0}")]
    Status(u16),

    #[error("proxy cache {path}: {source}")]
    Cache {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("proxy list is empty")]
    Empty,
}

/// Lazily-initialized pool of `host:port` proxy addresses
#[derive(Debug)]
pub struct ProxyPool {
    list_url: String,
    cache_path: PathBuf,
    proxies: OnceCell<Vec<String>>,
}

impl ProxyPool {
    pub fn new(list_url: impl Into<String>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            list_url: list_url.into(),
            cache_path: cache_path.into(),
            proxies: OnceCell::new(),
        }
    }

    /// Picks one proxy uniformly at random
    ///
    /// The first call initializes the list; later calls only read it. A failed
    /// initialization is not cached, so the next request tries again.
    pub async fn choose(&self, client: &Client) -> Result<String, ProxyError> {
        let proxies = self
            .proxies
            .get_or_try_init(|| self.load(client))
            .await?;

        proxies
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(ProxyError::Empty)
    }

    /// Number of proxies currently loaded (0 before first use)
    pub fn len(&self) -> usize {
        self.proxies.get().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn load(&self, client: &Client) -> Result<Vec<String>, ProxyError> {
        let content = if self.cache_path.exists() {
            tracing::debug!("Reading proxy list from {}", self.cache_path.display());
            tokio::fs::read_to_string(&self.cache_path)
                .await
                .map_err(|source| self.cache_error(source))?
        } else {
            let content = self.download(client).await?;
            write_cache(&self.cache_path, &content)
                .await
                .map_err(|source| self.cache_error(source))?;
            tracing::info!("Cached proxy list at {}", self.cache_path.display());
            content
        };

        let proxies = parse_proxy_list(&content);
        tracing::info!("Loaded {} proxies", proxies.len());
        Ok(proxies)
    }

    async fn download(&self, client: &Client) -> Result<String, ProxyError> {
        tracing::info!("Fetching proxy list from {}", self.list_url);
        let response = client.get(&self.list_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        Ok(body.replace("\r\n", "\n"))
    }

    fn cache_error(&self, source: std::io::Error) -> ProxyError {
        ProxyError::Cache {
            path: self.cache_path.clone(),
            source,
        }
    }
}

async fn write_cache(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await
}

/// Splits a newline-delimited proxy list, dropping blank entries
pub fn parse_proxy_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
