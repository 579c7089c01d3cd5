//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent
//! - Routing each request through a randomly chosen egress proxy
//! - Classifying responses into success, HTTP errors and transport errors
//!
//! The fetcher never retries and never returns an error: every failure is
//! folded into [`FetchOutcome::Failure`] so the orchestrator keeps batching.

use crate::config::{Config, ProxyConfig};
use crate::crawler::proxy::ProxyPool;
use crate::CrawlError;
use reqwest::header::REFERER;
use reqwest::{Client, Proxy};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Classification of a failed network attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// DNS, connection, proxy or body-read failure
    TransportError,
    /// Non-2xx response
    HttpError,
    /// The client timeout elapsed
    Timeout,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransportError => "transport_error",
            Self::HttpError => "http_error",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one network attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 2xx response with its body
    Success { status_code: u16, body: String },

    /// Any failure; `status_code` is set for HTTP errors only
    Failure {
        kind: FailureKind,
        status_code: Option<u16>,
        detail: String,
    },
}

impl FetchOutcome {
    fn transport(detail: impl Into<String>) -> Self {
        Self::Failure {
            kind: FailureKind::TransportError,
            status_code: None,
            detail: detail.into(),
        }
    }

    fn from_reqwest(error: &reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            FailureKind::Timeout
        } else {
            FailureKind::TransportError
        };
        Self::Failure {
            kind,
            status_code: None,
            detail: error.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the body of a successful fetch, or the failure as an error
    pub fn into_body(self, url: &str) -> Result<String, CrawlError> {
        match self {
            Self::Success { body, .. } => Ok(body),
            Self::Failure {
                kind,
                status_code,
                detail,
            } => Err(CrawlError::Fetch {
                url: url.to_string(),
                kind,
                status_code,
                detail,
            }),
        }
    }
}

/// Builds an HTTP client with the crawler's user agent
///
/// When `proxy` is given, plain-HTTP traffic is routed through it.
///
/// # Arguments
///
/// * `user_agent` - Value of the User-Agent header
/// * `timeout` - Total request timeout
/// * `proxy` - Optional `host:port` (or full URL) of the egress proxy
pub fn build_http_client(
    user_agent: &str,
    timeout: Duration,
    proxy: Option<&str>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(address) = proxy {
        let proxy_url = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{}", address)
        };
        builder = builder.proxy(Proxy::http(proxy_url)?);
    }

    builder.build()
}

/// Fetches pages through a rotating proxy pool
pub struct ProxyFetcher {
    user_agent: String,
    timeout: Duration,
    direct: Client,
    pool: Option<ProxyPool>,
    proxied: Mutex<HashMap<String, Client>>,
}

impl ProxyFetcher {
    /// Creates a fetcher from the proxy section of the configuration
    pub fn new(config: &ProxyConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        let pool = config
            .enabled
            .then(|| ProxyPool::new(config.list_url.clone(), config.cache_path.clone()));

        Ok(Self {
            direct: build_http_client(&config.user_agent, timeout, None)?,
            user_agent: config.user_agent.clone(),
            timeout,
            pool,
            proxied: Mutex::new(HashMap::new()),
        })
    }

    /// Creates a fetcher from the full configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            &config.proxy,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )
    }

    /// Issues a single GET for `url`
    ///
    /// `referer` is sent as the Referer header; the attribute endpoint only
    /// answers requests that look like they come from the document page.
    pub async fn fetch(&self, url: &str, referer: Option<&str>) -> FetchOutcome {
        let client = match self.client_for_request().await {
            Ok(client) => client,
            Err(outcome) => return outcome,
        };

        let mut request = client.get(url);
        if let Some(referer) = referer {
            request = request.header(REFERER, referer);
        }

        tracing::debug!("GET {}", url);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Request to {} failed: {}", url, e);
                return FetchOutcome::from_reqwest(&e);
            }
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Failure {
                kind: FailureKind::HttpError,
                status_code: Some(status.as_u16()),
                detail: format!("HTTP {}", status),
            };
        }

        match response.text().await {
            Ok(body) => FetchOutcome::Success {
                status_code: status.as_u16(),
                body,
            },
            Err(e) => FetchOutcome::from_reqwest(&e),
        }
    }

    /// Picks the client for the next request: a proxied one when the pool
    /// is enabled, the direct one otherwise
    async fn client_for_request(&self) -> Result<Client, FetchOutcome> {
        let Some(pool) = &self.pool else {
            return Ok(self.direct.clone());
        };

        let address = pool
            .choose(&self.direct)
            .await
            .map_err(|e| FetchOutcome::transport(format!("no usable proxy: {}", e)))?;

        let mut clients = self.proxied.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(&address) {
            return Ok(client.clone());
        }

        let client = build_http_client(&self.user_agent, self.timeout, Some(&address))
            .map_err(|e| FetchOutcome::transport(format!("invalid proxy '{}': {}", address, e)))?;
        clients.insert(address, client.clone());
        Ok(client)
    }
}
