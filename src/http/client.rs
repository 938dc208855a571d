//! HTTP client wrapper with redirect policy and request counting

use crate::error::{HeaderSecError, Result};
use crate::models::TransportConfig;
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::{Client, Method, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!("headersec/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client. Cloning is cheap and shares the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_count: Arc<AtomicU64>,
}

/// Follows up to `max_redirects` hops, then hands back the last redirect response
fn redirect_policy(config: &TransportConfig) -> Policy {
    if !config.follow_redirects {
        return Policy::none();
    }
    let max = config.max_redirects;
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= max {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

impl HttpClient {
    /// Creates a new HttpClient from transport configuration
    pub fn from_config(config: &TransportConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .tcp_keepalive(Duration::from_secs(30))
            .user_agent(DEFAULT_USER_AGENT)
            .redirect(redirect_policy(config))
            .danger_accept_invalid_certs(config.insecure);

        // zero means no limit on either phase
        if config.timeout_secs > 0 {
            let timeout = Duration::from_secs(config.timeout_secs);
            builder = builder.timeout(timeout).connect_timeout(timeout);
        }

        builder = match config.proxy {
            Some(ref proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url)
                    .map_err(|e| HeaderSecError::ConfigError(format!("Invalid proxy URL: {e}")))?;
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        let client = builder.build()?;

        Ok(Self {
            client,
            request_count: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Sends a single request with the given method and headers, no retries
    pub async fn send(
        &self,
        method: Method,
        url: &Url,
        headers: HeaderMap,
    ) -> std::result::Result<Response, reqwest::Error> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        let response = self
            .client
            .request(method.clone(), url.clone())
            .headers(headers)
            .send()
            .await?;
        debug!(
            "{method} {url} -> {} ({} headers)",
            response.status(),
            response.headers().len()
        );
        Ok(response)
    }

    /// Returns the total number of requests made
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }
}
