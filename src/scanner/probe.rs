//! Per-target HTTP probing with a single GET fallback

use crate::error::{HeaderSecError, Result};
use crate::http::HttpClient;
use crate::models::ScanRequest;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, Response};
use tracing::debug;

/// Response data kept from a successful probe
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// Requested URL after the port override, used to label output
    pub url: String,
    /// URL of the final response after redirects
    pub effective_url: String,
    pub status: u16,
    pub headers: HeaderMap,
}

impl ProbeResponse {
    /// Keeps status and headers and drops the response, releasing its connection
    fn from_response(url: &str, response: Response) -> Self {
        Self {
            url: url.to_string(),
            effective_url: response.url().to_string(),
            status: response.status().as_u16(),
            headers: response.headers().clone(),
        }
    }
}

/// Fetches the response headers of one target
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, target: &str, request: &ScanRequest) -> Result<ProbeResponse>;
}

/// Probes targets over HTTP using the shared client
pub struct HttpProber {
    client: HttpClient,
}

impl HttpProber {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn request_count(&self) -> u64 {
        self.client.request_count()
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, target: &str, request: &ScanRequest) -> Result<ProbeResponse> {
        let url = request.target_url(target)?;
        let headers = request.request_headers()?;

        let response = self
            .client
            .send(request.method.clone(), &url, headers.clone())
            .await
            .map_err(|source| HeaderSecError::RequestFailed {
                url: url.to_string(),
                source,
            })?;

        if !response.headers().is_empty() {
            return Ok(ProbeResponse::from_response(url.as_str(), response));
        }

        // Some servers only send headers with a body-bearing response
        debug!(
            "{url} returned no headers for {}, retrying with GET",
            request.method
        );
        drop(response);

        let response = self
            .client
            .send(Method::GET, &url, headers)
            .await
            .map_err(|source| HeaderSecError::FallbackFailed {
                url: url.to_string(),
                source,
            })?;

        Ok(ProbeResponse::from_response(url.as_str(), response))
    }
}
