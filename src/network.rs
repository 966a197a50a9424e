//! Network access
//!
//! `Fetcher` is the seam between the strategies and the outside world. A
//! fetch either yields a response (whatever its status) or fails at the
//! transport level; only the latter is an `Err`.

use crate::error::{Result, WorkerError};
use crate::http::{Request, Response};
use async_trait::async_trait;
use tracing::debug;

/// Performs a network fetch for a request
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// `Fetcher` backed by a reqwest client
///
/// No timeout is set: a hung request blocks its own response indefinitely.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| WorkerError::Other(format!("unsupported method {}: {}", request.method, e)))?;

        debug!("Fetching {}", request);
        let resp = self
            .client
            .request(method, request.url.clone())
            .send()
            .await?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp.bytes().await?.to_vec();

        debug!("Fetched {} -> {}", request, status);
        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
