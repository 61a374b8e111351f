//! Executes core `HttpRequest`s over the network.

use anyhow::{Context, Result};
use reqwest::Method;
use todo_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};
use tracing::debug;

/// Async HTTP executor. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("HTTP client build failed")?;
        Ok(Self { client })
    }

    /// Run one request. Non-2xx statuses come back as data; only transport
    /// problems are errors.
    pub async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match req.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        };
        debug!(%method, path = %req.path, "HTTP out");

        let mut builder = self.client.request(method, &req.path);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        debug!(status, "HTTP in");

        Ok(HttpResponse { status, headers, body })
    }
}
