//! Reqwest-based transport for the platform gateway

use crate::client::{ApiClient, ApiRequest, ApiResponse, HttpMethod};
use crate::core::{ClientConfig, Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client that sends JSON requests with bearer authentication
#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ReqwestApiClient {
    /// Create a new client from configuration
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("dataloop-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            "Created API client for {} (timeout {}s, pool {})",
            config.base_url, config.timeout_secs, config.pool_size
        );

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ApiClient for ReqwestApiClient {
    async fn gen_request(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url(&request.path);
        debug!("{:?} {}", request.method, url);

        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
            HttpMethod::Put => self.http.put(&url),
            HttpMethod::Patch => self.http.patch(&url),
            HttpMethod::Delete => self.http.delete(&url),
        };

        if let Some(token) = &self.config.token {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.json_body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Transport(format!("Request to {} timed out", url))
            } else {
                Error::Transport(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("Failed to read response body: {}", e)))?;

        if !(200..300).contains(&status) {
            warn!("{:?} {} returned {}", request.method, url, status);
        }

        Ok(ApiResponse::new(status, body.to_vec()))
    }

    fn pool_size(&self) -> usize {
        self.config.pool_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ReqwestApiClient::new(
            ClientConfig::new().with_base_url("http://localhost:8080/api/v1/"),
        )
        .unwrap();
        assert_eq!(client.url("/pipelines/p1"), "http://localhost:8080/api/v1/pipelines/p1");
        assert_eq!(client.url("items"), "http://localhost:8080/api/v1/items");
    }

    #[test]
    fn test_pool_size_from_config() {
        let client = ReqwestApiClient::new(ClientConfig::new().with_pool_size(3)).unwrap();
        assert_eq!(client.pool_size(), 3);
    }

    #[tokio::test]
    #[ignore] // Requires network access to the gateway
    async fn test_unauthenticated_request_is_rejected() {
        let client = ReqwestApiClient::new(ClientConfig::default()).unwrap();
        let response = client.gen_request(ApiRequest::get("/projects")).await.unwrap();
        assert!(!response.ok());
    }
}
