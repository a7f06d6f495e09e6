//! HTTP implementation of [`StatusApi`] on top of reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{HealthCheckRecord, NewService, Service, ServiceId, StatusApi};
use crate::error::ApiError;

/// Base URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Status API client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStatusApi {
    client: Client,
    endpoint: String,
    description: String,
}

impl HttpStatusApi {
    /// Create a new builder for configuring the client.
    pub fn builder() -> HttpStatusApiBuilder {
        HttpStatusApiBuilder::default()
    }

    /// Returns the base URL requests are made against.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Send the request and turn any non-2xx status into an error.
    async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response)
    }

    /// Send the request and decode a JSON body. `204 No Content` yields `None`.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let response = self.execute(request).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = response.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(Some(body))
    }
}

#[async_trait]
impl StatusApi for HttpStatusApi {
    async fn list_services(&self) -> Result<Vec<Service>, ApiError> {
        let request = self.client.get(self.url("/services"));
        Ok(self.fetch_json(request).await?.unwrap_or_default())
    }

    async fn create_service(&self, new: &NewService) -> Result<Service, ApiError> {
        let request = self.client.post(self.url("/services")).json(new);
        self.fetch_json(request)
            .await?
            .ok_or_else(|| ApiError::Decode("empty response to create".to_string()))
    }

    async fn delete_service(&self, id: ServiceId) -> Result<(), ApiError> {
        let request = self.client.delete(self.url(&format!("/services/{}", id)));
        self.execute(request).await?;
        Ok(())
    }

    async fn history(
        &self,
        id: ServiceId,
        limit: usize,
    ) -> Result<Vec<HealthCheckRecord>, ApiError> {
        debug!(service_id = %id, limit, "fetching history");
        let request = self
            .client
            .get(self.url(&format!("/services/{}/history?limit={}", id, limit)));
        Ok(self.fetch_json(request).await?.unwrap_or_default())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpStatusApi`].
#[derive(Debug, Default)]
pub struct HttpStatusApiBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpStatusApiBuilder {
    /// Set the API base URL (e.g., "http://localhost:8000/api/v1").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpStatusApi, ApiError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent(format!("sla-watch/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let description = format!("api: {}", endpoint);

        Ok(HttpStatusApi {
            client,
            endpoint,
            description,
        })
    }
}
