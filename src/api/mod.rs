//! Client abstraction for the remote status API.
//!
//! The engine talks to the server only through the [`StatusApi`] trait, so
//! pollers and commands can be driven by the HTTP client in production and by
//! an in-memory fake in tests.

mod http;
mod model;

pub use http::{HttpStatusApi, HttpStatusApiBuilder, DEFAULT_API_URL};
pub use model::{CheckStatus, HealthCheckRecord, NewService, Service, ServiceId};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::ApiError;

/// Operations the dashboard consumes from the status server.
///
/// # Example
///
/// ```no_run
/// use sla_watch::api::{HttpStatusApi, StatusApi};
///
/// # tokio_test::block_on(async {
/// let api = HttpStatusApi::builder()
///     .endpoint("http://localhost:8000/api/v1")
///     .build()
///     .unwrap();
/// let services = api.list_services().await.unwrap();
/// println!("tracking {} services", services.len());
/// # });
/// ```
#[async_trait]
pub trait StatusApi: Send + Sync + Debug {
    /// `GET /services`
    async fn list_services(&self) -> Result<Vec<Service>, ApiError>;

    /// `POST /services`
    async fn create_service(&self, new: &NewService) -> Result<Service, ApiError>;

    /// `DELETE /services/{id}`
    async fn delete_service(&self, id: ServiceId) -> Result<(), ApiError>;

    /// `GET /services/{id}/history?limit={limit}`, newest record first.
    async fn history(&self, id: ServiceId, limit: usize)
        -> Result<Vec<HealthCheckRecord>, ApiError>;

    /// Returns a human-readable description of the endpoint.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
