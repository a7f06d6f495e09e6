//! Add and delete commands against the status API.

use std::sync::Arc;

use url::Url;

use crate::api::{NewService, Service, ServiceId, StatusApi};
use crate::error::{ApiError, CommandError, ValidationError};

/// Returns true if `candidate` parses as an absolute `http` or `https` URL.
pub fn is_http_url(candidate: &str) -> bool {
    Url::parse(candidate)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// Validate add-service input. Both fields are trimmed first.
///
/// Nothing is sent to the server when this fails.
pub fn validate(name: &str, url: &str) -> Result<NewService, ValidationError> {
    let name = name.trim();
    let url = url.trim();

    if name.is_empty() {
        return Err(ValidationError::NameRequired);
    }
    if !is_http_url(url) {
        return Err(ValidationError::InvalidUrl);
    }

    Ok(NewService {
        name: name.to_string(),
        url: url.to_string(),
    })
}

/// Issues mutating requests. Results are returned, never stored here.
#[derive(Debug, Clone)]
pub struct CommandGateway {
    api: Arc<dyn StatusApi>,
}

impl CommandGateway {
    pub fn new(api: Arc<dyn StatusApi>) -> Self {
        Self { api }
    }

    /// Validate and submit a new service. This is the only path by which a
    /// service is created.
    pub async fn add_service(&self, name: &str, url: &str) -> Result<Service, CommandError> {
        let new = validate(name, url)?;
        Ok(self.create(&new).await?)
    }

    async fn create(&self, new: &NewService) -> Result<Service, ApiError> {
        match self.api.create_service(new).await {
            Ok(service) => {
                tracing::info!(service_id = %service.id, name = %service.name, "Service added");
                Ok(service)
            }
            Err(e) => {
                tracing::warn!(name = %new.name, error = %e, "Add service failed");
                Err(e)
            }
        }
    }

    pub async fn delete_service(&self, id: ServiceId) -> Result<(), ApiError> {
        match self.api.delete_service(id).await {
            Ok(()) => {
                tracing::info!(service_id = %id, "Service deleted");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(service_id = %id, error = %e, "Delete service failed");
                Err(e)
            }
        }
    }
}
