//! Error types for the status API client and dashboard commands.

use thiserror::Error;

/// Errors returned by the status API.
///
/// `Display` for [`ApiError::Status`] renders as `"<status> <reason>"`, which
/// is the text shown to the user in the global banner and the add form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{status} {reason}")]
    Status { status: u16, reason: String },

    /// The request never produced a response (connect, timeout, DNS, ...).
    #[error("Connection failed: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Numeric HTTP status, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            }
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Client-side rejection of an add-service request, raised before any
/// network call is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Enter a valid URL starting with http:// or https://")]
    InvalidUrl,
}

/// Failure of an add-service command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Network(#[from] ApiError),
}
