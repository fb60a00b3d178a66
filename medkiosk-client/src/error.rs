//! Client error types.

use thiserror::Error;

/// Broad classes of data-service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service answered, but not with the record asked for.
    Lookup,
    /// The service could not be reached or failed internally.
    Transport,
}

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("service error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ClientError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        ClientError::NotFound {
            resource: resource.into(),
        }
    }

    /// Classifies the failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Transport(_) => FailureKind::Transport,
            ClientError::Status { status, .. } if *status >= 500 => FailureKind::Transport,
            ClientError::Status { .. } => FailureKind::Lookup,
            ClientError::NotFound { .. } => FailureKind::Lookup,
            ClientError::Malformed(_) => FailureKind::Lookup,
        }
    }
}
