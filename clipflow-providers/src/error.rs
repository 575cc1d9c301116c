//! Provider error types.

use clipflow_core::BufferError;
use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown translation provider: {0}")]
    UnknownProvider(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("translation request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed translation response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Returns true if the service answered but refused the request.
    pub fn is_rejected(&self) -> bool {
        matches!(self, ProviderError::Status { status, .. } if (400..500).contains(status))
    }
}

impl From<ProviderError> for BufferError {
    fn from(e: ProviderError) -> Self {
        BufferError::Processing(e.to_string())
    }
}
