//! Error types for bridge operations

use murmur_core::SendError;
use thiserror::Error;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur while talking to the messaging backend
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Endpoint URL could not be parsed
    #[error("Invalid backend endpoint: {0}")]
    InvalidEndpoint(String),

    /// HTTP client could not be built
    #[error("Failed to create HTTP client: {0}")]
    ClientBuildFailed(String),

    /// Request never got a response
    #[error("Request to backend failed: {0}")]
    RequestFailed(String),

    /// Backend answered with an error
    #[error("Backend rejected message (status {status}): {body}")]
    Rejected { status: u16, body: String },

    /// Request could not be encoded
    #[error("Failed to encode request: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<BridgeError> for SendError {
    fn from(e: BridgeError) -> Self {
        SendError::new(e.to_string())
    }
}
