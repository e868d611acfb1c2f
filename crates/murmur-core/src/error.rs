//! Error types for the core module

use thiserror::Error;

/// Result type for composition operations
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Errors that can occur while composing or delivering a message
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Message content is empty after trimming
    #[error("Message is empty")]
    EmptyMessage,

    /// A forward was confirmed without any recipient
    #[error("No recipients selected")]
    NoRecipientsSelected,

    /// Forward confirmation requested with no open forward dialog
    #[error("No forward in progress")]
    NoForwardInProgress,

    /// Candidate index out of range in the forward dialog
    #[error("No forward candidate at index {0}")]
    InvalidCandidate(usize),

    /// Recipient string could not be parsed
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// The messaging backend rejected or failed a send
    #[error("Failed to send to {target}: {source}")]
    Backend {
        target: String,
        #[source]
        source: SendError,
    },
}

/// Failure reported by a [`MessageSender`](crate::MessageSender) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SendError(String);

impl SendError {
    /// Create a new send error with the given description
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// Get the error description
    pub fn message(&self) -> &str {
        &self.0
    }
}
