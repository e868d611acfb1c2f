//! Send primitive consumed by the composer

use crate::{OutgoingMessage, SendError};
use async_trait::async_trait;

/// Delivers a composed message to the messaging backend.
///
/// Implementations resolve once the backend has acknowledged the message.
/// No retry is attempted by callers.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), SendError>;
}
