//! Notifications emitted by the composer

use crate::{Recipient, ReferencedMessage};

/// Events sent from the composer to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeEvent {
    /// A reply is pending; the indicator should be shown
    ReplyStarted { original: ReferencedMessage },
    /// The pending reply was dropped without sending
    ReplyCancelled,
    /// The forward dialog was opened
    ForwardOpened { candidates: usize },
    /// The forward dialog was closed without sending
    ForwardClosed,
    /// A composed message was delivered
    Sent { target: String },
    /// Delivery to one target failed
    SendFailed { target: String, error: String },
    /// All forwarded copies were issued
    ForwardCompleted {
        delivered: Vec<Recipient>,
        failed: Vec<Recipient>,
    },
    /// A user-facing warning
    Warning { message: String },
}
