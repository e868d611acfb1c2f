//! Core composition logic for Murmur
//!
//! Provides the reply/forward composer, message decoration, and the data
//! models shared with the messaging backend bridge.

mod composer;
mod config;
mod decorate;
mod error;
mod events;
mod forward;
pub mod mock;
mod model;
mod roster;
mod sender;

pub use composer::{Composer, CompositionMode, Key, PendingComposition, ReplyIndicator};
pub use config::ComposerConfig;
pub use decorate::{
    display_content, is_forwarded, truncate_preview, DecoratedMessage, Decorator, ReplyQuote,
    FORWARD_MARKER,
};
pub use error::{ComposeError, ComposeResult, SendError};
pub use events::ComposeEvent;
pub use forward::{ForwardDialog, ForwardFailure, ForwardReport};
pub use model::{
    ChannelKind, ChatTarget, ForwardMetadata, ForwardSelection, OutgoingMessage, ReceivedMessage,
    Recipient, ReferencedMessage, ReplyMetadata,
};
pub use roster::{ForwardCandidate, GroupInfo, Roster};
pub use sender::MessageSender;
