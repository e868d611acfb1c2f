//! Message and addressing types

use crate::{ComposeError, ComposeResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery channel understood by the messaging backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelKind {
    /// One-to-one message
    #[serde(rename = "private_message")]
    Direct,
    /// Message to a group
    #[serde(rename = "group_message")]
    Group,
    /// Message to every connected user
    #[serde(rename = "chat_message")]
    Broadcast,
}

impl ChannelKind {
    /// Name used for this channel on the backend wire
    pub fn wire_name(&self) -> &'static str {
        match self {
            ChannelKind::Direct => "private_message",
            ChannelKind::Group => "group_message",
            ChannelKind::Broadcast => "chat_message",
        }
    }
}

/// The chat an outgoing message is addressed to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ChatTarget {
    /// Direct chat with a user
    Direct(String),
    /// Group chat
    Group(String),
    /// Public room
    #[default]
    Broadcast,
}

impl ChatTarget {
    pub fn kind(&self) -> ChannelKind {
        match self {
            ChatTarget::Direct(_) => ChannelKind::Direct,
            ChatTarget::Group(_) => ChannelKind::Group,
            ChatTarget::Broadcast => ChannelKind::Broadcast,
        }
    }

    /// Receiver or group id; `None` for broadcast
    pub fn id(&self) -> Option<&str> {
        match self {
            ChatTarget::Direct(id) | ChatTarget::Group(id) => Some(id.as_str()),
            ChatTarget::Broadcast => None,
        }
    }
}

impl fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatTarget::Direct(user) => write!(f, "@{}", user),
            ChatTarget::Group(group) => write!(f, "#{}", group),
            ChatTarget::Broadcast => write!(f, "everyone"),
        }
    }
}

impl From<Recipient> for ChatTarget {
    fn from(recipient: Recipient) -> Self {
        match recipient {
            Recipient::User(id) => ChatTarget::Direct(id),
            Recipient::Group(id) => ChatTarget::Group(id),
        }
    }
}

/// A forward recipient
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Recipient {
    User(String),
    Group(String),
}

impl Recipient {
    pub fn id(&self) -> &str {
        match self {
            Recipient::User(id) | Recipient::Group(id) => id,
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recipient::User(id) => write!(f, "user:{}", id),
            Recipient::Group(id) => write!(f, "group:{}", id),
        }
    }
}

impl FromStr for Recipient {
    type Err = ComposeError;

    /// Parse `user:<id>` or `group:<id>`
    fn from_str(s: &str) -> ComposeResult<Self> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| ComposeError::InvalidRecipient(s.to_string()))?;
        let id = id.trim();
        if id.is_empty() {
            return Err(ComposeError::InvalidRecipient(s.to_string()));
        }
        match kind.trim() {
            "user" => Ok(Recipient::User(id.to_string())),
            "group" => Ok(Recipient::Group(id.to_string())),
            _ => Err(ComposeError::InvalidRecipient(s.to_string())),
        }
    }
}

/// Ordered set of forward recipients.
///
/// Iteration follows insertion order; inserting a recipient twice keeps the
/// first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardSelection {
    recipients: Vec<Recipient>,
}

impl ForwardSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipient, returning `false` if it was already selected
    pub fn insert(&mut self, recipient: Recipient) -> bool {
        if self.recipients.contains(&recipient) {
            return false;
        }
        self.recipients.push(recipient);
        true
    }

    /// Remove a recipient, returning `true` if it was selected
    pub fn remove(&mut self, recipient: &Recipient) -> bool {
        let before = self.recipients.len();
        self.recipients.retain(|r| r != recipient);
        before != self.recipients.len()
    }

    /// Flip the selection state of a recipient, returning the new state
    pub fn toggle(&mut self, recipient: Recipient) -> bool {
        if self.remove(&recipient) {
            false
        } else {
            self.recipients.push(recipient);
            true
        }
    }

    pub fn contains(&self, recipient: &Recipient) -> bool {
        self.recipients.contains(recipient)
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipient> {
        self.recipients.iter()
    }
}

impl FromIterator<Recipient> for ForwardSelection {
    fn from_iter<I: IntoIterator<Item = Recipient>>(iter: I) -> Self {
        let mut selection = ForwardSelection::new();
        for recipient in iter {
            selection.insert(recipient);
        }
        selection
    }
}

/// Snapshot of a message taken when the user picks it for reply or forward
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferencedMessage {
    pub id: String,
    pub sender: String,
    /// `None` for media messages
    pub content: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ReferencedMessage {
    pub fn new(
        id: impl Into<String>,
        sender: impl Into<String>,
        content: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            sender: sender.into(),
            content,
            timestamp,
        }
    }
}

impl From<ReplyMetadata> for ReferencedMessage {
    fn from(reply: ReplyMetadata) -> Self {
        Self {
            id: reply.id,
            sender: reply.sender,
            content: reply.content,
            timestamp: reply.timestamp,
        }
    }
}

/// Reply reference attached to an outgoing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMetadata {
    /// Id of the message being replied to
    pub id: String,
    pub sender: String,
    pub content: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl From<&ReferencedMessage> for ReplyMetadata {
    fn from(original: &ReferencedMessage) -> Self {
        Self {
            id: original.id.clone(),
            sender: original.sender.clone(),
            content: original.content.clone(),
            timestamp: original.timestamp,
        }
    }
}

/// Origin of a forwarded message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardMetadata {
    pub original_id: String,
    pub original_sender: String,
}

impl From<&ReferencedMessage> for ForwardMetadata {
    fn from(original: &ReferencedMessage) -> Self {
        Self {
            original_id: original.id.clone(),
            original_sender: original.sender.clone(),
        }
    }
}

/// Message ready to hand to the send primitive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub target: ChatTarget,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<ReplyMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarded: Option<ForwardMetadata>,
}

impl OutgoingMessage {
    /// Create a new message to the given chat
    pub fn new(target: ChatTarget, content: impl Into<String>) -> Self {
        Self {
            target,
            content: content.into(),
            reply_to: None,
            forwarded: None,
        }
    }

    /// Attach a reply reference
    pub fn with_reply(mut self, reply: ReplyMetadata) -> Self {
        self.reply_to = Some(reply);
        self
    }

    /// Mark as forwarded from another message
    pub fn with_forward(mut self, origin: ForwardMetadata) -> Self {
        self.forwarded = Some(origin);
        self
    }

    pub fn kind(&self) -> ChannelKind {
        self.target.kind()
    }

    pub fn target(&self) -> &ChatTarget {
        &self.target
    }

    /// Reject messages whose content is blank
    pub fn validate(&self) -> ComposeResult<()> {
        if self.content.trim().is_empty() {
            return Err(ComposeError::EmptyMessage);
        }
        Ok(())
    }
}

/// A message received from the backend, as handed to the decorator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedMessage {
    pub id: String,
    pub sender: String,
    pub content: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<ReferencedMessage>,
}

impl ReceivedMessage {
    /// Snapshot this message for a reply or forward
    pub fn snapshot(&self) -> ReferencedMessage {
        ReferencedMessage {
            id: self.id.clone(),
            sender: self.sender.clone(),
            content: self.content.clone(),
            timestamp: self.timestamp,
        }
    }
}
