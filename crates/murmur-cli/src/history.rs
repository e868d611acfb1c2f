//! Messages seen in this session

use chrono::Utc;
use murmur_core::{OutgoingMessage, ReceivedMessage, ReferencedMessage};
use uuid::Uuid;

/// In-memory message log addressed by position
#[derive(Debug, Default)]
pub struct History {
    messages: Vec<ReceivedMessage>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, returning its index
    pub fn push(&mut self, message: ReceivedMessage) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Record an incoming message; `None` content is a media message
    pub fn receive(&mut self, sender: &str, content: Option<String>) -> usize {
        self.push(ReceivedMessage {
            id: Uuid::new_v4().to_string(),
            sender: sender.to_string(),
            content,
            timestamp: Utc::now(),
            reply_to: None,
        })
    }

    /// Echo a message we sent so it can be replied to or forwarded
    pub fn record_sent(&mut self, self_name: &str, message: &OutgoingMessage) -> usize {
        self.push(ReceivedMessage {
            id: Uuid::new_v4().to_string(),
            sender: self_name.to_string(),
            content: Some(message.content.clone()),
            timestamp: Utc::now(),
            reply_to: message.reply_to.clone().map(ReferencedMessage::from),
        })
    }

    pub fn get(&self, index: usize) -> Option<&ReceivedMessage> {
        self.messages.get(index)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}
