//! JSON request format of the backend's `send_message` call

use murmur_core::{ChannelKind, ChatTarget, ForwardMetadata, OutgoingMessage, ReplyMetadata};
use serde::{Deserialize, Serialize};

const SEND_METHOD: &str = "send_message";

/// Top-level RPC request
#[derive(Debug, Serialize)]
pub struct SendRequest<'a> {
    method: &'static str,
    params: SendParams<'a>,
}

#[derive(Debug, Serialize)]
struct SendParams<'a> {
    channel: ChannelKind,
    content: &'a str,
    options: SendOptions<'a>,
}

#[derive(Debug, Default, Serialize)]
struct SendOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    receiver: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    group_id: Option<&'a str>,
    #[serde(rename = "replyTo", skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a ReplyMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a ForwardMetadata>,
}

impl<'a> SendRequest<'a> {
    /// Build the request for an outgoing message
    pub fn from_message(message: &'a OutgoingMessage) -> Self {
        let mut options = SendOptions {
            reply_to: message.reply_to.as_ref(),
            metadata: message.forwarded.as_ref(),
            ..SendOptions::default()
        };
        match &message.target {
            ChatTarget::Direct(user) => options.receiver = Some(user.as_str()),
            ChatTarget::Group(group) => options.group_id = Some(group.as_str()),
            ChatTarget::Broadcast => {}
        }

        Self {
            method: SEND_METHOD,
            params: SendParams {
                channel: message.kind(),
                content: &message.content,
                options,
            },
        }
    }
}

/// Body returned by the backend; an `error` field means the send was refused
#[derive(Debug, Default, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Extract a backend error from a response body, if any
pub fn response_error(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    serde_json::from_str::<SendResponse>(body)
        .ok()
        .and_then(|response| response.error)
}
