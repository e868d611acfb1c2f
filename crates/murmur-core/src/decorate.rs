//! Reply-quote and forwarded-tag decoration for received messages

use crate::{ComposerConfig, ReceivedMessage};
use std::fmt;

/// Prefix that tags a message body as forwarded
pub const FORWARD_MARKER: &str = "[Forwarded]\n";

/// Check whether content carries the default forwarding marker
pub fn is_forwarded(content: &str) -> bool {
    content.starts_with(FORWARD_MARKER)
}

/// Content with the default forwarding marker removed
pub fn display_content(content: &str) -> &str {
    content.strip_prefix(FORWARD_MARKER).unwrap_or(content)
}

/// Keep at most `max_chars` characters, appending `...` when cut
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Quoted block shown above a reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyQuote {
    pub sender: String,
    /// Truncated original content; `None` for media
    pub preview: Option<String>,
}

/// A received message ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoratedMessage {
    pub sender: String,
    pub reply_quote: Option<ReplyQuote>,
    pub forwarded: bool,
    /// Body with any forwarding marker stripped; `None` for media
    pub body: Option<String>,
}

impl fmt::Display for DecoratedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(quote) = &self.reply_quote {
            writeln!(
                f,
                "  > {}: {}",
                quote.sender,
                quote.preview.as_deref().unwrap_or("[media]")
            )?;
        }
        if self.forwarded {
            writeln!(f, "  [Forwarded]")?;
        }
        write!(
            f,
            "{}: {}",
            self.sender,
            self.body.as_deref().unwrap_or("[media]")
        )
    }
}

/// Renders reply and forward annotations.
///
/// Rendering borrows the message and never writes to it, so rendering the
/// same message repeatedly gives the same result.
#[derive(Debug, Clone)]
pub struct Decorator {
    forward_marker: String,
    reply_preview_len: usize,
}

impl Default for Decorator {
    fn default() -> Self {
        Self::new(&ComposerConfig::default())
    }
}

impl Decorator {
    pub fn new(config: &ComposerConfig) -> Self {
        Self {
            forward_marker: config.forward_marker.clone(),
            reply_preview_len: config.reply_preview_len,
        }
    }

    pub fn is_forwarded(&self, content: &str) -> bool {
        !self.forward_marker.is_empty() && content.starts_with(&self.forward_marker)
    }

    pub fn display_content<'a>(&self, content: &'a str) -> &'a str {
        if self.is_forwarded(content) {
            &content[self.forward_marker.len()..]
        } else {
            content
        }
    }

    /// Decorate a received message for display
    pub fn render(&self, message: &ReceivedMessage) -> DecoratedMessage {
        let reply_quote = message.reply_to.as_ref().map(|original| ReplyQuote {
            sender: original.sender.clone(),
            preview: original
                .content
                .as_deref()
                .map(|content| self.quote_preview(content)),
        });

        let forwarded = message
            .content
            .as_deref()
            .is_some_and(|content| self.is_forwarded(content));

        let body = message
            .content
            .as_deref()
            .map(|content| self.display_content(content).to_string());

        DecoratedMessage {
            sender: message.sender.clone(),
            reply_quote,
            forwarded,
            body,
        }
    }

    /// Preview of quoted content, marker stripped and truncated
    pub fn quote_preview(&self, content: &str) -> String {
        truncate_preview(self.display_content(content), self.reply_preview_len)
    }
}
