//! Composer and decorator configuration

use crate::decorate::FORWARD_MARKER;
use serde::{Deserialize, Serialize};

/// Default number of characters shown when quoting a replied-to message
pub const DEFAULT_REPLY_PREVIEW_LEN: usize = 100;

/// Display and composition settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Maximum characters of the original content shown in reply quotes
    pub reply_preview_len: usize,
    /// Literal prefix that tags a message body as forwarded
    pub forward_marker: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            reply_preview_len: DEFAULT_REPLY_PREVIEW_LEN,
            forward_marker: FORWARD_MARKER.to_string(),
        }
    }
}
