//! Forward recipient dialog and delivery report

use crate::{
    ComposeError, ComposeResult, ForwardCandidate, ForwardSelection, Recipient, ReferencedMessage,
    SendError,
};

/// Recipient picker opened by a forward action
#[derive(Debug, Clone)]
pub struct ForwardDialog {
    message: ReferencedMessage,
    candidates: Vec<ForwardCandidate>,
    selection: ForwardSelection,
}

impl ForwardDialog {
    pub fn new(message: ReferencedMessage, candidates: Vec<ForwardCandidate>) -> Self {
        Self {
            message,
            candidates,
            selection: ForwardSelection::new(),
        }
    }

    /// The message being forwarded
    pub fn message(&self) -> &ReferencedMessage {
        &self.message
    }

    pub fn candidates(&self) -> &[ForwardCandidate] {
        &self.candidates
    }

    pub fn selection(&self) -> &ForwardSelection {
        &self.selection
    }

    /// Toggle the candidate at `index`, returning whether it is now selected
    pub fn toggle(&mut self, index: usize) -> ComposeResult<bool> {
        let candidate = self
            .candidates
            .get(index)
            .ok_or(ComposeError::InvalidCandidate(index))?;
        Ok(self.selection.toggle(candidate.recipient.clone()))
    }

    /// Select a recipient directly, even if it is not listed
    pub fn select(&mut self, recipient: Recipient) -> bool {
        self.selection.insert(recipient)
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.candidates
            .get(index)
            .is_some_and(|c| self.selection.contains(&c.recipient))
    }
}

/// A recipient whose forwarded copy failed to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardFailure {
    pub recipient: Recipient,
    pub error: SendError,
}

/// Per-recipient outcome of a forward
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForwardReport {
    pub delivered: Vec<Recipient>,
    pub failed: Vec<ForwardFailure>,
}

impl ForwardReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
