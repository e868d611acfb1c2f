//! Reply/forward composer
//!
//! One `Composer` lives for one chat session. It owns the pending reply, the
//! forward dialog, the active chat target and the compose input; the UI only
//! renders what the composer reports.

use crate::{
    ChatTarget, ComposeError, ComposeEvent, ComposeResult, ComposerConfig, Decorator,
    ForwardDialog, ForwardFailure, ForwardMetadata, ForwardReport, ForwardSelection,
    MessageSender, OutgoingMessage, ReferencedMessage, ReplyMetadata, Roster, SendError,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Reply context awaiting the next send
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PendingComposition {
    #[default]
    None,
    Reply(ReferencedMessage),
}

/// What the composer is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionMode {
    None,
    Reply,
    Forward,
}

/// Keys the composer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Char(char),
}

/// View model for the "replying to" bar above the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyIndicator {
    pub sender: String,
    pub preview: Option<String>,
}

/// Composition session
pub struct Composer {
    sender: Arc<dyn MessageSender>,
    decorator: Decorator,
    forward_marker: String,
    event_tx: mpsc::UnboundedSender<ComposeEvent>,
    target: ChatTarget,
    input: String,
    pending: PendingComposition,
    forward: Option<ForwardDialog>,
}

impl Composer {
    /// Create a new composer targeting the broadcast room
    pub fn new(
        sender: Arc<dyn MessageSender>,
        config: &ComposerConfig,
        event_tx: mpsc::UnboundedSender<ComposeEvent>,
    ) -> Self {
        Self {
            sender,
            decorator: Decorator::new(config),
            forward_marker: config.forward_marker.clone(),
            event_tx,
            target: ChatTarget::default(),
            input: String::new(),
            pending: PendingComposition::None,
            forward: None,
        }
    }

    pub fn target(&self) -> &ChatTarget {
        &self.target
    }

    /// Switch the active chat
    pub fn set_target(&mut self, target: ChatTarget) {
        debug!("Active chat is now {}", target);
        self.target = target;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn pending(&self) -> &PendingComposition {
        &self.pending
    }

    pub fn mode(&self) -> CompositionMode {
        match (&self.pending, &self.forward) {
            (PendingComposition::Reply(_), _) => CompositionMode::Reply,
            (PendingComposition::None, Some(_)) => CompositionMode::Forward,
            (PendingComposition::None, None) => CompositionMode::None,
        }
    }

    /// Indicator derived from the pending reply, if any
    pub fn reply_indicator(&self) -> Option<ReplyIndicator> {
        match &self.pending {
            PendingComposition::Reply(original) => Some(ReplyIndicator {
                sender: original.sender.clone(),
                preview: original
                    .content
                    .as_deref()
                    .map(|content| self.decorator.quote_preview(content)),
            }),
            PendingComposition::None => None,
        }
    }

    /// Start replying to `message`, replacing any earlier pending reply
    pub fn begin_reply(&mut self, message: ReferencedMessage) {
        info!("Replying to message {} from {}", message.id, message.sender);
        self.pending = PendingComposition::Reply(message.clone());
        self.emit(ComposeEvent::ReplyStarted { original: message });
    }

    /// Drop the pending reply. Does nothing if no reply is pending.
    pub fn cancel_reply(&mut self) {
        if let PendingComposition::Reply(_) = std::mem::take(&mut self.pending) {
            debug!("Reply cancelled");
            self.emit(ComposeEvent::ReplyCancelled);
        }
    }

    /// Open the forward dialog for `message` listing the roster's candidates.
    ///
    /// A pending reply is left untouched.
    pub fn begin_forward(&mut self, message: ReferencedMessage, roster: &Roster) -> &ForwardDialog {
        let candidates = roster.forward_candidates();
        info!(
            "Forwarding message {} ({} candidates)",
            message.id,
            candidates.len()
        );
        self.emit(ComposeEvent::ForwardOpened {
            candidates: candidates.len(),
        });
        self.forward.insert(ForwardDialog::new(message, candidates))
    }

    pub fn forward_dialog(&self) -> Option<&ForwardDialog> {
        self.forward.as_ref()
    }

    pub fn forward_dialog_mut(&mut self) -> Option<&mut ForwardDialog> {
        self.forward.as_mut()
    }

    /// Close the forward dialog without sending
    pub fn close_forward(&mut self) {
        if self.forward.take().is_some() {
            debug!("Forward dialog closed");
            self.emit(ComposeEvent::ForwardClosed);
        }
    }

    /// React to a key press, returning whether it was consumed.
    ///
    /// Escape closes the forward dialog if open, otherwise cancels a pending
    /// reply.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Escape if self.forward.is_some() => {
                self.close_forward();
                true
            }
            Key::Escape if matches!(self.pending, PendingComposition::Reply(_)) => {
                self.cancel_reply();
                true
            }
            _ => false,
        }
    }

    /// Send a forwarded copy of `message` to every recipient in `selection`.
    ///
    /// Recipients are sent to one at a time in selection order. A failed send
    /// or a payload with blank content is recorded in the report and does not
    /// stop the remaining ones. The forward dialog is left as it is; see
    /// [`Composer::confirm_forward_dialog`].
    pub async fn confirm_forward(
        &mut self,
        selection: &ForwardSelection,
        message: &ReferencedMessage,
    ) -> ComposeResult<ForwardReport> {
        if selection.is_empty() {
            warn!("Forward confirmed with no recipients");
            self.emit(ComposeEvent::Warning {
                message: "Select at least one recipient to forward to".to_string(),
            });
            return Err(ComposeError::NoRecipientsSelected);
        }

        let content = format!(
            "{}{}",
            self.forward_marker,
            message.content.as_deref().unwrap_or_default()
        );
        let origin = ForwardMetadata::from(message);
        let mut report = ForwardReport::default();

        for recipient in selection.iter() {
            let target = ChatTarget::from(recipient.clone());
            let payload =
                OutgoingMessage::new(target, content.as_str()).with_forward(origin.clone());

            let result = match payload.validate() {
                Ok(()) => self.sender.send(&payload).await,
                Err(e) => Err(SendError::new(e.to_string())),
            };

            match result {
                Ok(()) => {
                    debug!("Forwarded message {} to {}", message.id, recipient);
                    report.delivered.push(recipient.clone());
                }
                Err(e) => {
                    error!("Failed to forward message {} to {}: {}", message.id, recipient, e);
                    self.emit(ComposeEvent::SendFailed {
                        target: payload.target.to_string(),
                        error: e.to_string(),
                    });
                    report.failed.push(ForwardFailure {
                        recipient: recipient.clone(),
                        error: e,
                    });
                }
            }
        }

        info!(
            "Forward of {} finished: {} delivered, {} failed",
            message.id,
            report.delivered.len(),
            report.failed.len()
        );
        self.emit(ComposeEvent::ForwardCompleted {
            delivered: report.delivered.clone(),
            failed: report.failed.iter().map(|f| f.recipient.clone()).collect(),
        });

        Ok(report)
    }

    /// Confirm the open forward dialog with its current selection.
    ///
    /// With an empty selection the dialog stays open.
    pub async fn confirm_forward_dialog(&mut self) -> ComposeResult<ForwardReport> {
        let (selection, message) = match &self.forward {
            Some(dialog) => (dialog.selection().clone(), dialog.message().clone()),
            None => return Err(ComposeError::NoForwardInProgress),
        };
        let report = self.confirm_forward(&selection, &message).await?;
        self.forward = None;
        Ok(report)
    }

    /// Build and send a message to the active chat.
    ///
    /// Blank text is skipped and returns `Ok(None)`. Otherwise the input and
    /// pending reply are cleared whether or not the backend accepts the
    /// message.
    pub async fn compose_and_send(&mut self, text: &str) -> ComposeResult<Option<OutgoingMessage>> {
        let content = text.trim();
        if content.is_empty() {
            debug!("Skipping empty message");
            return Ok(None);
        }

        let mut message = OutgoingMessage::new(self.target.clone(), content);
        if let PendingComposition::Reply(original) = &self.pending {
            message = message.with_reply(ReplyMetadata::from(original));
        }
        message.validate()?;

        let result = self.sender.send(&message).await;

        self.input.clear();
        self.pending = PendingComposition::None;

        match result {
            Ok(()) => {
                info!("Message sent to {}", message.target);
                self.emit(ComposeEvent::Sent {
                    target: message.target.to_string(),
                });
                Ok(Some(message))
            }
            Err(e) => {
                error!("Failed to send message to {}: {}", message.target, e);
                self.emit(ComposeEvent::SendFailed {
                    target: message.target.to_string(),
                    error: e.to_string(),
                });
                Err(ComposeError::Backend {
                    target: message.target.to_string(),
                    source: e,
                })
            }
        }
    }

    /// Send whatever is in the input buffer
    pub async fn submit_input(&mut self) -> ComposeResult<Option<OutgoingMessage>> {
        let text = std::mem::take(&mut self.input);
        let result = self.compose_and_send(&text).await;
        if matches!(result, Ok(None)) {
            // Keep whitespace-only drafts as typed
            self.input = text;
        }
        result
    }

    fn emit(&self, event: ComposeEvent) {
        // Only fails once the UI has dropped its receiver
        if self.event_tx.send(event).is_err() {
            debug!("Event receiver closed, dropping compose event");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockSender;
    use crate::{GroupInfo, Recipient};
    use chrono::{TimeZone, Utc};

    fn message(id: &str, sender: &str, content: Option<&str>) -> ReferencedMessage {
        ReferencedMessage::new(
            id,
            sender,
            content.map(str::to_string),
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
    }

    fn composer(sender: Arc<MockSender>) -> (Composer, mpsc::UnboundedReceiver<ComposeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Composer::new(sender, &ComposerConfig::default(), tx), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ComposeEvent>) -> Vec<ComposeEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn roster() -> Roster {
        let mut roster = Roster::new("alice");
        roster.upsert_user("alice");
        roster.upsert_user("bob");
        roster.upsert_group(GroupInfo::new("g1", "Team"));
        roster
    }

    #[tokio::test]
    async fn test_reply_metadata_copied_into_payload() {
        let sender = Arc::new(MockSender::new());
        let (mut composer, _rx) = composer(sender.clone());
        composer.set_target(ChatTarget::Direct("bob".into()));

        composer.begin_reply(message("m1", "bob", Some("lunch?")));
        assert_eq!(composer.mode(), CompositionMode::Reply);

        let sent = composer.compose_and_send("sure").await.unwrap().unwrap();
        let reply = sent.reply_to.unwrap();
        assert_eq!(reply.sender, "bob");
        assert_eq!(reply.content.as_deref(), Some("lunch?"));
        assert_eq!(reply.id, "m1");

        assert_eq!(composer.mode(), CompositionMode::None);
        assert_eq!(composer.pending(), &PendingComposition::None);
        assert_eq!(sender.attempt_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_reply_drops_metadata() {
        let sender = Arc::new(MockSender::new());
        let (mut composer, mut rx) = composer(sender.clone());

        composer.begin_reply(message("m1", "bob", Some("hi")));
        composer.cancel_reply();
        assert_eq!(composer.mode(), CompositionMode::None);
        assert!(composer.reply_indicator().is_none());

        // Idempotent
        composer.cancel_reply();

        let sent = composer.compose_and_send("hello all").await.unwrap().unwrap();
        assert!(sent.reply_to.is_none());

        let events = drain(&mut rx);
        let cancels = events
            .iter()
            .filter(|e| **e == ComposeEvent::ReplyCancelled)
            .count();
        assert_eq!(cancels, 1);
    }

    #[tokio::test]
    async fn test_blank_text_never_sends() {
        let sender = Arc::new(MockSender::new());
        let (mut composer, _rx) = composer(sender.clone());
        composer.begin_reply(message("m1", "bob", Some("hi")));

        assert!(composer.compose_and_send("").await.unwrap().is_none());
        assert!(composer.compose_and_send("   ").await.unwrap().is_none());
        assert_eq!(sender.attempt_count(), 0);
        // A skipped send leaves the reply pending
        assert_eq!(composer.mode(), CompositionMode::Reply);
    }

    #[tokio::test]
    async fn test_content_trimmed_and_targeted() {
        let sender = Arc::new(MockSender::new());
        let (mut composer, _rx) = composer(sender.clone());
        composer.set_target(ChatTarget::Group("g1".into()));

        composer.compose_and_send("  hey team \n").await.unwrap();

        let sent = sender.attempts();
        assert_eq!(sent[0].content, "hey team");
        assert_eq!(sent[0].target, ChatTarget::Group("g1".into()));
    }

    #[tokio::test]
    async fn test_backend_failure_clears_state_and_reports() {
        let sender = Arc::new(MockSender::new().fail_for(ChatTarget::Broadcast));
        let (mut composer, mut rx) = composer(sender.clone());
        composer.begin_reply(message("m1", "bob", Some("hi")));
        composer.set_input("hello");

        let err = composer.submit_input().await.unwrap_err();
        assert!(matches!(err, ComposeError::Backend { ref target, .. } if target == "everyone"));
        assert_eq!(composer.input(), "");
        assert_eq!(composer.mode(), CompositionMode::None);

        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, ComposeEvent::SendFailed { target, .. } if target == "everyone")));
    }

    #[tokio::test]
    async fn test_submit_input_keeps_blank_draft() {
        let sender = Arc::new(MockSender::new());
        let (mut composer, _rx) = composer(sender.clone());
        composer.set_input("  ");

        assert!(composer.submit_input().await.unwrap().is_none());
        assert_eq!(composer.input(), "  ");
        assert_eq!(sender.attempt_count(), 0);
    }

    #[tokio::test]
    async fn test_forward_without_recipients_fails() {
        let sender = Arc::new(MockSender::new());
        let (mut composer, mut rx) = composer(sender.clone());

        let err = composer
            .confirm_forward(&ForwardSelection::new(), &message("m1", "bob", Some("hello")))
            .await
            .unwrap_err();

        assert!(matches!(err, ComposeError::NoRecipientsSelected));
        assert_eq!(sender.attempt_count(), 0);
        assert!(matches!(drain(&mut rx).as_slice(), [ComposeEvent::Warning { .. }]));
    }

    #[tokio::test]
    async fn test_forward_sends_in_selection_order() {
        let sender = Arc::new(MockSender::new());
        let (mut composer, _rx) = composer(sender.clone());
        let selection: ForwardSelection = vec![
            Recipient::User("bob".into()),
            Recipient::Group("g1".into()),
        ]
        .into_iter()
        .collect();

        let report = composer
            .confirm_forward(&selection, &message("m1", "carol", Some("hello")))
            .await
            .unwrap();
        assert!(report.is_complete());

        let sent = sender.attempts();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].content, "[Forwarded]\nhello");
        assert_eq!(sent[0].target, ChatTarget::Direct("bob".into()));
        assert_eq!(sent[1].content, "[Forwarded]\nhello");
        assert_eq!(sent[1].target, ChatTarget::Group("g1".into()));
        assert_eq!(sent[1].forwarded.as_ref().unwrap().original_sender, "carol");
    }

    #[tokio::test]
    async fn test_forward_continues_past_failures() {
        let sender = Arc::new(MockSender::new().fail_for(ChatTarget::Direct("bob".into())));
        let (mut composer, mut rx) = composer(sender.clone());
        let selection: ForwardSelection = vec![
            Recipient::User("bob".into()),
            Recipient::Group("g1".into()),
        ]
        .into_iter()
        .collect();

        let report = composer
            .confirm_forward(&selection, &message("m1", "carol", Some("hello")))
            .await
            .unwrap();

        assert_eq!(report.delivered, vec![Recipient::Group("g1".into())]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].recipient, Recipient::User("bob".into()));
        assert_eq!(sender.attempt_count(), 2);

        let events = drain(&mut rx);
        assert_eq!(
            events.last(),
            Some(&ComposeEvent::ForwardCompleted {
                delivered: vec![Recipient::Group("g1".into())],
                failed: vec![Recipient::User("bob".into())],
            })
        );
    }

    #[tokio::test]
    async fn test_forward_dialog_flow() {
        let sender = Arc::new(MockSender::new());
        let (mut composer, _rx) = composer(sender.clone());

        let dialog = composer.begin_forward(message("m1", "bob", Some("hello")), &roster());
        assert_eq!(dialog.candidates().len(), 2);
        assert_eq!(composer.mode(), CompositionMode::Forward);

        // Empty selection keeps the dialog open
        assert!(matches!(
            composer.confirm_forward_dialog().await,
            Err(ComposeError::NoRecipientsSelected)
        ));
        assert!(composer.forward_dialog().is_some());

        composer.forward_dialog_mut().unwrap().toggle(1).unwrap();
        let report = composer.confirm_forward_dialog().await.unwrap();
        assert_eq!(report.delivered, vec![Recipient::Group("g1".into())]);
        assert!(composer.forward_dialog().is_none());

        assert!(matches!(
            composer.confirm_forward_dialog().await,
            Err(ComposeError::NoForwardInProgress)
        ));
    }

    #[tokio::test]
    async fn test_media_forward_has_marker_only() {
        let sender = Arc::new(MockSender::new());
        let (mut composer, _rx) = composer(sender.clone());
        let selection: ForwardSelection = std::iter::once(Recipient::User("bob".into())).collect();

        composer
            .confirm_forward(&selection, &message("m1", "carol", None))
            .await
            .unwrap();
        assert_eq!(sender.attempts()[0].content, "[Forwarded]\n");
    }

    #[test]
    fn test_reply_and_forward_are_independent() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut composer =
            Composer::new(Arc::new(MockSender::new()), &ComposerConfig::default(), tx);

        composer.begin_reply(message("m1", "bob", Some("hi")));
        composer.begin_forward(message("m2", "carol", Some("yo")), &roster());
        assert_eq!(composer.mode(), CompositionMode::Reply);
        assert!(composer.forward_dialog().is_some());

        // Escape closes the dialog first, then the reply
        assert!(composer.handle_key(Key::Escape));
        assert!(composer.forward_dialog().is_none());
        assert_eq!(composer.mode(), CompositionMode::Reply);

        assert!(composer.handle_key(Key::Escape));
        assert_eq!(composer.mode(), CompositionMode::None);
        assert!(!composer.handle_key(Key::Escape));
        assert!(!composer.handle_key(Key::Char('a')));
    }

    #[test]
    fn test_reply_indicator_preview() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut composer =
            Composer::new(Arc::new(MockSender::new()), &ComposerConfig::default(), tx);

        composer.begin_reply(message("m1", "bob", Some(&"y".repeat(120))));
        let indicator = composer.reply_indicator().unwrap();
        assert_eq!(indicator.sender, "bob");
        assert_eq!(indicator.preview, Some(format!("{}...", "y".repeat(100))));

        composer.begin_reply(message("m2", "carol", None));
        let indicator = composer.reply_indicator().unwrap();
        assert_eq!(indicator.sender, "carol");
        assert_eq!(indicator.preview, None);
    }

    #[tokio::test]
    async fn test_forward_events_are_never_dropped() {
        let names: Vec<String> = (0..100).map(|i| format!("user{}", i)).collect();
        let mut sender = MockSender::new();
        for name in &names {
            sender = sender.fail_for(ChatTarget::Direct(name.clone()));
        }
        let (mut composer, mut rx) = composer(Arc::new(sender));
        let selection: ForwardSelection = names.iter().cloned().map(Recipient::User).collect();

        let report = composer
            .confirm_forward(&selection, &message("m1", "carol", Some("hello")))
            .await
            .unwrap();
        assert_eq!(report.failed.len(), 100);

        let events = drain(&mut rx);
        let failures = events
            .iter()
            .filter(|e| matches!(e, ComposeEvent::SendFailed { .. }))
            .count();
        assert_eq!(failures, 100);
        assert!(matches!(
            events.last(),
            Some(ComposeEvent::ForwardCompleted { failed, .. }) if failed.len() == 100
        ));
    }

    #[tokio::test]
    async fn test_forward_with_blank_body_is_not_sent() {
        let sender = Arc::new(MockSender::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = ComposerConfig {
            forward_marker: String::new(),
            ..ComposerConfig::default()
        };
        let mut composer = Composer::new(sender.clone(), &config, tx);
        let selection: ForwardSelection = vec![
            Recipient::User("bob".into()),
            Recipient::Group("g1".into()),
        ]
        .into_iter()
        .collect();

        let report = composer
            .confirm_forward(&selection, &message("m1", "carol", None))
            .await
            .unwrap();

        assert_eq!(sender.attempt_count(), 0);
        assert!(report.delivered.is_empty());
        let failed: Vec<_> = report.failed.iter().map(|f| f.recipient.clone()).collect();
        assert_eq!(
            failed,
            vec![Recipient::User("bob".into()), Recipient::Group("g1".into())]
        );
        assert_eq!(report.failed[0].error.message(), "Message is empty");

        let failures = drain(&mut rx)
            .iter()
            .filter(|e| matches!(e, ComposeEvent::SendFailed { .. }))
            .count();
        assert_eq!(failures, 2);
    }

    #[test]
    fn test_escape_closes_forward_dialog_without_reply() {
        let (mut composer, mut rx) = composer(Arc::new(MockSender::new()));
        composer.begin_forward(message("m1", "bob", Some("hello")), &roster());
        assert_eq!(composer.mode(), CompositionMode::Forward);

        assert!(composer.handle_key(Key::Escape));
        assert_eq!(composer.mode(), CompositionMode::None);
        assert!(composer.forward_dialog().is_none());
        assert_eq!(
            drain(&mut rx),
            vec![
                ComposeEvent::ForwardOpened { candidates: 2 },
                ComposeEvent::ForwardClosed,
            ]
        );
    }

    #[tokio::test]
    async fn test_direct_forward_leaves_open_dialog() {
        let sender = Arc::new(MockSender::new());
        let (mut composer, _rx) = composer(sender.clone());
        composer.begin_forward(message("m1", "bob", Some("hello")), &roster());

        let selection: ForwardSelection =
            std::iter::once(Recipient::User("dave".into())).collect();
        composer
            .confirm_forward(&selection, &message("m2", "carol", Some("other")))
            .await
            .unwrap();

        assert_eq!(sender.attempt_count(), 1);
        assert_eq!(composer.forward_dialog().unwrap().message().id, "m1");
        assert_eq!(composer.mode(), CompositionMode::Forward);
    }
}
