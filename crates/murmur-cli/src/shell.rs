//! Line-oriented chat shell driving one composer session

use crate::history::History;
use anyhow::{anyhow, bail};
use murmur_core::{
    ChatTarget, ComposeError, ComposeEvent, Composer, Decorator, ForwardDialog, Key, Roster,
};
use tracing::debug;

const HELP: &str = "\
Commands:
  /to @user | #group | all   switch the active chat
  /recv <sender> [text]      simulate an incoming message (no text = media)
  /reply <n>                 reply to message n
  /cancel                    drop the pending reply
  /esc                       press Escape
  /fwd <n>                   forward message n
  /pick <i>                  toggle forward recipient i
  /send                      forward to the picked recipients
  /close                     close the forward dialog
  /history                   show all messages
  /quit                      exit
Anything else is sent to the active chat.";

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Target(ChatTarget),
    Receive {
        sender: String,
        content: Option<String>,
    },
    Reply(usize),
    Cancel,
    Escape,
    Forward(usize),
    Pick(usize),
    ConfirmForward,
    CloseForward,
    History,
    Help,
    Quit,
    Text(String),
}

fn parse_index(arg: Option<&str>, what: &str) -> anyhow::Result<usize> {
    let arg = arg.ok_or_else(|| anyhow!("Missing {}", what))?;
    arg.parse().map_err(|_| anyhow!("Invalid {}: {}", what, arg))
}

fn parse_target(arg: &str) -> anyhow::Result<ChatTarget> {
    if arg == "all" {
        return Ok(ChatTarget::Broadcast);
    }
    if let Some(user) = arg.strip_prefix('@').filter(|u| !u.is_empty()) {
        return Ok(ChatTarget::Direct(user.to_string()));
    }
    if let Some(group) = arg.strip_prefix('#').filter(|g| !g.is_empty()) {
        return Ok(ChatTarget::Group(group.to_string()));
    }
    bail!("Unknown chat '{}', expected @user, #group or all", arg)
}

/// Parse one line of input
pub fn parse_command(line: &str) -> anyhow::Result<Command> {
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Ok(Command::Text(line.to_string()));
    };

    let (name, args) = rest
        .split_once(char::is_whitespace)
        .map(|(name, args)| (name, args.trim()))
        .unwrap_or((rest.trim(), ""));
    let first = args.split_whitespace().next();

    let command = match name {
        "to" => Command::Target(parse_target(first.ok_or_else(|| anyhow!("Missing chat"))?)?),
        "recv" => {
            let (sender, text) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
            if sender.is_empty() {
                bail!("Missing sender");
            }
            let text = text.trim();
            Command::Receive {
                sender: sender.to_string(),
                content: (!text.is_empty()).then(|| text.to_string()),
            }
        }
        "reply" => Command::Reply(parse_index(first, "message number")?),
        "cancel" => Command::Cancel,
        "esc" => Command::Escape,
        "fwd" => Command::Forward(parse_index(first, "message number")?),
        "pick" => Command::Pick(parse_index(first, "recipient number")?),
        "send" => Command::ConfirmForward,
        "close" => Command::CloseForward,
        "history" => Command::History,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("Unknown command /{}, try /help", other),
    };
    Ok(command)
}

/// Text for events that surface as notifications
pub fn notification(event: &ComposeEvent) -> Option<String> {
    match event {
        ComposeEvent::SendFailed { target, error } => {
            Some(format!("! Could not deliver to {}: {}", target, error))
        }
        ComposeEvent::ForwardCompleted { delivered, failed } if failed.is_empty() => Some(format!(
            "Message forwarded to {} recipient(s)",
            delivered.len()
        )),
        ComposeEvent::ForwardCompleted { delivered, failed } => {
            let failed: Vec<String> = failed.iter().map(|r| r.to_string()).collect();
            Some(format!(
                "! Forwarded to {} recipient(s), failed for {}",
                delivered.len(),
                failed.join(", ")
            ))
        }
        ComposeEvent::Warning { message } => Some(format!("! {}", message)),
        _ => None,
    }
}

fn dialog_lines(dialog: &ForwardDialog) -> Vec<String> {
    let mut lines = vec![format!("Forward message from {} to:", dialog.message().sender)];
    for (i, candidate) in dialog.candidates().iter().enumerate() {
        let mark = if dialog.is_selected(i) { "x" } else { " " };
        lines.push(format!("  [{}] {}. {}", mark, i, candidate.label));
    }
    lines
}

/// Interactive session state
pub struct Shell {
    composer: Composer,
    roster: Roster,
    history: History,
    decorator: Decorator,
}

impl Shell {
    pub fn new(composer: Composer, roster: Roster, decorator: Decorator) -> Self {
        Self {
            composer,
            roster,
            history: History::new(),
            decorator,
        }
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn render(&self, index: usize) -> Option<String> {
        self.history
            .get(index)
            .map(|m| format!("#{} {}", index, self.decorator.render(m)))
    }

    fn indicator_line(&self) -> Option<String> {
        self.composer.reply_indicator().map(|indicator| {
            format!(
                "Replying to {}: {} (/cancel or /esc to stop)",
                indicator.sender,
                indicator.preview.as_deref().unwrap_or("[media]")
            )
        })
    }

    /// Run a command, returning lines to print
    pub async fn execute(&mut self, command: Command) -> anyhow::Result<Vec<String>> {
        debug!("Executing {:?}", command);
        let mut out = Vec::new();

        match command {
            Command::Target(target) => {
                out.push(format!("Now chatting with {}", target));
                self.composer.set_target(target);
            }
            Command::Receive { sender, content } => {
                self.roster.upsert_user(sender.as_str());
                let index = self.history.receive(&sender, content);
                out.extend(self.render(index));
            }
            Command::Reply(index) => {
                let message = self
                    .history
                    .get(index)
                    .ok_or_else(|| anyhow!("No message #{}", index))?;
                self.composer.begin_reply(message.snapshot());
                out.extend(self.indicator_line());
            }
            Command::Cancel => {
                self.composer.cancel_reply();
                out.push("Reply cancelled".to_string());
            }
            Command::Escape => {
                if !self.composer.handle_key(Key::Escape) {
                    debug!("Escape ignored, nothing to dismiss");
                }
            }
            Command::Forward(index) => {
                let message = self
                    .history
                    .get(index)
                    .ok_or_else(|| anyhow!("No message #{}", index))?
                    .snapshot();
                let dialog = self.composer.begin_forward(message, &self.roster);
                out.extend(dialog_lines(dialog));
            }
            Command::Pick(index) => {
                let dialog = self
                    .composer
                    .forward_dialog_mut()
                    .ok_or(ComposeError::NoForwardInProgress)?;
                dialog.toggle(index)?;
                out.extend(dialog_lines(dialog));
            }
            Command::ConfirmForward => match self.composer.confirm_forward_dialog().await {
                Ok(report) => {
                    for failure in &report.failed {
                        out.push(format!("  {} failed: {}", failure.recipient, failure.error));
                    }
                }
                // Already surfaced as a warning notification
                Err(ComposeError::NoRecipientsSelected) => {}
                Err(e) => return Err(e.into()),
            },
            Command::CloseForward => self.composer.close_forward(),
            Command::History => {
                out.extend((0..self.history.len()).filter_map(|i| self.render(i)));
            }
            Command::Help => out.push(HELP.to_string()),
            Command::Quit => {}
            Command::Text(text) => {
                self.composer.set_input(text);
                match self.composer.submit_input().await {
                    Ok(Some(sent)) => {
                        let index = self.history.record_sent(&self.roster.self_name, &sent);
                        out.extend(self.render(index));
                    }
                    Ok(None) => {}
                    // Already surfaced as a send-failed notification
                    Err(ComposeError::Backend { .. }) => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(out)
    }
}
