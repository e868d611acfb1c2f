//! Recording sender for tests.
//!
//! Keeps every payload it is asked to deliver and fails for targets that
//! were configured to fail.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::{ChatTarget, MessageSender, OutgoingMessage, SendError};

/// Mock implementation of [`MessageSender`]
#[derive(Default)]
pub struct MockSender {
    attempts: Mutex<Vec<OutgoingMessage>>,
    failing: Mutex<HashSet<ChatTarget>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl MockSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `target` fail
    pub fn fail_for(self, target: ChatTarget) -> Self {
        lock(&self.failing).insert(target);
        self
    }

    /// Every payload passed to `send`, including failed ones, in call order
    pub fn attempts(&self) -> Vec<OutgoingMessage> {
        lock(&self.attempts).clone()
    }

    /// Payloads that were delivered successfully
    pub fn delivered(&self) -> Vec<OutgoingMessage> {
        let failing = lock(&self.failing);
        lock(&self.attempts)
            .iter()
            .filter(|m| !failing.contains(&m.target))
            .cloned()
            .collect()
    }

    pub fn attempt_count(&self) -> usize {
        lock(&self.attempts).len()
    }
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send(&self, message: &OutgoingMessage) -> Result<(), SendError> {
        lock(&self.attempts).push(message.clone());

        if lock(&self.failing).contains(&message.target) {
            return Err(SendError::new(format!(
                "backend unavailable for {}",
                message.target
            )));
        }
        Ok(())
    }
}
