//! In-process message log, used where no durable backing is wanted.

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::{MessageStore, Role, StoredMessage};

/// A `MessageStore` kept entirely in memory.
///
/// `set_failing(true)` makes every subsequent call return an error, and
/// `set_append_limit` rejects writes that would grow the log past a size.
/// Both let callers exercise their storage-failure paths.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    messages: Mutex<Vec<StoredMessage>>,
    failing: AtomicBool,
    append_limit: Mutex<Option<usize>>,
}

impl InMemoryMessageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Reject any append that would leave more than `limit` messages.
    pub fn set_append_limit(&self, limit: Option<usize>) {
        if let Ok(mut append_limit) = self.append_limit.lock() {
            *append_limit = limit;
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.lock().map_or(0, |messages| messages.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("message store unavailable");
        }
        Ok(())
    }

    fn check_room(&self, current: usize, adding: usize) -> anyhow::Result<()> {
        let limit = *self
            .append_limit
            .lock()
            .map_err(|_| anyhow::anyhow!("message store lock poisoned"))?;
        if limit.is_some_and(|limit| current + adding > limit) {
            anyhow::bail!("message store full");
        }
        Ok(())
    }
}

fn push(messages: &mut Vec<StoredMessage>, role: Role, content: &str) -> StoredMessage {
    let id = messages.last().map_or(1, |last| last.id + 1);
    let now = chrono::Utc::now();
    // Keep created_at non-decreasing even if the wall clock steps back.
    let created_at = messages
        .last()
        .map_or(now, |last| last.created_at.max(now));

    let message = StoredMessage {
        id,
        role,
        content: content.to_string(),
        created_at,
    };
    messages.push(message.clone());
    debug!("Appended {} message #{}", role, id);
    message
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn append(&self, role: Role, content: &str) -> anyhow::Result<StoredMessage> {
        self.check_available()?;
        let mut messages = self
            .messages
            .lock()
            .map_err(|_| anyhow::anyhow!("message store lock poisoned"))?;
        self.check_room(messages.len(), 1)?;

        Ok(push(&mut messages, role, content))
    }

    async fn append_exchange(
        &self,
        user: &str,
        assistant: &str,
    ) -> anyhow::Result<(StoredMessage, StoredMessage)> {
        self.check_available()?;
        let mut messages = self
            .messages
            .lock()
            .map_err(|_| anyhow::anyhow!("message store lock poisoned"))?;
        self.check_room(messages.len(), 2)?;

        let user = push(&mut messages, Role::User, user);
        let assistant = push(&mut messages, Role::Assistant, assistant);
        Ok((user, assistant))
    }

    async fn load_all(&self) -> anyhow::Result<Vec<StoredMessage>> {
        self.check_available()?;
        let messages = self
            .messages
            .lock()
            .map_err(|_| anyhow::anyhow!("message store lock poisoned"))?;
        Ok(messages.clone())
    }
}
