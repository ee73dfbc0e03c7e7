#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

pub mod store;
pub mod util;

pub use store::InMemoryMessageStore;
pub use util::{ANI_PREAMBLE, preamble};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown message role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A message as sent to the model service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A message read back from the log, with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    /// Unique, monotonically increasing identity assigned on append
    pub id: i64,
    pub role: Role,
    pub content: String,
    /// Ordering key
    pub created_at: DateTime<Utc>,
}

impl From<StoredMessage> for ChatMessage {
    fn from(message: StoredMessage) -> Self {
        Self {
            role: message.role,
            content: message.content,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Copy)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Sends a context window to a language-model service and returns one reply.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<LLMResponse>;
    fn model(&self) -> &str;
}

/// Durable append-only log of conversational turns.
///
/// `load_all` must return messages in exactly the order they were appended.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn append(&self, role: Role, content: &str) -> anyhow::Result<StoredMessage>;

    /// Append a `user` message and its `assistant` reply as one unit.
    ///
    /// On error neither message is stored.
    async fn append_exchange(
        &self,
        user: &str,
        assistant: &str,
    ) -> anyhow::Result<(StoredMessage, StoredMessage)>;

    async fn load_all(&self) -> anyhow::Result<Vec<StoredMessage>>;
}

#[async_trait]
impl<T: ModelGateway + ?Sized> ModelGateway for Arc<T> {
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<LLMResponse> {
        (**self).complete(messages).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

#[async_trait]
impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    async fn append(&self, role: Role, content: &str) -> anyhow::Result<StoredMessage> {
        (**self).append(role, content).await
    }

    async fn append_exchange(
        &self,
        user: &str,
        assistant: &str,
    ) -> anyhow::Result<(StoredMessage, StoredMessage)> {
        (**self).append_exchange(user, assistant).await
    }

    async fn load_all(&self) -> anyhow::Result<Vec<StoredMessage>> {
        (**self).load_all().await
    }
}
