//! The memory-augmented turn loop.
//!
//! Each turn reads one line, assembles the context window from the stored
//! log, asks the model for a single reply, persists the exchange and only
//! then shows the reply. Turns never overlap.

use crate::context::ContextBuilder;
use ani_core::{ChatMessage, MessageStore, ModelGateway, Usage};
use std::io::{BufRead, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Shown once when the loop starts.
pub const BANNER: &str = "Ani prototype started. Type your messages. Ctrl+C to exit.";
/// Printed before reading each line.
pub const USER_PROMPT: &str = "You: ";
/// Printed before each reply.
pub const REPLY_PREFIX: &str = "Ani: ";

/// Errors that can occur while running a turn.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("message store error: {0}")]
    Storage(#[source] anyhow::Error),

    #[error("model error: {0}")]
    Model(#[source] anyhow::Error),

    #[error("empty response from model")]
    EmptyResponse,

    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversationError {
    /// Storage and terminal failures end the session; model failures only
    /// discard the current turn.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io(_))
    }
}

/// Where the loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitInput,
    BuildingContext,
    AwaitingModel,
    Persisting,
    Terminated,
}

/// Result of a completed turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    /// Assistant's reply, already persisted
    pub reply: String,
    /// Token usage reported by the model service
    pub usage: Option<Usage>,
    /// 1-based turn number within the whole log
    pub turn_number: usize,
    /// Number of messages sent to the model
    pub context_len: usize,
}

/// Orchestrates input, context assembly, model call and persistence.
pub struct ConversationLoop<G = Arc<dyn ModelGateway>, S = Arc<dyn MessageStore>>
where
    G: Send + Sync,
    S: Send + Sync,
{
    gateway: G,
    store: S,
    builder: ContextBuilder,
    state: LoopState,
}

impl<G, S> ConversationLoop<G, S>
where
    G: ModelGateway + Send + Sync,
    S: MessageStore + Send + Sync,
{
    pub fn new(gateway: G, store: S) -> Self {
        Self {
            gateway,
            store,
            builder: ContextBuilder::new(),
            state: LoopState::AwaitInput,
        }
    }

    #[must_use]
    pub fn with_context_builder(mut self, builder: ContextBuilder) -> Self {
        self.builder = builder;
        self
    }

    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Run until end of input or a fatal error.
    ///
    /// Input lines need not be valid UTF-8. Model failures are reported on `output` as `Error: ...` and the loop
    /// keeps going. Storage and I/O failures are returned.
    pub async fn run<R, W>(&mut self, mut input: R, mut output: W) -> Result<(), ConversationError>
    where
        R: BufRead,
        W: Write,
    {
        writeln!(output, "{BANNER}")?;
        let mut turns = 0_usize;

        loop {
            self.state = LoopState::AwaitInput;
            write!(output, "{USER_PROMPT}")?;
            output.flush()?;

            // Raw bytes: a badly encoded line is decoded lossily, never fatal.
            let mut buf = Vec::new();
            if let Err(e) = input.read_until(b'\n', &mut buf) {
                self.state = LoopState::Terminated;
                return Err(e.into());
            }
            if buf.is_empty() {
                writeln!(output)?;
                break;
            }
            let line = String::from_utf8_lossy(&buf);

            match self.submit(&line).await {
                Ok(Some(result)) => {
                    turns += 1;
                    writeln!(output, "{REPLY_PREFIX}{}", result.reply)?;

                    if let Some(usage) = result.usage {
                        debug!(
                            "Turn {} tokens: {} prompt + {} completion = {} total",
                            result.turn_number,
                            usage.prompt_tokens,
                            usage.completion_tokens,
                            usage.total_tokens
                        );
                    }
                }
                Ok(None) => {}
                Err(e) if e.is_fatal() => {
                    self.state = LoopState::Terminated;
                    return Err(e);
                }
                Err(e) => {
                    warn!("Turn discarded: {e}");
                    writeln!(output, "Error: {e}")?;
                }
            }
        }

        self.state = LoopState::Terminated;
        info!("Session ended after {turns} turns");
        Ok(())
    }

    /// Handle one raw input line.
    ///
    /// Blank lines are ignored and return `Ok(None)` without touching the
    /// store or the model.
    pub async fn submit(&mut self, line: &str) -> Result<Option<TurnResult>, ConversationError> {
        let input = line.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let result = self.process_turn(input).await;
        self.state = match &result {
            Err(e) if e.is_fatal() => LoopState::Terminated,
            _ => LoopState::AwaitInput,
        };
        result.map(Some)
    }

    async fn process_turn(&mut self, input: &str) -> Result<TurnResult, ConversationError> {
        self.state = LoopState::BuildingContext;
        let history: Vec<ChatMessage> = self
            .store
            .load_all()
            .await
            .map_err(ConversationError::Storage)?
            .into_iter()
            .map(ChatMessage::from)
            .collect();

        let turn_number = history.len() / 2 + 1;
        let context = self.builder.build(&history, input);
        info!(
            "Processing turn {turn_number}: {} stored messages, {} in context",
            history.len(),
            context.len()
        );

        self.state = LoopState::AwaitingModel;
        let response = self
            .gateway
            .complete(&context)
            .await
            .map_err(ConversationError::Model)?;

        if response.content.trim().is_empty() {
            return Err(ConversationError::EmptyResponse);
        }

        self.state = LoopState::Persisting;
        self.store
            .append_exchange(input, &response.content)
            .await
            .map_err(ConversationError::Storage)?;

        debug!("Turn {turn_number} persisted");

        Ok(TurnResult {
            reply: response.content,
            usage: response.usage,
            turn_number,
            context_len: context.len(),
        })
    }
}
