#![warn(
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

//! Conversation turn loop with durable memory.
//!
//! # Key Features
//! - Full stored history sent with every request by default
//! - Pluggable context selection policies
//! - Exchanges persisted only after a successful reply
//! - Typed errors separating fatal storage faults from recoverable model faults

mod context;
mod manager;

pub use context::{
    CharBudget, CompositePolicy, ContextBuilder, ContextPolicy, FullHistory, RecentMessages,
};
pub use manager::{
    BANNER, ConversationError, ConversationLoop, LoopState, REPLY_PREFIX, TurnResult, USER_PROMPT,
};
