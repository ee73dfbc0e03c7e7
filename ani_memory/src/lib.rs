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

//! Durable conversation log backed by SQLite.

mod convert;
mod manager;

// Re-export MessageStore so SqliteMessageStore can be used without importing ani_core
pub use ani_core::MessageStore;

pub use manager::{SqliteMessageStore, sqlite_url};
