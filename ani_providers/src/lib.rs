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

pub mod retry;
pub mod xai;

pub use retry::retry_with_backoff;
pub use xai::{RequestPolicy, XAI_BASE_URL, XAI_MODEL, XaiProvider, parse_completion};
