//! Database entities for the conversation log.

pub mod messages;
