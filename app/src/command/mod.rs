//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy type with its own input, dispatched
//! statically from `main`.

use ani_config::{ContextConfig, ModelConfig};
use ani_conversation::{CharBudget, CompositePolicy, RecentMessages};
use ani_providers::RequestPolicy;
use std::time::Duration;

mod init;
mod sync;
mod version;

pub use init::InitStrategy;
pub use sync::{SyncInput, SyncStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Build the history selection policy from config.
///
/// With no limits configured the composite is empty and sends the full log.
fn build_context_policy(config: &ContextConfig) -> CompositePolicy {
    let mut policy = CompositePolicy::new();
    if let Some(limit) = config.history_limit {
        policy = policy.with(RecentMessages { limit });
    }
    if let Some(max_chars) = config.max_chars {
        policy = policy.with(CharBudget { max_chars });
    }
    policy
}

fn build_request_policy(config: &ModelConfig) -> RequestPolicy {
    RequestPolicy {
        timeout: config.request_timeout_secs.map(Duration::from_secs),
        retry_backoff: config
            .retry_backoff_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ani_conversation::ContextPolicy;
    use ani_core::ChatMessage;

    #[test]
    fn default_context_config_sends_full_history() {
        let policy = build_context_policy(&ContextConfig::default());
        assert!(policy.is_empty());

        let history: Vec<ChatMessage> =
            (0..50).map(|i| ChatMessage::user(format!("{i}"))).collect();
        assert_eq!(policy.select(&history).len(), 50);
    }

    #[test]
    fn history_limit_is_applied() {
        let policy = build_context_policy(&ContextConfig {
            history_limit: Some(4),
            max_chars: None,
        });

        let history: Vec<ChatMessage> =
            (0..10).map(|i| ChatMessage::user(format!("{i}"))).collect();
        let selected = policy.select(&history);
        assert_eq!(selected.len(), 4);
        assert_eq!(selected[0].content, "6");
    }

    #[test]
    fn default_request_policy_has_no_timeout_or_retry() {
        assert_eq!(
            build_request_policy(&ModelConfig::default()),
            RequestPolicy::default()
        );
    }

    #[test]
    fn request_policy_converts_units() {
        let policy = build_request_policy(&ModelConfig {
            request_timeout_secs: Some(30),
            retry_backoff_ms: vec![250, 1000],
        });

        assert_eq!(policy.timeout, Some(Duration::from_secs(30)));
        assert_eq!(
            policy.retry_backoff,
            vec![Duration::from_millis(250), Duration::from_secs(1)]
        );
    }
}
