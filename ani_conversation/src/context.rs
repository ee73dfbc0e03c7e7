//! Context window assembly.
//!
//! A context window is always `[preamble] ++ selected history ++ [new user message]`.
//! Which part of the stored history is selected is decided by a
//! [`ContextPolicy`]; the default sends all of it.

use ani_core::{ChatMessage, Role, preamble};
use std::fmt::Debug;

/// Chooses which stored messages go into the next request.
///
/// Implementations must return a subsequence of `history` in its original order.
pub trait ContextPolicy: Debug + Send + Sync {
    fn select(&self, history: &[ChatMessage]) -> Vec<ChatMessage>;
}

/// Every stored message, unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullHistory;

impl ContextPolicy for FullHistory {
    fn select(&self, history: &[ChatMessage]) -> Vec<ChatMessage> {
        history.to_vec()
    }
}

/// Move `start` forward past replies whose user message was cut off, so the
/// selection begins on a turn boundary.
fn align_to_turn(history: &[ChatMessage], mut start: usize) -> usize {
    while start < history.len() && history[start].role == Role::Assistant {
        start += 1;
    }
    start
}

/// At most the last `limit` messages, starting on a turn boundary.
#[derive(Debug, Clone, Copy)]
pub struct RecentMessages {
    pub limit: usize,
}

impl ContextPolicy for RecentMessages {
    fn select(&self, history: &[ChatMessage]) -> Vec<ChatMessage> {
        let start = align_to_turn(history, history.len().saturating_sub(self.limit));
        history[start..].to_vec()
    }
}

/// The newest messages whose contents fit in `max_chars` characters,
/// starting on a turn boundary.
#[derive(Debug, Clone, Copy)]
pub struct CharBudget {
    pub max_chars: usize,
}

impl ContextPolicy for CharBudget {
    fn select(&self, history: &[ChatMessage]) -> Vec<ChatMessage> {
        let mut total_chars = 0_usize;
        let mut start = history.len();

        // Walk back from the newest message
        for (idx, msg) in history.iter().enumerate().rev() {
            let len = msg.content.chars().count();
            if total_chars + len > self.max_chars {
                break;
            }
            total_chars += len;
            start = idx;
        }

        history[align_to_turn(history, start)..].to_vec()
    }
}

/// Applies each policy to the output of the previous one.
#[derive(Debug, Default)]
pub struct CompositePolicy {
    policies: Vec<Box<dyn ContextPolicy>>,
}

impl CompositePolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, policy: impl ContextPolicy + 'static) -> Self {
        self.policies.push(Box::new(policy));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl ContextPolicy for CompositePolicy {
    fn select(&self, history: &[ChatMessage]) -> Vec<ChatMessage> {
        self.policies
            .iter()
            .fold(history.to_vec(), |selected, policy| policy.select(&selected))
    }
}

/// Builds model-ready message sequences.
#[derive(Debug)]
pub struct ContextBuilder {
    preamble: ChatMessage,
    policy: Box<dyn ContextPolicy>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextBuilder {
    /// Persona preamble with the full-history policy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            preamble: preamble(),
            policy: Box::new(FullHistory),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: impl ContextPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// `[preamble] ++ policy(history) ++ [user: input]`
    #[must_use]
    pub fn build(&self, history: &[ChatMessage], input: &str) -> Vec<ChatMessage> {
        let selected = self.policy.select(history);

        let mut messages = Vec::with_capacity(selected.len() + 2);
        messages.push(self.preamble.clone());
        messages.extend(selected);
        messages.push(ChatMessage::user(input));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_messages(count: usize) -> Vec<ChatMessage> {
        (0..count)
            .map(|i| {
                if i % 2 == 0 {
                    ChatMessage::user(format!("Message {i}: {}", "x".repeat(100)))
                } else {
                    ChatMessage::assistant(format!("Message {i}: {}", "x".repeat(100)))
                }
            })
            .collect()
    }

    #[test]
    fn test_full_history_context() {
        let builder = ContextBuilder::new();
        let history = create_test_messages(10);

        let messages = builder.build(&history, "New message");

        assert_eq!(messages.len(), history.len() + 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(&messages[1..=10], history.as_slice());
        assert_eq!(messages[11], ChatMessage::user("New message"));
    }

    #[test]
    fn test_empty_history_context() {
        let messages = ContextBuilder::new().build(&[], "hello");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], preamble());
        assert_eq!(messages[1], ChatMessage::user("hello"));
    }

    #[test]
    fn test_recent_messages_policy() {
        let builder = ContextBuilder::new().with_policy(RecentMessages { limit: 4 });
        let history = create_test_messages(10);

        let messages = builder.build(&history, "New message");

        // System + last 4 history + new message
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[1], history[6]);
        assert_eq!(messages[4], history[9]);
    }

    #[test]
    fn test_recent_messages_never_starts_with_reply() {
        let history = create_test_messages(10);
        let selected = RecentMessages { limit: 3 }.select(&history);

        // The cut would land on history[7], an assistant reply
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].role, Role::User);
        assert_eq!(selected[0], history[8]);
    }

    #[test]
    fn test_char_budget_never_starts_with_reply() {
        let history = vec![
            ChatMessage::user("u".repeat(40)),
            ChatMessage::assistant("a".repeat(10)),
            ChatMessage::user("u".repeat(10)),
            ChatMessage::assistant("a".repeat(10)),
        ];

        // 30 chars fit the last three messages; the leading reply is dropped
        let selected = CharBudget { max_chars: 30 }.select(&history);
        assert_eq!(selected, history[2..].to_vec());
    }

    #[test]
    fn test_char_budget_keeps_newest() {
        let history = create_test_messages(20);
        let selected = CharBudget { max_chars: 500 }.select(&history);

        let total_chars: usize = selected.iter().map(|m| m.content.len()).sum();
        assert!(total_chars <= 500);
        assert!(!selected.is_empty());
        assert_eq!(selected.last(), history.last());
    }

    #[test]
    fn test_char_budget_drops_everything_when_newest_too_long() {
        let history = vec![ChatMessage::user("x".repeat(50))];
        assert!(CharBudget { max_chars: 10 }.select(&history).is_empty());
    }

    #[test]
    fn test_composite_policy_applies_in_order() {
        let history = create_test_messages(10);
        let policy = CompositePolicy::new()
            .with(RecentMessages { limit: 6 })
            .with(CharBudget { max_chars: 250 });

        let selected = policy.select(&history);

        assert_eq!(selected.len(), 2);
        assert_eq!(selected, history[8..].to_vec());
    }

    #[test]
    fn test_empty_composite_is_full_history() {
        let history = create_test_messages(4);
        let policy = CompositePolicy::new();

        assert!(policy.is_empty());
        assert_eq!(policy.select(&history), history);
    }
}
