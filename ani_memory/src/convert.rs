//! Row <-> domain conversions.

use ani_core::{Role, StoredMessage};
use ani_entities::messages;

pub fn model_to_message(model: messages::Model) -> anyhow::Result<StoredMessage> {
    let role: Role = model
        .role
        .parse()
        .map_err(|e| anyhow::anyhow!("corrupted message #{}: {e}", model.id))?;

    Ok(StoredMessage {
        id: i64::from(model.id),
        role,
        content: model.content,
        created_at: model.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> messages::Model {
        messages::Model {
            id: 7,
            role: role.to_string(),
            content: "hello".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn converts_known_role() {
        let message = model_to_message(row("assistant")).unwrap();
        assert_eq!(message.id, 7);
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.content, "hello");
    }

    #[test]
    fn rejects_unknown_role() {
        let err = model_to_message(row("narrator")).unwrap_err();
        assert!(err.to_string().contains("corrupted message #7"));
    }
}
