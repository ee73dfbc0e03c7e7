use ani_core::{MessageStore, Role, StoredMessage};
use ani_entities::messages;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryOrder, Schema, Set, TransactionTrait,
};
use std::path::Path;
use tracing::{debug, info};

use crate::convert::model_to_message;

/// Connection string for a SQLite file, creating it if it does not exist.
#[must_use]
pub fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

/// `MessageStore` persisted in a single SQLite table.
///
/// Single appends run in autocommit mode and exchanges in one transaction,
/// so messages are on disk by the time the call returns. `id` is `AUTOINCREMENT` and never reused, which makes it
/// the ordering key for reads.
pub struct SqliteMessageStore {
    db: DatabaseConnection,
}

impl SqliteMessageStore {
    /// Open (or create) the log at `path` and make sure the table exists.
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        Self::connect(&sqlite_url(path)).await
    }

    /// Connect with an explicit database URL.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        info!("Connecting to database: {}", database_url);
        let db = Database::connect(database_url).await?;
        let store = Self { db };
        store.init().await?;
        info!("SqliteMessageStore initialized");
        Ok(store)
    }

    /// Create the `messages` table. Safe to call on an existing log.
    pub async fn init(&self) -> anyhow::Result<()> {
        let builder = self.db.get_database_backend();
        let schema = Schema::new(builder);
        let mut stmt = schema.create_table_from_entity(messages::Entity);
        stmt.if_not_exists();

        self.db
            .execute_unprepared(&builder.build(&stmt).to_string())
            .await?;
        Ok(())
    }

    /// Number of messages in the log.
    pub async fn count(&self) -> anyhow::Result<u64> {
        Ok(messages::Entity::find().count(&self.db).await?)
    }

    /// Close the underlying connection pool.
    pub async fn close(self) -> anyhow::Result<()> {
        self.db.close().await?;
        Ok(())
    }
}

fn new_row(role: Role, content: &str) -> messages::ActiveModel {
    messages::ActiveModel {
        role: Set(role.as_str().to_string()),
        content: Set(content.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn append(&self, role: Role, content: &str) -> anyhow::Result<StoredMessage> {
        let model = new_row(role, content).insert(&self.db).await?;

        debug!("Appended {} message #{}", role, model.id);
        model_to_message(model)
    }

    async fn append_exchange(
        &self,
        user: &str,
        assistant: &str,
    ) -> anyhow::Result<(StoredMessage, StoredMessage)> {
        // Dropping the transaction on an early return rolls both rows back.
        let txn = self.db.begin().await?;
        let user_row = new_row(Role::User, user).insert(&txn).await?;
        let assistant_row = new_row(Role::Assistant, assistant).insert(&txn).await?;
        txn.commit().await?;

        debug!(
            "Appended exchange #{} / #{}",
            user_row.id, assistant_row.id
        );
        Ok((model_to_message(user_row)?, model_to_message(assistant_row)?))
    }

    async fn load_all(&self) -> anyhow::Result<Vec<StoredMessage>> {
        let rows = messages::Entity::find()
            .order_by_asc(messages::Column::Id)
            .all(&self.db)
            .await?;

        debug!("Loaded {} messages", rows.len());
        rows.into_iter().map(model_to_message).collect()
    }
}
