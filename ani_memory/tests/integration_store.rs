//! Integration tests for the SQLite message log.
//!
//! These tests verify that:
//! - Initialization is idempotent and keeps existing rows
//! - Reads return messages in append order
//! - Appended messages survive closing and reopening the file
//! - An exchange is stored as a whole or not at all

use ani_core::Role;
use ani_memory::{MessageStore, SqliteMessageStore, sqlite_url};
use sea_orm::{ConnectionTrait, Database};
use tempfile::TempDir;

fn temp_db() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ani_memory.db");
    (dir, path)
}

#[tokio::test]
async fn test_empty_log_loads_nothing() {
    let (_dir, path) = temp_db();
    let store = SqliteMessageStore::open(&path).await.unwrap();

    assert!(store.load_all().await.unwrap().is_empty());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_load_all_preserves_append_order() {
    let (_dir, path) = temp_db();
    let store = SqliteMessageStore::open(&path).await.unwrap();

    let script = [
        (Role::User, "hello"),
        (Role::Assistant, "hi there"),
        (Role::User, "how are you"),
        (Role::Assistant, "fine"),
    ];
    for (role, content) in script {
        store.append(role, content).await.unwrap();
    }

    let loaded = store.load_all().await.unwrap();
    let pairs: Vec<(Role, &str)> = loaded
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(pairs, script.to_vec());

    assert!(loaded.windows(2).all(|w| w[0].id < w[1].id));
}

#[tokio::test]
async fn test_init_twice_is_noop() {
    let (_dir, path) = temp_db();
    let store = SqliteMessageStore::open(&path).await.unwrap();
    store.append(Role::User, "remember me").await.unwrap();

    store.init().await.unwrap();
    store.init().await.unwrap();

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].content, "remember me");
}

#[tokio::test]
async fn test_messages_survive_reopen() {
    let (_dir, path) = temp_db();

    let store = SqliteMessageStore::open(&path).await.unwrap();
    store.append(Role::User, "hello").await.unwrap();
    store.append(Role::Assistant, "hi there").await.unwrap();
    store.close().await.unwrap();

    let reopened = SqliteMessageStore::open(&path).await.unwrap();
    assert_eq!(reopened.count().await.unwrap(), 2);

    reopened.append(Role::User, "again").await.unwrap();
    let loaded = reopened.load_all().await.unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[2].role, Role::User);
    assert_eq!(loaded[2].content, "again");
}

#[tokio::test]
async fn test_open_fails_for_missing_directory() {
    let (dir, _) = temp_db();
    let path = dir.path().join("no_such_dir").join("ani_memory.db");

    assert!(SqliteMessageStore::open(&path).await.is_err());
}

#[tokio::test]
async fn test_append_exchange_commits_pair() {
    let (_dir, path) = temp_db();
    let store = SqliteMessageStore::open(&path).await.unwrap();

    let (user, assistant) = store.append_exchange("hello", "hi there").await.unwrap();
    assert_eq!(user.role, Role::User);
    assert_eq!(assistant.role, Role::Assistant);
    assert!(assistant.id > user.id);

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded, vec![user, assistant]);
}

#[tokio::test]
async fn test_append_exchange_rolls_back_on_failed_reply_insert() {
    let (_dir, path) = temp_db();
    let store = SqliteMessageStore::open(&path).await.unwrap();
    store.append_exchange("hello", "hi there").await.unwrap();

    // Make every further assistant insert fail inside the database
    let admin = Database::connect(&sqlite_url(&path)).await.unwrap();
    admin
        .execute_unprepared(
            "CREATE TRIGGER reject_assistant BEFORE INSERT ON messages \
             WHEN NEW.role = 'assistant' BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .await
        .unwrap();

    assert!(store.append_exchange("how are you", "fine").await.is_err());

    let loaded = store.load_all().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[1].content, "hi there");
}
