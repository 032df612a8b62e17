//! Repository for message data access operations.

use crate::entities::{Message, MessageRole};
use crate::types::{MessageError, MessageResult};
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

/// Repository for message database operations
///
/// Holds an injected pool; every call checks out its own connection, and
/// every mutating call runs inside its own transaction. Uniqueness of
/// `message_id` is enforced by the PRIMARY KEY constraint rather than a
/// read-before-write, so concurrent creates with the same identifier
/// resolve to exactly one success and one `AlreadyExists`.
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new message record
    pub async fn create(&self, message: &Message) -> MessageResult<Message> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let result = sqlx::query(
            "INSERT INTO messages (message_id, chat_id, content, rating, sent_at, role)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(message.message_id.to_string())
        .bind(message.chat_id.to_string())
        .bind(&message.content)
        .bind(message.rating)
        .bind(message.sent_at.to_rfc3339())
        .bind(message.role.as_str())
        .execute(&mut *tx)
        .await;

        if let Err(e) = result {
            tx.rollback().await.ok();
            return Err(classify_insert_error(e));
        }

        tx.commit().await.map_err(storage_error)?;

        info!(
            message_id = %message.message_id,
            chat_id = %message.chat_id,
            "created message"
        );

        Ok(message.clone())
    }

    /// Find a message by its identifier
    pub async fn find_by_id(&self, message_id: Uuid) -> MessageResult<Message> {
        let row = sqlx::query(
            "SELECT message_id, chat_id, content, rating, sent_at, role
             FROM messages WHERE message_id = ?",
        )
        .bind(message_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        match row {
            Some(row) => row_to_message(&row),
            None => Err(MessageError::NotFound),
        }
    }

    /// List messages with pagination.
    ///
    /// Ordered by `sent_at` with `message_id` breaking ties, so pagination
    /// sees the same total order on every call.
    pub async fn list(&self, skip: i64, limit: i64) -> MessageResult<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT message_id, chat_id, content, rating, sent_at, role
             FROM messages ORDER BY sent_at, message_id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.iter().map(row_to_message).collect()
    }

    /// Replace the content of an existing message.
    ///
    /// The update and the re-read of the stored row share one transaction,
    /// so the returned record is exactly what was committed.
    pub async fn update_content(&self, message_id: Uuid, content: &str) -> MessageResult<Message> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let result = sqlx::query("UPDATE messages SET content = ? WHERE message_id = ?")
            .bind(content)
            .bind(message_id.to_string())
            .execute(&mut *tx)
            .await;

        let affected = match result {
            Ok(done) => done.rows_affected(),
            Err(e) => {
                tx.rollback().await.ok();
                return Err(storage_error(e));
            }
        };

        if affected == 0 {
            tx.rollback().await.ok();
            return Err(MessageError::NotFound);
        }

        let row = sqlx::query(
            "SELECT message_id, chat_id, content, rating, sent_at, role
             FROM messages WHERE message_id = ?",
        )
        .bind(message_id.to_string())
        .fetch_one(&mut *tx)
        .await;

        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tx.rollback().await.ok();
                return Err(storage_error(e));
            }
        };

        let message = row_to_message(&row)?;
        tx.commit().await.map_err(storage_error)?;

        info!(message_id = %message_id, "updated message content");

        Ok(message)
    }

    /// Remove a message record
    pub async fn delete(&self, message_id: Uuid) -> MessageResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        let result = sqlx::query("DELETE FROM messages WHERE message_id = ?")
            .bind(message_id.to_string())
            .execute(&mut *tx)
            .await;

        let affected = match result {
            Ok(done) => done.rows_affected(),
            Err(e) => {
                tx.rollback().await.ok();
                return Err(storage_error(e));
            }
        };

        if affected == 0 {
            tx.rollback().await.ok();
            return Err(MessageError::NotFound);
        }

        tx.commit().await.map_err(storage_error)?;

        info!(message_id = %message_id, "deleted message");

        Ok(())
    }
}

fn storage_error(error: sqlx::Error) -> MessageError {
    MessageError::DatabaseError(error.to_string())
}

fn classify_insert_error(error: sqlx::Error) -> MessageError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => MessageError::AlreadyExists,
        _ => storage_error(error),
    }
}

fn row_to_message(row: &SqliteRow) -> MessageResult<Message> {
    let message_id: String = row.try_get("message_id").map_err(storage_error)?;
    let chat_id: String = row.try_get("chat_id").map_err(storage_error)?;
    let sent_at: String = row.try_get("sent_at").map_err(storage_error)?;
    let role: String = row.try_get("role").map_err(storage_error)?;

    Ok(Message {
        message_id: Uuid::parse_str(&message_id)
            .map_err(|e| MessageError::DatabaseError(e.to_string()))?,
        chat_id: Uuid::parse_str(&chat_id)
            .map_err(|e| MessageError::DatabaseError(e.to_string()))?,
        content: row.try_get("content").map_err(storage_error)?,
        rating: row.try_get("rating").map_err(storage_error)?,
        sent_at: DateTime::parse_from_rfc3339(&sent_at)
            .map_err(|e| MessageError::DatabaseError(e.to_string()))?
            .with_timezone(&Utc),
        role: MessageRole::from(role.as_str()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::prepare_database;
    use crate::migrations::run_migrations;
    use chatvault_config::DatabaseConfig;
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_messages.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let config = DatabaseConfig {
            url: db_url,
            max_connections: 1,
        };

        let pool = prepare_database(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();

        (pool, temp_dir)
    }

    fn sample_message(sent_at: &str) -> Message {
        Message {
            message_id: Uuid::new_v4(),
            chat_id: Uuid::new_v4(),
            content: "hello".to_string(),
            rating: false,
            sent_at: sent_at.parse().unwrap(),
            role: MessageRole::User,
        }
    }

    async fn count_messages(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        let message = sample_message("2025-12-29T12:00:00Z");
        let created = repo.create(&message).await.unwrap();
        assert_eq!(created, message);

        let found = repo.find_by_id(message.message_id).await.unwrap();
        assert_eq!(found, message);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_conflict() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool.clone());

        let message = sample_message("2025-12-29T12:00:00Z");
        repo.create(&message).await.unwrap();

        let mut duplicate = message.clone();
        duplicate.content = "different content".to_string();
        let err = repo.create(&duplicate).await.unwrap_err();
        assert!(matches!(err, MessageError::AlreadyExists));

        // Failed insert leaves the store untouched
        assert_eq!(count_messages(&pool).await, 1);
        let stored = repo.find_by_id(message.message_id).await.unwrap();
        assert_eq!(stored.content, "hello");
    }

    #[tokio::test]
    async fn test_find_missing_is_not_found() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        let err = repo.find_by_id(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, MessageError::NotFound));
    }

    #[tokio::test]
    async fn test_update_content_replaces_only_content() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        let message = sample_message("2025-12-29T12:00:00Z");
        repo.create(&message).await.unwrap();

        let updated = repo
            .update_content(message.message_id, "updated content")
            .await
            .unwrap();
        assert_eq!(updated.content, "updated content");
        assert_eq!(updated.message_id, message.message_id);
        assert_eq!(updated.chat_id, message.chat_id);
        assert_eq!(updated.rating, message.rating);
        assert_eq!(updated.sent_at, message.sent_at);
        assert_eq!(updated.role, message.role);

        let found = repo.find_by_id(message.message_id).await.unwrap();
        assert_eq!(found, updated);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        let err = repo
            .update_content(Uuid::new_v4(), "content")
            .await
            .unwrap_err();
        assert!(matches!(err, MessageError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_then_find_is_not_found() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        let message = sample_message("2025-12-29T12:00:00Z");
        repo.create(&message).await.unwrap();

        repo.delete(message.message_id).await.unwrap();

        let err = repo.find_by_id(message.message_id).await.unwrap_err();
        assert!(matches!(err, MessageError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        let err = repo.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, MessageError::NotFound));
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        let first = sample_message("2025-12-29T10:00:00Z");
        let second = sample_message("2025-12-29T11:00:00Z");
        let third = sample_message("2025-12-29T12:00:00Z");
        repo.create(&third).await.unwrap();
        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();

        let page = repo.list(0, 2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].message_id, first.message_id);
        assert_eq!(page[1].message_id, second.message_id);

        let rest = repo.list(2, 100).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].message_id, third.message_id);

        assert!(repo.list(0, 0).await.unwrap().is_empty());
        assert!(repo.list(5, 100).await.unwrap().is_empty());

        let all = repo.list(0, 100).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_list_order_breaks_sent_at_ties_by_id() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = MessageRepository::new(pool);

        let mut ids = Vec::new();
        for _ in 0..3 {
            let message = sample_message("2025-12-29T12:00:00Z");
            ids.push(message.message_id);
            repo.create(&message).await.unwrap();
        }
        ids.sort_by_key(|id| id.to_string());

        let listed: Vec<Uuid> = repo
            .list(0, 100)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.message_id)
            .collect();
        assert_eq!(listed, ids);
    }
}
