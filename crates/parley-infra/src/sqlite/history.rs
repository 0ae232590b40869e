//! SQLite chat history store.
//!
//! Implements `HistoryStore` from `parley-core` using sqlx with split
//! read/write pools. The transcript is stored as a single JSON array
//! under a fixed key and replaced wholesale on every save.

use chrono::Utc;
use parley_core::storage::HistoryStore;
use parley_types::chat::Message;
use parley_types::error::HistoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// Storage key for the cached transcript.
pub const HISTORY_KEY: &str = "refund-agent-history";

/// SQLite-backed implementation of `HistoryStore`.
pub struct SqliteHistoryStore {
    pool: DatabasePool,
}

impl SqliteHistoryStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl HistoryStore for SqliteHistoryStore {
    async fn load(&self) -> Result<Option<Vec<Message>>, HistoryError> {
        let row = sqlx::query("SELECT value FROM chat_history WHERE key = ?")
            .bind(HISTORY_KEY)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| HistoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let value: String = row
                    .try_get("value")
                    .map_err(|e| HistoryError::Query(e.to_string()))?;
                let messages: Vec<Message> = serde_json::from_str(&value)
                    .map_err(|e| HistoryError::Malformed(e.to_string()))?;
                Ok(Some(messages))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, messages: &[Message]) -> Result<(), HistoryError> {
        let value = serde_json::to_string(messages)
            .map_err(|e| HistoryError::Query(format!("failed to serialize transcript: {e}")))?;
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO chat_history (key, value, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(HISTORY_KEY)
        .bind(&value)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| HistoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), HistoryError> {
        sqlx::query("DELETE FROM chat_history WHERE key = ?")
            .bind(HISTORY_KEY)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| HistoryError::Query(e.to_string()))?;

        Ok(())
    }
}
