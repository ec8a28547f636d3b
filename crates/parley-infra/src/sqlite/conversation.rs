//! SQLite conversation log.
//!
//! One row per answered prompt. Written by the host after the reply is
//! produced; nothing in dispatch reads it.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use parley_types::error::RepositoryError;

use super::pool::DatabasePool;
use super::usage::{format_datetime, parse_datetime};

/// A logged prompt and the reply that was shown for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationEntry {
    pub id: Uuid,
    pub user_id: String,
    pub message: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

pub struct SqliteConversationLog {
    pool: DatabasePool,
}

impl SqliteConversationLog {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Record a prompt/reply pair.
    pub async fn save(
        &self,
        user_id: &str,
        message: &str,
        response: &str,
    ) -> Result<ConversationEntry, RepositoryError> {
        let entry = ConversationEntry {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            message: message.to_string(),
            response: response.to_string(),
            timestamp: Utc::now(),
        };

        sqlx::query(
            r#"INSERT INTO conversations (id, user_id, message, response, timestamp)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(entry.id.to_string())
        .bind(&entry.user_id)
        .bind(&entry.message)
        .bind(&entry.response)
        .bind(format_datetime(&entry.timestamp))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(entry)
    }

    /// Most recent entries for a user, newest first.
    pub async fn recent(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<ConversationEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM conversations WHERE user_id = ? ORDER BY timestamp DESC, id DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id").map_err(|e| RepositoryError::Query(e.to_string()))?;
                let timestamp: String = row
                    .try_get("timestamp")
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(ConversationEntry {
                    id: Uuid::parse_str(&id)
                        .map_err(|e| RepositoryError::Query(format!("invalid id: {e}")))?,
                    user_id: row
                        .try_get("user_id")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                    message: row
                        .try_get("message")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                    response: row
                        .try_get("response")
                        .map_err(|e| RepositoryError::Query(e.to_string()))?,
                    timestamp: parse_datetime(&timestamp)?,
                })
            })
            .collect()
    }
}
