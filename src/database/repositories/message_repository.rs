// ABOUTME: Raw chat message repository backed by SQLite
// ABOUTME: Inserts, ordered range selects, byte-sum aggregation and cutoff deletes per thread
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::{MessageRepository, NewMessage};
use crate::database::{format_timestamp, parse_timestamp, Database};
use crate::errors::DatabaseError;
use crate::models::{MessageRecord, MessageRole};

const MESSAGE_COLUMNS: &str = "id, session_id, report_id, user_id, role, content, created_at";

/// SQLite implementation of `MessageRepository`
pub struct MessageRepositoryImpl {
    db: Database,
}

impl MessageRepositoryImpl {
    /// Create a new `MessageRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    fn row_to_message(row: &SqliteRow) -> Result<MessageRecord, DatabaseError> {
        let role: String = row.get("role");
        let created_at: String = row.get("created_at");
        Ok(MessageRecord {
            id: row.get("id"),
            session_id: row.get("session_id"),
            report_id: row.get("report_id"),
            user_id: row.get("user_id"),
            role: MessageRole::from_str(&role).map_err(|e| DatabaseError::InvalidData {
                field: "chat_messages.role".to_owned(),
                reason: e.message,
            })?,
            content: row.get("content"),
            created_at: parse_timestamp("chat_messages.created_at", &created_at)?,
        })
    }

    fn to_u64(value: i64) -> u64 {
        u64::try_from(value).unwrap_or(0)
    }
}

#[async_trait]
impl MessageRepository for MessageRepositoryImpl {
    async fn insert(&self, message: NewMessage<'_>) -> Result<MessageRecord, DatabaseError> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r"
            INSERT INTO chat_messages (id, session_id, report_id, user_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&id)
        .bind(message.session_id)
        .bind(message.report_id)
        .bind(message.user_id)
        .bind(message.role.as_str())
        .bind(message.content)
        .bind(format_timestamp(&message.created_at))
        .execute(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to insert message", &e))?;

        Ok(MessageRecord {
            id,
            session_id: message.session_id.to_owned(),
            report_id: message.report_id.to_owned(),
            user_id: message.user_id.to_owned(),
            role: message.role,
            content: message.content.to_owned(),
            created_at: message.created_at,
        })
    }

    async fn count(&self, report_id: &str, user_id: &str) -> Result<u64, DatabaseError> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) AS count
            FROM chat_messages
            WHERE report_id = $1 AND user_id = $2
            ",
        )
        .bind(report_id)
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to count messages", &e))?;

        Ok(Self::to_u64(row.get("count")))
    }

    async fn total_bytes(&self, report_id: &str, user_id: &str) -> Result<u64, DatabaseError> {
        // LENGTH on a BLOB counts bytes; on TEXT it would count characters
        let row = sqlx::query(
            r"
            SELECT COALESCE(SUM(LENGTH(CAST(content AS BLOB))), 0) AS total
            FROM chat_messages
            WHERE report_id = $1 AND user_id = $2
            ",
        )
        .bind(report_id)
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to sum message bytes", &e))?;

        Ok(Self::to_u64(row.get("total")))
    }

    async fn latest_created_at(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        let row = sqlx::query(
            r"
            SELECT MAX(created_at) AS latest
            FROM chat_messages
            WHERE report_id = $1 AND user_id = $2
            ",
        )
        .bind(report_id)
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to get latest message time", &e))?;

        let latest: Option<String> = row.get("latest");
        latest
            .map(|value| parse_timestamp("chat_messages.created_at", &value))
            .transpose()
    }

    async fn list_ascending(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> Result<Vec<MessageRecord>, DatabaseError> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {MESSAGE_COLUMNS}
            FROM chat_messages
            WHERE report_id = $1 AND user_id = $2
            ORDER BY created_at ASC, rowid ASC
            "
        ))
        .bind(report_id)
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to list messages", &e))?;

        rows.iter().map(Self::row_to_message).collect()
    }

    async fn list_recent(
        &self,
        report_id: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, DatabaseError> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {MESSAGE_COLUMNS}
            FROM chat_messages
            WHERE report_id = $1 AND user_id = $2
            ORDER BY created_at DESC, rowid DESC
            LIMIT $3
            "
        ))
        .bind(report_id)
        .bind(user_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to get recent messages", &e))?;

        rows.iter().map(Self::row_to_message).collect()
    }

    async fn delete_up_to(
        &self,
        report_id: &str,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r"
            DELETE FROM chat_messages
            WHERE report_id = $1 AND user_id = $2 AND created_at <= $3
            ",
        )
        .bind(report_id)
        .bind(user_id)
        .bind(format_timestamp(&cutoff))
        .execute(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to prune summarized messages", &e))?;

        Ok(result.rows_affected())
    }

    async fn delete_older_than(
        &self,
        report_id: &str,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r"
            DELETE FROM chat_messages
            WHERE report_id = $1 AND user_id = $2 AND created_at < $3
            ",
        )
        .bind(report_id)
        .bind(user_id)
        .bind(format_timestamp(&cutoff))
        .execute(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to delete expired messages", &e))?;

        Ok(result.rows_affected())
    }
}
