// ABOUTME: Chat session repository backed by SQLite
// ABOUTME: Resolves the canonical (most recent) session of a thread and creates new ones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::SessionRepository;
use crate::database::{format_timestamp, parse_timestamp, storage_now, Database};
use crate::errors::DatabaseError;
use crate::models::{SessionRecord, SessionStatus};

/// SQLite implementation of `SessionRepository`
pub struct SessionRepositoryImpl {
    db: Database,
}

impl SessionRepositoryImpl {
    /// Create a new `SessionRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    fn row_to_session(row: &SqliteRow) -> Result<SessionRecord, DatabaseError> {
        let status: String = row.get("status");
        let created_at: String = row.get("created_at");
        Ok(SessionRecord {
            id: row.get("id"),
            report_id: row.get("report_id"),
            user_id: row.get("user_id"),
            model: row.get("model"),
            status: SessionStatus::from_str_or_default(&status),
            created_at: parse_timestamp("chat_sessions.created_at", &created_at)?,
        })
    }
}

#[async_trait]
impl SessionRepository for SessionRepositoryImpl {
    async fn latest_session(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> Result<Option<SessionRecord>, DatabaseError> {
        let row = sqlx::query(
            r"
            SELECT id, report_id, user_id, model, status, created_at
            FROM chat_sessions
            WHERE report_id = $1 AND user_id = $2
            ORDER BY created_at DESC, rowid DESC
            LIMIT 1
            ",
        )
        .bind(report_id)
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to get latest session", &e))?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn create_session(
        &self,
        report_id: &str,
        user_id: &str,
        model: Option<&str>,
    ) -> Result<SessionRecord, DatabaseError> {
        let id = Uuid::new_v4().to_string();
        let created_at = storage_now();

        sqlx::query(
            r"
            INSERT INTO chat_sessions (id, report_id, user_id, model, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&id)
        .bind(report_id)
        .bind(user_id)
        .bind(model)
        .bind(SessionStatus::Active.as_str())
        .bind(format_timestamp(&created_at))
        .execute(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to create session", &e))?;

        Ok(SessionRecord {
            id,
            report_id: report_id.to_owned(),
            user_id: user_id.to_owned(),
            model: model.map(ToOwned::to_owned),
            status: SessionStatus::Active,
            created_at,
        })
    }

    async fn list_sessions(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> Result<Vec<SessionRecord>, DatabaseError> {
        let rows = sqlx::query(
            r"
            SELECT id, report_id, user_id, model, status, created_at
            FROM chat_sessions
            WHERE report_id = $1 AND user_id = $2
            ORDER BY created_at DESC, rowid DESC
            ",
        )
        .bind(report_id)
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to list sessions", &e))?;

        rows.iter().map(Self::row_to_session).collect()
    }
}
