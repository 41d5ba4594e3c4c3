// ABOUTME: Running summary repository backed by SQLite
// ABOUTME: Single row per report, upserted in place with a non-decreasing coverage boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::SummaryRepository;
use crate::database::{format_timestamp, parse_timestamp, storage_now, Database};
use crate::errors::DatabaseError;
use crate::models::SummaryRecord;

/// SQLite implementation of `SummaryRepository`
pub struct SummaryRepositoryImpl {
    db: Database,
}

impl SummaryRepositoryImpl {
    /// Create a new `SummaryRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    fn row_to_summary(row: &SqliteRow) -> Result<SummaryRecord, DatabaseError> {
        let coverage: String = row.get("coverage_up_to");
        let updated_at: String = row.get("updated_at");
        Ok(SummaryRecord {
            id: row.get("id"),
            report_id: row.get("report_id"),
            session_id: row.get("session_id"),
            summary: row.get("summary"),
            coverage_up_to: parse_timestamp("chat_summaries.coverage_up_to", &coverage)?,
            updated_at: parse_timestamp("chat_summaries.updated_at", &updated_at)?,
        })
    }
}

#[async_trait]
impl SummaryRepository for SummaryRepositoryImpl {
    async fn get(&self, report_id: &str) -> Result<Option<SummaryRecord>, DatabaseError> {
        let row = sqlx::query(
            r"
            SELECT id, report_id, session_id, summary, coverage_up_to, updated_at
            FROM chat_summaries
            WHERE report_id = $1
            ",
        )
        .bind(report_id)
        .fetch_optional(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to get summary", &e))?;

        row.as_ref().map(Self::row_to_summary).transpose()
    }

    async fn upsert(
        &self,
        report_id: &str,
        session_id: Option<&str>,
        summary: &str,
        coverage_up_to: DateTime<Utc>,
    ) -> Result<SummaryRecord, DatabaseError> {
        // A stale compaction (older boundary) must not replace a newer digest
        let row = sqlx::query(
            r"
            INSERT INTO chat_summaries (id, report_id, session_id, summary, coverage_up_to, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT(report_id) DO UPDATE SET
                session_id = excluded.session_id,
                summary = excluded.summary,
                coverage_up_to = excluded.coverage_up_to,
                updated_at = excluded.updated_at
            WHERE excluded.coverage_up_to >= chat_summaries.coverage_up_to
            RETURNING id, report_id, session_id, summary, coverage_up_to, updated_at
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(report_id)
        .bind(session_id)
        .bind(summary)
        .bind(format_timestamp(&coverage_up_to))
        .bind(format_timestamp(&storage_now()))
        .fetch_optional(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to upsert summary", &e))?;

        if let Some(row) = row {
            return Self::row_to_summary(&row);
        }

        self.get(report_id)
            .await?
            .ok_or_else(|| DatabaseError::QueryError {
                context: format!("Summary for report {report_id} vanished during upsert"),
            })
    }
}
