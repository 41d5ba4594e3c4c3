// ABOUTME: Report ownership repository backed by SQLite
// ABOUTME: Answers "who owns this report" for the ownership guard
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;
use sqlx::Row;

use super::ReportRepository;
use crate::database::{format_timestamp, storage_now, Database};
use crate::errors::DatabaseError;

/// SQLite implementation of `ReportRepository`
pub struct ReportRepositoryImpl {
    db: Database,
}

impl ReportRepositoryImpl {
    /// Create a new `ReportRepository` with the given database connection
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReportRepository for ReportRepositoryImpl {
    async fn report_owner(&self, report_id: &str) -> Result<Option<String>, DatabaseError> {
        let row = sqlx::query("SELECT user_id FROM reports WHERE id = $1")
            .bind(report_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| DatabaseError::query("Failed to look up report owner", &e))?;

        Ok(row.map(|r| r.get("user_id")))
    }

    async fn register_report(
        &self,
        report_id: &str,
        user_id: &str,
        title: Option<&str>,
    ) -> Result<(), DatabaseError> {
        // Ownership never transfers: a conflicting owner leaves the row untouched
        sqlx::query(
            r"
            INSERT INTO reports (id, user_id, title, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT(id) DO UPDATE SET title = COALESCE(excluded.title, reports.title)
            WHERE reports.user_id = excluded.user_id
            ",
        )
        .bind(report_id)
        .bind(user_id)
        .bind(title)
        .bind(format_timestamp(&storage_now()))
        .execute(self.db.pool())
        .await
        .map_err(|e| DatabaseError::query("Failed to register report", &e))?;

        Ok(())
    }
}
