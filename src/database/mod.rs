// ABOUTME: SQLite connection management and schema migrations for chat memory
// ABOUTME: Owns the pool and the fixed-width timestamp encoding shared by all repositories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! One SQLite database holds reports (ownership only), sessions, messages and the
//! per-report running summary. Timestamps are stored as fixed-width RFC 3339 UTC
//! strings with microsecond precision, so string comparison in SQL is chronological
//! comparison.

/// Narrow per-entity repository interfaces and their SQLite implementations
pub mod repositories;

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::config::DatabaseUrl;
use crate::errors::{AppResult, DatabaseError};

/// Default pool size for file-backed databases
const FILE_POOL_MAX_CONNECTIONS: u32 = 5;

/// Database handle shared by every repository
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to `database_url` and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened or migrations fail
    pub async fn new(database_url: &str) -> AppResult<Self> {
        Self::connect(&DatabaseUrl::parse_url(database_url)).await
    }

    /// Connect to a parsed target and run migrations
    ///
    /// In-memory databases use exactly one long-lived connection; every pooled
    /// connection to `:memory:` would otherwise open a distinct empty database.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened or migrations fail
    pub async fn connect(url: &DatabaseUrl) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| DatabaseError::ConnectionError {
                context: format!("Invalid database URL {url}: {e}"),
            })?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if url.is_memory() {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(FILE_POOL_MAX_CONNECTIONS)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionError {
                context: format!("Failed to open {url}: {e}"),
            })?;

        info!(database = %url, "Connected to chat database");

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| DatabaseError::MigrationError {
                    context: e.to_string(),
                })?;
        }
        debug!(statements = SCHEMA.len(), "Chat schema migrated");
        Ok(())
    }
}

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS reports (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        title TEXT,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS chat_sessions (
        id TEXT PRIMARY KEY,
        report_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        model TEXT,
        status TEXT NOT NULL DEFAULT 'active',
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_chat_sessions_thread
        ON chat_sessions (report_id, user_id, created_at)
    ",
    r"
    CREATE TABLE IF NOT EXISTS chat_messages (
        id TEXT PRIMARY KEY,
        session_id TEXT NOT NULL REFERENCES chat_sessions(id) ON DELETE CASCADE,
        report_id TEXT NOT NULL,
        user_id TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('user', 'assistant', 'system')),
        content TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_chat_messages_thread
        ON chat_messages (report_id, user_id, created_at)
    ",
    r"
    CREATE TABLE IF NOT EXISTS chat_summaries (
        id TEXT PRIMARY KEY,
        report_id TEXT NOT NULL UNIQUE,
        session_id TEXT REFERENCES chat_sessions(id) ON DELETE SET NULL,
        summary TEXT NOT NULL,
        coverage_up_to TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
];

/// Encode a timestamp in the fixed-width stored form
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored timestamp
///
/// # Errors
///
/// Returns `InvalidData` naming `field` if the value is not RFC 3339
pub fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DatabaseError::InvalidData {
            field: field.to_owned(),
            reason: format!("'{value}': {e}"),
        })
}

/// Current time at storage precision
#[must_use]
pub fn storage_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
