// ABOUTME: Repository interfaces for reports, sessions, messages and summaries
// ABOUTME: Each trait exposes only the operations the memory components need
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Repositories
//!
//! The memory components never build SQL. They talk to these traits, which any
//! relational or document store can satisfy. [`Repositories::sqlite`] wires the
//! bundled SQLite implementations.

mod message_repository;
mod report_repository;
mod session_repository;
mod summary_repository;

pub use message_repository::MessageRepositoryImpl;
pub use report_repository::ReportRepositoryImpl;
pub use session_repository::SessionRepositoryImpl;
pub use summary_repository::SummaryRepositoryImpl;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::Database;
use crate::errors::DatabaseError;
use crate::models::{MessageRecord, MessageRole, SessionRecord, SummaryRecord};

/// Report ownership lookups
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Owner of `report_id`, or `None` when no such report exists
    async fn report_owner(&self, report_id: &str) -> Result<Option<String>, DatabaseError>;

    /// Record that `user_id` owns `report_id` (idempotent for the same owner)
    async fn register_report(
        &self,
        report_id: &str,
        user_id: &str,
        title: Option<&str>,
    ) -> Result<(), DatabaseError>;
}

/// Chat session persistence
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Most recently created session for the thread
    async fn latest_session(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> Result<Option<SessionRecord>, DatabaseError>;

    /// Insert a fresh active session
    async fn create_session(
        &self,
        report_id: &str,
        user_id: &str,
        model: Option<&str>,
    ) -> Result<SessionRecord, DatabaseError>;

    /// All sessions of the thread, newest first
    async fn list_sessions(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> Result<Vec<SessionRecord>, DatabaseError>;
}

/// A message about to be inserted
#[derive(Debug, Clone)]
pub struct NewMessage<'a> {
    /// Owning session
    pub session_id: &'a str,
    /// Report the thread is attached to
    pub report_id: &'a str,
    /// Thread owner
    pub user_id: &'a str,
    /// Sender role
    pub role: MessageRole,
    /// Message text
    pub content: &'a str,
    /// Creation time at storage precision
    pub created_at: DateTime<Utc>,
}

/// Raw message persistence
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Insert one message
    async fn insert(&self, message: NewMessage<'_>) -> Result<MessageRecord, DatabaseError>;

    /// Number of stored messages in the thread
    async fn count(&self, report_id: &str, user_id: &str) -> Result<u64, DatabaseError>;

    /// Sum of UTF-8 byte lengths of stored message contents
    async fn total_bytes(&self, report_id: &str, user_id: &str) -> Result<u64, DatabaseError>;

    /// Timestamp of the newest stored message
    async fn latest_created_at(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> Result<Option<DateTime<Utc>>, DatabaseError>;

    /// Every stored message, oldest first
    async fn list_ascending(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> Result<Vec<MessageRecord>, DatabaseError>;

    /// The newest `limit` messages, newest first
    async fn list_recent(
        &self,
        report_id: &str,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<MessageRecord>, DatabaseError>;

    /// Delete messages with `created_at <= cutoff`; returns rows removed
    async fn delete_up_to(
        &self,
        report_id: &str,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, DatabaseError>;

    /// Delete messages with `created_at < cutoff`; returns rows removed
    async fn delete_older_than(
        &self,
        report_id: &str,
        user_id: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, DatabaseError>;
}

/// Running summary persistence, one row per report
#[async_trait]
pub trait SummaryRepository: Send + Sync {
    /// The live summary for the report
    async fn get(&self, report_id: &str) -> Result<Option<SummaryRecord>, DatabaseError>;

    /// Insert the summary or overwrite it in place.
    ///
    /// The stored coverage never moves backwards: an upsert with an older boundary
    /// keeps the existing one.
    async fn upsert(
        &self,
        report_id: &str,
        session_id: Option<&str>,
        summary: &str,
        coverage_up_to: DateTime<Utc>,
    ) -> Result<SummaryRecord, DatabaseError>;
}

/// Repository handles injected into the memory components
#[derive(Clone)]
pub struct Repositories {
    /// Report ownership
    pub reports: Arc<dyn ReportRepository>,
    /// Sessions
    pub sessions: Arc<dyn SessionRepository>,
    /// Raw messages
    pub messages: Arc<dyn MessageRepository>,
    /// Running summaries
    pub summaries: Arc<dyn SummaryRepository>,
}

impl Repositories {
    /// SQLite-backed repositories sharing one pool
    #[must_use]
    pub fn sqlite(db: &Database) -> Self {
        Self {
            reports: Arc::new(ReportRepositoryImpl::new(db.clone())),
            sessions: Arc::new(SessionRepositoryImpl::new(db.clone())),
            messages: Arc::new(MessageRepositoryImpl::new(db.clone())),
            summaries: Arc::new(SummaryRepositoryImpl::new(db.clone())),
        }
    }
}
