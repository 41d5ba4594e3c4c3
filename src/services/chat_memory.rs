// ABOUTME: Facade wiring the memory components over one set of repositories
// ABOUTME: Exposes append, compaction, retention, reads and turn normalization behind one object
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use super::compaction::{CompactionEngine, CompactionOutcome};
use super::conversation_reader::ConversationReader;
use super::conversation_store::{AppendMessage, AppendedMessage, ConversationStore};
use super::ownership::OwnershipGuard;
use super::retention::RetentionReaper;
use super::turns;
use crate::config::MemoryConfig;
use crate::database::repositories::Repositories;
use crate::errors::AppResult;
use crate::llm::Turn;
use crate::models::{ConversationView, SessionRecord};
use crate::summarization::{FallbackSummarizer, Summarizer};

/// Bounded conversational memory for report chat threads
#[derive(Clone)]
pub struct ChatMemory {
    repositories: Repositories,
    guard: OwnershipGuard,
    store: ConversationStore,
    compaction: CompactionEngine,
    retention: RetentionReaper,
    reader: ConversationReader,
    config: MemoryConfig,
}

impl ChatMemory {
    /// Wire every component; `summarizer` is wrapped with timeout and truncation fallback
    #[must_use]
    pub fn new(repositories: Repositories, summarizer: Arc<dyn Summarizer>, config: MemoryConfig) -> Self {
        let guard = OwnershipGuard::new(Arc::clone(&repositories.reports));
        let retention = RetentionReaper::new(
            guard.clone(),
            Arc::clone(&repositories.messages),
            config.retention_window(),
        );
        let fallback = FallbackSummarizer::new(
            summarizer,
            config.summary_max_chars,
            config.summarizer_timeout(),
        );

        Self {
            store: ConversationStore::new(guard.clone(), &repositories, &config),
            compaction: CompactionEngine::new(
                guard.clone(),
                &repositories,
                fallback,
                retention.clone(),
                &config,
            ),
            reader: ConversationReader::new(guard.clone(), &repositories, &config),
            retention,
            guard,
            repositories,
            config,
        }
    }

    /// Memory policy in effect
    #[must_use]
    pub const fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Register (or retitle) a report owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if the report already belongs to another user, or a database error.
    pub async fn register_report(&self, report_id: &str, user_id: &str, title: Option<&str>) -> AppResult<()> {
        self.repositories
            .reports
            .register_report(report_id, user_id, title)
            .await?;
        self.guard.assert_ownership(report_id, user_id).await
    }

    /// See [`ConversationStore::append_message`]
    ///
    /// # Errors
    ///
    /// Propagates the store's validation, ownership, budget and session errors.
    pub async fn append_message(&self, input: AppendMessage) -> AppResult<AppendedMessage> {
        self.store.append_message(input).await
    }

    /// See [`CompactionEngine::summarize_if_needed`]
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` or a database error.
    pub async fn summarize_if_needed(&self, report_id: &str, user_id: &str) -> AppResult<CompactionOutcome> {
        self.compaction.summarize_if_needed(report_id, user_id).await
    }

    /// See [`RetentionReaper::apply_retention`]
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` or a database error.
    pub async fn apply_retention(&self, report_id: &str, user_id: &str) -> AppResult<u64> {
        self.retention.apply_retention(report_id, user_id).await
    }

    /// See [`ConversationReader::get_conversation`]
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` or a database error.
    pub async fn get_conversation(
        &self,
        report_id: &str,
        user_id: &str,
        limit: Option<i64>,
    ) -> AppResult<ConversationView> {
        self.reader.get_conversation(report_id, user_id, limit).await
    }

    /// Sessions of the thread, newest first
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` or a database error.
    pub async fn list_sessions(&self, report_id: &str, user_id: &str) -> AppResult<Vec<SessionRecord>> {
        self.guard.assert_ownership(report_id, user_id).await?;
        Ok(self.repositories.sessions.list_sessions(report_id, user_id).await?)
    }

    /// See [`turns::normalize_turns`]
    #[must_use]
    pub fn normalize_turns(leading: Turn, history: Vec<Turn>) -> Vec<Turn> {
        turns::normalize_turns(leading, history)
    }
}
