// ABOUTME: Bounded, oldest-first view of a chat thread plus its live summary
// ABOUTME: Reconstructed on every read for display and for rebuilding outbound prompts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::{debug, instrument};

use super::ownership::OwnershipGuard;
use crate::config::MemoryConfig;
use crate::database::repositories::{MessageRepository, Repositories, SummaryRepository};
use crate::errors::AppResult;
use crate::models::{ConversationView, SummaryView};

/// Read side of a thread
#[derive(Clone)]
pub struct ConversationReader {
    guard: OwnershipGuard,
    messages: Arc<dyn MessageRepository>,
    summaries: Arc<dyn SummaryRepository>,
    config: MemoryConfig,
}

impl ConversationReader {
    /// Create a reader using the configured window bounds
    #[must_use]
    pub fn new(guard: OwnershipGuard, repositories: &Repositories, config: &MemoryConfig) -> Self {
        Self {
            guard,
            messages: Arc::clone(&repositories.messages),
            summaries: Arc::clone(&repositories.summaries),
            config: config.clone(),
        }
    }

    /// Live summary and the most recent `limit` messages, oldest first
    ///
    /// `limit` is clamped into `[1, max_window]` and defaults to the configured
    /// window. The summary is returned alongside the messages, never merged into them.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if the caller does not own the report, or a database error.
    #[instrument(skip(self))]
    pub async fn get_conversation(
        &self,
        report_id: &str,
        user_id: &str,
        limit: Option<i64>,
    ) -> AppResult<ConversationView> {
        self.guard.assert_ownership(report_id, user_id).await?;

        let window = self.config.clamp_window(limit);
        let summary = self.summaries.get(report_id).await?.map(SummaryView::from);

        let mut messages = self
            .messages
            .list_recent(report_id, user_id, window)
            .await?;
        messages.reverse();

        // A prune interrupted after the summary upsert can leave covered rows behind
        if let Some(summary) = &summary {
            messages.retain(|m| m.created_at > summary.coverage_up_to);
        }

        debug!(window, returned = messages.len(), has_summary = summary.is_some(), "Conversation read");
        Ok(ConversationView { summary, messages })
    }
}
