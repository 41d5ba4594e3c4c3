// ABOUTME: Append path for chat threads with per-message and per-thread byte budgets
// ABOUTME: Validates input, checks ownership and caps, reuses or lazily creates the session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::ownership::OwnershipGuard;
use crate::config::MemoryConfig;
use crate::database::repositories::{
    MessageRepository, NewMessage, Repositories, SessionRepository, SummaryRepository,
};
use crate::database::storage_now;
use crate::errors::{AppError, AppResult};
use crate::models::{MessageRole, SessionRecord};

/// Input of an append
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendMessage {
    /// Report the thread belongs to
    pub report_id: String,
    /// Caller
    pub user_id: String,
    /// `user`, `assistant` or `system`
    pub role: String,
    /// Message text
    pub content: String,
    /// Model tag used only when a session has to be created
    pub model: Option<String>,
}

impl AppendMessage {
    /// Build an append request without a model tag
    #[must_use]
    pub fn new(
        report_id: impl Into<String>,
        user_id: impl Into<String>,
        role: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            report_id: report_id.into(),
            user_id: user_id.into(),
            role: role.into(),
            content: content.into(),
            model: None,
        }
    }

    /// Tag a newly created session with `model`
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Result of a successful append
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppendedMessage {
    /// Id of the stored message
    pub message_id: String,
    /// Session the message was filed under
    pub session_id: String,
}

/// Writes turns into a thread, never compacting inline
#[derive(Clone)]
pub struct ConversationStore {
    guard: OwnershipGuard,
    sessions: Arc<dyn SessionRepository>,
    messages: Arc<dyn MessageRepository>,
    summaries: Arc<dyn SummaryRepository>,
    message_max_bytes: usize,
    thread_max_bytes: usize,
}

impl ConversationStore {
    /// Create a store over the given repositories and budgets
    #[must_use]
    pub fn new(guard: OwnershipGuard, repositories: &Repositories, config: &MemoryConfig) -> Self {
        Self {
            guard,
            sessions: Arc::clone(&repositories.sessions),
            messages: Arc::clone(&repositories.messages),
            summaries: Arc::clone(&repositories.summaries),
            message_max_bytes: config.message_max_bytes,
            thread_max_bytes: config.thread_max_bytes,
        }
    }

    /// Append one message to the thread of `(report_id, user_id)`
    ///
    /// Nothing is written unless every check passes. The thread total counts raw
    /// message bytes plus the live summary's bytes.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for blank content or an unknown role
    /// - `Forbidden` if the caller does not own the report
    /// - `MessageTooLarge` if the content exceeds the per-message cap
    /// - `ConversationCapExceeded` if the thread would exceed its cap
    /// - `SessionError` if the session cannot be resolved or created
    #[instrument(skip(self, input), fields(report_id = %input.report_id, user_id = %input.user_id, role = %input.role))]
    pub async fn append_message(&self, input: AppendMessage) -> AppResult<AppendedMessage> {
        let role = Self::validate(&input)?;
        self.guard
            .assert_ownership(&input.report_id, &input.user_id)
            .await?;

        let content_bytes = input.content.len();
        if content_bytes > self.message_max_bytes {
            warn!(content_bytes, cap = self.message_max_bytes, "Message rejected: too large");
            return Err(AppError::message_too_large(
                content_bytes,
                self.message_max_bytes,
            ));
        }

        let summary = self.summaries.get(&input.report_id).await?;
        let summary_bytes = summary.as_ref().map_or(0, |s| s.summary.len() as u64);
        let current = self
            .messages
            .total_bytes(&input.report_id, &input.user_id)
            .await?
            + summary_bytes;
        if current + content_bytes as u64 > self.thread_max_bytes as u64 {
            warn!(
                current,
                content_bytes,
                cap = self.thread_max_bytes,
                "Message rejected: thread budget exhausted"
            );
            return Err(AppError::conversation_cap_exceeded(
                current,
                content_bytes,
                self.thread_max_bytes,
            ));
        }

        let session = self
            .resolve_session(&input.report_id, &input.user_id, input.model.as_deref())
            .await?;

        let latest = self
            .messages
            .latest_created_at(&input.report_id, &input.user_id)
            .await?;
        let created_at = next_timestamp(
            storage_now(),
            latest,
            summary.as_ref().map(|s| s.coverage_up_to),
        );

        let message = self
            .messages
            .insert(NewMessage {
                session_id: &session.id,
                report_id: &input.report_id,
                user_id: &input.user_id,
                role,
                content: &input.content,
                created_at,
            })
            .await?;

        debug!(message_id = %message.id, session_id = %session.id, content_bytes, "Chat message stored");
        Ok(AppendedMessage {
            message_id: message.id,
            session_id: session.id,
        })
    }

    fn validate(input: &AppendMessage) -> AppResult<MessageRole> {
        if input.report_id.trim().is_empty() || input.user_id.trim().is_empty() {
            return Err(AppError::validation("report_id and user_id are required"));
        }
        if input.content.trim().is_empty() {
            return Err(AppError::validation("Message content must not be empty"));
        }
        MessageRole::from_str(&input.role)
    }

    /// Most recently created session of the thread, or a fresh one
    async fn resolve_session(
        &self,
        report_id: &str,
        user_id: &str,
        model: Option<&str>,
    ) -> AppResult<SessionRecord> {
        let existing = self
            .sessions
            .latest_session(report_id, user_id)
            .await
            .map_err(|e| AppError::session("Failed to resolve chat session").with_source(e))?;
        if let Some(session) = existing {
            return Ok(session);
        }

        let session = self
            .sessions
            .create_session(report_id, user_id, model)
            .await
            .map_err(|e| AppError::session("Failed to create chat session").with_source(e))?;
        info!(session_id = %session.id, report_id, user_id, "Chat session created");
        Ok(session)
    }
}

/// Timestamp for a new message: strictly after everything already in the thread
///
/// Cutoff deletes compare `created_at`, so two messages must never share one and a
/// new message must never land at or below the summary coverage boundary.
fn next_timestamp(
    now: DateTime<Utc>,
    latest: Option<DateTime<Utc>>,
    coverage: Option<DateTime<Utc>>,
) -> DateTime<Utc> {
    latest
        .into_iter()
        .chain(coverage)
        .max()
        .map_or(now, |floor| now.max(floor + Duration::microseconds(1)))
}
