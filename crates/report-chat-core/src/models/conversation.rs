// ABOUTME: Chat session, message and summary record types for database persistence
// ABOUTME: DTOs for per-report chat threads with a single running summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Role of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// End-user input
    User,
    /// Model reply
    Assistant,
    /// Instruction or note injected by the application
    System,
}

impl MessageRole {
    /// Convert to string representation for storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl FromStr for MessageRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            other => Err(AppError::validation(format!(
                "Invalid role '{other}': expected user, assistant or system"
            ))),
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Accepting turns
    Active,
    /// No longer used
    Closed,
}

impl SessionStatus {
    /// Convert to string representation for storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }

    /// Parse a stored status; unknown values are treated as active
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s {
            "closed" => Self::Closed,
            _ => Self::Active,
        }
    }
}

/// Database representation of a chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique session ID
    pub id: String,
    /// Report the thread is attached to
    pub report_id: String,
    /// User who owns the thread
    pub user_id: String,
    /// Model identifier the session was opened with
    pub model: Option<String>,
    /// Advisory status
    pub status: SessionStatus,
    /// When the session was created
    pub created_at: DateTime<Utc>,
}

/// Database representation of a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Unique message ID
    pub id: String,
    /// Session this message belongs to
    pub session_id: String,
    /// Report the thread is attached to
    pub report_id: String,
    /// User who owns the thread
    pub user_id: String,
    /// Role of the message sender
    pub role: MessageRole,
    /// Message content
    pub content: String,
    /// When the message was created
    pub created_at: DateTime<Utc>,
}

impl MessageRecord {
    /// UTF-8 byte length of the content
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.content.len()
    }
}

/// Database representation of the running summary for a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRecord {
    /// Unique summary ID
    pub id: String,
    /// Report the summary belongs to (at most one row per report)
    pub report_id: String,
    /// Session that was active when the summary was last written
    pub session_id: Option<String>,
    /// Digest text
    pub summary: String,
    /// Inclusive upper bound of the raw messages this digest accounts for
    pub coverage_up_to: DateTime<Utc>,
    /// When the summary was last written
    pub updated_at: DateTime<Utc>,
}

/// Summary part of a [`ConversationView`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryView {
    /// Digest text
    pub text: String,
    /// Inclusive coverage boundary
    pub coverage_up_to: DateTime<Utc>,
}

impl From<SummaryRecord> for SummaryView {
    fn from(record: SummaryRecord) -> Self {
        Self {
            text: record.summary,
            coverage_up_to: record.coverage_up_to,
        }
    }
}

/// Bounded view of a thread, rebuilt on every read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationView {
    /// Live summary, if the thread was ever compacted
    pub summary: Option<SummaryView>,
    /// Most recent messages, oldest first
    pub messages: Vec<MessageRecord>,
}
