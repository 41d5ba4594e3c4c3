// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: In-memory database, seeded reports, and scripted summarizer and provider fakes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `report_chat_memory`

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use report_chat_memory::{
    config::MemoryConfig,
    database::{
        repositories::{NewMessage, Repositories},
        Database,
    },
    errors::{AppError, AppResult},
    llm::{ChatRequest, ChatResponse, LlmProvider},
    models::{MessageRecord, MessageRole},
    services::{AppendMessage, ChatMemory, ConversationStore, OwnershipGuard},
    summarization::Summarizer,
};

pub const REPORT_ID: &str = "report-1";
pub const OWNER_ID: &str = "user-1";
pub const OTHER_USER_ID: &str = "user-2";

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Ok(Database::new("sqlite::memory:").await?)
}

/// Database, repositories and a seeded report owned by `OWNER_ID`
pub struct TestThread {
    pub database: Database,
    pub repositories: Repositories,
}

impl TestThread {
    pub async fn new() -> Result<Self> {
        let database = create_test_database().await?;
        let repositories = Repositories::sqlite(&database);
        repositories
            .reports
            .register_report(REPORT_ID, OWNER_ID, Some("ACME Corp initiation"))
            .await?;
        Ok(Self {
            database,
            repositories,
        })
    }

    pub fn memory(&self, summarizer: Arc<dyn Summarizer>, config: MemoryConfig) -> ChatMemory {
        ChatMemory::new(self.repositories.clone(), summarizer, config)
    }

    pub fn store(&self, config: &MemoryConfig) -> ConversationStore {
        let guard = OwnershipGuard::new(Arc::clone(&self.repositories.reports));
        ConversationStore::new(guard, &self.repositories, config)
    }

    /// Raw messages of the owner's thread, oldest first
    pub async fn raw_messages(&self) -> Result<Vec<MessageRecord>> {
        Ok(self
            .repositories
            .messages
            .list_ascending(REPORT_ID, OWNER_ID)
            .await?)
    }

    /// Insert a message with an explicit timestamp, bypassing budgets
    pub async fn insert_at(&self, role: MessageRole, content: &str, created_at: DateTime<Utc>) -> Result<MessageRecord> {
        let session = match self
            .repositories
            .sessions
            .latest_session(REPORT_ID, OWNER_ID)
            .await?
        {
            Some(session) => session,
            None => {
                self.repositories
                    .sessions
                    .create_session(REPORT_ID, OWNER_ID, None)
                    .await?
            }
        };
        Ok(self
            .repositories
            .messages
            .insert(NewMessage {
                session_id: &session.id,
                report_id: REPORT_ID,
                user_id: OWNER_ID,
                role,
                content,
                created_at,
            })
            .await?)
    }
}

/// Append `count` alternating user/assistant one-liners through `memory`
pub async fn append_alternating(memory: &ChatMemory, count: usize) -> Result<()> {
    for i in 1..=count {
        let role = if i % 2 == 1 { "user" } else { "assistant" };
        memory
            .append_message(AppendMessage::new(
                REPORT_ID,
                OWNER_ID,
                role,
                format!("message {i}"),
            ))
            .await?;
    }
    Ok(())
}

// ============================================================================
// Summarizer Fakes
// ============================================================================

/// Returns a fixed digest and records every input it was given
pub struct ScriptedSummarizer {
    digest: String,
    pub inputs: Mutex<Vec<String>>,
}

impl ScriptedSummarizer {
    pub fn new(digest: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            digest: digest.into(),
            inputs: Mutex::new(Vec::new()),
        })
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for ScriptedSummarizer {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn summarize(&self, text: &str) -> AppResult<String> {
        self.inputs.lock().unwrap().push(text.to_owned());
        Ok(self.digest.clone())
    }
}

/// Always fails like an upstream outage
pub struct FailingSummarizer;

#[async_trait]
impl Summarizer for FailingSummarizer {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn summarize(&self, _text: &str) -> AppResult<String> {
        Err(AppError::external_service("Gemini", "503 Service Unavailable"))
    }
}

/// Never answers within any reasonable timeout
pub struct HangingSummarizer;

#[async_trait]
impl Summarizer for HangingSummarizer {
    fn name(&self) -> &'static str {
        "hanging"
    }

    async fn summarize(&self, _text: &str) -> AppResult<String> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("too late".to_owned())
    }
}

/// Appends a message to the thread while the digest is being produced
pub struct InterleavingSummarizer {
    store: ConversationStore,
    pub appended: Mutex<Option<String>>,
}

impl InterleavingSummarizer {
    pub fn new(store: ConversationStore) -> Arc<Self> {
        Arc::new(Self {
            store,
            appended: Mutex::new(None),
        })
    }
}

#[async_trait]
impl Summarizer for InterleavingSummarizer {
    fn name(&self) -> &'static str {
        "interleaving"
    }

    async fn summarize(&self, _text: &str) -> AppResult<String> {
        let appended = self
            .store
            .append_message(AppendMessage::new(
                REPORT_ID,
                OWNER_ID,
                "user",
                "sent from another tab",
            ))
            .await?;
        *self.appended.lock().unwrap() = Some(appended.message_id);
        Ok("digest".to_owned())
    }
}

// ============================================================================
// Provider Fakes
// ============================================================================

/// Dialogue provider with a canned reply that records requests
pub struct ScriptedProvider {
    reply: Option<String>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn last_request(&self) -> ChatRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-1"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Some(reply) => Ok(ChatResponse {
                content: reply.clone(),
                model: request.model.clone().unwrap_or_else(|| "scripted-1".to_owned()),
                usage: None,
                finish_reason: Some("STOP".to_owned()),
            }),
            None => Err(AppError::external_service("Gemini", "503 Service Unavailable")),
        }
    }

    async fn health_check(&self) -> Result<bool, AppError> {
        Ok(self.reply.is_some())
    }
}
