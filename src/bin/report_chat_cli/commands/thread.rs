// ABOUTME: Thread maintenance commands for report-chat-cli
// ABOUTME: Handles migrate, register-report, append, compact, show and sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use report_chat_memory::{
    config::AppConfig,
    database::Database,
    errors::AppResult,
    services::AppendMessage,
};

type Result<T> = AppResult<T>;
use serde_json::json;
use tracing::info;

use super::{memory, print_json};

/// Create or update the schema
pub async fn migrate(database: &Database) -> Result<()> {
    database.migrate().await?;
    info!("Chat schema is up to date");
    print_json(&json!({ "migrated": true }))
}

/// Register a report and its owner
pub async fn register_report(
    database: &Database,
    config: &AppConfig,
    report: &str,
    user: &str,
    title: Option<&str>,
) -> Result<()> {
    memory(database, config)?
        .register_report(report, user, title)
        .await?;
    print_json(&json!({ "report_id": report, "user_id": user }))
}

/// Append a message, then run the compaction check the way a chat round would
pub async fn append(
    database: &Database,
    config: &AppConfig,
    report: String,
    user: String,
    role: String,
    content: String,
    model: Option<String>,
) -> Result<()> {
    let memory = memory(database, config)?;
    let mut input = AppendMessage::new(report.clone(), user.clone(), role, content);
    input.model = model;

    let appended = memory.append_message(input).await?;
    let compaction = memory.summarize_if_needed(&report, &user).await?;
    print_json(&json!({ "appended": appended, "compaction": compaction }))
}

/// Run a compaction check
pub async fn compact(database: &Database, config: &AppConfig, report: &str, user: &str) -> Result<()> {
    let outcome = memory(database, config)?
        .summarize_if_needed(report, user)
        .await?;
    print_json(&outcome)
}

/// Print the conversation view
pub async fn show(
    database: &Database,
    config: &AppConfig,
    report: &str,
    user: &str,
    limit: Option<i64>,
) -> Result<()> {
    let view = memory(database, config)?
        .get_conversation(report, user, limit)
        .await?;
    print_json(&view)
}

/// Print sessions, newest first
pub async fn sessions(database: &Database, config: &AppConfig, report: &str, user: &str) -> Result<()> {
    let sessions = memory(database, config)?.list_sessions(report, user).await?;
    print_json(&sessions)
}
