// ABOUTME: Tests for chat database connection, migrations and repository queries
// ABOUTME: File-backed persistence, idempotent migrations, byte sums and cutoff deletes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Test files don't require documentation - this is a rustc lint (not clippy)
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use common::{TestThread, OTHER_USER_ID, OWNER_ID, REPORT_ID};
use report_chat_memory::database::{repositories::Repositories, Database};
use report_chat_memory::models::MessageRole;
use tempfile::TempDir;

#[tokio::test]
async fn test_file_database_persists_across_connections() -> Result<()> {
    common::init_test_logging();
    let dir = TempDir::new()?;
    let url = format!("sqlite:{}", dir.path().join("chat.db").display());

    {
        let database = Database::new(&url).await?;
        Repositories::sqlite(&database)
            .reports
            .register_report(REPORT_ID, OWNER_ID, None)
            .await?;
    }

    let database = Database::new(&url).await?;
    database.migrate().await?;
    let owner = Repositories::sqlite(&database)
        .reports
        .report_owner(REPORT_ID)
        .await?;
    assert_eq!(owner.as_deref(), Some(OWNER_ID));
    Ok(())
}

#[tokio::test]
async fn test_report_ownership_never_transfers() -> Result<()> {
    let thread = TestThread::new().await?;

    thread
        .repositories
        .reports
        .register_report(REPORT_ID, OTHER_USER_ID, Some("hijack"))
        .await?;

    let owner = thread.repositories.reports.report_owner(REPORT_ID).await?;
    assert_eq!(owner.as_deref(), Some(OWNER_ID));
    Ok(())
}

#[tokio::test]
async fn test_total_bytes_sums_utf8_lengths() -> Result<()> {
    let thread = TestThread::new().await?;
    let now = Utc::now();

    thread.insert_at(MessageRole::User, "abc", now).await?;
    thread
        .insert_at(MessageRole::Assistant, "ééé", now + Duration::seconds(1))
        .await?;

    let total = thread
        .repositories
        .messages
        .total_bytes(REPORT_ID, OWNER_ID)
        .await?;
    assert_eq!(total, 9);
    Ok(())
}

#[tokio::test]
async fn test_cutoff_deletes_differ_on_boundary() -> Result<()> {
    let thread = TestThread::new().await?;
    let boundary = thread
        .insert_at(MessageRole::User, "boundary", Utc::now())
        .await?
        .created_at;

    let older = thread
        .repositories
        .messages
        .delete_older_than(REPORT_ID, OWNER_ID, boundary)
        .await?;
    assert_eq!(older, 0);

    let up_to = thread
        .repositories
        .messages
        .delete_up_to(REPORT_ID, OWNER_ID, boundary)
        .await?;
    assert_eq!(up_to, 1);
    Ok(())
}

#[tokio::test]
async fn test_latest_session_is_most_recent() -> Result<()> {
    let thread = TestThread::new().await?;
    let sessions = &thread.repositories.sessions;

    sessions.create_session(REPORT_ID, OWNER_ID, Some("a")).await?;
    let newer = sessions.create_session(REPORT_ID, OWNER_ID, Some("b")).await?;

    let latest = sessions.latest_session(REPORT_ID, OWNER_ID).await?.unwrap();
    assert_eq!(latest.id, newer.id);
    assert_eq!(sessions.list_sessions(REPORT_ID, OWNER_ID).await?.len(), 2);
    Ok(())
}
