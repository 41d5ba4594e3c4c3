// ABOUTME: Integration tests for the append path of chat threads
// ABOUTME: Covers validation, ownership, byte budgets, session reuse and timestamp ordering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Test files don't require documentation - this is a rustc lint (not clippy)
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use anyhow::Result;
use common::{TestThread, OTHER_USER_ID, OWNER_ID, REPORT_ID};
use report_chat_memory::config::MemoryConfig;
use report_chat_memory::errors::ErrorCode;
use report_chat_memory::services::AppendMessage;

fn small_caps() -> MemoryConfig {
    MemoryConfig {
        message_max_bytes: 64,
        thread_max_bytes: 100,
        ..MemoryConfig::default()
    }
}

// ============================================================================
// Happy Path
// ============================================================================

#[tokio::test]
async fn test_first_append_creates_session_and_later_appends_reuse_it() -> Result<()> {
    let thread = TestThread::new().await?;
    let store = thread.store(&MemoryConfig::default());

    let first = store
        .append_message(
            AppendMessage::new(REPORT_ID, OWNER_ID, "user", "What is the price target?")
                .with_model("gemini-2.5-flash"),
        )
        .await?;
    let second = store
        .append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "assistant", "$42."))
        .await?;

    assert_eq!(first.session_id, second.session_id);
    assert_ne!(first.message_id, second.message_id);

    let sessions = thread
        .repositories
        .sessions
        .list_sessions(REPORT_ID, OWNER_ID)
        .await?;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].model.as_deref(), Some("gemini-2.5-flash"));
    Ok(())
}

#[tokio::test]
async fn test_timestamps_strictly_increase_within_thread() -> Result<()> {
    let thread = TestThread::new().await?;
    let store = thread.store(&MemoryConfig::default());

    for i in 0..10 {
        store
            .append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "user", format!("m{i}")))
            .await?;
    }

    let messages = thread.raw_messages().await?;
    assert_eq!(messages.len(), 10);
    for pair in messages.windows(2) {
        assert!(pair[0].created_at < pair[1].created_at);
    }
    assert_eq!(messages[0].content, "m0");
    assert_eq!(messages[9].content, "m9");
    Ok(())
}

#[tokio::test]
async fn test_message_at_exact_cap_is_accepted() -> Result<()> {
    let thread = TestThread::new().await?;
    let store = thread.store(&small_caps());

    store
        .append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "user", "x".repeat(64)))
        .await?;

    assert_eq!(thread.raw_messages().await?.len(), 1);
    Ok(())
}

// ============================================================================
// Rejections
// ============================================================================

#[tokio::test]
async fn test_message_over_cap_is_rejected_before_any_write() -> Result<()> {
    let thread = TestThread::new().await?;
    let config = MemoryConfig::default();
    let store = thread.store(&config);

    let error = store
        .append_message(AppendMessage::new(
            REPORT_ID,
            OWNER_ID,
            "user",
            "a".repeat(config.message_max_bytes + 1),
        ))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::MessageTooLarge);
    assert_eq!(error.http_status(), 413);
    assert_eq!(thread.repositories.messages.count(REPORT_ID, OWNER_ID).await?, 0);
    assert!(thread
        .repositories
        .sessions
        .latest_session(REPORT_ID, OWNER_ID)
        .await?
        .is_none());
    Ok(())
}

#[tokio::test]
async fn test_cap_counts_bytes_not_characters() -> Result<()> {
    let thread = TestThread::new().await?;
    let store = thread.store(&small_caps());

    // 33 two-byte characters = 66 bytes
    let error = store
        .append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "user", "é".repeat(33)))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::MessageTooLarge);
    Ok(())
}

#[tokio::test]
async fn test_thread_cap_rejects_write_that_would_overflow() -> Result<()> {
    let thread = TestThread::new().await?;
    let store = thread.store(&small_caps());

    store
        .append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "user", "x".repeat(60)))
        .await?;
    let error = store
        .append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "assistant", "y".repeat(41)))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ConversationCapExceeded);
    assert_eq!(error.details["current_bytes"], 60);
    assert_eq!(thread.raw_messages().await?.len(), 1);

    // Exactly reaching the cap is fine
    store
        .append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "assistant", "y".repeat(40)))
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_thread_cap_includes_live_summary_bytes() -> Result<()> {
    let thread = TestThread::new().await?;
    let store = thread.store(&small_caps());

    let first = store
        .append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "user", "hello"))
        .await?;
    let earlier = thread.raw_messages().await?[0].created_at;
    thread
        .repositories
        .summaries
        .upsert(REPORT_ID, Some(first.session_id.as_str()), &"s".repeat(50), earlier)
        .await?;
    thread
        .repositories
        .messages
        .delete_up_to(REPORT_ID, OWNER_ID, earlier)
        .await?;

    let error = store
        .append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "user", "z".repeat(51)))
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ConversationCapExceeded);
    Ok(())
}

#[tokio::test]
async fn test_new_message_lands_after_summary_coverage() -> Result<()> {
    let thread = TestThread::new().await?;
    let store = thread.store(&MemoryConfig::default());

    let first = store
        .append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "user", "hello"))
        .await?;
    let future = chrono::Utc::now() + chrono::Duration::hours(1);
    thread
        .repositories
        .summaries
        .upsert(REPORT_ID, Some(first.session_id.as_str()), "digest", future)
        .await?;

    store
        .append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "user", "after"))
        .await?;

    let messages = thread.raw_messages().await?;
    assert!(messages.last().unwrap().created_at > future);
    Ok(())
}

#[tokio::test]
async fn test_invalid_input_fails_validation_without_writes() -> Result<()> {
    let thread = TestThread::new().await?;
    let store = thread.store(&MemoryConfig::default());

    for input in [
        AppendMessage::new(REPORT_ID, OWNER_ID, "user", ""),
        AppendMessage::new(REPORT_ID, OWNER_ID, "user", " \n\t "),
        AppendMessage::new(REPORT_ID, OWNER_ID, "model", "hi"),
        AppendMessage::new(REPORT_ID, OWNER_ID, "", "hi"),
    ] {
        let error = store.append_message(input).await.unwrap_err();
        assert_eq!(error.code, ErrorCode::ValidationFailed);
        assert_eq!(error.http_status(), 400);
    }

    assert_eq!(thread.repositories.messages.count(REPORT_ID, OWNER_ID).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_non_owner_and_unknown_report_are_forbidden() -> Result<()> {
    let thread = TestThread::new().await?;
    let store = thread.store(&MemoryConfig::default());

    let not_owner = store
        .append_message(AppendMessage::new(REPORT_ID, OTHER_USER_ID, "user", "hi"))
        .await
        .unwrap_err();
    let missing = store
        .append_message(AppendMessage::new("no-such-report", OWNER_ID, "user", "hi"))
        .await
        .unwrap_err();

    assert_eq!(not_owner.code, ErrorCode::Forbidden);
    assert_eq!(missing.code, ErrorCode::Forbidden);
    assert_eq!(not_owner.http_status(), 403);
    Ok(())
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_first_appends_both_succeed() -> Result<()> {
    let thread = TestThread::new().await?;
    let store = thread.store(&MemoryConfig::default());

    let (a, b) = tokio::join!(
        store.append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "user", "tab one")),
        store.append_message(AppendMessage::new(REPORT_ID, OWNER_ID, "user", "tab two")),
    );
    let (a, b) = (a?, b?);

    // One or two sessions may exist; reads resolve to the newest either way
    let sessions = thread
        .repositories
        .sessions
        .list_sessions(REPORT_ID, OWNER_ID)
        .await?;
    assert!((1..=2).contains(&sessions.len()));
    assert!(sessions.iter().any(|s| s.id == a.session_id));
    assert!(sessions.iter().any(|s| s.id == b.session_id));

    let latest = thread
        .repositories
        .sessions
        .latest_session(REPORT_ID, OWNER_ID)
        .await?
        .unwrap();
    assert_eq!(latest.id, sessions[0].id);
    assert_eq!(thread.raw_messages().await?.len(), 2);
    Ok(())
}
