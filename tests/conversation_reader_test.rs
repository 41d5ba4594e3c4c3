// ABOUTME: Integration tests for bounded conversation views
// ABOUTME: Window clamping, oldest-first ordering, summary pairing and ownership
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

// Test files don't require documentation - this is a rustc lint (not clippy)
#![allow(missing_docs)]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use anyhow::Result;
use common::{append_alternating, ScriptedSummarizer, TestThread, OTHER_USER_ID, OWNER_ID, REPORT_ID};
use report_chat_memory::config::MemoryConfig;
use report_chat_memory::errors::ErrorCode;
use report_chat_memory::models::MessageRole;

fn windowed() -> MemoryConfig {
    MemoryConfig {
        default_window: 5,
        max_window: 8,
        summarize_message_threshold: 1000,
        ..MemoryConfig::default()
    }
}

#[tokio::test]
async fn test_empty_thread_has_no_summary_and_no_messages() -> Result<()> {
    let thread = TestThread::new().await?;
    let memory = thread.memory(ScriptedSummarizer::new("digest"), windowed());

    let view = memory.get_conversation(REPORT_ID, OWNER_ID, None).await?;

    assert!(view.summary.is_none());
    assert!(view.messages.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_default_window_returns_latest_messages_oldest_first() -> Result<()> {
    let thread = TestThread::new().await?;
    let memory = thread.memory(ScriptedSummarizer::new("digest"), windowed());
    append_alternating(&memory, 12).await?;

    let view = memory.get_conversation(REPORT_ID, OWNER_ID, None).await?;

    let contents: Vec<&str> = view.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(
        contents,
        vec!["message 8", "message 9", "message 10", "message 11", "message 12"]
    );
    assert_eq!(view.messages[0].role, MessageRole::Assistant);
    Ok(())
}

#[tokio::test]
async fn test_limit_is_clamped_into_range() -> Result<()> {
    let thread = TestThread::new().await?;
    let memory = thread.memory(ScriptedSummarizer::new("digest"), windowed());
    append_alternating(&memory, 12).await?;

    let cases = [(Some(0), 1), (Some(-3), 1), (Some(3), 3), (Some(8), 8), (Some(500), 8)];
    for (limit, expected) in cases {
        let view = memory.get_conversation(REPORT_ID, OWNER_ID, limit).await?;
        assert_eq!(view.messages.len(), expected, "limit {limit:?}");
        assert_eq!(view.messages.last().unwrap().content, "message 12");
    }
    Ok(())
}

#[tokio::test]
async fn test_summary_is_returned_beside_uncovered_messages() -> Result<()> {
    let thread = TestThread::new().await?;
    let memory = thread.memory(
        ScriptedSummarizer::new("Discussed valuation."),
        MemoryConfig::default(),
    );
    append_alternating(&memory, 25).await?;
    let outcome = memory.summarize_if_needed(REPORT_ID, OWNER_ID).await?;

    let view = memory.get_conversation(REPORT_ID, OWNER_ID, Some(100)).await?;

    let summary = view.summary.unwrap();
    assert_eq!(summary.text, "Discussed valuation.");
    assert_eq!(Some(summary.coverage_up_to), outcome.coverage_up_to);
    assert_eq!(view.messages.len(), 3);
    assert!(view
        .messages
        .iter()
        .all(|m| m.created_at > summary.coverage_up_to));
    Ok(())
}

#[tokio::test]
async fn test_covered_rows_left_by_interrupted_prune_are_hidden() -> Result<()> {
    let thread = TestThread::new().await?;
    let memory = thread.memory(ScriptedSummarizer::new("digest"), MemoryConfig::default());
    append_alternating(&memory, 4).await?;

    // Summary written but prune never ran
    let messages = thread.raw_messages().await?;
    thread
        .repositories
        .summaries
        .upsert(REPORT_ID, Some(messages[1].session_id.as_str()), "digest", messages[1].created_at)
        .await?;

    let view = memory.get_conversation(REPORT_ID, OWNER_ID, None).await?;
    let contents: Vec<&str> = view.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["message 3", "message 4"]);
    Ok(())
}

#[tokio::test]
async fn test_reading_requires_ownership() -> Result<()> {
    let thread = TestThread::new().await?;
    let memory = thread.memory(ScriptedSummarizer::new("digest"), windowed());
    append_alternating(&memory, 2).await?;

    let error = memory
        .get_conversation(REPORT_ID, OTHER_USER_ID, None)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::Forbidden);
    Ok(())
}
