// ABOUTME: Core data models for report chat threads
// ABOUTME: Re-exports session, message, summary and view records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Chat session, message and summary records plus the derived conversation view
pub mod conversation;

pub use conversation::{
    ConversationView, MessageRecord, MessageRole, SessionRecord, SessionStatus, SummaryRecord,
    SummaryView,
};
