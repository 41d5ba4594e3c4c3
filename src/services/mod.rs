// ABOUTME: Memory service layer for report chat threads
// ABOUTME: Ownership, append budgets, compaction, retention, bounded reads and turn shaping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Facade over all memory components
pub mod chat_memory;
/// Size-triggered summarization and pruning
pub mod compaction;
/// Bounded thread views
pub mod conversation_reader;
/// Append path with byte budgets
pub mod conversation_store;
/// Report ownership checks
pub mod ownership;
/// Question/answer orchestration against a dialogue provider
pub mod report_chat;
/// Age-based message sweep
pub mod retention;
/// Alternating turn shaping
pub mod turns;

pub use chat_memory::ChatMemory;
pub use compaction::{CompactionEngine, CompactionOutcome};
pub use conversation_reader::ConversationReader;
pub use conversation_store::{AppendMessage, AppendedMessage, ConversationStore};
pub use ownership::OwnershipGuard;
pub use report_chat::{ChatReply, ReportChatService, SendMessage};
pub use retention::RetentionReaper;
pub use turns::{build_leading_context, history_turns, normalize_turns};
