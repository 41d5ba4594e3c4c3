// ABOUTME: Main library entry point for report chat memory
// ABOUTME: Bounded per-report chat threads with budgets, compaction, retention and turn shaping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Report Chat Memory
//!
//! Every AI-generated research report carries a chat thread. This crate keeps that
//! thread bounded and usable by a strictly alternating dialogue model:
//!
//! - **Budgets**: per-message and per-thread byte caps enforced on append
//! - **Compaction**: old turns are condensed into one running summary per report,
//!   keeping a verbatim hot tail of recent messages
//! - **Retention**: raw messages past a fixed age are swept regardless of size
//! - **Views**: bounded, oldest-first windows plus the live summary
//! - **Turn shaping**: arbitrary history is normalized into user/model alternation
//!
//! ## Architecture
//!
//! All storage access goes through narrow per-entity repositories
//! ([`database::repositories`]); every component receives its dependencies at
//! construction, so tests substitute fakes per call.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use report_chat_memory::config::MemoryConfig;
//! use report_chat_memory::database::{repositories::Repositories, Database};
//! use report_chat_memory::errors::AppResult;
//! use report_chat_memory::services::{AppendMessage, ChatMemory};
//! use report_chat_memory::summarization::TruncatingSummarizer;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let database = Database::new("sqlite::memory:").await?;
//!     let repositories = Repositories::sqlite(&database);
//!     let config = MemoryConfig::default();
//!     let summarizer = Arc::new(TruncatingSummarizer::new(config.summary_max_chars));
//!     let memory = ChatMemory::new(repositories, summarizer, config);
//!
//!     memory
//!         .append_message(AppendMessage::new("report-1", "user-1", "user", "Why is margin falling?"))
//!         .await?;
//!     memory.summarize_if_needed("report-1", "user-1").await?;
//!     Ok(())
//! }
//! ```

/// Configuration loaded from the environment
pub mod config;

/// Application constants and configuration defaults
pub mod constants;

/// SQLite storage and per-entity repositories
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Generative-AI dialogue capability and providers
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Persisted records and derived views
pub mod models;

/// Memory components: ownership, store, compaction, retention, reader, turn shaping
pub mod services;

/// Summarization strategies used by compaction
pub mod summarization;
