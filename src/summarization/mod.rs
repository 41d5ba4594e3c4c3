// ABOUTME: Summarization capability used by compaction to condense old turns
// ABOUTME: Remote LLM strategy, deterministic truncation, and a timeout-bounded fallback wrapper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Summarization
//!
//! Compaction asks a [`Summarizer`] to turn serialized transcript text into a
//! bounded digest. The remote strategy may fail or hang, so compaction never calls
//! it directly: [`FallbackSummarizer`] bounds it with a timeout and degrades to
//! [`TruncatingSummarizer`], which cannot fail.

mod fallback;
mod llm_summarizer;
mod truncation;

pub use fallback::{Digest, DigestSource, FallbackSummarizer};
pub use llm_summarizer::LlmSummarizer;
pub use truncation::{tail_chars, truncate_chars, TruncatingSummarizer};

use async_trait::async_trait;

use crate::errors::AppResult;

/// `summarize(text) -> text` capability
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Strategy identifier for logs
    fn name(&self) -> &'static str;

    /// Condense `text` into a digest
    ///
    /// # Errors
    ///
    /// Remote strategies return an error when the upstream call fails.
    async fn summarize(&self, text: &str) -> AppResult<String>;
}
