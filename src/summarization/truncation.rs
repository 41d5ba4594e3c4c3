// ABOUTME: Deterministic summarization by prefix truncation on a character boundary
// ABOUTME: Used directly when no remote capability exists and as the fallback for outages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use async_trait::async_trait;

use super::Summarizer;
use crate::constants::prompt::TRUNCATION_MARKER;
use crate::errors::AppResult;

/// Keep at most `max_chars` characters of `text`
///
/// When text is cut, the last kept character is replaced by an ellipsis so the
/// result is still exactly `max_chars` long. Never splits a UTF-8 sequence.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    match text.char_indices().nth(max_chars) {
        None => text.to_owned(),
        Some(_) => {
            let keep = max_chars - 1;
            let end = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
            let mut truncated = String::with_capacity(end + TRUNCATION_MARKER.len());
            truncated.push_str(&text[..end]);
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
    }
}

/// Keep at most the last `max_chars` characters of `text`
///
/// Mirror of [`truncate_chars`]: when text is cut, the first kept character is
/// replaced by an ellipsis.
#[must_use]
pub fn tail_chars(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_owned();
    }
    let skip = total - (max_chars - 1);
    let start = text.char_indices().nth(skip).map_or(text.len(), |(i, _)| i);
    format!("{TRUNCATION_MARKER}{}", &text[start..])
}

/// Summarizer that keeps the leading `max_chars` characters
#[derive(Debug, Clone, Copy)]
pub struct TruncatingSummarizer {
    max_chars: usize,
}

impl TruncatingSummarizer {
    /// Create a truncating summarizer with an output ceiling
    #[must_use]
    pub const fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Output ceiling in characters
    #[must_use]
    pub const fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Infallible variant of `summarize`
    #[must_use]
    pub fn truncate(&self, text: &str) -> String {
        truncate_chars(text.trim(), self.max_chars)
    }
}

#[async_trait]
impl Summarizer for TruncatingSummarizer {
    fn name(&self) -> &'static str {
        "truncation"
    }

    async fn summarize(&self, text: &str) -> AppResult<String> {
        Ok(self.truncate(text))
    }
}
