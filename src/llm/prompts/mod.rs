// ABOUTME: Prompts for report chat and conversation summarization loaded at compile time
// ABOUTME: Renders the summarizer instruction with the configured output ceiling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy maintenance.

/// Placeholder replaced with the summary character ceiling
const MAX_CHARS_PLACEHOLDER: &str = "{max_chars}";

/// Instruction for condensing older conversation turns into a running summary
pub const SUMMARIZE_PROMPT: &str = include_str!("summarize.md");

/// Default instruction block for answering questions about a research report
pub const REPORT_CHAT_PROMPT: &str = include_str!("report_chat.md");

/// Render the summarizer instruction for a given output ceiling
#[must_use]
pub fn summarize_instructions(max_chars: usize) -> String {
    SUMMARIZE_PROMPT.replace(MAX_CHARS_PLACEHOLDER, &max_chars.to_string())
}

/// Get the default report chat instruction block
#[must_use]
pub const fn get_report_chat_prompt() -> &'static str {
    REPORT_CHAT_PROMPT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_instructions_fill_ceiling() {
        let rendered = summarize_instructions(4000);
        assert!(rendered.contains("4000"));
        assert!(!rendered.contains(MAX_CHARS_PLACEHOLDER));
    }
}
