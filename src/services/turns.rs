// ABOUTME: Shapes stored history into a strictly alternating user/model turn sequence
// ABOUTME: Pure functions: leading context fusion, role mapping, same-role merging, continuation patch
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Turn Normalization
//!
//! Dialogue models accept only `user`/`model` alternation that starts and ends
//! with the user. Stored history is arbitrary: consecutive user messages,
//! system notes, or a thread ending on an assistant reply. Nothing here touches
//! storage so the shaping rules can be tested in isolation.

use crate::constants::prompt::{CONTINUATION_TEXT, MERGE_SEPARATOR, SUMMARY_HEADING};
use crate::llm::prompts::get_report_chat_prompt;
use crate::llm::{Turn, TurnRole};
use crate::models::{MessageRecord, MessageRole, SummaryView};

/// Produce a legal alternating sequence from a leading context turn and history
///
/// - The leading turn is emitted first, always as a user turn
/// - A turn with the same role as the previous output turn is merged into it
/// - Blank turns are dropped
/// - A sequence ending on the model gets a synthetic user continuation
#[must_use]
pub fn normalize_turns<I>(leading: Turn, history: I) -> Vec<Turn>
where
    I: IntoIterator<Item = Turn>,
{
    let mut output = vec![Turn::user(leading.text)];

    for turn in history {
        if turn.text.trim().is_empty() {
            continue;
        }
        match output.last_mut() {
            Some(last) if last.role == turn.role => {
                last.text.push_str(MERGE_SEPARATOR);
                last.text.push_str(&turn.text);
            }
            _ => output.push(turn),
        }
    }

    if output.last().is_some_and(|t| t.role == TurnRole::Model) {
        output.push(Turn::user(CONTINUATION_TEXT));
    }
    output
}

/// Fuse instructions and the live summary into the leading context turn
#[must_use]
pub fn build_leading_context(instructions: Option<&str>, summary: Option<&SummaryView>) -> Turn {
    let default_instructions = get_report_chat_prompt();
    let instructions = instructions
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default_instructions)
        .trim();

    match summary {
        Some(summary) => Turn::user(format!(
            "{instructions}\n\n{SUMMARY_HEADING}\n{}",
            summary.text
        )),
        None => Turn::user(instructions),
    }
}

/// Map a stored role into the dialogue vocabulary
#[must_use]
pub const fn dialogue_role(role: MessageRole) -> TurnRole {
    match role {
        MessageRole::Assistant => TurnRole::Model,
        MessageRole::User | MessageRole::System => TurnRole::User,
    }
}

/// Convert stored messages (oldest first) into turns
#[must_use]
pub fn history_turns(messages: &[MessageRecord]) -> Vec<Turn> {
    messages
        .iter()
        .map(|m| Turn::new(dialogue_role(m.role), m.content.clone()))
        .collect()
}
