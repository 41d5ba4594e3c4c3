// ABOUTME: Size-triggered compaction of chat threads into one running summary per report
// ABOUTME: Keeps a verbatim hot tail, prunes by the recorded coverage boundary, then sweeps retention
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::ownership::OwnershipGuard;
use super::retention::RetentionReaper;
use crate::config::MemoryConfig;
use crate::database::format_timestamp;
use crate::database::repositories::{MessageRepository, Repositories, SummaryRepository};
use crate::errors::AppResult;
use crate::models::{MessageRecord, SummaryRecord};
use crate::summarization::{tail_chars, truncate_chars, DigestSource, FallbackSummarizer};

/// Heading that carries the previous digest into the next one
const PREVIOUS_SUMMARY_HEADING: &str = "Previous summary:";

/// Joins the kept tail of the previous digest to the new transcript in a fallback digest
const FALLBACK_SEPARATOR: &str = "\n\n";

/// What a compaction check did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompactionOutcome {
    /// Whether a new digest was written
    pub summarized: bool,
    /// Coverage boundary of the live summary, set only when `summarized`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage_up_to: Option<DateTime<Utc>>,
    /// Raw messages deleted because the summary now covers them
    pub pruned: u64,
    /// Raw messages deleted by the retention sweep
    pub expired: u64,
    /// Strategy that produced the digest
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest_source: Option<DigestSource>,
}

impl CompactionOutcome {
    const fn skipped(expired: u64) -> Self {
        Self {
            summarized: false,
            coverage_up_to: None,
            pruned: 0,
            expired,
            digest_source: None,
        }
    }
}

/// Thresholds and ceilings for one engine
#[derive(Debug, Clone, Copy)]
struct CompactionPolicy {
    message_threshold: usize,
    byte_threshold: usize,
    anchor_count: usize,
    input_max_chars: usize,
    summary_max_chars: usize,
}

/// Decides when a thread is too big and replaces its older turns with a digest
#[derive(Clone)]
pub struct CompactionEngine {
    guard: OwnershipGuard,
    messages: Arc<dyn MessageRepository>,
    summaries: Arc<dyn SummaryRepository>,
    summarizer: FallbackSummarizer,
    reaper: RetentionReaper,
    policy: CompactionPolicy,
}

impl CompactionEngine {
    /// Create an engine; the reaper runs after every check
    #[must_use]
    pub fn new(
        guard: OwnershipGuard,
        repositories: &Repositories,
        summarizer: FallbackSummarizer,
        reaper: RetentionReaper,
        config: &MemoryConfig,
    ) -> Self {
        Self {
            guard,
            messages: Arc::clone(&repositories.messages),
            summaries: Arc::clone(&repositories.summaries),
            summarizer,
            reaper,
            policy: CompactionPolicy {
                message_threshold: config.summarize_message_threshold,
                byte_threshold: config.summarize_byte_threshold,
                anchor_count: config.anchor_count,
                input_max_chars: config.summarizer_input_max_chars,
                summary_max_chars: config.summary_max_chars,
            },
        }
    }

    /// Compact the thread if it crossed either threshold, then sweep retention
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if the caller does not own the report, or a database
    /// error. Summarizer failures never surface here.
    #[instrument(skip(self))]
    pub async fn summarize_if_needed(
        &self,
        report_id: &str,
        user_id: &str,
    ) -> AppResult<CompactionOutcome> {
        self.guard.assert_ownership(report_id, user_id).await?;

        let outcome = self.compact(report_id, user_id).await?;
        let expired = self.reaper.sweep(report_id, user_id).await?;

        Ok(CompactionOutcome { expired, ..outcome })
    }

    async fn compact(&self, report_id: &str, user_id: &str) -> AppResult<CompactionOutcome> {
        let previous = self.summaries.get(report_id).await?;
        let message_count = self.messages.count(report_id, user_id).await?;
        let total_bytes = self.messages.total_bytes(report_id, user_id).await?
            + previous.as_ref().map_or(0, |s| s.summary.len() as u64);

        if !self.policy.should_compact(message_count, total_bytes) {
            debug!(message_count, total_bytes, "Compaction not needed");
            return Ok(CompactionOutcome::skipped(0));
        }

        let messages = self.messages.list_ascending(report_id, user_id).await?;
        let split_at = messages.len().saturating_sub(self.policy.anchor_count);
        let (older, _hot_tail) = messages.split_at(split_at);

        // Rows at or below an existing boundary are already in the digest
        let covered = previous.as_ref().map(|s| s.coverage_up_to);
        let candidates: Vec<&MessageRecord> = older
            .iter()
            .filter(|m| covered.is_none_or(|boundary| m.created_at > boundary))
            .collect();

        let Some(last) = candidates.last() else {
            debug!(message_count, "No compaction candidates outside the hot tail");
            return Ok(CompactionOutcome::skipped(0));
        };
        let coverage_up_to = last.created_at;
        let session_id = last.session_id.clone();

        let input = self.policy.summarizer_input(previous.as_ref(), &candidates);
        let fallback_input = self.policy.fallback_input(previous.as_ref(), &candidates);
        let digest = self.summarizer.digest_or(&input, &fallback_input).await;
        let summary_text = truncate_chars(&digest.text, self.policy.summary_max_chars);

        let stored = self
            .summaries
            .upsert(report_id, Some(session_id.as_str()), &summary_text, coverage_up_to)
            .await?;

        // Prune with the boundary actually persisted, never "all current rows"
        let pruned = self
            .messages
            .delete_up_to(report_id, user_id, stored.coverage_up_to)
            .await?;

        info!(
            report_id,
            user_id,
            candidates = candidates.len(),
            pruned,
            digest_source = digest.source.as_str(),
            coverage_up_to = %format_timestamp(&stored.coverage_up_to),
            "Chat thread compacted"
        );

        Ok(CompactionOutcome {
            summarized: true,
            coverage_up_to: Some(stored.coverage_up_to),
            pruned,
            expired: 0,
            digest_source: Some(digest.source),
        })
    }
}

impl CompactionPolicy {
    /// Either threshold is sufficient
    fn should_compact(&self, message_count: u64, total_bytes: u64) -> bool {
        message_count > self.message_threshold as u64 || total_bytes > self.byte_threshold as u64
    }

    /// Previous digest plus `[timestamp] [role]: content` lines, cut to the input ceiling
    fn summarizer_input(&self, previous: Option<&SummaryRecord>, candidates: &[&MessageRecord]) -> String {
        let mut input = String::new();
        if let Some(previous) = previous {
            let _ = write!(input, "{PREVIOUS_SUMMARY_HEADING}\n{}\n\n", previous.summary);
        }
        input.push_str(&transcript(candidates));
        truncate_chars(&input, self.input_max_chars)
    }

    /// Text the truncation fallback keeps when the summarizer is unavailable
    ///
    /// The new transcript is guaranteed at least half of the summary cap; the
    /// previous digest only contributes its most recent tail. Otherwise a digest
    /// already at the cap would crowd out every newly pruned turn.
    fn fallback_input(&self, previous: Option<&SummaryRecord>, candidates: &[&MessageRecord]) -> String {
        let transcript = transcript(candidates);
        let Some(previous) = previous else {
            return transcript;
        };

        let reserved = transcript.chars().count().min(self.summary_max_chars / 2);
        let prior_budget = self
            .summary_max_chars
            .saturating_sub(reserved + FALLBACK_SEPARATOR.len());
        let prior = tail_chars(previous.summary.trim(), prior_budget);
        if prior.is_empty() {
            transcript
        } else {
            format!("{prior}{FALLBACK_SEPARATOR}{transcript}")
        }
    }
}

/// Candidates as `[timestamp] [role]: content` lines, oldest first
fn transcript(candidates: &[&MessageRecord]) -> String {
    let mut lines = String::new();
    for message in candidates {
        let _ = writeln!(
            lines,
            "[{}] [{}]: {}",
            format_timestamp(&message.created_at),
            message.role,
            message.content
        );
    }
    lines.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::storage_now;
    use crate::models::MessageRole;

    fn policy() -> CompactionPolicy {
        CompactionPolicy {
            message_threshold: 20,
            byte_threshold: 1000,
            anchor_count: 3,
            input_max_chars: 10_000,
            summary_max_chars: 100,
        }
    }

    fn message(role: MessageRole, content: &str) -> MessageRecord {
        MessageRecord {
            id: "m".to_owned(),
            session_id: "s".to_owned(),
            report_id: "r".to_owned(),
            user_id: "u".to_owned(),
            role,
            content: content.to_owned(),
            created_at: storage_now(),
        }
    }

    #[test]
    fn test_trigger_is_either_threshold() {
        let policy = policy();
        assert!(!policy.should_compact(20, 1000));
        assert!(policy.should_compact(21, 10));
        assert!(policy.should_compact(2, 1001));
    }

    #[test]
    fn test_input_lists_roles_and_carries_previous_summary() {
        let first = message(MessageRole::User, "What drives revenue?");
        let second = message(MessageRole::Assistant, "Subscriptions.");
        let previous = SummaryRecord {
            id: "s".to_owned(),
            report_id: "r".to_owned(),
            session_id: None,
            summary: "User asked about margins.".to_owned(),
            coverage_up_to: storage_now(),
            updated_at: storage_now(),
        };

        let input = policy().summarizer_input(Some(&previous), &[&first, &second]);

        assert!(input.starts_with("Previous summary:\nUser asked about margins.\n\n["));
        assert!(input.contains("] [user]: What drives revenue?\n"));
        assert!(input.ends_with("] [assistant]: Subscriptions."));
    }

    #[test]
    fn test_fallback_without_previous_is_the_transcript() {
        let first = message(MessageRole::User, "hello");
        let input = policy().fallback_input(None, &[&first]);
        assert!(input.starts_with('['));
        assert!(input.ends_with("] [user]: hello"));
    }

    #[test]
    fn test_fallback_reserves_half_the_cap_for_new_turns() {
        let previous = SummaryRecord {
            id: "s".to_owned(),
            report_id: "r".to_owned(),
            session_id: None,
            summary: format!("{}END", "o".repeat(200)),
            coverage_up_to: storage_now(),
            updated_at: storage_now(),
        };
        let fresh = message(MessageRole::Assistant, &"n".repeat(200));

        let input = policy().fallback_input(Some(&previous), &[&fresh]);
        let digest = truncate_chars(&input, 100);

        // Previous digest keeps only its tail, then the new transcript begins
        assert!(digest.starts_with('…'));
        assert!(digest.contains("END\n\n["));
        assert!(digest.contains("[assistant]: nnn"));
        assert!(!digest.contains(PREVIOUS_SUMMARY_HEADING));
    }

    #[test]
    fn test_input_is_cut_to_ceiling() {
        let long = message(MessageRole::User, &"x".repeat(500));
        let policy = CompactionPolicy {
            input_max_chars: 64,
            ..policy()
        };
        assert_eq!(policy.summarizer_input(None, &[&long]).chars().count(), 64);
    }
}
