// ABOUTME: Memory policy configuration for chat threads
// ABOUTME: Byte budgets, retention window, compaction thresholds and read window sizes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::env_parse_or;
use crate::constants::{compaction, limits, window};
use crate::errors::{AppError, AppResult};

/// Recognized memory options, one instance shared by every component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Maximum UTF-8 bytes in a single message
    pub message_max_bytes: usize,
    /// Maximum stored bytes per thread (messages plus live summary)
    pub thread_max_bytes: usize,
    /// Age in days after which raw messages are swept
    pub retention_days: i64,
    /// Compaction fires when the thread holds more messages than this
    pub summarize_message_threshold: usize,
    /// Compaction fires when the thread holds more bytes than this
    pub summarize_byte_threshold: usize,
    /// Maximum characters in a stored summary
    pub summary_max_chars: usize,
    /// Serialized candidate text is cut to this many characters before summarization
    pub summarizer_input_max_chars: usize,
    /// Most recent messages compaction never touches
    pub anchor_count: usize,
    /// Window used when a reader passes no limit
    pub default_window: usize,
    /// Upper clamp for reader limits
    pub max_window: usize,
    /// Seconds the remote summarizer may take before falling back
    pub summarizer_timeout_secs: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            message_max_bytes: limits::MESSAGE_MAX_BYTES,
            thread_max_bytes: limits::THREAD_MAX_BYTES,
            retention_days: limits::RETENTION_DAYS,
            summarize_message_threshold: compaction::MESSAGE_THRESHOLD,
            summarize_byte_threshold: compaction::BYTE_THRESHOLD,
            summary_max_chars: compaction::SUMMARY_MAX_CHARS,
            summarizer_input_max_chars: compaction::SUMMARIZER_INPUT_MAX_CHARS,
            anchor_count: compaction::ANCHOR_COUNT,
            default_window: window::DEFAULT_WINDOW,
            max_window: window::MAX_WINDOW,
            summarizer_timeout_secs: compaction::SUMMARIZER_TIMEOUT_SECS,
        }
    }
}

impl MemoryConfig {
    /// Load memory configuration from environment
    ///
    /// # Errors
    ///
    /// Returns a config error if a variable is set but does not parse, or if the
    /// resulting combination fails [`MemoryConfig::validate`].
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();
        let config = Self {
            message_max_bytes: env_parse_or("CHAT_MESSAGE_MAX_BYTES", defaults.message_max_bytes)?,
            thread_max_bytes: env_parse_or("CHAT_THREAD_MAX_BYTES", defaults.thread_max_bytes)?,
            retention_days: env_parse_or("CHAT_RETENTION_DAYS", defaults.retention_days)?,
            summarize_message_threshold: env_parse_or(
                "CHAT_SUMMARIZE_MESSAGE_THRESHOLD",
                defaults.summarize_message_threshold,
            )?,
            summarize_byte_threshold: env_parse_or(
                "CHAT_SUMMARIZE_BYTE_THRESHOLD",
                defaults.summarize_byte_threshold,
            )?,
            summary_max_chars: env_parse_or("CHAT_SUMMARY_MAX_CHARS", defaults.summary_max_chars)?,
            summarizer_input_max_chars: env_parse_or(
                "CHAT_SUMMARIZER_INPUT_MAX_CHARS",
                defaults.summarizer_input_max_chars,
            )?,
            anchor_count: env_parse_or("CHAT_ANCHOR_COUNT", defaults.anchor_count)?,
            default_window: env_parse_or("CHAT_DEFAULT_WINDOW", defaults.default_window)?,
            max_window: env_parse_or("CHAT_MAX_WINDOW", defaults.max_window)?,
            summarizer_timeout_secs: env_parse_or(
                "CHAT_SUMMARIZER_TIMEOUT_SECS",
                defaults.summarizer_timeout_secs,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations no thread could satisfy
    ///
    /// # Errors
    ///
    /// Returns a config error describing the first violated constraint.
    pub fn validate(&self) -> AppResult<()> {
        if self.message_max_bytes == 0 || self.thread_max_bytes == 0 {
            return Err(AppError::config("Byte caps must be greater than zero"));
        }
        if self.message_max_bytes > self.thread_max_bytes {
            return Err(AppError::config(format!(
                "CHAT_MESSAGE_MAX_BYTES ({}) exceeds CHAT_THREAD_MAX_BYTES ({})",
                self.message_max_bytes, self.thread_max_bytes
            )));
        }
        if self.retention_days <= 0 || self.retention_days > limits::MAX_RETENTION_DAYS {
            return Err(AppError::config(format!(
                "CHAT_RETENTION_DAYS ({}) must be between 1 and {}",
                self.retention_days,
                limits::MAX_RETENTION_DAYS
            )));
        }
        if self.max_window == 0 {
            return Err(AppError::config("CHAT_MAX_WINDOW must be greater than zero"));
        }
        if self.default_window == 0 || self.default_window > self.max_window {
            return Err(AppError::config(format!(
                "CHAT_DEFAULT_WINDOW ({}) must be between 1 and CHAT_MAX_WINDOW ({})",
                self.default_window, self.max_window
            )));
        }
        if self.summary_max_chars == 0 {
            return Err(AppError::config("CHAT_SUMMARY_MAX_CHARS must be greater than zero"));
        }
        Ok(())
    }

    /// Retention window as a chrono duration, saturating for out-of-range day counts
    #[must_use]
    pub fn retention_window(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.retention_days).unwrap_or(chrono::Duration::MAX)
    }

    /// Remote summarizer timeout
    #[must_use]
    pub const fn summarizer_timeout(&self) -> Duration {
        Duration::from_secs(self.summarizer_timeout_secs)
    }

    /// Clamp a caller-supplied window into `[1, max_window]`
    #[must_use]
    pub fn clamp_window(&self, limit: Option<i64>) -> usize {
        let max = self.max_window.max(1);
        match limit {
            None => self.default_window.clamp(1, max),
            Some(requested) if requested < 1 => 1,
            Some(requested) => usize::try_from(requested).map_or(max, |n| n.min(max)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(MemoryConfig::default().validate().is_ok());
    }

    #[test]
    fn test_message_cap_above_thread_cap_is_rejected() {
        let config = MemoryConfig {
            message_max_bytes: 1_000,
            thread_max_bytes: 500,
            ..MemoryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_window_above_max_is_rejected() {
        let config = MemoryConfig {
            default_window: 50,
            max_window: 10,
            ..MemoryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retention_days_are_bounded() {
        for retention_days in [0, -1, limits::MAX_RETENTION_DAYS + 1, 100_000_000] {
            let config = MemoryConfig {
                retention_days,
                ..MemoryConfig::default()
            };
            assert!(config.validate().is_err(), "{retention_days} accepted");
        }

        let century = MemoryConfig {
            retention_days: limits::MAX_RETENTION_DAYS,
            ..MemoryConfig::default()
        };
        assert!(century.validate().is_ok());
    }

    #[test]
    fn test_retention_window_saturates_instead_of_panicking() {
        let config = MemoryConfig {
            retention_days: i64::MAX,
            ..MemoryConfig::default()
        };
        assert_eq!(config.retention_window(), chrono::Duration::MAX);
    }

    #[test]
    fn test_clamp_window() {
        let config = MemoryConfig::default();
        assert_eq!(config.clamp_window(None), config.default_window);
        assert_eq!(config.clamp_window(Some(0)), 1);
        assert_eq!(config.clamp_window(Some(-7)), 1);
        assert_eq!(config.clamp_window(Some(5)), 5);
        assert_eq!(config.clamp_window(Some(10_000)), config.max_window);
    }
}
