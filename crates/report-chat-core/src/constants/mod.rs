// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Default memory budgets, compaction thresholds and read window sizes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Defaults for every recognized memory option. Runtime values come from
//! `MemoryConfig`, which falls back to these when an environment variable is unset.

/// Storage budgets for a single thread
pub mod limits {
    /// Maximum UTF-8 byte length of one message
    pub const MESSAGE_MAX_BYTES: usize = 16_384;
    /// Maximum stored bytes for one thread (messages plus live summary)
    pub const THREAD_MAX_BYTES: usize = 262_144;
    /// Raw messages older than this many days are deleted by the retention sweep
    pub const RETENTION_DAYS: i64 = 30;
    /// Upper bound accepted for the retention window (about a century)
    pub const MAX_RETENTION_DAYS: i64 = 36_500;
}

/// Compaction policy
pub mod compaction {
    /// Compact when a thread holds more than this many messages
    pub const MESSAGE_THRESHOLD: usize = 20;
    /// Compact when a thread holds more than this many bytes
    pub const BYTE_THRESHOLD: usize = 65_536;
    /// Maximum characters in a stored summary
    pub const SUMMARY_MAX_CHARS: usize = 4_000;
    /// Serialized candidate text is cut to this many characters before summarization
    pub const SUMMARIZER_INPUT_MAX_CHARS: usize = 24_000;
    /// Most recent messages that compaction never touches
    pub const ANCHOR_COUNT: usize = 3;
    /// Seconds to wait on the remote summarizer before falling back to truncation
    pub const SUMMARIZER_TIMEOUT_SECS: u64 = 20;
}

/// Read window sizes for conversation views
pub mod window {
    /// Messages returned when the caller gives no limit
    pub const DEFAULT_WINDOW: usize = 20;
    /// Upper clamp for caller-supplied limits
    pub const MAX_WINDOW: usize = 100;
}

/// Prompt reconstruction
pub mod prompt {
    /// Joins same-role turns merged by the normalizer
    pub const MERGE_SEPARATOR: &str = "\n\n---\n\n";
    /// Synthetic user turn appended when history ends on the model
    pub const CONTINUATION_TEXT: &str = "Please continue.";
    /// Heading placed before the running summary in the leading context turn
    pub const SUMMARY_HEADING: &str = "Summary of earlier conversation:";
    /// Marker appended by deterministic truncation
    pub const TRUNCATION_MARKER: &str = "…";
}

/// Service identification for logging
pub mod service_names {
    /// Service name used in structured logs
    pub const REPORT_CHAT_MEMORY: &str = "report-chat-memory";
}
