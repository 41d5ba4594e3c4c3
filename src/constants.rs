// ABOUTME: Application constants re-exported from report-chat-core
// ABOUTME: Memory budgets, compaction thresholds, window sizes and prompt markers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use report_chat_core::constants::*;
