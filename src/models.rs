// ABOUTME: Persisted chat records re-exported from report-chat-core
// ABOUTME: Sessions, messages, summaries and the derived conversation view
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use report_chat_core::models::*;
