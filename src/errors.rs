// ABOUTME: Unified error handling re-exported from report-chat-core
// ABOUTME: Single import path for AppError, ErrorCode and DatabaseError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use report_chat_core::errors::*;
