// ABOUTME: Core types and constants for the report chat memory subsystem
// ABOUTME: Foundation crate with error handling, memory-policy constants and records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Report Chat Core
//!
//! Foundation crate providing shared types and constants for report chat memory.
//! This crate is designed to change infrequently, enabling incremental compilation
//! benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `DatabaseError`
//! - **constants**: Memory budgets, compaction thresholds and window sizes
//! - **models**: Sessions, messages, summaries and the conversation view

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (sessions, messages, summaries)
pub mod models;
