// ABOUTME: Configuration module aggregating environment-driven settings
// ABOUTME: Database target, memory policy and generative-AI provider options
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration is environment-only: every setting has a default and an
//! override variable. Parse failures surface as `CONFIG_ERROR` rather than
//! being silently replaced by defaults.

/// Database connection target
pub mod database;
/// Generative-AI provider settings
pub mod llm;
/// Memory budgets and compaction policy
pub mod memory;

pub use database::{DatabaseConfig, DatabaseUrl};
pub use llm::LlmConfig;
pub use memory::MemoryConfig;

use std::env;
use std::str::FromStr;

use crate::errors::{AppError, AppResult};

/// Complete runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database settings
    pub database: DatabaseConfig,
    /// Memory policy
    pub memory: MemoryConfig,
    /// Provider settings
    pub llm: LlmConfig,
}

impl AppConfig {
    /// Load the complete configuration from environment
    ///
    /// # Errors
    ///
    /// Returns a config error if any memory option fails to parse or validate.
    pub fn from_env() -> AppResult<Self> {
        Ok(Self {
            database: DatabaseConfig::from_env(),
            memory: MemoryConfig::from_env()?,
            llm: LlmConfig::from_env(),
        })
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, using `default` when it is unset
fn env_parse_or<T>(key: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid value for {key} ('{raw}'): {e}"))),
        Err(_) => Ok(default),
    }
}
