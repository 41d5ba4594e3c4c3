// ABOUTME: Generative-AI provider configuration
// ABOUTME: API key and model selection for the dialogue and summarization capability
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use super::env_var_or;

/// Environment variable for the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable selecting the model
pub const LLM_MODEL_ENV: &str = "REPORT_CHAT_LLM_MODEL";

/// Model used when none is configured
pub const DEFAULT_LLM_MODEL: &str = "gemini-2.5-flash";

/// Provider settings
#[derive(Clone)]
pub struct LlmConfig {
    /// API key, absent when the remote capability is not configured
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
}

impl LlmConfig {
    /// Load provider configuration from environment
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_key: env::var(GEMINI_API_KEY_ENV).ok().filter(|key| !key.trim().is_empty()),
            model: env_var_or(LLM_MODEL_ENV, DEFAULT_LLM_MODEL),
        }
    }

    /// Whether a remote provider can be constructed
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Debug for LlmConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .finish()
    }
}
