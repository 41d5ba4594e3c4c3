// ABOUTME: Command modules for report-chat-cli
// ABOUTME: Thread maintenance commands and the live question command
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod ask;
pub mod thread;

use std::sync::Arc;

use report_chat_memory::{
    config::AppConfig,
    database::{repositories::Repositories, Database},
    errors::AppResult,
    llm::{GeminiProvider, LlmProvider},
    services::ChatMemory,
    summarization::{LlmSummarizer, Summarizer, TruncatingSummarizer},
};
use serde::Serialize;
use tracing::info;

/// Gemini provider if an API key is configured
pub fn provider(config: &AppConfig) -> AppResult<Option<Arc<dyn LlmProvider>>> {
    if !config.llm.is_configured() {
        return Ok(None);
    }
    let provider = GeminiProvider::from_config(&config.llm)?;
    Ok(Some(Arc::new(provider)))
}

/// Memory facade with the best available summarizer
pub fn memory(database: &Database, config: &AppConfig) -> AppResult<ChatMemory> {
    let summarizer: Arc<dyn Summarizer> = match provider(config)? {
        Some(provider) => {
            info!(provider = provider.name(), "Using remote summarizer");
            Arc::new(LlmSummarizer::new(provider, config.memory.summary_max_chars))
        }
        None => Arc::new(TruncatingSummarizer::new(config.memory.summary_max_chars)),
    };
    Ok(ChatMemory::new(
        Repositories::sqlite(database),
        summarizer,
        config.memory.clone(),
    ))
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
