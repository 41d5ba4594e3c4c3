// ABOUTME: Live question command for report-chat-cli
// ABOUTME: Runs one full chat round against Gemini over the bounded thread memory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use report_chat_memory::{
    config::{llm::GEMINI_API_KEY_ENV, AppConfig},
    database::Database,
    errors::{AppError, AppResult},
    services::{ReportChatService, SendMessage},
};

type Result<T> = AppResult<T>;

use super::{memory, print_json, provider};

/// Ask a question and print the stored exchange
pub async fn ask(
    database: &Database,
    config: &AppConfig,
    report: String,
    user: String,
    question: String,
    instructions: Option<String>,
) -> Result<()> {
    let provider = provider(config)?
        .ok_or_else(|| AppError::config(format!("{GEMINI_API_KEY_ENV} is required for ask")))?;
    let service = ReportChatService::new(memory(database, config)?, provider);

    let reply = service
        .send_message(SendMessage {
            report_id: report,
            user_id: user,
            text: question,
            instructions,
            model: Some(config.llm.model.clone()),
        })
        .await?;
    print_json(&reply)
}
