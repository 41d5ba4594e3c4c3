// ABOUTME: Remote summarization strategy backed by any LlmProvider
// ABOUTME: Sends the compile-time summarization prompt plus transcript as a single user turn
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::truncation::truncate_chars;
use super::Summarizer;
use crate::errors::{AppError, AppResult};
use crate::llm::prompts::summarize_instructions;
use crate::llm::{ChatRequest, LlmProvider, Turn};

/// Low temperature keeps digests stable across re-compactions
const SUMMARY_TEMPERATURE: f32 = 0.2;

/// Summarizer that delegates to a generative-AI provider
pub struct LlmSummarizer {
    provider: Arc<dyn LlmProvider>,
    max_chars: usize,
    model: Option<String>,
}

impl LlmSummarizer {
    /// Create a summarizer over `provider` with an output ceiling
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, max_chars: usize) -> Self {
        Self {
            provider,
            max_chars,
            model: None,
        }
    }

    /// Override the provider's default model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    fn build_request(&self, text: &str) -> ChatRequest {
        let prompt = format!("{}\n{text}", summarize_instructions(self.max_chars));
        let request = ChatRequest::new(vec![Turn::user(prompt)]).with_temperature(SUMMARY_TEMPERATURE);
        match &self.model {
            Some(model) => request.with_model(model.clone()),
            None => request,
        }
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    fn name(&self) -> &'static str {
        "llm"
    }

    #[instrument(skip(self, text), fields(provider = self.provider.name(), input_chars = text.len()))]
    async fn summarize(&self, text: &str) -> AppResult<String> {
        let response = self.provider.complete(&self.build_request(text)).await?;
        let digest = response.content.trim();
        if digest.is_empty() {
            return Err(AppError::external_service(
                self.provider.name(),
                "Summarizer returned empty text",
            ));
        }

        debug!(digest_chars = digest.chars().count(), "Received summary from provider");
        Ok(truncate_chars(digest, self.max_chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatResponse, TurnRole};

    struct EchoProvider;

    #[async_trait]
    impl LlmProvider for EchoProvider {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn default_model(&self) -> &str {
            "echo-1"
        }

        async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
            Ok(ChatResponse {
                content: format!("  {}  ", request.turns.len()),
                model: "echo-1".to_owned(),
                usage: None,
                finish_reason: None,
            })
        }

        async fn health_check(&self) -> Result<bool, AppError> {
            Ok(true)
        }
    }

    #[test]
    fn test_request_is_single_user_turn_with_transcript() {
        let summarizer = LlmSummarizer::new(Arc::new(EchoProvider), 500).with_model("flash");
        let request = summarizer.build_request("[user]: hi");

        assert_eq!(request.turns.len(), 1);
        assert_eq!(request.turns[0].role, TurnRole::User);
        assert!(request.turns[0].text.ends_with("[user]: hi"));
        assert!(request.turns[0].text.contains("500"));
        assert_eq!(request.model.as_deref(), Some("flash"));
    }

    #[tokio::test]
    async fn test_summary_is_trimmed() {
        let summarizer = LlmSummarizer::new(Arc::new(EchoProvider), 500);
        assert_eq!(summarizer.summarize("text").await.unwrap(), "1");
    }
}
