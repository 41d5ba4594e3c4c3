// ABOUTME: Report chat orchestration over the bounded memory and a dialogue provider
// ABOUTME: Append, compact, rebuild the prompt window, call the model, store the reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::chat_memory::ChatMemory;
use super::conversation_store::{AppendMessage, AppendedMessage};
use super::turns::{build_leading_context, history_turns, normalize_turns};
use crate::errors::{AppResult, ErrorCode};
use crate::llm::{ChatRequest, LlmProvider};
use crate::models::MessageRole;

/// A user question about a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessage {
    /// Report being discussed
    pub report_id: String,
    /// Caller
    pub user_id: String,
    /// Question text
    pub text: String,
    /// Instruction block for the leading context turn; defaults to the report chat prompt
    pub instructions: Option<String>,
    /// Model override, also used to tag a new session
    pub model: Option<String>,
}

/// Result of one question/answer round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// Model answer
    pub reply: String,
    /// Stored id of the question
    pub user_message_id: String,
    /// Stored id of the answer
    pub assistant_message_id: String,
    /// Session both messages were filed under
    pub session_id: String,
}

/// Drives one chat round against the dialogue capability
pub struct ReportChatService {
    memory: ChatMemory,
    provider: Arc<dyn LlmProvider>,
}

impl ReportChatService {
    /// Create a service over `memory` and `provider`
    #[must_use]
    pub fn new(memory: ChatMemory, provider: Arc<dyn LlmProvider>) -> Self {
        Self { memory, provider }
    }

    /// Underlying memory
    #[must_use]
    pub const fn memory(&self) -> &ChatMemory {
        &self.memory
    }

    /// Ask a question and store both sides of the exchange
    ///
    /// # Errors
    ///
    /// Returns memory errors (ownership, budgets, storage) and provider errors.
    /// Nothing is stored for the answer if the provider fails.
    #[instrument(skip(self, request), fields(report_id = %request.report_id, user_id = %request.user_id))]
    pub async fn send_message(&self, request: SendMessage) -> AppResult<ChatReply> {
        let question = self
            .append_with_compaction(&request, MessageRole::User, &request.text)
            .await?;
        self.memory
            .summarize_if_needed(&request.report_id, &request.user_id)
            .await?;

        let view = self
            .memory
            .get_conversation(&request.report_id, &request.user_id, None)
            .await?;
        let leading = build_leading_context(request.instructions.as_deref(), view.summary.as_ref());
        let turns = normalize_turns(leading, history_turns(&view.messages));

        let chat_request = match &request.model {
            Some(model) => ChatRequest::new(turns).with_model(model.clone()),
            None => ChatRequest::new(turns),
        };
        let response = self.provider.complete(&chat_request).await?;

        let answer = self
            .append_with_compaction(&request, MessageRole::Assistant, &response.content)
            .await?;
        self.memory
            .summarize_if_needed(&request.report_id, &request.user_id)
            .await?;

        info!(
            session_id = %answer.session_id,
            model = %response.model,
            turns = chat_request.turns.len(),
            "Report chat round completed"
        );
        Ok(ChatReply {
            reply: response.content,
            user_message_id: question.message_id,
            assistant_message_id: answer.message_id,
            session_id: answer.session_id,
        })
    }

    /// Append; on a full thread compact once and retry once
    async fn append_with_compaction(
        &self,
        request: &SendMessage,
        role: MessageRole,
        content: &str,
    ) -> AppResult<AppendedMessage> {
        let build = || {
            let input = AppendMessage::new(&request.report_id, &request.user_id, role.as_str(), content);
            match &request.model {
                Some(model) => input.with_model(model.clone()),
                None => input,
            }
        };

        match self.memory.append_message(build()).await {
            Err(e) if e.code == ErrorCode::ConversationCapExceeded => {
                warn!(role = %role, "Thread budget full, compacting before retry");
                self.memory
                    .summarize_if_needed(&request.report_id, &request.user_id)
                    .await?;
                self.memory.append_message(build()).await
            }
            result => result,
        }
    }
}
