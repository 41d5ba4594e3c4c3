// ABOUTME: Unified error handling with machine-readable codes and HTTP status mapping
// ABOUTME: Defines AppError, ErrorCode and the JSON error envelope consumed by the HTTP layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every failure leaving the chat memory subsystem is an [`AppError`] carrying an
//! [`ErrorCode`]. The code is stable and machine-readable; the HTTP layer maps it to a
//! status class with [`ErrorCode::http_status`] and decides on retries with
//! [`ErrorCode::is_retryable`].

/// Database error types with sqlx conversion
#[cfg(feature = "database-errors")]
pub mod database;

#[cfg(feature = "database-errors")]
pub use database::DatabaseError;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the chat memory subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorCode {
    // Authorization (1000-1999)
    /// Caller does not own the report the thread belongs to
    #[serde(rename = "FORBIDDEN")]
    Forbidden = 1004,

    // Validation (3000-3999)
    /// Missing or invalid role, or empty content
    #[serde(rename = "VALIDATION_FAILED")]
    ValidationFailed = 3000,
    /// A single message exceeds the per-message byte cap
    #[serde(rename = "MESSAGE_TOO_LARGE")]
    MessageTooLarge = 3010,
    /// Appending would push the thread over its byte cap
    #[serde(rename = "CONVERSATION_CAP_EXCEEDED")]
    ConversationCapExceeded = 3011,

    // Resource Management (4000-4999)
    /// The requested resource was not found
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// Session could not be resolved or created
    #[serde(rename = "SESSION_ERROR")]
    SessionError = 4010,

    // External Services (5000-5999)
    /// The generative-AI provider returned an error
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,
    /// The generative-AI provider rate limited the request
    #[serde(rename = "EXTERNAL_RATE_LIMITED")]
    ExternalRateLimited = 5003,

    // Configuration (6000-6999)
    /// Configuration missing or invalid
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,

    // Internal Errors (9000-9999)
    /// Unclassified internal failure
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Storage backend failure
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::ValidationFailed => 400,
            Self::Forbidden => 403,
            Self::ResourceNotFound => 404,
            Self::MessageTooLarge | Self::ConversationCapExceeded => 413,
            Self::ExternalServiceError => 502,
            Self::ExternalRateLimited => 503,
            Self::SessionError | Self::ConfigError | Self::InternalError | Self::DatabaseError => {
                500
            }
        }
    }

    /// Stable machine-readable code string (matches the serde representation)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Forbidden => "FORBIDDEN",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::MessageTooLarge => "MESSAGE_TOO_LARGE",
            Self::ConversationCapExceeded => "CONVERSATION_CAP_EXCEEDED",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::SessionError => "SESSION_ERROR",
            Self::ExternalServiceError => "EXTERNAL_SERVICE_ERROR",
            Self::ExternalRateLimited => "EXTERNAL_RATE_LIMITED",
            Self::ConfigError => "CONFIG_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }

    /// Whether a caller may safely retry the operation unchanged.
    ///
    /// Size and validation failures are deterministic and never retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::SessionError
                | Self::DatabaseError
                | Self::ExternalServiceError
                | Self::ExternalRateLimited
        )
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Forbidden => "You do not have access to this report",
            Self::ValidationFailed => "The provided message is invalid",
            Self::MessageTooLarge => "The message exceeds the maximum allowed size",
            Self::ConversationCapExceeded => "The conversation has reached its storage limit",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::SessionError => "The chat session could not be resolved",
            Self::ExternalServiceError => "The AI service encountered an error",
            Self::ExternalRateLimited => "The AI service is rate limiting requests",
            Self::ConfigError => "Configuration error encountered",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database operation failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the chat memory subsystem
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional structured details for the caller
    pub details: serde_json::Value,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: serde_json::Value::Null,
            source: None,
        }
    }

    /// Add details to the error
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Ownership check failed
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Invalid role or content
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Single message over the per-message cap
    #[must_use]
    pub fn message_too_large(bytes: usize, cap: usize) -> Self {
        Self::new(
            ErrorCode::MessageTooLarge,
            format!("Message is {bytes} bytes, limit is {cap} bytes"),
        )
        .with_details(serde_json::json!({ "bytes": bytes, "limit": cap }))
    }

    /// Thread total would exceed the per-thread cap
    #[must_use]
    pub fn conversation_cap_exceeded(current: u64, incoming: usize, cap: usize) -> Self {
        Self::new(
            ErrorCode::ConversationCapExceeded,
            format!(
                "Conversation holds {current} bytes; adding {incoming} would exceed {cap} bytes"
            ),
        )
        .with_details(serde_json::json!({
            "current_bytes": current,
            "incoming_bytes": incoming,
            "limit": cap
        }))
    }

    /// Session could not be resolved or created
    pub fn session(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SessionError, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Body of an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Machine-readable code
    pub code: ErrorCode,
    /// HTTP status class
    pub status: u16,
    /// Human-readable message
    pub message: String,
    /// Structured details, omitted when empty
    #[serde(skip_serializing_if = "serde_json::Value::is_null", default)]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                status: error.code.http_status(),
                message: error.message,
                details: error.details,
            },
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(format!("Serialization failed: {error}")).with_source(error)
    }
}
