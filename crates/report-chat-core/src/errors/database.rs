// ABOUTME: Structured error types for chat storage operations
// ABOUTME: Wraps sqlx failures with context and converts them into AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode};
use thiserror::Error;

/// Errors raised by the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Could not open or configure the connection pool
    #[error("Database connection failed: {context}")]
    ConnectionError {
        /// What was being attempted
        context: String,
    },

    /// A statement failed
    #[error("Query failed: {context}")]
    QueryError {
        /// What was being attempted
        context: String,
    },

    /// Schema creation failed
    #[error("Migration failed: {context}")]
    MigrationError {
        /// What was being attempted
        context: String,
    },

    /// A stored value could not be decoded into its domain type
    #[error("Invalid stored value for {field}: {reason}")]
    InvalidData {
        /// Column or field name
        field: String,
        /// Why decoding failed
        reason: String,
    },

    /// Raw driver error
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Wrap a driver error with a description of the failed operation
    pub fn query(context: impl Into<String>, source: &sqlx::Error) -> Self {
        Self::QueryError {
            context: format!("{}: {source}", context.into()),
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(error: DatabaseError) -> Self {
        Self::new(ErrorCode::DatabaseError, error.to_string()).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_maps_to_retryable_code() {
        let error: AppError = DatabaseError::QueryError {
            context: "insert message".to_owned(),
        }
        .into();

        assert_eq!(error.code, ErrorCode::DatabaseError);
        assert!(error.code.is_retryable());
        assert!(error.message.contains("insert message"));
    }
}
