// ABOUTME: Sole authorization checkpoint for chat threads
// ABOUTME: Verifies the caller owns the report before any read or write on its thread
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::warn;

use crate::database::repositories::ReportRepository;
use crate::errors::{AppError, AppResult};

/// Checks report ownership on every call; results are never cached
#[derive(Clone)]
pub struct OwnershipGuard {
    reports: Arc<dyn ReportRepository>,
}

impl OwnershipGuard {
    /// Create a guard over the report ownership lookup
    #[must_use]
    pub fn new(reports: Arc<dyn ReportRepository>) -> Self {
        Self { reports }
    }

    /// Fail with `Forbidden` unless `report_id` exists and is owned by `user_id`
    ///
    /// A missing report and a report owned by someone else are indistinguishable
    /// to the caller.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` on ownership failure, or a database error if the lookup fails.
    pub async fn assert_ownership(&self, report_id: &str, user_id: &str) -> AppResult<()> {
        match self.reports.report_owner(report_id).await? {
            Some(owner) if owner == user_id => Ok(()),
            _ => {
                warn!(report_id, user_id, "Ownership check failed");
                Err(AppError::forbidden(
                    "Report not found or not accessible to this user",
                ))
            }
        }
    }
}
