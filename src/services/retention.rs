// ABOUTME: Age-based garbage collection of raw chat messages
// ABOUTME: Deletes messages older than the retention window regardless of summary coverage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, info};

use super::ownership::OwnershipGuard;
use crate::database::repositories::MessageRepository;
use crate::database::storage_now;
use crate::errors::AppResult;

/// Time-based sweep over one thread
#[derive(Clone)]
pub struct RetentionReaper {
    guard: OwnershipGuard,
    messages: Arc<dyn MessageRepository>,
    retention: Duration,
}

impl RetentionReaper {
    /// Create a reaper that keeps `retention` worth of raw history
    #[must_use]
    pub fn new(guard: OwnershipGuard, messages: Arc<dyn MessageRepository>, retention: Duration) -> Self {
        Self {
            guard,
            messages,
            retention,
        }
    }

    /// Delete expired messages of the thread, returning how many were removed
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if the caller does not own the report, or a database error.
    pub async fn apply_retention(&self, report_id: &str, user_id: &str) -> AppResult<u64> {
        self.guard.assert_ownership(report_id, user_id).await?;
        self.sweep(report_id, user_id).await
    }

    /// Sweep without re-checking ownership; callers must have checked already
    pub(crate) async fn sweep(&self, report_id: &str, user_id: &str) -> AppResult<u64> {
        let Some(cutoff) = storage_now().checked_sub_signed(self.retention) else {
            debug!(report_id, user_id, "Retention window exceeds the representable range, nothing to sweep");
            return Ok(0);
        };
        let deleted = self
            .messages
            .delete_older_than(report_id, user_id, cutoff)
            .await?;

        if deleted > 0 {
            info!(report_id, user_id, deleted, %cutoff, "Expired chat messages removed");
        } else {
            debug!(report_id, user_id, "No expired chat messages");
        }
        Ok(deleted)
    }
}
