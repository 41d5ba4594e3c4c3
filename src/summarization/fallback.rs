// ABOUTME: Strategy wrapper that bounds the primary summarizer and degrades to truncation
// ABOUTME: Compaction goes through this so an AI outage or hang never blocks pruning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::time::timeout;
use tracing::warn;

use super::truncation::TruncatingSummarizer;
use super::Summarizer;
use crate::errors::AppResult;

/// Which strategy produced a digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestSource {
    /// The primary (usually remote) summarizer
    Primary,
    /// Deterministic truncation after a primary failure or timeout
    Fallback,
}

impl DigestSource {
    /// Label for logs
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        }
    }
}

/// Digest text and its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// Summary text, at most the configured character cap
    pub text: String,
    /// Strategy that produced it
    pub source: DigestSource,
}

/// Primary summarizer under a timeout, with truncation as the fallback
#[derive(Clone)]
pub struct FallbackSummarizer {
    primary: Arc<dyn Summarizer>,
    fallback: TruncatingSummarizer,
    timeout: Duration,
}

impl FallbackSummarizer {
    /// Wrap `primary`; fallback output is capped at `max_chars`
    #[must_use]
    pub fn new(primary: Arc<dyn Summarizer>, max_chars: usize, timeout: Duration) -> Self {
        Self {
            primary,
            fallback: TruncatingSummarizer::new(max_chars),
            timeout,
        }
    }

    /// Produce a digest. Never fails.
    pub async fn digest(&self, text: &str) -> Digest {
        self.digest_or(text, text).await
    }

    /// Produce a digest of `text`, truncating `fallback_text` if the primary fails
    pub async fn digest_or(&self, text: &str, fallback_text: &str) -> Digest {
        let primary = self.primary.name();
        let failure = match timeout(self.timeout, self.primary.summarize(text)).await {
            Ok(Ok(summary)) if !summary.trim().is_empty() => {
                return Digest {
                    text: self.fallback.truncate(&summary),
                    source: DigestSource::Primary,
                };
            }
            Ok(Ok(_)) => "empty summary".to_owned(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {}ms", self.timeout.as_millis()),
        };

        warn!(
            summarizer = primary,
            reason = %failure,
            "Summarizer unavailable, falling back to truncation"
        );
        Digest {
            text: self.fallback.truncate(fallback_text),
            source: DigestSource::Fallback,
        }
    }
}

#[async_trait]
impl Summarizer for FallbackSummarizer {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn summarize(&self, text: &str) -> AppResult<String> {
        Ok(self.digest(text).await.text)
    }
}
