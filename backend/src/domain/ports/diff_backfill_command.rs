//! Driving port for attaching diffs to stored commits.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{CommitKey, Error};

/// A commit whose diff could not be attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillFailure {
    /// Commit affected.
    #[serde(flatten)]
    pub key: CommitKey,
    /// Failure description.
    pub error: String,
}

/// Response of one backfill pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillReport {
    /// Commits that lacked a diff when the pass started.
    pub missing_count: usize,
    /// Diffs attached.
    pub updated_count: usize,
    /// Commits that vanished between lookup and update.
    pub unmatched_count: usize,
    /// Per-commit failures; the pass continued past each.
    pub failures: Vec<BackfillFailure>,
}

/// Trigger a diff backfill.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiffBackfillCommand: Send + Sync {
    /// Fetch and attach the diff of every commit that lacks one.
    async fn backfill_diffs(&self) -> Result<BackfillReport, Error>;
}
