//! Driving port for incremental commit and pull-request sync.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Error, PageSize, RepoSlug, SyncTable};

/// Why a page walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The host returned an empty page or advertised no further page.
    Exhausted,
    /// A record older than the watermark was reached.
    CaughtUp,
    /// The configured page guard was hit.
    PageLimit,
}

/// Result of walking one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepositorySyncStatus {
    /// The walk completed.
    Synced {
        /// Pages fetched.
        pages: u32,
        /// Records received from the host.
        fetched: usize,
        /// Records that were new to the store.
        inserted: usize,
        /// Why the walk stopped.
        stop_reason: StopReason,
        /// Watermark written at the end of the walk, if any.
        watermark: Option<DateTime<Utc>>,
    },
    /// The host failed; other repositories were still walked.
    Failed {
        /// Failure description.
        error: String,
    },
}

/// Outcome for one repository of a sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySyncOutcome {
    /// `workspace/slug`.
    pub repo: RepoSlug,
    /// What happened.
    #[serde(flatten)]
    pub status: RepositorySyncStatus,
}

/// Response of a sync pass over every configured repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Table written.
    pub table: SyncTable,
    /// When the pass started.
    pub started_at: DateTime<Utc>,
    /// Records received across repositories.
    pub total_count: usize,
    /// Records new to the store across repositories.
    pub inserted_count: usize,
    /// Repositories whose walk failed.
    pub failed_count: usize,
    /// Per-repository outcomes, in configuration order.
    pub repositories: Vec<RepositorySyncOutcome>,
}

impl SyncReport {
    /// Empty report for a pass starting now.
    #[must_use]
    pub fn new(table: SyncTable, started_at: DateTime<Utc>) -> Self {
        Self {
            table,
            started_at,
            total_count: 0,
            inserted_count: 0,
            failed_count: 0,
            repositories: Vec::new(),
        }
    }

    /// Record one repository's outcome and update the totals.
    pub fn push(&mut self, repo: RepoSlug, status: RepositorySyncStatus) {
        match &status {
            RepositorySyncStatus::Synced {
                fetched, inserted, ..
            } => {
                self.total_count += fetched;
                self.inserted_count += inserted;
            }
            RepositorySyncStatus::Failed { .. } => self.failed_count += 1,
        }
        self.repositories.push(RepositorySyncOutcome { repo, status });
    }
}

/// Trigger incremental syncs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SyncCommand: Send + Sync {
    /// Walk commits of every configured repository down to its watermark.
    async fn sync_commits(&self, page_size: PageSize) -> Result<SyncReport, Error>;

    /// Walk every pull-request page of every configured repository.
    async fn sync_pullrequests(&self, page_size: PageSize) -> Result<SyncReport, Error>;
}
