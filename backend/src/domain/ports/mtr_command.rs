//! Driving ports for the MTR sweep and its aggregation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{AuthorAlias, Error, MtrSummary, PageSize, RepoSlug};

/// Result of sweeping one repository's branches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MtrRepositoryStatus {
    /// Every branch was walked.
    Swept {
        /// Branches walked.
        branches: usize,
        /// Distinct commits collected.
        commits: usize,
    },
    /// The host failed for this repository.
    Failed {
        /// Failure description.
        error: String,
    },
}

/// Outcome for one repository of an MTR sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MtrRepositoryOutcome {
    /// `workspace/slug`.
    pub repo: RepoSlug,
    /// What happened.
    #[serde(flatten)]
    pub status: MtrRepositoryStatus,
}

/// Response of an MTR sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MtrSyncReport {
    /// When the sweep started.
    pub started_at: DateTime<Utc>,
    /// Distinct commits collected across repositories.
    pub total_count: usize,
    /// Whether the stored table was replaced. Any repository failure keeps
    /// the previous table.
    pub replaced: bool,
    /// Per-repository outcomes, in configuration order.
    pub repositories: Vec<MtrRepositoryOutcome>,
}

/// Rebuild the MTR table from every branch of every repository.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MtrCommand: Send + Sync {
    /// Sweep branches and replace the stored records.
    async fn sync_mtr(&self, page_size: PageSize) -> Result<MtrSyncReport, Error>;
}

/// Read MTR aggregations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MtrQuery: Send + Sync {
    /// MTR for one author.
    async fn author_mtr(&self, alias: &AuthorAlias) -> Result<MtrSummary, Error>;

    /// MTR across every author.
    async fn all_mtr(&self) -> Result<MtrSummary, Error>;
}
