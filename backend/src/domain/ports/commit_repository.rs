//! Driven port for the commit record store.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::define_store_error;
use crate::domain::{
    AuthorActivity, AuthorAlias, AuthoredDiff, CommitKey, CommitRecord, CommitStamp,
    CommitSummary, DailyCommitCount, RepoActivity,
};

define_store_error! {
    /// Failures raised by the commit store.
    pub enum CommitRepositoryError {
        connection => "commit store connection failed: {message}",
        query => "commit store query failed: {message}",
    }
}

/// Idempotent writes and read projections over stored commits.
///
/// Commits are keyed on `(repo, id)`. Inserting a key that already exists is
/// a silent no-op, never an update.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitRepository: Send + Sync {
    /// Insert commits, ignoring keys already stored. Returns rows inserted.
    async fn upsert_commits(&self, records: &[CommitRecord]) -> Result<usize, CommitRepositoryError>;

    /// Keys of every commit without a diff.
    async fn find_missing_diffs(&self) -> Result<Vec<CommitKey>, CommitRepositoryError>;

    /// Attach a diff. Returns whether a row was affected.
    async fn set_diff(&self, key: &CommitKey, diff: &str) -> Result<bool, CommitRepositoryError>;

    /// Commit counts per author identity.
    async fn author_activity(&self) -> Result<Vec<AuthorActivity>, CommitRepositoryError>;

    /// Commit counts per repository for one author.
    async fn author_repositories(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<RepoActivity>, CommitRepositoryError>;

    /// Commits of one author, oldest first.
    async fn author_commits(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<CommitSummary>, CommitRepositoryError>;

    /// Commits of one author on one UTC day, oldest first.
    async fn author_commits_on(
        &self,
        alias: &AuthorAlias,
        date: NaiveDate,
    ) -> Result<Vec<CommitSummary>, CommitRepositoryError>;

    /// Commits per UTC day for one author, by day.
    async fn author_daily_counts(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<DailyCommitCount>, CommitRepositoryError>;

    /// Commit counts per repository.
    async fn repository_activity(&self) -> Result<Vec<RepoActivity>, CommitRepositoryError>;

    /// Diff of the first stored commit with this hash.
    ///
    /// Outer `None`: no such commit. Inner `None`: not yet backfilled.
    async fn find_diff(&self, commit_id: &str) -> Result<Option<Option<String>>, CommitRepositoryError>;

    /// Every commit, oldest first.
    async fn commit_stamps(&self) -> Result<Vec<CommitStamp>, CommitRepositoryError>;

    /// Commits of one repository, oldest first.
    async fn repository_commit_stamps(
        &self,
        repo: &str,
    ) -> Result<Vec<CommitStamp>, CommitRepositoryError>;

    /// Stored diffs of one author, oldest first.
    async fn author_diffs(&self, alias: &AuthorAlias) -> Result<Vec<AuthoredDiff>, CommitRepositoryError>;
}
