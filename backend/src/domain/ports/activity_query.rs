//! Driving port for the read-only activity views.
//!
//! Author-scoped calls take an [`AuthorAlias`], which matches either the
//! stable author id or the display name.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    AuthorActivity, AuthorAlias, CommitKey, CommitStamp, CommitSummary, DailyCommitCount,
    DiffSummary, Error, PullRequestRecord, RepoActivity, RepoSlug,
};

/// Parsed diff of one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitDiffSummary {
    /// Commit the files belong to.
    #[serde(flatten)]
    pub key: CommitKey,
    /// One entry per parsable file section.
    pub files: Vec<DiffSummary>,
}

/// Parsed diffs of one author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorDiffReport {
    /// Commits with at least one parsable section.
    pub commits: Vec<CommitDiffSummary>,
    /// File sections skipped as malformed.
    pub skipped_sections: usize,
    /// Commits whose diff has not been backfilled yet.
    pub pending_commits: usize,
}

/// Activity views served over HTTP.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityQuery: Send + Sync {
    /// Authors with commit counts, sorted case-insensitively by name.
    async fn authors(&self) -> Result<Vec<AuthorActivity>, Error>;

    /// Repositories an author committed to.
    async fn author_repositories(&self, alias: &AuthorAlias) -> Result<Vec<RepoActivity>, Error>;

    /// An author's commits, oldest first.
    async fn author_commits(&self, alias: &AuthorAlias) -> Result<Vec<CommitSummary>, Error>;

    /// An author's pull requests.
    async fn author_pullrequests(&self, alias: &AuthorAlias)
    -> Result<Vec<PullRequestRecord>, Error>;

    /// An author's commits per UTC day.
    async fn author_commit_counts(&self, alias: &AuthorAlias)
    -> Result<Vec<DailyCommitCount>, Error>;

    /// An author's commits on one UTC day.
    async fn author_commits_on(
        &self,
        alias: &AuthorAlias,
        date: NaiveDate,
    ) -> Result<Vec<CommitSummary>, Error>;

    /// Repositories with commit counts that still resolve upstream.
    async fn repositories(&self) -> Result<Vec<RepoActivity>, Error>;

    /// Stored diff of a commit.
    async fn commit_diff(&self, commit_id: &str) -> Result<String, Error>;

    /// Every stored commit, oldest first.
    async fn all_commits(&self) -> Result<Vec<CommitStamp>, Error>;

    /// Every stored commit of one repository, oldest first.
    async fn repository_commits(&self, repo: &RepoSlug) -> Result<Vec<CommitStamp>, Error>;

    /// Parsed diffs of an author's commits.
    async fn author_diffs(&self, alias: &AuthorAlias) -> Result<AuthorDiffReport, Error>;

    /// Every stored pull request.
    async fn pullrequests(&self) -> Result<Vec<PullRequestRecord>, Error>;

    /// Number of stored pull requests.
    async fn count_pullrequests(&self) -> Result<u64, Error>;

    /// Newest pull request overall.
    async fn last_pullrequest(&self) -> Result<PullRequestRecord, Error>;

    /// Newest pull request of an author.
    async fn author_last_pullrequest(&self, alias: &AuthorAlias) -> Result<PullRequestRecord, Error>;
}
