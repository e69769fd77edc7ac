//! Commit records mirrored from the remote host and their read projections.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A commit as stored in the record store.
///
/// `diff` starts empty and is attached later by the diff backfill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    /// Commit hash.
    pub id: String,
    /// Display identity of the author.
    pub author: String,
    /// Stable author id: user uuid or extracted email.
    pub author_id: Option<String>,
    /// Full commit message.
    pub message: String,
    /// Commit date reported by the host.
    pub created_at: DateTime<Utc>,
    /// `workspace/slug` the commit was listed under.
    pub repo: String,
    /// Unified diff text, once backfilled.
    pub diff: Option<String>,
}

/// Natural key of a stored commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CommitKey {
    /// `workspace/slug` of the owning repository.
    pub repo: String,
    /// Commit hash.
    pub id: String,
}

impl CommitKey {
    /// Build a key from its parts.
    pub fn new(repo: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            id: id.into(),
        }
    }
}

impl CommitRecord {
    /// Key identifying this commit in the store.
    #[must_use]
    pub fn key(&self) -> CommitKey {
        CommitKey::new(self.repo.clone(), self.id.clone())
    }
}

/// Commit without its diff, as served to API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    /// Commit hash.
    pub id: String,
    /// Display identity of the author.
    pub author: String,
    /// Stable author id.
    pub author_id: Option<String>,
    /// Full commit message.
    pub message: String,
    /// Commit date.
    pub created_at: DateTime<Utc>,
    /// Owning repository.
    pub repo: String,
}

/// Minimal commit reference used by the timeline views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitStamp {
    /// Commit hash.
    pub id: String,
    /// Owning repository.
    pub repo: String,
    /// Commit date.
    pub created_at: DateTime<Utc>,
}

/// Commit count for one author identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorActivity {
    /// Stable author id, if known.
    pub author_id: Option<String>,
    /// Display identity.
    pub author: String,
    /// Number of stored commits.
    pub commits: i64,
}

/// Commit count for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoActivity {
    /// `workspace/slug`.
    pub repo: String,
    /// Number of stored commits.
    pub commits: i64,
}

/// Commits made on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCommitCount {
    /// Calendar day in UTC.
    pub date: NaiveDate,
    /// Commits on that day.
    pub commit_count: i64,
}

/// Stored diff text for one commit of an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoredDiff {
    /// Commit the diff belongs to.
    pub key: CommitKey,
    /// Diff text, absent until backfilled.
    pub diff: Option<String>,
}
