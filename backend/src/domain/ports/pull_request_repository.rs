//! Driven port for the pull-request record store.

use async_trait::async_trait;

use super::define_store_error;
use crate::domain::{AuthorAlias, PullRequestRecord};

define_store_error! {
    /// Failures raised by the pull-request store.
    pub enum PullRequestRepositoryError {
        connection => "pull request store connection failed: {message}",
        query => "pull request store query failed: {message}",
    }
}

/// Idempotent writes and reads over stored pull requests, keyed on
/// `(repo, id)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestRepository: Send + Sync {
    /// Insert pull requests, ignoring keys already stored. Returns rows inserted.
    async fn upsert_pullrequests(
        &self,
        records: &[PullRequestRecord],
    ) -> Result<usize, PullRequestRepositoryError>;

    /// Every stored pull request, newest first.
    async fn all(&self) -> Result<Vec<PullRequestRecord>, PullRequestRepositoryError>;

    /// Pull requests of one author, newest first.
    async fn for_author(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<PullRequestRecord>, PullRequestRepositoryError>;

    /// Number of stored pull requests.
    async fn count(&self) -> Result<u64, PullRequestRepositoryError>;

    /// Most recently created pull request.
    async fn latest(&self) -> Result<Option<PullRequestRecord>, PullRequestRepositoryError>;

    /// Most recently created pull request of one author.
    async fn latest_for_author(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Option<PullRequestRecord>, PullRequestRepositoryError>;
}
