//! Driven port for the remote source-control host.
//!
//! Adapters translate the host's JSON into domain records, normalising author
//! identity on the way in. Every call returns a typed error; callers decide
//! whether to retry (see [`RepositorySourceError::is_retryable`]).

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{CommitRecord, PageSize, PullRequestRecord, RepoSlug};

define_port_error! {
    /// Failures raised while reading from the remote host.
    pub enum RepositorySourceError {
        /// The request never produced a response.
        Transport { message: String } => "repository host transport failed: {message}",
        /// The request exceeded its deadline.
        Timeout { message: String } => "repository host request timed out: {message}",
        /// The host throttled the request.
        RateLimited { message: String } => "repository host rate limited the request: {message}",
        /// The repository, commit or page does not exist.
        NotFound { message: String } => "repository host resource not found: {message}",
        /// Any other non-success status.
        Status { status: u16, message: String } => "repository host returned status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } => "repository host response decode failed: {message}",
    }
}

impl RepositorySourceError {
    /// Whether a bounded retry may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::NotFound { .. } | Self::Decode { .. } => false,
        }
    }
}

/// One page of host results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePage<T> {
    /// Records on this page, newest first.
    pub items: Vec<T>,
    /// Whether the host advertised a following page.
    pub has_next: bool,
}

impl<T> SourcePage<T> {
    /// A page with no records and no successor.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_next: false,
        }
    }
}

/// A branch of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// Branch name, which may contain `/`.
    pub name: String,
    /// Repository name reported on the branch target, if any.
    pub repository: Option<String>,
}

/// Read access to the remote host.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// List one page of commits on the main history, newest first.
    async fn list_commits(
        &self,
        repo: &RepoSlug,
        page: u32,
        page_size: PageSize,
    ) -> Result<SourcePage<CommitRecord>, RepositorySourceError>;

    /// Fetch the unified diff of one commit.
    async fn get_diff(&self, repo: &RepoSlug, commit_id: &str)
    -> Result<String, RepositorySourceError>;

    /// List one page of pull requests in any state, newest first.
    async fn list_pullrequests(
        &self,
        repo: &RepoSlug,
        page: u32,
        page_size: PageSize,
    ) -> Result<SourcePage<PullRequestRecord>, RepositorySourceError>;

    /// List every branch of a repository.
    async fn list_branches(&self, repo: &RepoSlug) -> Result<Vec<BranchRef>, RepositorySourceError>;

    /// List one page of commits reachable from a branch, newest first.
    async fn list_branch_commits(
        &self,
        repo: &RepoSlug,
        branch: &str,
        page: u32,
        page_size: PageSize,
    ) -> Result<SourcePage<CommitRecord>, RepositorySourceError>;

    /// Whether the repository still resolves on the host.
    async fn repository_exists(&self, repo: &RepoSlug) -> Result<bool, RepositorySourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RepositorySourceError::transport("reset"), true)]
    #[case(RepositorySourceError::timeout("slow"), true)]
    #[case(RepositorySourceError::rate_limited("429"), true)]
    #[case(RepositorySourceError::status(502_u16, "bad gateway"), true)]
    #[case(RepositorySourceError::status(400_u16, "bad request"), false)]
    #[case(RepositorySourceError::not_found("missing"), false)]
    #[case(RepositorySourceError::decode("eof"), false)]
    fn classifies_retryable_failures(#[case] error: RepositorySourceError, #[case] expected: bool) {
        assert_eq!(error.is_retryable(), expected);
    }
}
