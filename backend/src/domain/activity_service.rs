//! Read-only activity views over the stored commits and pull requests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::warn;

use super::ports::{
    ActivityQuery, AuthorDiffReport, CommitDiffSummary, CommitRepository, PullRequestRepository,
    RepositorySource,
};
use super::{
    AuthorActivity, AuthorAlias, CommitStamp, CommitSummary, DailyCommitCount, Error,
    PullRequestRecord, RepoActivity, RepoSlug, RetryPolicy, parse_diff, split_diff_files,
};

/// Domain service implementing [`ActivityQuery`].
pub struct ActivityService {
    commits: Arc<dyn CommitRepository>,
    pull_requests: Arc<dyn PullRequestRepository>,
    source: Arc<dyn RepositorySource>,
    retry: RetryPolicy,
}

impl ActivityService {
    /// Create the service.
    pub fn new(
        commits: Arc<dyn CommitRepository>,
        pull_requests: Arc<dyn PullRequestRepository>,
        source: Arc<dyn RepositorySource>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            commits,
            pull_requests,
            source,
            retry,
        }
    }

    /// Whether `repo` still resolves upstream.
    ///
    /// Only a confirmed miss hides a repository; a failed check keeps it
    /// listed so one unreachable repository cannot blank the whole view.
    async fn still_exists(&self, repo: &str) -> bool {
        let Ok(parsed) = repo.parse::<RepoSlug>() else {
            warn!(repo, "stored repository name is not a workspace/slug pair");
            return false;
        };
        let source = &self.source;
        let slug = &parsed;
        match self
            .retry
            .run("repository_exists", move || source.repository_exists(slug))
            .await
        {
            Ok(exists) => exists,
            Err(error) => {
                warn!(repo, %error, "repository check failed; keeping it listed");
                true
            }
        }
    }
}

fn pull_request_or_not_found(
    record: Option<PullRequestRecord>,
    what: &str,
) -> Result<PullRequestRecord, Error> {
    record.ok_or_else(|| Error::not_found(format!("no pull request found for {what}")))
}

#[async_trait]
impl ActivityQuery for ActivityService {
    async fn authors(&self) -> Result<Vec<AuthorActivity>, Error> {
        let mut authors = self.commits.author_activity().await?;
        authors.sort_by_cached_key(|row| (row.author.to_lowercase(), row.author_id.clone()));
        Ok(authors)
    }

    async fn author_repositories(&self, alias: &AuthorAlias) -> Result<Vec<RepoActivity>, Error> {
        Ok(self.commits.author_repositories(alias).await?)
    }

    async fn author_commits(&self, alias: &AuthorAlias) -> Result<Vec<CommitSummary>, Error> {
        Ok(self.commits.author_commits(alias).await?)
    }

    async fn author_pullrequests(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<PullRequestRecord>, Error> {
        Ok(self.pull_requests.for_author(alias).await?)
    }

    async fn author_commit_counts(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<DailyCommitCount>, Error> {
        Ok(self.commits.author_daily_counts(alias).await?)
    }

    async fn author_commits_on(
        &self,
        alias: &AuthorAlias,
        date: NaiveDate,
    ) -> Result<Vec<CommitSummary>, Error> {
        Ok(self.commits.author_commits_on(alias, date).await?)
    }

    async fn repositories(&self) -> Result<Vec<RepoActivity>, Error> {
        let mut live = Vec::new();
        for row in self.commits.repository_activity().await? {
            if self.still_exists(&row.repo).await {
                live.push(row);
            }
        }
        Ok(live)
    }

    async fn commit_diff(&self, commit_id: &str) -> Result<String, Error> {
        match self.commits.find_diff(commit_id).await? {
            Some(Some(diff)) => Ok(diff),
            Some(None) => Err(Error::not_found(format!(
                "diff for commit {commit_id} has not been backfilled"
            ))),
            None => Err(Error::not_found(format!("commit {commit_id} not found"))),
        }
    }

    async fn all_commits(&self) -> Result<Vec<CommitStamp>, Error> {
        Ok(self.commits.commit_stamps().await?)
    }

    async fn repository_commits(&self, repo: &RepoSlug) -> Result<Vec<CommitStamp>, Error> {
        Ok(self
            .commits
            .repository_commit_stamps(&repo.to_string())
            .await?)
    }

    async fn author_diffs(&self, alias: &AuthorAlias) -> Result<AuthorDiffReport, Error> {
        let mut report = AuthorDiffReport::default();
        for authored in self.commits.author_diffs(alias).await? {
            let Some(diff) = authored.diff.as_deref() else {
                report.pending_commits += 1;
                continue;
            };
            let mut files = Vec::new();
            for section in split_diff_files(diff) {
                match parse_diff(section) {
                    Ok(summary) => files.push(summary),
                    Err(error) => {
                        warn!(commit_id = %authored.key.id, %error, "skipping diff section");
                        report.skipped_sections += 1;
                    }
                }
            }
            if !files.is_empty() {
                report.commits.push(CommitDiffSummary {
                    key: authored.key,
                    files,
                });
            }
        }
        Ok(report)
    }

    async fn pullrequests(&self) -> Result<Vec<PullRequestRecord>, Error> {
        Ok(self.pull_requests.all().await?)
    }

    async fn count_pullrequests(&self) -> Result<u64, Error> {
        Ok(self.pull_requests.count().await?)
    }

    async fn last_pullrequest(&self) -> Result<PullRequestRecord, Error> {
        pull_request_or_not_found(self.pull_requests.latest().await?, "any author")
    }

    async fn author_last_pullrequest(&self, alias: &AuthorAlias) -> Result<PullRequestRecord, Error> {
        pull_request_or_not_found(
            self.pull_requests.latest_for_author(alias).await?,
            alias.as_str(),
        )
    }
}
