//! Attach diffs to commits that lack one.
//!
//! Failures are per commit: a diff that cannot be fetched is reported and the
//! pass moves on. Diffs already attached stay attached. Only store failures
//! end the pass early.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::ports::{
    BackfillFailure, BackfillReport, CommitRepository, DiffBackfillCommand, RepositorySource,
};
use super::{CommitKey, Error, RepoSlug, RetryPolicy};

/// Domain service implementing [`DiffBackfillCommand`].
pub struct DiffBackfillWorker {
    source: Arc<dyn RepositorySource>,
    commits: Arc<dyn CommitRepository>,
    retry: RetryPolicy,
    gate: tokio::sync::Mutex<()>,
}

impl DiffBackfillWorker {
    /// Create a worker.
    pub fn new(
        source: Arc<dyn RepositorySource>,
        commits: Arc<dyn CommitRepository>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            source,
            commits,
            retry,
            gate: tokio::sync::Mutex::new(()),
        }
    }

    async fn fetch_diff(&self, key: &CommitKey) -> Result<String, String> {
        let repo: RepoSlug = key.repo.parse().map_err(|error| format!("{error}"))?;
        let source = &self.source;
        let repo = &repo;
        self.retry
            .run("get_diff", move || source.get_diff(repo, &key.id))
            .await
            .map_err(|error| error.to_string())
    }
}

#[async_trait]
impl DiffBackfillCommand for DiffBackfillWorker {
    async fn backfill_diffs(&self) -> Result<BackfillReport, Error> {
        let _gate = self.gate.lock().await;
        let missing = self.commits.find_missing_diffs().await?;
        let mut report = BackfillReport {
            missing_count: missing.len(),
            ..BackfillReport::default()
        };

        for key in missing {
            let diff = match self.fetch_diff(&key).await {
                Ok(diff) => diff,
                Err(error) => {
                    warn!(repo = %key.repo, commit_id = %key.id, %error, "diff fetch failed");
                    report.failures.push(BackfillFailure { key, error });
                    continue;
                }
            };
            if self.commits.set_diff(&key, &diff).await? {
                report.updated_count += 1;
            } else {
                warn!(repo = %key.repo, commit_id = %key.id, "commit vanished before its diff was stored");
                report.unmatched_count += 1;
            }
        }

        info!(
            missing = report.missing_count,
            updated = report.updated_count,
            failed = report.failures.len(),
            "diff backfill finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{CommitRepositoryError, MockCommitRepository};
    use crate::domain::test_support::{InMemoryStore, ScriptedSource, at, commit};
    use crate::domain::{ErrorCode, RetryConfig};

    fn retry() -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_attempts: 1,
            ..RetryConfig::default()
        })
    }

    async fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::default());
        store
            .upsert_commits(&[
                commit("acme/one", "aaa", "T/a", at(1, 1)),
                commit("acme/one", "bbb", "T/b", at(1, 2)),
                commit("acme/one", "ccc", "T/c", at(1, 3)),
            ])
            .await
            .expect("seed commits");
        store
    }

    #[rstest]
    #[tokio::test]
    async fn continues_past_per_commit_failures() {
        let store = seeded_store().await;
        let source = Arc::new(
            ScriptedSource::default()
                .with_diff("aaa", "diff --git a/x b/x\n")
                .with_diff("ccc", "diff --git a/y b/y\n"),
        );
        let worker = DiffBackfillWorker::new(source, Arc::clone(&store) as Arc<dyn CommitRepository>, retry());

        let report = worker.backfill_diffs().await.expect("backfill");

        assert_eq!(report.missing_count, 3);
        assert_eq!(report.updated_count, 2);
        let failed: Vec<&str> = report.failures.iter().map(|f| f.key.id.as_str()).collect();
        assert_eq!(failed, ["bbb"]);
        let remaining = store.find_missing_diffs().await.expect("missing diffs");
        assert_eq!(remaining, [CommitKey::new("acme/one", "bbb")]);
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_repository_is_a_per_commit_failure() {
        let mut commits = MockCommitRepository::new();
        commits
            .expect_find_missing_diffs()
            .times(1)
            .return_once(|| Ok(vec![CommitKey::new("not-a-slug", "abc")]));
        commits.expect_set_diff().never();
        let worker = DiffBackfillWorker::new(
            Arc::new(ScriptedSource::default()),
            Arc::new(commits),
            retry(),
        );

        let report = worker.backfill_diffs().await.expect("backfill");

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.updated_count, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn unmatched_updates_are_counted() {
        let mut commits = MockCommitRepository::new();
        commits
            .expect_find_missing_diffs()
            .return_once(|| Ok(vec![CommitKey::new("acme/one", "gone")]));
        commits
            .expect_set_diff()
            .withf(|key, diff| key.id == "gone" && diff.starts_with("diff --git"))
            .times(1)
            .return_once(|_, _| Ok(false));
        let source = ScriptedSource::default().with_diff("gone", "diff --git a/z b/z\n");
        let worker = DiffBackfillWorker::new(Arc::new(source), Arc::new(commits), retry());

        let report = worker.backfill_diffs().await.expect("backfill");

        assert_eq!(report.unmatched_count, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn store_failure_is_fatal() {
        let mut commits = MockCommitRepository::new();
        commits
            .expect_find_missing_diffs()
            .return_once(|| Err(CommitRepositoryError::query("boom")));
        let worker = DiffBackfillWorker::new(
            Arc::new(ScriptedSource::default()),
            Arc::new(commits),
            retry(),
        );

        let error = worker.backfill_diffs().await.expect_err("store failure");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }
}
