//! Branch sweep that rebuilds the MTR table, plus the read side.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{MtrRecord, MtrSummary, summarize};
use crate::domain::ports::{
    MtrCommand, MtrQuery, MtrRepository, MtrRepositoryOutcome, MtrRepositoryStatus, MtrSyncReport,
    RepositorySource, RepositorySourceError,
};
use crate::domain::{AuthorAlias, Error, PageSize, RepoSlug, RetryPolicy, SyncConfig};

/// Domain service implementing [`MtrCommand`] and [`MtrQuery`].
pub struct MtrService {
    source: Arc<dyn RepositorySource>,
    store: Arc<dyn MtrRepository>,
    repositories: Vec<RepoSlug>,
    config: SyncConfig,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
    gate: Mutex<()>,
}

type SweptCommits = BTreeMap<(String, String), MtrRecord>;

impl MtrService {
    /// Create the service over the given repositories.
    pub fn new(
        source: Arc<dyn RepositorySource>,
        store: Arc<dyn MtrRepository>,
        repositories: Vec<RepoSlug>,
        config: SyncConfig,
        retry: RetryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            store,
            repositories,
            config,
            retry,
            clock,
            gate: Mutex::new(()),
        }
    }

    /// Walk every branch of `repo`, adding unseen commits to `swept`.
    ///
    /// Returns the number of branches walked.
    async fn sweep_repository(
        &self,
        repo: &RepoSlug,
        page_size: PageSize,
        swept: &mut SweptCommits,
    ) -> Result<usize, RepositorySourceError> {
        let source = &self.source;
        let branches = self
            .retry
            .run("list_branches", move || source.list_branches(repo))
            .await?;

        for branch in &branches {
            let name = branch.name.as_str();
            let mut page = 1;
            loop {
                debug!(repo = %repo, branch = name, page, "fetching branch commits");
                let fetched = self
                    .retry
                    .run("list_branch_commits", move || {
                        source.list_branch_commits(repo, name, page, page_size)
                    })
                    .await?;
                let exhausted = fetched.items.is_empty() || !fetched.has_next;
                for commit in fetched.items {
                    swept
                        .entry((repo.to_string(), commit.id.clone()))
                        .or_insert_with(|| MtrRecord {
                            commit_id: commit.id,
                            author: commit.author,
                            author_id: commit.author_id,
                            repository: repo.to_string(),
                            created_at: commit.created_at,
                            commit_message: commit.message,
                        });
                }
                if exhausted {
                    break;
                }
                if page >= self.config.max_pages {
                    warn!(repo = %repo, branch = name, page, "branch walk hit the page guard");
                    break;
                }
                page += 1;
            }
        }
        Ok(branches.len())
    }
}

#[async_trait]
impl MtrCommand for MtrService {
    async fn sync_mtr(&self, page_size: PageSize) -> Result<MtrSyncReport, Error> {
        let _gate = self.gate.lock().await;
        let started_at = self.clock.utc();
        let mut swept = SweptCommits::new();
        let mut repositories = Vec::with_capacity(self.repositories.len());
        let mut failed = false;

        for repo in &self.repositories {
            let before = swept.len();
            let status = match self.sweep_repository(repo, page_size, &mut swept).await {
                Ok(branches) => MtrRepositoryStatus::Swept {
                    branches,
                    commits: swept.len() - before,
                },
                Err(error) => {
                    warn!(repo = %repo, %error, "MTR sweep failed");
                    failed = true;
                    MtrRepositoryStatus::Failed {
                        error: error.to_string(),
                    }
                }
            };
            repositories.push(MtrRepositoryOutcome {
                repo: repo.clone(),
                status,
            });
        }

        let records: Vec<MtrRecord> = swept.into_values().collect();
        let replaced = if failed {
            warn!("keeping the previous MTR table after a failed sweep");
            false
        } else {
            self.store.replace_all(&records).await?;
            true
        };
        info!(commits = records.len(), replaced, "MTR sweep finished");

        Ok(MtrSyncReport {
            started_at,
            total_count: records.len(),
            replaced,
            repositories,
        })
    }
}

#[async_trait]
impl MtrQuery for MtrService {
    async fn author_mtr(&self, alias: &AuthorAlias) -> Result<MtrSummary, Error> {
        let records = self.store.for_author(alias).await?;
        Ok(summarize(&records))
    }

    async fn all_mtr(&self) -> Result<MtrSummary, Error> {
        let records = self.store.all().await?;
        Ok(summarize(&records))
    }
}
