//! Incremental sync of commits and pull requests.
//!
//! Each configured repository is walked page by page, newest first:
//!
//! 1. read the watermark for `(table, repo)`; none means full history;
//! 2. fetch page `n` and upsert it (insert-or-ignore);
//! 3. stop on an empty page, on a page with no successor, or once a record
//!    strictly older than the watermark has been written;
//! 4. after a complete walk, store the newest timestamp seen as the new
//!    watermark, never moving it backwards. A walk cut off by the page guard
//!    keeps the previous watermark so the next pass revisits older pages.
//!
//! Pull requests skip the watermark and always walk every page. A host
//! failure fails only the repository being walked; store failures abort the
//! pass.

mod walk;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use self::walk::{PageOutcome, WalkStep, advance_watermark, next_step, reached_watermark};
use super::ports::{
    CommitRepository, PullRequestRepository, RepositorySource, RepositorySourceError,
    RepositorySyncStatus, SourcePage, StopReason, SyncCommand, SyncReport, WatermarkRepository,
};
use super::{CommitRecord, Error, PageSize, PullRequestRecord, RepoSlug, RetryPolicy, SyncTable};

/// Walk limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Pages fetched per repository before the walk is cut off.
    pub max_pages: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { max_pages: 1_000 }
    }
}

/// Ports the orchestrator drives.
#[derive(Clone)]
pub struct SyncOrchestratorPorts {
    /// Remote host.
    pub source: Arc<dyn RepositorySource>,
    /// Commit store.
    pub commits: Arc<dyn CommitRepository>,
    /// Pull-request store.
    pub pull_requests: Arc<dyn PullRequestRepository>,
    /// Watermark store.
    pub watermarks: Arc<dyn WatermarkRepository>,
}

/// Domain service implementing [`SyncCommand`].
pub struct SyncOrchestrator {
    ports: SyncOrchestratorPorts,
    repositories: Vec<RepoSlug>,
    config: SyncConfig,
    retry: RetryPolicy,
    clock: Arc<dyn Clock>,
    commit_gate: Mutex<()>,
    pull_request_gate: Mutex<()>,
}

#[derive(Debug)]
enum WalkError {
    Source(RepositorySourceError),
    Store(Error),
}

#[derive(Debug, Default)]
struct WalkSummary {
    pages: u32,
    fetched: usize,
    inserted: usize,
    newest: Option<DateTime<Utc>>,
    stop_reason: Option<StopReason>,
    watermark: Option<DateTime<Utc>>,
}

impl WalkSummary {
    fn into_status(self) -> RepositorySyncStatus {
        RepositorySyncStatus::Synced {
            pages: self.pages,
            fetched: self.fetched,
            inserted: self.inserted,
            stop_reason: self.stop_reason.unwrap_or(StopReason::Exhausted),
            watermark: self.watermark,
        }
    }
}

/// One kind of record the orchestrator can walk.
#[async_trait]
trait PagedRecords: Send + Sync {
    type Record: Send + Sync;

    const TABLE: SyncTable;
    const USES_WATERMARK: bool;

    async fn fetch(
        &self,
        repo: &RepoSlug,
        page: u32,
        page_size: PageSize,
    ) -> Result<SourcePage<Self::Record>, RepositorySourceError>;

    async fn store(&self, records: &[Self::Record]) -> Result<usize, Error>;

    fn timestamp(record: &Self::Record) -> DateTime<Utc>;
}

struct CommitPages<'a> {
    source: &'a dyn RepositorySource,
    store: &'a dyn CommitRepository,
}

#[async_trait]
impl PagedRecords for CommitPages<'_> {
    type Record = CommitRecord;

    const TABLE: SyncTable = SyncTable::Commits;
    const USES_WATERMARK: bool = true;

    async fn fetch(
        &self,
        repo: &RepoSlug,
        page: u32,
        page_size: PageSize,
    ) -> Result<SourcePage<CommitRecord>, RepositorySourceError> {
        self.source.list_commits(repo, page, page_size).await
    }

    async fn store(&self, records: &[CommitRecord]) -> Result<usize, Error> {
        Ok(self.store.upsert_commits(records).await?)
    }

    fn timestamp(record: &CommitRecord) -> DateTime<Utc> {
        record.created_at
    }
}

struct PullRequestPages<'a> {
    source: &'a dyn RepositorySource,
    store: &'a dyn PullRequestRepository,
}

#[async_trait]
impl PagedRecords for PullRequestPages<'_> {
    type Record = PullRequestRecord;

    const TABLE: SyncTable = SyncTable::PullRequests;
    const USES_WATERMARK: bool = false;

    async fn fetch(
        &self,
        repo: &RepoSlug,
        page: u32,
        page_size: PageSize,
    ) -> Result<SourcePage<PullRequestRecord>, RepositorySourceError> {
        self.source.list_pullrequests(repo, page, page_size).await
    }

    async fn store(&self, records: &[PullRequestRecord]) -> Result<usize, Error> {
        Ok(self.store.upsert_pullrequests(records).await?)
    }

    fn timestamp(record: &PullRequestRecord) -> DateTime<Utc> {
        record.created_at
    }
}

impl SyncOrchestrator {
    /// Create an orchestrator over the given repositories.
    pub fn new(
        ports: SyncOrchestratorPorts,
        repositories: Vec<RepoSlug>,
        config: SyncConfig,
        retry: RetryPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ports,
            repositories,
            config,
            retry,
            clock,
            commit_gate: Mutex::new(()),
            pull_request_gate: Mutex::new(()),
        }
    }

    async fn sync_all<P: PagedRecords>(&self, pages: &P, page_size: PageSize) -> Result<SyncReport, Error> {
        let mut report = SyncReport::new(P::TABLE, self.clock.utc());
        for repo in &self.repositories {
            match self.walk_repository(pages, repo, page_size).await {
                Ok(summary) => {
                    info!(
                        table = %P::TABLE,
                        repo = %repo,
                        pages = summary.pages,
                        fetched = summary.fetched,
                        inserted = summary.inserted,
                        stop_reason = ?summary.stop_reason,
                        "repository sync finished"
                    );
                    report.push(repo.clone(), summary.into_status());
                }
                Err(WalkError::Source(error)) => {
                    warn!(table = %P::TABLE, repo = %repo, %error, "repository sync failed");
                    report.push(
                        repo.clone(),
                        RepositorySyncStatus::Failed {
                            error: error.to_string(),
                        },
                    );
                }
                Err(WalkError::Store(error)) => return Err(error),
            }
        }
        Ok(report)
    }

    async fn walk_repository<P: PagedRecords>(
        &self,
        pages: &P,
        repo: &RepoSlug,
        page_size: PageSize,
    ) -> Result<WalkSummary, WalkError> {
        let watermark = if P::USES_WATERMARK {
            self.ports
                .watermarks
                .get(P::TABLE, repo)
                .await
                .map_err(|error| WalkError::Store(error.into()))?
        } else {
            None
        };

        let mut summary = WalkSummary::default();
        let mut page = 1;
        loop {
            debug!(table = %P::TABLE, repo = %repo, page, "fetching page");
            let fetched = self
                .retry
                .run(P::TABLE.as_str(), move || pages.fetch(repo, page, page_size))
                .await
                .map_err(WalkError::Source)?;
            summary.pages += 1;

            if !fetched.items.is_empty() {
                summary.inserted += pages.store(&fetched.items).await.map_err(WalkError::Store)?;
                summary.fetched += fetched.items.len();
                let newest = fetched.items.iter().map(P::timestamp).max();
                summary.newest = summary.newest.max(newest);
            }

            let outcome = PageOutcome {
                page,
                len: fetched.items.len(),
                has_next: fetched.has_next,
                caught_up: reached_watermark(fetched.items.iter().map(P::timestamp), watermark),
            };
            match next_step(outcome, self.config.max_pages) {
                WalkStep::Continue(next) => page = next,
                WalkStep::Stop(reason) => {
                    summary.stop_reason = Some(reason);
                    break;
                }
            }
        }

        if P::USES_WATERMARK {
            if summary.stop_reason == Some(StopReason::PageLimit) {
                warn!(
                    table = %P::TABLE,
                    repo = %repo,
                    pages = summary.pages,
                    "page guard reached; keeping previous watermark"
                );
                summary.watermark = watermark;
            } else if let Some(mark) = advance_watermark(watermark, summary.newest) {
                self.ports
                    .watermarks
                    .set(P::TABLE, repo, mark)
                    .await
                    .map_err(|error| WalkError::Store(error.into()))?;
                summary.watermark = Some(mark);
            }
        }
        Ok(summary)
    }
}

#[async_trait]
impl SyncCommand for SyncOrchestrator {
    async fn sync_commits(&self, page_size: PageSize) -> Result<SyncReport, Error> {
        let _gate = self.commit_gate.lock().await;
        let pages = CommitPages {
            source: self.ports.source.as_ref(),
            store: self.ports.commits.as_ref(),
        };
        self.sync_all(&pages, page_size).await
    }

    async fn sync_pullrequests(&self, page_size: PageSize) -> Result<SyncReport, Error> {
        let _gate = self.pull_request_gate.lock().await;
        let pages = PullRequestPages {
            source: self.ports.source.as_ref(),
            store: self.ports.pull_requests.as_ref(),
        };
        self.sync_all(&pages, page_size).await
    }
}
