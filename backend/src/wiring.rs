//! Construction of the domain services over the production adapters.
//!
//! Shared by the HTTP server and the `sync-once` binary so both drive the
//! same stores with the same retry and walk limits.

use std::sync::Arc;

use mockable::DefaultClock;

use crate::config::AppConfig;
use crate::domain::ports::{
    CommitRepository, MtrRepository, PullRequestRepository, RepositorySource,
    WatermarkRepository,
};
use crate::domain::{
    ActivityService, DiffBackfillWorker, MtrService, RetryPolicy, SyncOrchestrator,
    SyncOrchestratorPorts,
};
use crate::inbound::http::HttpState;
use crate::outbound::bitbucket::BitbucketHttpSource;
use crate::outbound::persistence::{
    DbPool, DieselCommitRepository, DieselMtrRepository, DieselPullRequestRepository,
    DieselWatermarkRepository,
};

/// Failure to assemble the services.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    /// The reqwest client could not be built.
    #[error("failed to build the Bitbucket client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Every domain service, ready to serve.
#[derive(Clone)]
pub struct Services {
    /// Commit and pull-request sync.
    pub sync: Arc<SyncOrchestrator>,
    /// Diff backfill.
    pub diffs: Arc<DiffBackfillWorker>,
    /// MTR sweep and queries.
    pub mtr: Arc<MtrService>,
    /// Read-side queries.
    pub activity: Arc<ActivityService>,
}

impl Services {
    /// Build the services over `pool` and a Bitbucket client from `config`.
    ///
    /// # Errors
    /// Returns [`WiringError::Client`] when the HTTP client cannot be built.
    pub fn build(config: &AppConfig, pool: &DbPool) -> Result<Self, WiringError> {
        let source: Arc<dyn RepositorySource> =
            Arc::new(BitbucketHttpSource::new(config.bitbucket.clone())?);
        Ok(Self::from_ports(config, source, pool))
    }

    fn from_ports(config: &AppConfig, source: Arc<dyn RepositorySource>, pool: &DbPool) -> Self {
        let commits: Arc<dyn CommitRepository> =
            Arc::new(DieselCommitRepository::new(pool.clone(), config.chunk_size));
        let pull_requests: Arc<dyn PullRequestRepository> = Arc::new(
            DieselPullRequestRepository::new(pool.clone(), config.chunk_size),
        );
        let watermarks: Arc<dyn WatermarkRepository> =
            Arc::new(DieselWatermarkRepository::new(pool.clone()));
        let mtr_store: Arc<dyn MtrRepository> =
            Arc::new(DieselMtrRepository::new(pool.clone(), config.chunk_size));
        let retry = RetryPolicy::new(config.retry);
        let clock = Arc::new(DefaultClock);

        let sync = SyncOrchestrator::new(
            SyncOrchestratorPorts {
                source: source.clone(),
                commits: commits.clone(),
                pull_requests: pull_requests.clone(),
                watermarks,
            },
            config.repositories.clone(),
            config.sync,
            retry.clone(),
            clock.clone(),
        );
        let diffs = DiffBackfillWorker::new(source.clone(), commits.clone(), retry.clone());
        let mtr = MtrService::new(
            source.clone(),
            mtr_store,
            config.repositories.clone(),
            config.sync,
            retry.clone(),
            clock,
        );
        let activity = ActivityService::new(commits, pull_requests, source, retry);

        Self {
            sync: Arc::new(sync),
            diffs: Arc::new(diffs),
            mtr: Arc::new(mtr),
            activity: Arc::new(activity),
        }
    }

    /// Port bundle for the HTTP handlers.
    #[must_use]
    pub fn http_state(&self) -> HttpState {
        HttpState {
            activity: self.activity.clone(),
            sync: self.sync.clone(),
            diffs: self.diffs.clone(),
            mtr: self.mtr.clone(),
            mtr_query: self.mtr.clone(),
        }
    }
}
