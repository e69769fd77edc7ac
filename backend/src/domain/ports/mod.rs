//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`RepositorySource`]) are implemented by
//! outbound adapters. Driving ports (`*Command`, `*Query`) are implemented by
//! domain services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::{define_port_error, define_store_error};

mod activity_query;
mod commit_repository;
mod diff_backfill_command;
mod mtr_command;
mod mtr_repository;
mod pull_request_repository;
mod repository_source;
mod sync_command;
mod watermark_repository;

#[cfg(test)]
pub use activity_query::MockActivityQuery;
pub use activity_query::{ActivityQuery, AuthorDiffReport, CommitDiffSummary};
#[cfg(test)]
pub use commit_repository::MockCommitRepository;
pub use commit_repository::{CommitRepository, CommitRepositoryError};
#[cfg(test)]
pub use diff_backfill_command::MockDiffBackfillCommand;
pub use diff_backfill_command::{BackfillFailure, BackfillReport, DiffBackfillCommand};
#[cfg(test)]
pub use mtr_command::{MockMtrCommand, MockMtrQuery};
pub use mtr_command::{
    MtrCommand, MtrQuery, MtrRepositoryOutcome, MtrRepositoryStatus, MtrSyncReport,
};
#[cfg(test)]
pub use mtr_repository::MockMtrRepository;
pub use mtr_repository::{MtrRepository, MtrRepositoryError};
#[cfg(test)]
pub use pull_request_repository::MockPullRequestRepository;
pub use pull_request_repository::{PullRequestRepository, PullRequestRepositoryError};
#[cfg(test)]
pub use repository_source::MockRepositorySource;
pub use repository_source::{BranchRef, RepositorySource, RepositorySourceError, SourcePage};
#[cfg(test)]
pub use sync_command::MockSyncCommand;
pub use sync_command::{
    RepositorySyncOutcome, RepositorySyncStatus, StopReason, SyncCommand, SyncReport,
};
#[cfg(test)]
pub use watermark_repository::MockWatermarkRepository;
pub use watermark_repository::{WatermarkRepository, WatermarkRepositoryError};
