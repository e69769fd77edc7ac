//! Domain primitives, ports, and services.
//!
//! Purpose: hold everything that does not know about HTTP, Diesel, or the
//! repository host's wire format. Adapters in `inbound` and `outbound`
//! translate to and from these types.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error payload.
//! - Record types: [`CommitRecord`], [`PullRequestRecord`], [`MtrRecord`].
//! - Services: [`SyncOrchestrator`], [`DiffBackfillWorker`],
//!   [`ActivityService`], [`MtrService`].

pub mod activity_service;
pub mod author;
pub mod commit;
pub mod diff;
pub mod diff_backfill;
pub mod error;
pub mod mtr;
pub mod page_size;
pub mod ports;
pub mod pull_request;
pub mod repo_slug;
pub mod retry;
pub mod sync_orchestrator;
pub mod sync_table;
pub mod trace_id;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::activity_service::ActivityService;
pub use self::author::{AuthorAlias, AuthorIdentity, BlankAuthorAlias};
pub use self::commit::{
    AuthorActivity, AuthoredDiff, CommitKey, CommitRecord, CommitStamp, CommitSummary,
    DailyCommitCount, RepoActivity,
};
pub use self::diff::{DiffFormatError, DiffSummary, parse_diff, split_diff_files};
pub use self::diff_backfill::DiffBackfillWorker;
pub use self::error::{Error, ErrorCode};
pub use self::mtr::{MeanRepairTime, MtrRecord, MtrService, MtrSummary, RepairTime};
pub use self::page_size::{PageSize, PageSizeError};
pub use self::pull_request::{PullRequestRecord, PullRequestState, UnknownPullRequestState};
pub use self::repo_slug::{RepoSlug, RepoSlugError};
pub use self::retry::{RetryConfig, RetryPolicy};
pub use self::sync_orchestrator::{SyncConfig, SyncOrchestrator, SyncOrchestratorPorts};
pub use self::sync_table::SyncTable;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;
