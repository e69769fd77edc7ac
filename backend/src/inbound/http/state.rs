//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they stay testable without a database or a remote host.

use std::sync::Arc;

use crate::domain::ports::{ActivityQuery, DiffBackfillCommand, MtrCommand, MtrQuery, SyncCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Author, commit and pull-request queries.
    pub activity: Arc<dyn ActivityQuery>,
    /// Commit and pull-request sync.
    pub sync: Arc<dyn SyncCommand>,
    /// Diff backfill.
    pub diffs: Arc<dyn DiffBackfillCommand>,
    /// MTR sweep.
    pub mtr: Arc<dyn MtrCommand>,
    /// MTR reads.
    pub mtr_query: Arc<dyn MtrQuery>,
}
