//! Driven port for the derived MTR table.

use async_trait::async_trait;

use super::define_store_error;
use crate::domain::{AuthorAlias, MtrRecord};

define_store_error! {
    /// Failures raised by the MTR store.
    pub enum MtrRepositoryError {
        connection => "mtr store connection failed: {message}",
        query => "mtr store query failed: {message}",
    }
}

/// Full-refresh storage for MTR records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MtrRepository: Send + Sync {
    /// Atomically replace every stored record. Returns rows written.
    async fn replace_all(&self, records: &[MtrRecord]) -> Result<usize, MtrRepositoryError>;

    /// Records of one author.
    async fn for_author(&self, alias: &AuthorAlias) -> Result<Vec<MtrRecord>, MtrRepositoryError>;

    /// Every record.
    async fn all(&self) -> Result<Vec<MtrRecord>, MtrRepositoryError>;
}
