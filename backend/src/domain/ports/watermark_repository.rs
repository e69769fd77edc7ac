//! Driven port for per-(table, repository) sync watermarks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_store_error;
use crate::domain::{RepoSlug, SyncTable};

define_store_error! {
    /// Failures raised by the watermark store.
    pub enum WatermarkRepositoryError {
        connection => "watermark store connection failed: {message}",
        query => "watermark store query failed: {message}",
    }
}

/// Read and upsert the cutoff of the last successful walk.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WatermarkRepository: Send + Sync {
    /// Stored watermark; `None` means the full history must be walked.
    async fn get(
        &self,
        table: SyncTable,
        repo: &RepoSlug,
    ) -> Result<Option<DateTime<Utc>>, WatermarkRepositoryError>;

    /// Insert or overwrite the watermark in one statement.
    async fn set(
        &self,
        table: SyncTable,
        repo: &RepoSlug,
        updated_at: DateTime<Utc>,
    ) -> Result<(), WatermarkRepositoryError>;
}
