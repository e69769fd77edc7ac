//! PostgreSQL-backed `WatermarkRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{WatermarkRepository, WatermarkRepositoryError};
use crate::domain::{RepoSlug, SyncTable};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewWatermarkRow;
use super::pool::{DbPool, PoolError};
use super::schema::bb_sync_history;

/// Diesel-backed implementation of the watermark repository port.
#[derive(Clone)]
pub struct DieselWatermarkRepository {
    pool: DbPool,
}

impl DieselWatermarkRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> WatermarkRepositoryError {
    map_basic_pool_error(error, WatermarkRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> WatermarkRepositoryError {
    map_basic_diesel_error(
        error,
        WatermarkRepositoryError::query,
        WatermarkRepositoryError::connection,
    )
}

#[async_trait]
impl WatermarkRepository for DieselWatermarkRepository {
    async fn get(
        &self,
        table: SyncTable,
        repo: &RepoSlug,
    ) -> Result<Option<DateTime<Utc>>, WatermarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        bb_sync_history::table
            .filter(bb_sync_history::tbl.eq(table.as_str()))
            .filter(bb_sync_history::repo.eq(repo.to_string()))
            .select(bb_sync_history::updated_at)
            .first::<DateTime<Utc>>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn set(
        &self,
        table: SyncTable,
        repo: &RepoSlug,
        updated_at: DateTime<Utc>,
    ) -> Result<(), WatermarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let repo = repo.to_string();
        let row = NewWatermarkRow {
            tbl: table.as_str(),
            repo: &repo,
            updated_at,
        };
        diesel::insert_into(bb_sync_history::table)
            .values(&row)
            .on_conflict((bb_sync_history::tbl, bb_sync_history::repo))
            .do_update()
            .set(bb_sync_history::updated_at.eq(excluded(bb_sync_history::updated_at)))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
