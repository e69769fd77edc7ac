//! PostgreSQL-backed `PullRequestRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PullRequestRepository, PullRequestRepositoryError};
use crate::domain::{AuthorAlias, PullRequestRecord};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewPullRequestRow, PullRequestRow};
use super::pool::{DbPool, PoolError};
use super::schema::bb_pullrequests;

/// Diesel-backed implementation of the pull request repository port.
#[derive(Clone)]
pub struct DieselPullRequestRepository {
    pool: DbPool,
    chunk_size: usize,
}

impl DieselPullRequestRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool, chunk_size: usize) -> Self {
        Self {
            pool,
            chunk_size: chunk_size.max(1),
        }
    }
}

fn map_pool_error(error: PoolError) -> PullRequestRepositoryError {
    map_basic_pool_error(error, PullRequestRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PullRequestRepositoryError {
    map_basic_diesel_error(
        error,
        PullRequestRepositoryError::query,
        PullRequestRepositoryError::connection,
    )
}

fn into_records(rows: Vec<PullRequestRow>) -> Result<Vec<PullRequestRecord>, PullRequestRepositoryError> {
    rows.into_iter()
        .map(PullRequestRecord::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(PullRequestRepositoryError::query)
}

#[async_trait]
impl PullRequestRepository for DieselPullRequestRepository {
    async fn upsert_pullrequests(
        &self,
        records: &[PullRequestRecord],
    ) -> Result<usize, PullRequestRepositoryError> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut inserted = 0;
        for chunk in records.chunks(self.chunk_size) {
            let rows: Vec<NewPullRequestRow<'_>> =
                chunk.iter().map(NewPullRequestRow::from).collect();
            inserted += diesel::insert_into(bb_pullrequests::table)
                .values(&rows)
                .on_conflict((bb_pullrequests::repo, bb_pullrequests::id))
                .do_nothing()
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
        }
        Ok(inserted)
    }

    async fn all(&self) -> Result<Vec<PullRequestRecord>, PullRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PullRequestRow> = bb_pullrequests::table
            .order((bb_pullrequests::created_at.desc(), bb_pullrequests::id.desc()))
            .select(PullRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_records(rows)
    }

    async fn for_author(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<PullRequestRecord>, PullRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PullRequestRow> = bb_pullrequests::table
            .filter(
                bb_pullrequests::author_id
                    .eq(alias.as_str())
                    .or(bb_pullrequests::author.eq(alias.as_str())),
            )
            .order((bb_pullrequests::created_at.desc(), bb_pullrequests::id.desc()))
            .select(PullRequestRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        into_records(rows)
    }

    async fn count(&self) -> Result<u64, PullRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = bb_pullrequests::table
            .select(count_star())
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        u64::try_from(total).map_err(|_| PullRequestRepositoryError::query("negative row count"))
    }

    async fn latest(&self) -> Result<Option<PullRequestRecord>, PullRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PullRequestRow> = bb_pullrequests::table
            .order((bb_pullrequests::created_at.desc(), bb_pullrequests::id.desc()))
            .select(PullRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(PullRequestRecord::try_from)
            .transpose()
            .map_err(PullRequestRepositoryError::query)
    }

    async fn latest_for_author(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Option<PullRequestRecord>, PullRequestRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PullRequestRow> = bb_pullrequests::table
            .filter(
                bb_pullrequests::author_id
                    .eq(alias.as_str())
                    .or(bb_pullrequests::author.eq(alias.as_str())),
            )
            .order((bb_pullrequests::created_at.desc(), bb_pullrequests::id.desc()))
            .select(PullRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(PullRequestRecord::try_from)
            .transpose()
            .map_err(PullRequestRepositoryError::query)
    }
}
