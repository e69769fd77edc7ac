//! PostgreSQL-backed `MtrRepository` implementation using Diesel ORM.
//!
//! The table is replaced wholesale inside one transaction, so readers see
//! either the previous sweep or the new one.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{MtrRepository, MtrRepositoryError};
use crate::domain::{AuthorAlias, MtrRecord};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{MtrRow, NewMtrRow};
use super::pool::{DbPool, PoolError};
use super::schema::bb_mtr;

/// Diesel-backed implementation of the MTR repository port.
#[derive(Clone)]
pub struct DieselMtrRepository {
    pool: DbPool,
    chunk_size: usize,
}

impl DieselMtrRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool, chunk_size: usize) -> Self {
        Self {
            pool,
            chunk_size: chunk_size.max(1),
        }
    }
}

fn map_pool_error(error: PoolError) -> MtrRepositoryError {
    map_basic_pool_error(error, MtrRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MtrRepositoryError {
    map_basic_diesel_error(
        error,
        MtrRepositoryError::query,
        MtrRepositoryError::connection,
    )
}

#[async_trait]
impl MtrRepository for DieselMtrRepository {
    async fn replace_all(&self, records: &[MtrRecord]) -> Result<usize, MtrRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<NewMtrRow<'_>> = records.iter().map(NewMtrRow::from).collect();
        let chunk_size = self.chunk_size;
        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                diesel::delete(bb_mtr::table).execute(conn).await?;
                let mut inserted = 0;
                for chunk in rows.chunks(chunk_size) {
                    inserted += diesel::insert_into(bb_mtr::table)
                        .values(chunk)
                        .on_conflict((bb_mtr::repository, bb_mtr::commit_id))
                        .do_nothing()
                        .execute(conn)
                        .await?;
                }
                Ok(inserted)
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn for_author(&self, alias: &AuthorAlias) -> Result<Vec<MtrRecord>, MtrRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MtrRow> = bb_mtr::table
            .filter(
                bb_mtr::author_id
                    .eq(alias.as_str())
                    .or(bb_mtr::author.eq(alias.as_str())),
            )
            .order((bb_mtr::created_at.asc(), bb_mtr::commit_id.asc()))
            .select(MtrRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(MtrRecord::from).collect())
    }

    async fn all(&self) -> Result<Vec<MtrRecord>, MtrRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MtrRow> = bb_mtr::table
            .order((bb_mtr::created_at.asc(), bb_mtr::commit_id.asc()))
            .select(MtrRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(MtrRecord::from).collect())
    }
}
