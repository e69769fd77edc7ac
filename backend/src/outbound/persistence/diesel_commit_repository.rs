//! PostgreSQL-backed `CommitRepository` implementation using Diesel ORM.
//!
//! Inserts are insert-or-ignore on `(repo, id)`, so re-syncing a page never
//! duplicates rows or overwrites a backfilled diff.

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime};
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CommitRepository, CommitRepositoryError};
use crate::domain::{
    AuthorActivity, AuthorAlias, AuthoredDiff, CommitKey, CommitRecord, CommitStamp,
    CommitSummary, DailyCommitCount, RepoActivity,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CommitStampRow, CommitSummaryRow, DailyCountRow, NewCommitRow};
use super::pool::{DbPool, PoolError};
use super::schema::bb_commits;

const DAILY_COUNTS_SQL: &str = "SELECT DATE(created_at AT TIME ZONE 'UTC') AS day, \
     COUNT(*) AS commit_count \
     FROM bb_commits \
     WHERE author_id = $1 OR author = $1 \
     GROUP BY day \
     ORDER BY day";

/// Diesel-backed implementation of the commit repository port.
#[derive(Clone)]
pub struct DieselCommitRepository {
    pool: DbPool,
    chunk_size: usize,
}

impl DieselCommitRepository {
    /// Create a new repository with the given connection pool.
    ///
    /// Batches are written `chunk_size` rows per statement; zero is treated
    /// as one.
    pub fn new(pool: DbPool, chunk_size: usize) -> Self {
        Self {
            pool,
            chunk_size: chunk_size.max(1),
        }
    }
}

fn map_pool_error(error: PoolError) -> CommitRepositoryError {
    map_basic_pool_error(error, CommitRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> CommitRepositoryError {
    map_basic_diesel_error(
        error,
        CommitRepositoryError::query,
        CommitRepositoryError::connection,
    )
}

fn repo_activity((repo, commits): (String, i64)) -> RepoActivity {
    RepoActivity { repo, commits }
}

#[async_trait]
impl CommitRepository for DieselCommitRepository {
    async fn upsert_commits(&self, records: &[CommitRecord]) -> Result<usize, CommitRepositoryError> {
        if records.is_empty() {
            return Ok(0);
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut inserted = 0;
        for chunk in records.chunks(self.chunk_size) {
            let rows: Vec<NewCommitRow<'_>> = chunk.iter().map(NewCommitRow::from).collect();
            inserted += diesel::insert_into(bb_commits::table)
                .values(&rows)
                .on_conflict((bb_commits::repo, bb_commits::id))
                .do_nothing()
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
        }
        Ok(inserted)
    }

    async fn find_missing_diffs(&self) -> Result<Vec<CommitKey>, CommitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let keys: Vec<(String, String)> = bb_commits::table
            .filter(bb_commits::diff.is_null())
            .order((bb_commits::created_at.asc(), bb_commits::id.asc()))
            .select((bb_commits::repo, bb_commits::id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(keys
            .into_iter()
            .map(|(repo, id)| CommitKey { repo, id })
            .collect())
    }

    async fn set_diff(&self, key: &CommitKey, diff: &str) -> Result<bool, CommitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            bb_commits::table
                .filter(bb_commits::repo.eq(&key.repo))
                .filter(bb_commits::id.eq(&key.id)),
        )
        .set(bb_commits::diff.eq(diff))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn author_activity(&self) -> Result<Vec<AuthorActivity>, CommitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(Option<String>, String, i64)> = bb_commits::table
            .group_by((bb_commits::author_id, bb_commits::author))
            .select((bb_commits::author_id, bb_commits::author, count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(author_id, author, commits)| AuthorActivity {
                author_id,
                author,
                commits,
            })
            .collect())
    }

    async fn author_repositories(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<RepoActivity>, CommitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, i64)> = bb_commits::table
            .filter(
                bb_commits::author_id
                    .eq(alias.as_str())
                    .or(bb_commits::author.eq(alias.as_str())),
            )
            .group_by(bb_commits::repo)
            .select((bb_commits::repo, count_star()))
            .order(bb_commits::repo.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(repo_activity).collect())
    }

    async fn author_commits(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<CommitSummary>, CommitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CommitSummaryRow> = bb_commits::table
            .filter(
                bb_commits::author_id
                    .eq(alias.as_str())
                    .or(bb_commits::author.eq(alias.as_str())),
            )
            .order((bb_commits::created_at.asc(), bb_commits::id.asc()))
            .select(CommitSummaryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(CommitSummary::from).collect())
    }

    async fn author_commits_on(
        &self,
        alias: &AuthorAlias,
        date: NaiveDate,
    ) -> Result<Vec<CommitSummary>, CommitRepositoryError> {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start
            .checked_add_days(Days::new(1))
            .ok_or_else(|| CommitRepositoryError::query(format!("date {date} is out of range")))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CommitSummaryRow> = bb_commits::table
            .filter(
                bb_commits::author_id
                    .eq(alias.as_str())
                    .or(bb_commits::author.eq(alias.as_str())),
            )
            .filter(bb_commits::created_at.ge(start))
            .filter(bb_commits::created_at.lt(end))
            .order((bb_commits::created_at.asc(), bb_commits::id.asc()))
            .select(CommitSummaryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(CommitSummary::from).collect())
    }

    async fn author_daily_counts(
        &self,
        alias: &AuthorAlias,
    ) -> Result<Vec<DailyCommitCount>, CommitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DailyCountRow> = diesel::sql_query(DAILY_COUNTS_SQL)
            .bind::<Text, _>(alias.as_str())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(DailyCommitCount::from).collect())
    }

    async fn repository_activity(&self) -> Result<Vec<RepoActivity>, CommitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, i64)> = bb_commits::table
            .group_by(bb_commits::repo)
            .select((bb_commits::repo, count_star()))
            .order(bb_commits::repo.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(repo_activity).collect())
    }

    async fn find_diff(&self, commit_id: &str) -> Result<Option<Option<String>>, CommitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        bb_commits::table
            .filter(bb_commits::id.eq(commit_id))
            .order(bb_commits::repo.asc())
            .select(bb_commits::diff)
            .first::<Option<String>>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn commit_stamps(&self) -> Result<Vec<CommitStamp>, CommitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CommitStampRow> = bb_commits::table
            .order((bb_commits::created_at.asc(), bb_commits::id.asc()))
            .select(CommitStampRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(CommitStamp::from).collect())
    }

    async fn repository_commit_stamps(
        &self,
        repo: &str,
    ) -> Result<Vec<CommitStamp>, CommitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CommitStampRow> = bb_commits::table
            .filter(bb_commits::repo.eq(repo))
            .order((bb_commits::created_at.asc(), bb_commits::id.asc()))
            .select(CommitStampRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(CommitStamp::from).collect())
    }

    async fn author_diffs(&self, alias: &AuthorAlias) -> Result<Vec<AuthoredDiff>, CommitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(String, String, Option<String>)> = bb_commits::table
            .filter(
                bb_commits::author_id
                    .eq(alias.as_str())
                    .or(bb_commits::author.eq(alias.as_str())),
            )
            .order((bb_commits::created_at.asc(), bb_commits::id.asc()))
            .select((bb_commits::repo, bb_commits::id, bb_commits::diff))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows
            .into_iter()
            .map(|(repo, id, diff)| AuthoredDiff {
                key: CommitKey { repo, id },
                diff,
            })
            .collect())
    }
}
