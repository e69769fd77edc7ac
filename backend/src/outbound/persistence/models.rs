//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Date};

use crate::domain::{
    CommitRecord, CommitStamp, CommitSummary, DailyCommitCount, MtrRecord, PullRequestRecord,
};

use super::schema::{bb_commits, bb_mtr, bb_pullrequests, bb_sync_history};

// ---------------------------------------------------------------------------
// Commit models
// ---------------------------------------------------------------------------

/// Insertable struct for mirrored commits.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bb_commits)]
pub(crate) struct NewCommitRow<'a> {
    pub id: &'a str,
    pub repo: &'a str,
    pub author: &'a str,
    pub author_id: Option<&'a str>,
    pub message: &'a str,
    pub created_at: DateTime<Utc>,
    pub diff: Option<&'a str>,
}

impl<'a> From<&'a CommitRecord> for NewCommitRow<'a> {
    fn from(record: &'a CommitRecord) -> Self {
        Self {
            id: &record.id,
            repo: &record.repo,
            author: &record.author,
            author_id: record.author_id.as_deref(),
            message: &record.message,
            created_at: record.created_at,
            diff: record.diff.as_deref(),
        }
    }
}

/// Commit columns without the diff.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bb_commits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommitSummaryRow {
    pub id: String,
    pub author: String,
    pub author_id: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub repo: String,
}

impl From<CommitSummaryRow> for CommitSummary {
    fn from(row: CommitSummaryRow) -> Self {
        Self {
            id: row.id,
            author: row.author,
            author_id: row.author_id,
            message: row.message,
            created_at: row.created_at,
            repo: row.repo,
        }
    }
}

/// Identity and date of a commit.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bb_commits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommitStampRow {
    pub id: String,
    pub repo: String,
    pub created_at: DateTime<Utc>,
}

impl From<CommitStampRow> for CommitStamp {
    fn from(row: CommitStampRow) -> Self {
        Self {
            id: row.id,
            repo: row.repo,
            created_at: row.created_at,
        }
    }
}

/// Result row of the per-day count query.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct DailyCountRow {
    #[diesel(sql_type = Date)]
    pub day: NaiveDate,
    #[diesel(sql_type = BigInt)]
    pub commit_count: i64,
}

impl From<DailyCountRow> for DailyCommitCount {
    fn from(row: DailyCountRow) -> Self {
        Self {
            date: row.day,
            commit_count: row.commit_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Pull request models
// ---------------------------------------------------------------------------

/// Row struct for reading from the bb_pullrequests table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bb_pullrequests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PullRequestRow {
    pub id: i64,
    pub repo: String,
    pub title: String,
    pub description: String,
    pub state: String,
    pub author: String,
    pub author_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PullRequestRow> for PullRequestRecord {
    type Error = String;

    fn try_from(row: PullRequestRow) -> Result<Self, Self::Error> {
        let state = row
            .state
            .parse()
            .map_err(|error| format!("pull request {}/{}: {error}", row.repo, row.id))?;
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            state,
            author: row.author,
            author_id: row.author_id,
            repo: row.repo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for mirrored pull requests.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bb_pullrequests)]
pub(crate) struct NewPullRequestRow<'a> {
    pub id: i64,
    pub repo: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub state: &'static str,
    pub author: &'a str,
    pub author_id: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a PullRequestRecord> for NewPullRequestRow<'a> {
    fn from(record: &'a PullRequestRecord) -> Self {
        Self {
            id: record.id,
            repo: &record.repo,
            title: &record.title,
            description: &record.description,
            state: record.state.as_str(),
            author: &record.author,
            author_id: record.author_id.as_deref(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Watermark models
// ---------------------------------------------------------------------------

/// Insertable struct for sync watermarks.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bb_sync_history)]
pub(crate) struct NewWatermarkRow<'a> {
    pub tbl: &'static str,
    pub repo: &'a str,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// MTR models
// ---------------------------------------------------------------------------

/// Row struct for reading from the bb_mtr table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bb_mtr)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MtrRow {
    pub commit_id: String,
    pub author: String,
    pub author_id: Option<String>,
    pub repository: String,
    pub created_at: DateTime<Utc>,
    pub commit_message: String,
}

impl From<MtrRow> for MtrRecord {
    fn from(row: MtrRow) -> Self {
        Self {
            commit_id: row.commit_id,
            author: row.author,
            author_id: row.author_id,
            repository: row.repository,
            created_at: row.created_at,
            commit_message: row.commit_message,
        }
    }
}

/// Insertable struct for MTR records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bb_mtr)]
pub(crate) struct NewMtrRow<'a> {
    pub commit_id: &'a str,
    pub author: &'a str,
    pub author_id: Option<&'a str>,
    pub repository: &'a str,
    pub created_at: DateTime<Utc>,
    pub commit_message: &'a str,
}

impl<'a> From<&'a MtrRecord> for NewMtrRow<'a> {
    fn from(record: &'a MtrRecord) -> Self {
        Self {
            commit_id: &record.commit_id,
            author: &record.author,
            author_id: record.author_id.as_deref(),
            repository: &record.repository,
            created_at: record.created_at,
            commit_message: &record.commit_message,
        }
    }
}
