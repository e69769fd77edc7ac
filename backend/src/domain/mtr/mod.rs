//! Mean time to repair (MTR).
//!
//! Commits whose message starts with `TASK/...` are grouped per author by the
//! text before the first `/`. A task's repair time is the elapsed time between
//! its oldest and newest commit, summed over adjacent pairs after sorting the
//! group newest first. Tasks with a single commit have no repair time.
//!
//! The MTR table is derived data: every sweep recomputes it wholesale from the
//! branch histories, unlike the incremental commit table.

mod service;

pub use service::MtrService;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Sentinel reported when no task has a measurable repair time.
pub const NO_MTR_TIMES_FOUND: &str = "no MTR times found";

const MILLIS_PER_SECOND: i64 = 1_000;
const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// One commit considered by the MTR sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MtrRecord {
    /// Commit hash.
    pub commit_id: String,
    /// Display identity of the author.
    pub author: String,
    /// Stable author id.
    pub author_id: Option<String>,
    /// `workspace/slug`.
    pub repository: String,
    /// Commit date.
    pub created_at: DateTime<Utc>,
    /// Full commit message.
    pub commit_message: String,
}

/// Task key of a commit message: the trimmed text before the first `/`.
///
/// `None` for messages without a `/` or with nothing before it; those count
/// as wrong commit messages.
#[must_use]
pub fn task_key(message: &str) -> Option<&str> {
    let (prefix, _) = message.split_once('/')?;
    let key = prefix.trim();
    (!key.is_empty()).then_some(key)
}

/// Format a millisecond duration as `H:MM:SS`, rounding to the nearest
/// second. Negative durations format as zero.
#[must_use]
pub fn format_hms(millis: i64) -> String {
    let total_seconds = millis
        .max(0)
        .saturating_add(MILLIS_PER_SECOND.div_euclid(2))
        .div_euclid(MILLIS_PER_SECOND);
    let hours = total_seconds.div_euclid(SECONDS_PER_HOUR);
    let minutes = total_seconds
        .rem_euclid(SECONDS_PER_HOUR)
        .div_euclid(SECONDS_PER_MINUTE);
    let seconds = total_seconds.rem_euclid(SECONDS_PER_MINUTE);
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// Elapsed repair time, held in whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RepairTime(i64);

impl RepairTime {
    /// Wrap a millisecond count.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Fractional hours for numeric consumers.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        clippy::float_arithmetic,
        reason = "millisecond repair times stay far below 2^53, so the f64 is exact enough for reporting"
    )]
    pub fn hours(self) -> f64 {
        self.0 as f64 / MILLIS_PER_HOUR
    }

    fn mean(values: &[Self]) -> Option<Self> {
        let count = i64::try_from(values.len()).ok().filter(|count| *count > 0)?;
        let total = values
            .iter()
            .fold(0_i64, |sum, value| sum.saturating_add(value.0));
        Some(Self(total.div_euclid(count)))
    }
}

impl fmt::Display for RepairTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_hms(self.0))
    }
}

impl Serialize for RepairTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Mean repair time, or the explicit absence of one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeanRepairTime {
    /// Mean over measurable tasks.
    Measured(RepairTime),
    /// No task had two or more commits.
    NoTimesFound,
}

impl MeanRepairTime {
    fn of(values: &[RepairTime]) -> Self {
        RepairTime::mean(values).map_or(Self::NoTimesFound, Self::Measured)
    }

    /// Mean in hours, if measured.
    #[must_use]
    pub fn hours(self) -> Option<f64> {
        match self {
            Self::Measured(time) => Some(time.hours()),
            Self::NoTimesFound => None,
        }
    }
}

impl Serialize for MeanRepairTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Measured(time) => time.serialize(serializer),
            Self::NoTimesFound => serializer.serialize_str(NO_MTR_TIMES_FOUND),
        }
    }
}

/// Repair time of one task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRepairTime {
    /// Task key.
    pub task: String,
    /// Commits grouped under the key.
    pub commit_count: usize,
    /// Newest commit of the group, which carries the repair time.
    pub newest_commit_id: String,
    /// Elapsed time as `H:MM:SS`, absent for single-commit tasks.
    pub repair_time: Option<RepairTime>,
}

/// MTR breakdown for one author.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorMtr {
    /// Display identity.
    pub author: String,
    /// Tasks ordered by key.
    pub tasks: Vec<TaskRepairTime>,
    /// Messages without a task key.
    pub wrong_commit_messages: usize,
    /// `H:MM:SS` mean or the sentinel.
    pub mean_repair_time: MeanRepairTime,
    /// Mean in hours.
    pub mean_repair_hours: Option<f64>,
}

/// MTR across every author in the input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MtrSummary {
    /// Per-author breakdown ordered by author.
    pub authors: Vec<AuthorMtr>,
    /// Messages without a task key, all authors.
    pub wrong_commit_messages: usize,
    /// Mean over every measurable task of every author.
    pub mean_repair_time: MeanRepairTime,
    /// Mean in hours.
    pub mean_repair_hours: Option<f64>,
}

/// Aggregate MTR records into per-author and global results.
#[must_use]
pub fn summarize(records: &[MtrRecord]) -> MtrSummary {
    let mut by_author: BTreeMap<&str, Vec<&MtrRecord>> = BTreeMap::new();
    for record in records {
        by_author.entry(record.author.as_str()).or_default().push(record);
    }

    let authors: Vec<AuthorMtr> = by_author
        .into_iter()
        .map(|(author, commits)| summarize_author(author, &commits))
        .collect();

    let measured: Vec<RepairTime> = authors
        .iter()
        .flat_map(|author| author.tasks.iter().filter_map(|task| task.repair_time))
        .collect();
    let mean_repair_time = MeanRepairTime::of(&measured);

    MtrSummary {
        wrong_commit_messages: authors.iter().map(|author| author.wrong_commit_messages).sum(),
        mean_repair_hours: mean_repair_time.hours(),
        mean_repair_time,
        authors,
    }
}

fn summarize_author(author: &str, commits: &[&MtrRecord]) -> AuthorMtr {
    let mut groups: BTreeMap<&str, Vec<&MtrRecord>> = BTreeMap::new();
    let mut wrong_commit_messages = 0;
    for &record in commits {
        match task_key(&record.commit_message) {
            Some(key) => groups.entry(key).or_default().push(record),
            None => wrong_commit_messages += 1,
        }
    }

    let tasks: Vec<TaskRepairTime> = groups
        .into_iter()
        .filter_map(|(task, entries)| task_repair_time(task, entries))
        .collect();
    let measured: Vec<RepairTime> = tasks.iter().filter_map(|task| task.repair_time).collect();
    let mean_repair_time = MeanRepairTime::of(&measured);

    AuthorMtr {
        author: author.to_owned(),
        tasks,
        wrong_commit_messages,
        mean_repair_hours: mean_repair_time.hours(),
        mean_repair_time,
    }
}

fn task_repair_time(task: &str, mut entries: Vec<&MtrRecord>) -> Option<TaskRepairTime> {
    entries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.commit_id.cmp(&a.commit_id))
    });
    let newest = entries.first()?;
    let repair_time = (entries.len() > 1).then(|| {
        let millis: i64 = entries
            .windows(2)
            .filter_map(|pair| match pair {
                [later, earlier] => Some((later.created_at - earlier.created_at).num_milliseconds()),
                _ => None,
            })
            .sum();
        RepairTime::from_millis(millis)
    });
    Some(TaskRepairTime {
        task: task.to_owned(),
        commit_count: entries.len(),
        newest_commit_id: newest.commit_id.clone(),
        repair_time,
    })
}

#[cfg(test)]
mod tests;
