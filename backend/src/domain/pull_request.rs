//! Pull-request records mirrored from the remote host.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullRequestState {
    /// Awaiting review or merge.
    Open,
    /// Merged into the destination branch.
    Merged,
    /// Closed without merging.
    Declined,
    /// Replaced by another pull request.
    Superseded,
}

impl PullRequestState {
    /// Every state, in the order the host documents them.
    pub const ALL: [Self; 4] = [Self::Open, Self::Merged, Self::Declined, Self::Superseded];

    /// Wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
            Self::Declined => "DECLINED",
            Self::Superseded => "SUPERSEDED",
        }
    }
}

impl fmt::Display for PullRequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised pull-request state text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown pull request state `{0}`")]
pub struct UnknownPullRequestState(pub String);

impl FromStr for PullRequestState {
    type Err = UnknownPullRequestState;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownPullRequestState(value.to_owned()))
    }
}

/// A pull request as stored in the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRecord {
    /// Host-assigned id, unique within its repository.
    pub id: i64,
    /// Title line.
    pub title: String,
    /// Body text, empty when the host sends none.
    pub description: String,
    /// Lifecycle state at sync time.
    pub state: PullRequestState,
    /// Display identity of the author.
    pub author: String,
    /// Stable author id.
    pub author_id: Option<String>,
    /// `workspace/slug` of the source repository.
    pub repo: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}
