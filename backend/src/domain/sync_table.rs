//! Record tables whose sync progress is tracked by a watermark.

use serde::Serialize;

/// Table a sync pass writes to. Also the first half of a watermark key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum SyncTable {
    /// Commit records.
    Commits,
    /// Pull-request records.
    PullRequests,
}

impl SyncTable {
    /// Table name as stored in the watermark history.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Commits => "bb_commits",
            Self::PullRequests => "bb_pullrequests",
        }
    }
}

impl From<SyncTable> for &'static str {
    fn from(value: SyncTable) -> Self {
        value.as_str()
    }
}

impl std::fmt::Display for SyncTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
