//! Page-walk decisions, kept free of I/O.

use chrono::{DateTime, Utc};

use crate::domain::ports::StopReason;

/// What the walk does after a page has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WalkStep {
    /// Fetch the given page next.
    Continue(u32),
    /// End the walk.
    Stop(StopReason),
}

/// Facts about the page just processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageOutcome {
    pub(crate) page: u32,
    pub(crate) len: usize,
    pub(crate) has_next: bool,
    pub(crate) caught_up: bool,
}

/// Decide the next step. An empty page always stops the walk.
pub(crate) fn next_step(outcome: PageOutcome, max_pages: u32) -> WalkStep {
    if outcome.len == 0 {
        return WalkStep::Stop(StopReason::Exhausted);
    }
    if outcome.caught_up {
        return WalkStep::Stop(StopReason::CaughtUp);
    }
    if !outcome.has_next {
        return WalkStep::Stop(StopReason::Exhausted);
    }
    if outcome.page >= max_pages {
        return WalkStep::Stop(StopReason::PageLimit);
    }
    WalkStep::Continue(outcome.page.saturating_add(1))
}

/// Whether any timestamp on the page is strictly older than the watermark.
pub(crate) fn reached_watermark(
    timestamps: impl IntoIterator<Item = DateTime<Utc>>,
    watermark: Option<DateTime<Utc>>,
) -> bool {
    watermark.is_some_and(|mark| timestamps.into_iter().any(|stamp| stamp < mark))
}

/// Watermark to persist after a walk, never moving backwards.
///
/// `None` when the walk saw no records, leaving any stored value untouched.
pub(crate) fn advance_watermark(
    previous: Option<DateTime<Utc>>,
    newest_seen: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    newest_seen.map(|newest| previous.map_or(newest, |mark| mark.max(newest)))
}
