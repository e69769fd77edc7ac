//! Validated page size for paginated host calls.

use serde::Serialize;

/// Page sizes the host accepts.
pub const PAGE_SIZE_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

/// Page size outside [`PAGE_SIZE_RANGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("page size {0} must be between 1 and 100")]
pub struct PageSizeError(pub u32);

/// Number of records requested per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PageSize(u32);

impl PageSize {
    /// Default for commit walks.
    pub const COMMITS: Self = Self(20);
    /// Default for pull-request walks.
    pub const PULL_REQUESTS: Self = Self(10);
    /// Used when listing branches.
    pub const BRANCHES: Self = Self(100);

    /// Validate a caller-supplied size.
    ///
    /// # Errors
    /// Returns [`PageSizeError`] outside [`PAGE_SIZE_RANGE`].
    pub fn new(value: u32) -> Result<Self, PageSizeError> {
        if PAGE_SIZE_RANGE.contains(&value) {
            Ok(Self(value))
        } else {
            Err(PageSizeError(value))
        }
    }

    /// Raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}
