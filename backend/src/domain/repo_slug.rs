//! Typed `workspace/slug` repository address.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Validation failures for [`RepoSlug`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoSlugError {
    /// The value is not of the form `workspace/slug`.
    #[error("repository `{value}` must be written as workspace/slug")]
    Malformed {
        /// Offending input.
        value: String,
    },
}

/// Repository address on the remote host, e.g. `acme/widgets`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoSlug {
    workspace: String,
    slug: String,
}

impl RepoSlug {
    /// Build a slug from its two components.
    ///
    /// # Errors
    /// Returns [`RepoSlugError::Malformed`] when either part is blank or
    /// contains a `/`.
    pub fn new(workspace: &str, slug: &str) -> Result<Self, RepoSlugError> {
        let workspace = workspace.trim();
        let slug = slug.trim();
        let valid = |part: &str| !part.is_empty() && !part.contains('/');
        if !valid(workspace) || !valid(slug) {
            return Err(RepoSlugError::Malformed {
                value: format!("{workspace}/{slug}"),
            });
        }
        Ok(Self {
            workspace: workspace.to_owned(),
            slug: slug.to_owned(),
        })
    }

    /// Parse a comma-separated allowlist, ignoring blank entries.
    ///
    /// # Errors
    /// Fails on the first malformed entry.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, RepoSlugError> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::parse)
            .collect()
    }

    /// Workspace component.
    #[must_use]
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Repository component.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }
}

impl FromStr for RepoSlug {
    type Err = RepoSlugError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || RepoSlugError::Malformed {
            value: value.to_owned(),
        };
        let (workspace, slug) = value.trim().split_once('/').ok_or_else(malformed)?;
        Self::new(workspace, slug).map_err(|_| malformed())
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.workspace, self.slug)
    }
}

impl Serialize for RepoSlug {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
