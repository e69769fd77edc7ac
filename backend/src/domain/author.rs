//! Author identity normalisation and alias matching.
//!
//! The remote host reports an author either as a registered user (nickname
//! plus a brace-wrapped UUID) or as a raw `Name <email>` string. Both shapes
//! collapse into an [`AuthorIdentity`]: a display string that is always
//! present and an optional stable id.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static EMAIL_IN_BRACKETS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<([^<>]+)>").ok());

const UNKNOWN_AUTHOR: &str = "unknown";

/// Strip the braces the host wraps around user UUIDs.
#[must_use]
pub fn strip_braces(uuid: &str) -> &str {
    uuid.trim().trim_start_matches('{').trim_end_matches('}')
}

/// Extract the bracketed email from a raw `Name <email>` author string.
///
/// Best effort: returns `None` when no non-blank bracket content exists.
#[must_use]
pub fn extract_email(raw: &str) -> Option<&str> {
    let regex = EMAIL_IN_BRACKETS.as_ref()?;
    regex
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map(|found| found.as_str().trim())
        .filter(|email| !email.is_empty())
}

/// Normalised author of a commit or pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorIdentity {
    display: String,
    id: Option<String>,
}

impl AuthorIdentity {
    /// Identity for a registered user.
    ///
    /// The display name prefers the nickname, then the full display name,
    /// then the id itself.
    #[must_use]
    pub fn registered(nickname: Option<&str>, display_name: Option<&str>, uuid: Option<&str>) -> Self {
        let id = uuid.map(strip_braces).filter(|id| !id.is_empty());
        let display = first_non_blank([nickname, display_name, id]).unwrap_or(UNKNOWN_AUTHOR);
        Self {
            display: display.to_owned(),
            id: id.map(str::to_owned),
        }
    }

    /// Identity for an unregistered author known only by a raw string.
    ///
    /// Both display and id become the extracted email. Without an email the
    /// id is `None` and the raw text is kept for display.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        match extract_email(raw) {
            Some(email) => Self {
                display: email.to_owned(),
                id: Some(email.to_owned()),
            },
            None => Self {
                display: first_non_blank([Some(raw)])
                    .unwrap_or(UNKNOWN_AUTHOR)
                    .to_owned(),
                id: None,
            },
        }
    }

    /// Display identity.
    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Stable id, when one could be derived.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Split into `(display, id)`.
    #[must_use]
    pub fn into_parts(self) -> (String, Option<String>) {
        (self.display, self.id)
    }
}

fn first_non_blank<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Lookup key that matches a record by stable id or by display name.
///
/// Older rows may only carry a display name, so callers address authors with
/// whichever value they hold and both columns are compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AuthorAlias(String);

/// Rejected alias input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("author must not be blank")]
pub struct BlankAuthorAlias;

impl AuthorAlias {
    /// Build an alias from caller input.
    ///
    /// # Errors
    /// Returns [`BlankAuthorAlias`] for blank input.
    pub fn new(value: &str) -> Result<Self, BlankAuthorAlias> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BlankAuthorAlias);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw alias text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a record with the given author columns answers to this alias.
    #[must_use]
    pub fn matches(&self, author: &str, author_id: Option<&str>) -> bool {
        author_id == Some(self.0.as_str()) || author == self.0
    }
}

impl std::fmt::Display for AuthorAlias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
