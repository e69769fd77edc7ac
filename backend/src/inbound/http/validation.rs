//! Path and query validation for the inbound HTTP adapter.
//!
//! Every failure becomes an `invalid_request` error whose details name the
//! offending field, the rejected value, and a machine-readable code.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::domain::{AuthorAlias, Error, PageSize, RepoSlug};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValidationCode {
    BlankAuthor,
    InvalidDate,
    InvalidPageSize,
    InvalidRepository,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::BlankAuthor => "blank_author",
            Self::InvalidDate => "invalid_date",
            Self::InvalidPageSize => "invalid_page_size",
            Self::InvalidRepository => "invalid_repository",
        }
    }
}

fn invalid(field: &str, value: impl Into<String>, code: ValidationCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value.into(),
        "code": code.as_str(),
    }))
}

/// Query string accepted by the sync endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct PageSizeQuery {
    /// Requested page size; the endpoint default applies when absent.
    pub page_size: Option<u32>,
}

impl PageSizeQuery {
    /// Validated size, or `default` when absent.
    pub fn resolve(&self, default: PageSize) -> Result<PageSize, Error> {
        match self.page_size {
            None => Ok(default),
            Some(raw) => PageSize::new(raw).map_err(|err| {
                invalid(
                    "page_size",
                    raw.to_string(),
                    ValidationCode::InvalidPageSize,
                    err.to_string(),
                )
            }),
        }
    }
}

pub(crate) fn parse_author(raw: &str) -> Result<AuthorAlias, Error> {
    AuthorAlias::new(raw).map_err(|err| {
        invalid("author", raw, ValidationCode::BlankAuthor, err.to_string())
    })
}

/// Parse a `YYYY-MM-DD` UTC calendar date.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        invalid(
            "date",
            raw,
            ValidationCode::InvalidDate,
            "date must use the YYYY-MM-DD format".to_owned(),
        )
    })
}

pub(crate) fn parse_repository(workspace: &str, slug: &str) -> Result<RepoSlug, Error> {
    RepoSlug::new(workspace, slug).map_err(|err| {
        invalid(
            "repository",
            format!("{workspace}/{slug}"),
            ValidationCode::InvalidRepository,
            err.to_string(),
        )
    })
}
