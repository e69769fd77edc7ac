//! DTOs for decoding Bitbucket Cloud JSON responses.
//!
//! Responses decode into these transport types first and are mapped into
//! domain records in one pass, normalising author identity on the way.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::ports::{BranchRef, SourcePage};
use crate::domain::{AuthorIdentity, CommitRecord, PullRequestRecord, PullRequestState, RepoSlug};

/// Paginated envelope shared by every list endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct PageDto<T> {
    #[serde(default = "Vec::new")]
    pub(super) values: Vec<T>,
    pub(super) next: Option<String>,
}

impl<T> PageDto<T> {
    pub(super) fn into_page<U>(
        self,
        mut map: impl FnMut(T) -> Result<U, String>,
    ) -> Result<SourcePage<U>, String> {
        let has_next = self.next.is_some();
        let items = self
            .values
            .into_iter()
            .map(&mut map)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SourcePage { items, has_next })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    nickname: Option<String>,
    display_name: Option<String>,
    uuid: Option<String>,
}

impl UserDto {
    fn identity(&self) -> AuthorIdentity {
        AuthorIdentity::registered(
            self.nickname.as_deref(),
            self.display_name.as_deref(),
            self.uuid.as_deref(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CommitAuthorDto {
    user: Option<UserDto>,
    #[serde(default)]
    raw: String,
}

impl CommitAuthorDto {
    fn identity(&self) -> AuthorIdentity {
        match &self.user {
            Some(user) => user.identity(),
            None => AuthorIdentity::from_raw(&self.raw),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RepositoryDto {
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CommitDto {
    hash: String,
    author: Option<CommitAuthorDto>,
    #[serde(default)]
    message: String,
    date: DateTime<Utc>,
    repository: Option<RepositoryDto>,
}

impl CommitDto {
    /// Map into a domain record. `repo` is used when the payload names no
    /// repository.
    pub(super) fn into_record(self, repo: &RepoSlug) -> CommitRecord {
        let identity = self
            .author
            .as_ref()
            .map_or_else(|| AuthorIdentity::from_raw(""), CommitAuthorDto::identity);
        let (author, author_id) = identity.into_parts();
        CommitRecord {
            id: self.hash,
            author,
            author_id,
            message: self.message,
            created_at: self.date,
            repo: full_name_or(self.repository.as_ref(), repo),
            diff: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PullRequestSourceDto {
    repository: Option<RepositoryDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct PullRequestDto {
    id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<String>,
    state: String,
    author: Option<UserDto>,
    source: Option<PullRequestSourceDto>,
    created_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
}

impl PullRequestDto {
    pub(super) fn into_record(self, repo: &RepoSlug) -> Result<PullRequestRecord, String> {
        let state: PullRequestState = self
            .state
            .parse()
            .map_err(|error| format!("pull request {}: {error}", self.id))?;
        let identity = self.author.as_ref().map_or_else(
            || AuthorIdentity::registered(None, None, None),
            UserDto::identity,
        );
        let (author, author_id) = identity.into_parts();
        let repository = self
            .source
            .as_ref()
            .and_then(|source| source.repository.as_ref());
        Ok(PullRequestRecord {
            id: self.id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            state,
            author,
            author_id,
            repo: full_name_or(repository, repo),
            created_at: self.created_on,
            updated_at: self.updated_on,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct BranchTargetDto {
    repository: Option<RepositoryDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct BranchDto {
    name: String,
    target: Option<BranchTargetDto>,
}

impl BranchDto {
    pub(super) fn into_branch(self) -> BranchRef {
        let repository = self
            .target
            .and_then(|target| target.repository)
            .and_then(|repository| repository.full_name);
        BranchRef {
            name: self.name,
            repository,
        }
    }
}

fn full_name_or(repository: Option<&RepositoryDto>, fallback: &RepoSlug) -> String {
    repository
        .and_then(|repository| repository.full_name.clone())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
