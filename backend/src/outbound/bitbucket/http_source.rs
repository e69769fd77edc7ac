//! Reqwest-backed Bitbucket Cloud source adapter.
//!
//! This adapter owns transport details only: URL construction, basic auth,
//! timeout and HTTP error mapping, and JSON decoding into domain records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{BranchDto, CommitDto, PageDto, PullRequestDto};
use crate::domain::ports::{BranchRef, RepositorySource, RepositorySourceError, SourcePage};
use crate::domain::{CommitRecord, PageSize, PullRequestRecord, PullRequestState, RepoSlug};

/// Default API root for repository endpoints.
pub const DEFAULT_API_BASE_URL: &str = "https://api.bitbucket.org/2.0/repositories";

const DEFAULT_USER_AGENT: &str = "bitmirror/0.1";
const MAX_BRANCH_PAGES: u32 = 1_000;

/// Connection settings for the Bitbucket adapter.
#[derive(Clone)]
pub struct BitbucketClientConfig {
    /// Repository API root; `{workspace}/{slug}` is appended.
    pub base_url: Url,
    /// Account name for basic auth.
    pub username: String,
    /// App password for basic auth.
    pub app_password: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for BitbucketClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitbucketClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("app_password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Bitbucket source adapter performing authenticated GET requests.
pub struct BitbucketHttpSource {
    client: Client,
    base_url: Url,
    username: String,
    app_password: String,
}

impl BitbucketHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: BitbucketClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
            username: config.username,
            app_password: config.app_password,
        })
    }

    fn repo_url(&self, repo: &RepoSlug, tail: &[&str]) -> Result<Url, RepositorySourceError> {
        build_repo_url(&self.base_url, repo, tail)
    }

    async fn get(&self, url: Url) -> Result<(StatusCode, Vec<u8>), RepositorySourceError> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .basic_auth(&self.username, Some(&self.app_password))
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        Ok((status, body.to_vec()))
    }

    async fn get_ok(&self, url: Url) -> Result<Vec<u8>, RepositorySourceError> {
        let (status, body) = self.get(url).await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(map_status_error(status, &body))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RepositorySourceError> {
        let body = self.get_ok(url).await?;
        decode(&body)
    }
}

fn build_repo_url(base: &Url, repo: &RepoSlug, tail: &[&str]) -> Result<Url, RepositorySourceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| RepositorySourceError::transport(format!("base url {base} cannot hold a path")))?
        .pop_if_empty()
        .push(repo.workspace())
        .push(repo.slug())
        .extend(tail);
    Ok(url)
}

fn with_page(mut url: Url, page: u32, page_size: PageSize) -> Url {
    url.query_pairs_mut()
        .append_pair("page", &page.to_string())
        .append_pair("pagelen", &page_size.get().to_string());
    url
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, RepositorySourceError> {
    serde_json::from_slice(body).map_err(|error| {
        RepositorySourceError::decode(format!("invalid Bitbucket JSON payload: {error}"))
    })
}

#[async_trait]
impl RepositorySource for BitbucketHttpSource {
    async fn list_commits(
        &self,
        repo: &RepoSlug,
        page: u32,
        page_size: PageSize,
    ) -> Result<SourcePage<CommitRecord>, RepositorySourceError> {
        let url = with_page(self.repo_url(repo, &["commits", ""])?, page, page_size);
        let dto: PageDto<CommitDto> = self.get_json(url).await?;
        dto.into_page(|commit| Ok(commit.into_record(repo)))
            .map_err(RepositorySourceError::decode)
    }

    async fn get_diff(&self, repo: &RepoSlug, commit_id: &str) -> Result<String, RepositorySourceError> {
        let url = self.repo_url(repo, &["diff", commit_id])?;
        let body = self.get_ok(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn list_pullrequests(
        &self,
        repo: &RepoSlug,
        page: u32,
        page_size: PageSize,
    ) -> Result<SourcePage<PullRequestRecord>, RepositorySourceError> {
        let mut url = self.repo_url(repo, &["pullrequests", ""])?;
        {
            let mut query = url.query_pairs_mut();
            for state in PullRequestState::ALL {
                query.append_pair("state", state.as_str());
            }
        }
        let url = with_page(url, page, page_size);
        let dto: PageDto<PullRequestDto> = self.get_json(url).await?;
        dto.into_page(|pull_request| pull_request.into_record(repo))
            .map_err(RepositorySourceError::decode)
    }

    async fn list_branches(&self, repo: &RepoSlug) -> Result<Vec<BranchRef>, RepositorySourceError> {
        let base = self.repo_url(repo, &["refs", "branches"])?;
        let mut branches = Vec::new();
        for page in 1..=MAX_BRANCH_PAGES {
            let url = with_page(base.clone(), page, PageSize::BRANCHES);
            let dto: PageDto<BranchDto> = self.get_json(url).await?;
            let fetched = dto
                .into_page(|branch| Ok(branch.into_branch()))
                .map_err(RepositorySourceError::decode)?;
            let done = fetched.items.is_empty() || !fetched.has_next;
            branches.extend(fetched.items);
            if done {
                break;
            }
        }
        Ok(branches)
    }

    async fn list_branch_commits(
        &self,
        repo: &RepoSlug,
        branch: &str,
        page: u32,
        page_size: PageSize,
    ) -> Result<SourcePage<CommitRecord>, RepositorySourceError> {
        let url = with_page(self.repo_url(repo, &["commits", branch])?, page, page_size);
        let dto: PageDto<CommitDto> = self.get_json(url).await?;
        dto.into_page(|commit| Ok(commit.into_record(repo)))
            .map_err(RepositorySourceError::decode)
    }

    async fn repository_exists(&self, repo: &RepoSlug) -> Result<bool, RepositorySourceError> {
        let (status, body) = self.get(self.repo_url(repo, &[])?).await?;
        match status {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(map_status_error(status, &body)),
        }
    }
}

fn map_transport_error(error: reqwest::Error) -> RepositorySourceError {
    if error.is_timeout() {
        RepositorySourceError::timeout(error.to_string())
    } else {
        RepositorySourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RepositorySourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => RepositorySourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            RepositorySourceError::timeout(message)
        }
        StatusCode::NOT_FOUND => RepositorySourceError::not_found(message),
        _ => RepositorySourceError::status(status.as_u16(), message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
