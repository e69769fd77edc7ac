//! Repository and commit endpoints.
//!
//! ```text
//! GET /repos
//! GET /commits/{id}/diff
//! GET /all_commits
//! GET /{workspace}/{slug}/all_commits
//! GET /{author}/diff
//! ```

use actix_web::{HttpResponse, get, web};

use super::envelope;
use super::error::ApiResult;
use super::schemas::{EnvelopeSchema, ErrorEnvelopeSchema};
use super::state::HttpState;
use super::validation::{parse_author, parse_repository};

/// Configured repositories that still exist upstream, with commit counts.
#[utoipa::path(
    get,
    path = "/repos",
    tags = ["repositories"],
    responses(
        (status = 200, description = "Repositories with commit counts", body = EnvelopeSchema),
        (status = 503, description = "Store unavailable", body = ErrorEnvelopeSchema)
    )
)]
#[get("/repos")]
pub async fn list_repositories(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(envelope::ok(state.activity.repositories().await?))
}

/// Raw unified diff stored for a commit.
#[utoipa::path(
    get,
    path = "/commits/{id}/diff",
    tags = ["commits"],
    params(("id" = String, Path, description = "Commit hash")),
    responses(
        (status = 200, description = "Diff text", body = EnvelopeSchema),
        (status = 404, description = "Unknown commit or diff not yet fetched", body = ErrorEnvelopeSchema)
    )
)]
#[get("/commits/{id}/diff")]
pub async fn commit_diff(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    Ok(envelope::ok(state.activity.commit_diff(path.trim()).await?))
}

/// Every stored commit as `(id, repo, created_at)`, oldest first.
#[utoipa::path(
    get,
    path = "/all_commits",
    tags = ["commits"],
    responses(
        (status = 200, description = "All commits", body = EnvelopeSchema),
        (status = 503, description = "Store unavailable", body = ErrorEnvelopeSchema)
    )
)]
#[get("/all_commits")]
pub async fn all_commits(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(envelope::ok(state.activity.all_commits().await?))
}

/// Stored commits of one repository, oldest first.
#[utoipa::path(
    get,
    path = "/{workspace}/{slug}/all_commits",
    tags = ["commits"],
    params(
        ("workspace" = String, Path, description = "Workspace owning the repository"),
        ("slug" = String, Path, description = "Repository slug")
    ),
    responses(
        (status = 200, description = "Commits of the repository", body = EnvelopeSchema),
        (status = 400, description = "Malformed repository", body = ErrorEnvelopeSchema)
    )
)]
#[get("/{workspace}/{slug}/all_commits")]
pub async fn repository_commits(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (workspace, slug) = path.into_inner();
    let repo = parse_repository(&workspace, &slug)?;
    Ok(envelope::ok(state.activity.repository_commits(&repo).await?))
}

/// Per-file summaries of every diff an author has in the store.
#[utoipa::path(
    get,
    path = "/{author}/diff",
    tags = ["commits"],
    params(("author" = String, Path, description = "Author id or display name")),
    responses(
        (status = 200, description = "Parsed diffs", body = EnvelopeSchema),
        (status = 400, description = "Blank author", body = ErrorEnvelopeSchema)
    )
)]
#[get("/{author}/diff")]
pub async fn author_diffs(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let alias = parse_author(&path)?;
    Ok(envelope::ok(state.activity.author_diffs(&alias).await?))
}
