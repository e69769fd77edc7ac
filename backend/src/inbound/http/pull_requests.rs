//! Pull-request endpoints.
//!
//! ```text
//! GET /pullrequests
//! GET /count_pullrequests
//! GET /last_pullrequest
//! GET /{author}/last_pullrequest
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Serialize;

use super::envelope;
use super::error::ApiResult;
use super::schemas::{EnvelopeSchema, ErrorEnvelopeSchema};
use super::state::HttpState;
use super::validation::parse_author;

#[derive(Debug, Serialize)]
struct PullRequestCount {
    count: u64,
}

/// Every stored pull request, newest first.
#[utoipa::path(
    get,
    path = "/pullrequests",
    tags = ["pullrequests"],
    responses(
        (status = 200, description = "All pull requests", body = EnvelopeSchema),
        (status = 503, description = "Store unavailable", body = ErrorEnvelopeSchema)
    )
)]
#[get("/pullrequests")]
pub async fn list_pullrequests(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(envelope::ok(state.activity.pullrequests().await?))
}

/// Number of stored pull requests.
#[utoipa::path(
    get,
    path = "/count_pullrequests",
    tags = ["pullrequests"],
    responses(
        (status = 200, description = "Pull-request count", body = EnvelopeSchema),
        (status = 503, description = "Store unavailable", body = ErrorEnvelopeSchema)
    )
)]
#[get("/count_pullrequests")]
pub async fn count_pullrequests(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let count = state.activity.count_pullrequests().await?;
    Ok(envelope::ok(PullRequestCount { count }))
}

/// Most recently created pull request.
#[utoipa::path(
    get,
    path = "/last_pullrequest",
    tags = ["pullrequests"],
    responses(
        (status = 200, description = "Newest pull request", body = EnvelopeSchema),
        (status = 404, description = "No pull requests stored", body = ErrorEnvelopeSchema)
    )
)]
#[get("/last_pullrequest")]
pub async fn last_pullrequest(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(envelope::ok(state.activity.last_pullrequest().await?))
}

/// An author's most recently created pull request.
#[utoipa::path(
    get,
    path = "/{author}/last_pullrequest",
    tags = ["pullrequests"],
    params(("author" = String, Path, description = "Author id or display name")),
    responses(
        (status = 200, description = "Newest pull request by the author", body = EnvelopeSchema),
        (status = 404, description = "Author has no pull requests", body = ErrorEnvelopeSchema)
    )
)]
#[get("/{author}/last_pullrequest")]
pub async fn author_last_pullrequest(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let alias = parse_author(&path)?;
    Ok(envelope::ok(state.activity.author_last_pullrequest(&alias).await?))
}
