//! Author-scoped activity endpoints.
//!
//! ```text
//! GET /authors
//! GET /authors/{id}/repos
//! GET /authors/{id}/commits
//! GET /authors/{id}/pullrequests
//! GET /authors/{id}/commit_count
//! GET /authors/{id}/{date}/commits
//! ```
//!
//! `{id}` is an author alias: the stable author id or the display name.

use actix_web::{HttpResponse, get, web};

use super::envelope;
use super::error::ApiResult;
use super::schemas::{EnvelopeSchema, ErrorEnvelopeSchema};
use super::state::HttpState;
use super::validation::{parse_author, parse_date};

/// Authors with their commit totals, sorted case-insensitively.
#[utoipa::path(
    get,
    path = "/authors",
    tags = ["authors"],
    responses(
        (status = 200, description = "Authors and commit totals", body = EnvelopeSchema),
        (status = 503, description = "Store unavailable", body = ErrorEnvelopeSchema)
    )
)]
#[get("/authors")]
pub async fn list_authors(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(envelope::ok(state.activity.authors().await?))
}

/// Repositories an author committed to, with per-repository counts.
#[utoipa::path(
    get,
    path = "/authors/{id}/repos",
    tags = ["authors"],
    params(("id" = String, Path, description = "Author id or display name")),
    responses(
        (status = 200, description = "Repositories for the author", body = EnvelopeSchema),
        (status = 400, description = "Blank author", body = ErrorEnvelopeSchema)
    )
)]
#[get("/authors/{id}/repos")]
pub async fn author_repositories(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let alias = parse_author(&path)?;
    Ok(envelope::ok(state.activity.author_repositories(&alias).await?))
}

/// An author's commits, oldest first.
#[utoipa::path(
    get,
    path = "/authors/{id}/commits",
    tags = ["authors"],
    params(("id" = String, Path, description = "Author id or display name")),
    responses(
        (status = 200, description = "Commits by the author", body = EnvelopeSchema),
        (status = 400, description = "Blank author", body = ErrorEnvelopeSchema)
    )
)]
#[get("/authors/{id}/commits")]
pub async fn author_commits(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let alias = parse_author(&path)?;
    Ok(envelope::ok(state.activity.author_commits(&alias).await?))
}

/// An author's pull requests, newest first.
#[utoipa::path(
    get,
    path = "/authors/{id}/pullrequests",
    tags = ["authors"],
    params(("id" = String, Path, description = "Author id or display name")),
    responses(
        (status = 200, description = "Pull requests by the author", body = EnvelopeSchema),
        (status = 400, description = "Blank author", body = ErrorEnvelopeSchema)
    )
)]
#[get("/authors/{id}/pullrequests")]
pub async fn author_pullrequests(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let alias = parse_author(&path)?;
    Ok(envelope::ok(state.activity.author_pullrequests(&alias).await?))
}

/// Commits per UTC calendar day for an author, oldest day first.
#[utoipa::path(
    get,
    path = "/authors/{id}/commit_count",
    tags = ["authors"],
    params(("id" = String, Path, description = "Author id or display name")),
    responses(
        (status = 200, description = "Daily commit counts", body = EnvelopeSchema),
        (status = 400, description = "Blank author", body = ErrorEnvelopeSchema)
    )
)]
#[get("/authors/{id}/commit_count")]
pub async fn author_commit_counts(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let alias = parse_author(&path)?;
    Ok(envelope::ok(state.activity.author_commit_counts(&alias).await?))
}

/// An author's commits on one UTC day.
#[utoipa::path(
    get,
    path = "/authors/{id}/{date}/commits",
    tags = ["authors"],
    params(
        ("id" = String, Path, description = "Author id or display name"),
        ("date" = String, Path, description = "UTC day as YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Commits on that day", body = EnvelopeSchema),
        (status = 400, description = "Blank author or malformed date", body = ErrorEnvelopeSchema)
    )
)]
#[get("/authors/{id}/{date}/commits")]
pub async fn author_commits_on(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (id, date) = path.into_inner();
    let alias = parse_author(&id)?;
    let date = parse_date(&date)?;
    Ok(envelope::ok(state.activity.author_commits_on(&alias, date).await?))
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{MockPorts, call_json};
    use actix_web::test::TestRequest;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;

    use crate::domain::{AuthorActivity, CommitSummary, DailyCommitCount, Error};

    fn summary(id: &str) -> CommitSummary {
        CommitSummary {
            id: id.to_owned(),
            author: "jdoe".to_owned(),
            author_id: Some("abc".to_owned()),
            message: "PROJ-1/fix".to_owned(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("timestamp"),
            repo: "acme/api".to_owned(),
        }
    }

    #[actix_web::test]
    async fn lists_authors_in_envelope() {
        let mut ports = MockPorts::default();
        ports.activity.expect_authors().times(1).return_once(|| {
            Ok(vec![AuthorActivity {
                author_id: Some("abc".to_owned()),
                author: "jdoe".to_owned(),
                commits: 3,
            }])
        });

        let (status, body) = call_json(ports, TestRequest::get().uri("/authors")).await;

        assert_eq!(status, 200);
        assert_eq!(
            body,
            json!({
                "statusCode": 200,
                "data": [{ "author_id": "abc", "author": "jdoe", "commits": 3 }],
            })
        );
    }

    #[actix_web::test]
    async fn passes_alias_and_date_through() {
        let mut ports = MockPorts::default();
        ports
            .activity
            .expect_author_commits_on()
            .withf(|alias, date| {
                alias.as_str() == "jdoe" && *date == NaiveDate::from_ymd_opt(2024, 3, 1).expect("date")
            })
            .times(1)
            .return_once(|_, _| Ok(vec![summary("aaa")]));

        let (status, body) =
            call_json(ports, TestRequest::get().uri("/authors/jdoe/2024-03-01/commits")).await;

        assert_eq!(status, 200);
        assert_eq!(body["data"][0]["id"], json!("aaa"));
    }

    #[rstest]
    #[case("/authors/jdoe/2024-3-1x/commits")]
    #[case("/authors/jdoe/yesterday/commits")]
    #[actix_web::test]
    async fn malformed_date_is_rejected_before_the_store(#[case] uri: &str) {
        let (status, body) = call_json(MockPorts::default(), TestRequest::get().uri(uri)).await;

        assert_eq!(status, 400);
        assert_eq!(body["error"]["details"]["code"], json!("invalid_date"));
    }

    #[actix_web::test]
    async fn blank_author_is_rejected() {
        let (status, body) =
            call_json(MockPorts::default(), TestRequest::get().uri("/authors/%20/commits")).await;

        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], json!("invalid_request"));
    }

    #[actix_web::test]
    async fn commit_counts_serialise_dates() {
        let mut ports = MockPorts::default();
        ports
            .activity
            .expect_author_commit_counts()
            .return_once(|_| {
                Ok(vec![DailyCommitCount {
                    date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"),
                    commit_count: 2,
                }])
            });

        let (_, body) =
            call_json(ports, TestRequest::get().uri("/authors/abc/commit_count")).await;

        assert_eq!(body["data"], json!([{ "date": "2024-03-01", "commit_count": 2 }]));
    }

    #[actix_web::test]
    async fn store_outage_maps_to_503() {
        let mut ports = MockPorts::default();
        ports
            .activity
            .expect_author_repositories()
            .return_once(|_| Err(Error::service_unavailable("database unavailable")));

        let (status, body) = call_json(ports, TestRequest::get().uri("/authors/jdoe/repos")).await;

        assert_eq!(status, 503);
        assert_eq!(body["statusCode"], json!(503));
    }
}
