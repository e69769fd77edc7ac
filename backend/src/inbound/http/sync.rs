//! Sync triggers.
//!
//! ```text
//! POST /sync/commits?page_size=N       (default 20)
//! POST /sync/pullrequests?page_size=N  (default 10)
//! POST /sync/diffs
//! POST /sync_mtr?page_size=N           (default 20)
//! ```
//!
//! Each call runs to completion and returns its report. A second call for
//! the same table waits for the one in flight.

use actix_web::{HttpResponse, post, web};
use tracing::info;

use super::envelope;
use super::error::ApiResult;
use super::schemas::{EnvelopeSchema, ErrorEnvelopeSchema};
use super::state::HttpState;
use super::validation::PageSizeQuery;
use crate::domain::PageSize;

/// Pull new commits for every configured repository.
#[utoipa::path(
    post,
    path = "/sync/commits",
    tags = ["sync"],
    params(("page_size" = Option<u32>, Query, description = "Commits per page, 1 to 100")),
    responses(
        (status = 200, description = "Per-repository sync report", body = EnvelopeSchema),
        (status = 400, description = "Page size out of range", body = ErrorEnvelopeSchema),
        (status = 503, description = "Store unavailable", body = ErrorEnvelopeSchema)
    )
)]
#[post("/sync/commits")]
pub async fn sync_commits(
    state: web::Data<HttpState>,
    query: web::Query<PageSizeQuery>,
) -> ApiResult<HttpResponse> {
    let page_size = query.resolve(PageSize::COMMITS)?;
    info!(page_size = page_size.get(), "commit sync requested");
    Ok(envelope::ok(state.sync.sync_commits(page_size).await?))
}

/// Pull new pull requests for every configured repository.
#[utoipa::path(
    post,
    path = "/sync/pullrequests",
    tags = ["sync"],
    params(("page_size" = Option<u32>, Query, description = "Pull requests per page, 1 to 100")),
    responses(
        (status = 200, description = "Per-repository sync report", body = EnvelopeSchema),
        (status = 400, description = "Page size out of range", body = ErrorEnvelopeSchema),
        (status = 503, description = "Store unavailable", body = ErrorEnvelopeSchema)
    )
)]
#[post("/sync/pullrequests")]
pub async fn sync_pullrequests(
    state: web::Data<HttpState>,
    query: web::Query<PageSizeQuery>,
) -> ApiResult<HttpResponse> {
    let page_size = query.resolve(PageSize::PULL_REQUESTS)?;
    info!(page_size = page_size.get(), "pull request sync requested");
    Ok(envelope::ok(state.sync.sync_pullrequests(page_size).await?))
}

/// Fetch diffs for stored commits that lack one.
#[utoipa::path(
    post,
    path = "/sync/diffs",
    tags = ["sync"],
    responses(
        (status = 200, description = "Backfill report with per-commit failures", body = EnvelopeSchema),
        (status = 503, description = "Store unavailable", body = ErrorEnvelopeSchema)
    )
)]
#[post("/sync/diffs")]
pub async fn sync_diffs(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    info!("diff backfill requested");
    Ok(envelope::ok(state.diffs.backfill_diffs().await?))
}

/// Rebuild the MTR table from every branch of every configured repository.
#[utoipa::path(
    post,
    path = "/sync_mtr",
    tags = ["sync", "mtr"],
    params(("page_size" = Option<u32>, Query, description = "Commits per page, 1 to 100")),
    responses(
        (status = 200, description = "Sweep report; the table is replaced only if every repository succeeded", body = EnvelopeSchema),
        (status = 400, description = "Page size out of range", body = ErrorEnvelopeSchema),
        (status = 503, description = "Store unavailable", body = ErrorEnvelopeSchema)
    )
)]
#[post("/sync_mtr")]
pub async fn sync_mtr(
    state: web::Data<HttpState>,
    query: web::Query<PageSizeQuery>,
) -> ApiResult<HttpResponse> {
    let page_size = query.resolve(PageSize::COMMITS)?;
    info!(page_size = page_size.get(), "MTR sweep requested");
    Ok(envelope::ok(state.mtr.sync_mtr(page_size).await?))
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{MockPorts, call_json};
    use actix_web::test::TestRequest;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;

    use crate::domain::ports::{
        BackfillReport, MtrSyncReport, RepositorySyncStatus, StopReason, SyncReport,
    };
    use crate::domain::{RepoSlug, SyncTable};

    fn started_at() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0)
            .single()
            .expect("timestamp")
    }

    #[rstest]
    #[case("/sync/commits", 20)]
    #[case("/sync/commits?page_size=50", 50)]
    #[actix_web::test]
    async fn commit_sync_uses_requested_or_default_page_size(
        #[case] uri: &str,
        #[case] expected: u32,
    ) {
        let mut ports = MockPorts::default();
        ports
            .sync
            .expect_sync_commits()
            .withf(move |size| size.get() == expected)
            .times(1)
            .return_once(|_| {
                let mut report = SyncReport::new(SyncTable::Commits, started_at());
                let repo = RepoSlug::new("acme", "api").expect("slug");
                report.push(
                    repo,
                    RepositorySyncStatus::Synced {
                        pages: 1,
                        fetched: 2,
                        inserted: 2,
                        stop_reason: StopReason::Exhausted,
                        watermark: None,
                    },
                );
                Ok(report)
            });

        let (status, body) = call_json(ports, TestRequest::post().uri(uri)).await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["inserted_count"], json!(2));
        assert_eq!(body["data"]["repositories"][0]["status"], json!("synced"));
    }

    #[actix_web::test]
    async fn pullrequest_sync_defaults_to_ten() {
        let mut ports = MockPorts::default();
        ports
            .sync
            .expect_sync_pullrequests()
            .withf(|size| size.get() == 10)
            .return_once(|_| Ok(SyncReport::new(SyncTable::PullRequests, started_at())));

        let (status, _) = call_json(ports, TestRequest::post().uri("/sync/pullrequests")).await;

        assert_eq!(status, 200);
    }

    #[rstest]
    #[case("/sync/commits?page_size=0")]
    #[case("/sync/pullrequests?page_size=101")]
    #[case("/sync_mtr?page_size=500")]
    #[actix_web::test]
    async fn out_of_range_page_size_is_rejected(#[case] uri: &str) {
        let (status, body) = call_json(MockPorts::default(), TestRequest::post().uri(uri)).await;

        assert_eq!(status, 400);
        assert_eq!(body["error"]["details"]["code"], json!("invalid_page_size"));
    }

    #[actix_web::test]
    async fn non_numeric_page_size_uses_error_envelope() {
        let (status, body) = call_json(
            MockPorts::default(),
            TestRequest::post().uri("/sync/commits?page_size=lots"),
        )
        .await;

        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], json!("invalid_request"));
    }

    #[actix_web::test]
    async fn diff_backfill_returns_report() {
        let mut ports = MockPorts::default();
        ports.diffs.expect_backfill_diffs().return_once(|| {
            Ok(BackfillReport {
                missing_count: 2,
                updated_count: 1,
                unmatched_count: 0,
                failures: Vec::new(),
            })
        });

        let (status, body) = call_json(ports, TestRequest::post().uri("/sync/diffs")).await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["missing_count"], json!(2));
    }

    #[actix_web::test]
    async fn mtr_sweep_returns_report() {
        let mut ports = MockPorts::default();
        ports
            .mtr
            .expect_sync_mtr()
            .withf(|size| size.get() == 20)
            .return_once(|_| {
                Ok(MtrSyncReport {
                    started_at: started_at(),
                    total_count: 4,
                    replaced: true,
                    repositories: Vec::new(),
                })
            });

        let (status, body) = call_json(ports, TestRequest::post().uri("/sync_mtr")).await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["replaced"], json!(true));
    }
}
