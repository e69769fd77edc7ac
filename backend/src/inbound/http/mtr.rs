//! Mean-time-to-repair views.
//!
//! ```text
//! GET /mtr
//! GET /{author}/mtr
//! ```
//!
//! Both read the table rebuilt by `POST /sync_mtr`; neither calls the host.

use actix_web::{HttpResponse, get, web};

use super::envelope;
use super::error::ApiResult;
use super::schemas::{EnvelopeSchema, ErrorEnvelopeSchema};
use super::state::HttpState;
use super::validation::parse_author;

/// MTR for every author plus the overall mean.
#[utoipa::path(
    get,
    path = "/mtr",
    tags = ["mtr"],
    responses(
        (status = 200, description = "Per-author and overall MTR", body = EnvelopeSchema),
        (status = 503, description = "Store unavailable", body = ErrorEnvelopeSchema)
    )
)]
#[get("/mtr")]
pub async fn all_mtr(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    Ok(envelope::ok(state.mtr_query.all_mtr().await?))
}

/// MTR for one author.
#[utoipa::path(
    get,
    path = "/{author}/mtr",
    tags = ["mtr"],
    params(("author" = String, Path, description = "Author id or display name")),
    responses(
        (status = 200, description = "Author MTR", body = EnvelopeSchema),
        (status = 400, description = "Blank author", body = ErrorEnvelopeSchema)
    )
)]
#[get("/{author}/mtr")]
pub async fn author_mtr(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let alias = parse_author(&path)?;
    Ok(envelope::ok(state.mtr_query.author_mtr(&alias).await?))
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::{MockPorts, call_json};
    use actix_web::test::TestRequest;
    use serde_json::json;

    use crate::domain::{MeanRepairTime, MtrSummary, RepairTime};

    fn empty_summary() -> MtrSummary {
        MtrSummary {
            authors: Vec::new(),
            wrong_commit_messages: 0,
            mean_repair_time: MeanRepairTime::NoTimesFound,
            mean_repair_hours: None,
        }
    }

    #[actix_web::test]
    async fn empty_table_reports_sentinel() {
        let mut ports = MockPorts::default();
        ports.mtr_query.expect_all_mtr().return_once(|| Ok(empty_summary()));

        let (status, body) = call_json(ports, TestRequest::get().uri("/mtr")).await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["mean_repair_time"], json!("no MTR times found"));
        assert_eq!(body["data"]["mean_repair_hours"], json!(null));
    }

    #[actix_web::test]
    async fn author_mtr_formats_hours() {
        let mut ports = MockPorts::default();
        ports
            .mtr_query
            .expect_author_mtr()
            .withf(|alias| alias.as_str() == "jdoe")
            .return_once(|_| {
                Ok(MtrSummary {
                    mean_repair_time: MeanRepairTime::Measured(RepairTime::from_millis(5_400_000)),
                    mean_repair_hours: Some(1.5),
                    ..empty_summary()
                })
            });

        let (status, body) = call_json(ports, TestRequest::get().uri("/jdoe/mtr")).await;

        assert_eq!(status, 200);
        assert_eq!(body["data"]["mean_repair_time"], json!("1:30:00"));
    }
}
