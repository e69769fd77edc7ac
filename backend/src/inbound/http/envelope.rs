//! Response envelope shared by every JSON endpoint.
//!
//! Success bodies are `{"statusCode": 200, "data": ...}`; failures are
//! `{"statusCode": <status>, "error": {...}}` (see [`super::error`]).

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::domain::Error;

/// Successful response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Always 200.
    pub status_code: u16,
    /// Endpoint payload.
    pub data: T,
}

/// Failed response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope<'a> {
    /// HTTP status, repeated in the body.
    pub status_code: u16,
    /// Failure details.
    pub error: &'a Error,
}

/// Wrap `data` in a 200 envelope.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        status_code: StatusCode::OK.as_u16(),
        data,
    })
}
