//! Test helpers for the HTTP handlers.

use std::sync::Arc;

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::{App, test, web};
use serde_json::Value;

use super::state::HttpState;
use crate::domain::ports::{
    MockActivityQuery, MockDiffBackfillCommand, MockMtrCommand, MockMtrQuery, MockSyncCommand,
};

/// Mock ports; any call without an expectation fails the test.
#[derive(Default)]
pub struct MockPorts {
    /// Activity query port.
    pub activity: MockActivityQuery,
    /// Sync command port.
    pub sync: MockSyncCommand,
    /// Diff backfill command port.
    pub diffs: MockDiffBackfillCommand,
    /// MTR command port.
    pub mtr: MockMtrCommand,
    /// MTR query port.
    pub mtr_query: MockMtrQuery,
}

impl MockPorts {
    /// Wrap the mocks into handler state.
    pub fn into_state(self) -> HttpState {
        HttpState {
            activity: Arc::new(self.activity),
            sync: Arc::new(self.sync),
            diffs: Arc::new(self.diffs),
            mtr: Arc::new(self.mtr),
            mtr_query: Arc::new(self.mtr_query),
        }
    }
}

/// Send `request` to an app serving every API route over `ports`.
pub async fn call(ports: MockPorts, request: test::TestRequest) -> ServiceResponse<BoxBody> {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(ports.into_state()))
            .configure(super::configure_api),
    )
    .await;
    test::call_service(&app, request.to_request())
        .await
        .map_into_boxed_body()
}

/// Status code and parsed JSON body of `request`.
pub async fn call_json(ports: MockPorts, request: test::TestRequest) -> (u16, Value) {
    let res = call(ports, request).await;
    let status = res.status().as_u16();
    let body = test::read_body_json(res).await;
    (status, body)
}
