//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler in [`crate::inbound::http`] plus the
//! schema wrappers from [`crate::inbound::http::schemas`]. The document backs
//! Swagger UI in debug builds and the `openapi-dump` binary.

use utoipa::OpenApi;

use crate::inbound::http::schemas::{
    EnvelopeSchema, ErrorCodeSchema, ErrorEnvelopeSchema, ErrorSchema,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "bitmirror API",
        description = "Incremental Bitbucket mirror with commit, pull request and MTR analytics."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::authors::list_authors,
        crate::inbound::http::authors::author_repositories,
        crate::inbound::http::authors::author_commits,
        crate::inbound::http::authors::author_pullrequests,
        crate::inbound::http::authors::author_commit_counts,
        crate::inbound::http::authors::author_commits_on,
        crate::inbound::http::commits::list_repositories,
        crate::inbound::http::commits::commit_diff,
        crate::inbound::http::commits::all_commits,
        crate::inbound::http::commits::repository_commits,
        crate::inbound::http::commits::author_diffs,
        crate::inbound::http::pull_requests::list_pullrequests,
        crate::inbound::http::pull_requests::count_pullrequests,
        crate::inbound::http::pull_requests::last_pullrequest,
        crate::inbound::http::pull_requests::author_last_pullrequest,
        crate::inbound::http::sync::sync_commits,
        crate::inbound::http::sync::sync_pullrequests,
        crate::inbound::http::sync::sync_diffs,
        crate::inbound::http::sync::sync_mtr,
        crate::inbound::http::mtr::all_mtr,
        crate::inbound::http::mtr::author_mtr,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(EnvelopeSchema, ErrorEnvelopeSchema, ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "authors", description = "Activity of one author"),
        (name = "repositories", description = "Configured repositories"),
        (name = "commits", description = "Stored commits and diffs"),
        (name = "pullrequests", description = "Stored pull requests"),
        (name = "sync", description = "Pull new data from Bitbucket"),
        (name = "mtr", description = "Mean time to repair"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
