//! HTTP inbound adapter exposing the REST surface.

pub mod authors;
pub mod commits;
pub mod envelope;
pub mod error;
pub mod health;
pub mod mtr;
pub mod pull_requests;
pub mod schemas;
pub mod state;
pub mod sync;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;
pub use state::HttpState;

/// Register every API route on `cfg`.
///
/// Routes with literal first segments are registered before the
/// `/{author}/...` and `/{workspace}/{slug}/...` patterns.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid query string: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid path: {err}")).into()
    }))
    .service(authors::list_authors)
    .service(authors::author_repositories)
    .service(authors::author_commits)
    .service(authors::author_pullrequests)
    .service(authors::author_commit_counts)
    .service(authors::author_commits_on)
    .service(commits::list_repositories)
    .service(commits::commit_diff)
    .service(commits::all_commits)
    .service(pull_requests::list_pullrequests)
    .service(pull_requests::count_pullrequests)
    .service(pull_requests::last_pullrequest)
    .service(sync::sync_commits)
    .service(sync::sync_pullrequests)
    .service(sync::sync_diffs)
    .service(sync::sync_mtr)
    .service(mtr::all_mtr)
    .service(commits::repository_commits)
    .service(commits::author_diffs)
    .service(pull_requests::author_last_pullrequest)
    .service(mtr::author_mtr);
}
