//! Incremental Bitbucket mirror with activity and MTR analytics.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the sync services
//! and their ports, [`outbound`] the Bitbucket and PostgreSQL adapters, and
//! [`inbound`] the actix-web surface.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod wiring;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
