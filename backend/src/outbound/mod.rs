//! Outbound adapters (driven side of the hexagon).
//!
//! - `bitbucket`: reqwest client implementing `RepositorySource`.
//! - `persistence`: Diesel stores implementing the record-store ports.

pub mod bitbucket;
pub mod persistence;
