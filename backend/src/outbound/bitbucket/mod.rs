//! Bitbucket Cloud outbound adapters.
//!
//! This module provides a thin HTTP implementation of the
//! `RepositorySource` port.

mod dto;
mod http_source;

pub use http_source::{BitbucketClientConfig, BitbucketHttpSource, DEFAULT_API_BASE_URL};
