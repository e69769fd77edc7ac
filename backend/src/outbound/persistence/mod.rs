//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the record-store ports backed by PostgreSQL
//! through `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   records. Walk logic, watermark monotonicity and MTR maths stay in the
//!   domain.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Insert-or-ignore**: commits and pull requests are written with
//!   `ON CONFLICT DO NOTHING` on their `(repo, id)` keys.
//!
//! # Example
//!
//! ```ignore
//! use bitmirror::outbound::persistence::{DbPool, DieselCommitRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/mirror")).await?;
//! let commits = DieselCommitRepository::new(pool, 500);
//! ```

mod diesel_basic_error_mapping;
mod diesel_commit_repository;
mod diesel_mtr_repository;
mod diesel_pull_request_repository;
mod diesel_watermark_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_commit_repository::DieselCommitRepository;
pub use diesel_mtr_repository::DieselMtrRepository;
pub use diesel_pull_request_repository::DieselPullRequestRepository;
pub use diesel_watermark_repository::DieselWatermarkRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_migrations, run_migrations_blocking};
pub use pool::{DbPool, PoolConfig, PoolError};
