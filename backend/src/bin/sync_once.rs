//! Run one sync pass against the configured stores and print its report.
//!
//! Intended for cron: settings come from the same environment as the server
//! and the JSON report is written to stdout.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;

use bitmirror::config::AppConfig;
use bitmirror::domain::ports::{DiffBackfillCommand, MtrCommand, SyncCommand};
use bitmirror::domain::{PageSize, TraceId};
use bitmirror::outbound::persistence::{DbPool, run_migrations};
use bitmirror::wiring::Services;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `sync-once` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sync-once",
    about = "Run a single Bitbucket sync pass and print the report as JSON",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    pass: Pass,
    /// Leave the schema untouched instead of applying pending migrations.
    #[arg(long)]
    skip_migrations: bool,
}

#[derive(Debug, Clone, Subcommand)]
enum Pass {
    /// Pull new commits.
    Commits {
        #[arg(long, value_parser = parse_page_size, default_value = "20")]
        page_size: PageSize,
    },
    /// Pull new pull requests.
    Pullrequests {
        #[arg(long, value_parser = parse_page_size, default_value = "10")]
        page_size: PageSize,
    },
    /// Fetch missing diffs.
    Diffs,
    /// Rebuild the MTR table from every branch.
    Mtr {
        #[arg(long, value_parser = parse_page_size, default_value = "20")]
        page_size: PageSize,
    },
}

fn parse_page_size(raw: &str) -> Result<PageSize, String> {
    let value: u32 = raw
        .trim()
        .parse()
        .map_err(|error| format!("page size must be a number: {error}"))?;
    PageSize::new(value).map_err(|error| error.to_string())
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(TraceId::scope(TraceId::generate(), async_main()))
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let dotenv = dotenvy::dotenv();
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(%error, "tracing init failed");
    }
    if let Err(error) = dotenv
        && !error.not_found()
    {
        warn!(%error, "failed to read .env");
    }

    let config = AppConfig::load().map_err(io::Error::other)?;
    if !args.skip_migrations {
        let applied = run_migrations(config.pool.database_url())
            .await
            .map_err(|error| io::Error::other(format!("migrations failed: {error}")))?;
        info!(applied, "database migrations applied");
    }
    let pool = DbPool::new(config.pool.clone())
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;
    let services = Services::build(&config, &pool).map_err(io::Error::other)?;

    match args.pass {
        Pass::Commits { page_size } => print_report(&run(services.sync.sync_commits(page_size)).await?),
        Pass::Pullrequests { page_size } => {
            print_report(&run(services.sync.sync_pullrequests(page_size)).await?)
        }
        Pass::Diffs => print_report(&run(services.diffs.backfill_diffs()).await?),
        Pass::Mtr { page_size } => print_report(&run(services.mtr.sync_mtr(page_size)).await?),
    }
}

async fn run<T>(
    pass: impl Future<Output = Result<T, bitmirror::domain::Error>>,
) -> io::Result<T> {
    pass.await
        .map_err(|error| io::Error::other(format!("{:?}: {}", error.code(), error.message())))
}

fn print_report(report: &impl Serialize) -> io::Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(io::Error::other)?;
    println!("{json}");
    Ok(())
}
