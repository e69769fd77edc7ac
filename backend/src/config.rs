//! Settings loaded through OrthoConfig and resolved into [`AppConfig`].
//!
//! Three layered settings structs read environment variables (after
//! `dotenvy` has loaded any `.env` file):
//!
//! - `BITBUCKET_*`: repository allowlist, credentials and retry limits.
//! - `DB_*`: connection parts or a full `DB_URL`, pool size, write chunking.
//! - `SERVER_*`: bind address and the per-repository page guard.

use std::ffi::OsString;
use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{RepoSlug, RepoSlugError, RetryConfig, SyncConfig};
use crate::outbound::bitbucket::{BitbucketClientConfig, DEFAULT_API_BASE_URL};
use crate::outbound::persistence::PoolConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Remote host settings (`BITBUCKET_*`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BITBUCKET")]
pub struct BitbucketSettings {
    /// Comma-separated `workspace/slug` allowlist.
    pub repos: Option<String>,
    /// Account used for basic auth.
    pub username: Option<String>,
    /// App password paired with `username`.
    pub app_password: Option<String>,
    /// Repository API root.
    pub api_base_url: Option<String>,
    /// Per-request deadline in seconds.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    /// Attempts per host call, including the first.
    #[ortho_config(default = 3)]
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    #[ortho_config(default = 200)]
    pub initial_backoff_ms: u64,
}

/// Record store settings (`DB_*`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DB")]
pub struct DatabaseSettings {
    /// Full connection URL; wins over the individual parts.
    pub url: Option<String>,
    /// Server host name.
    pub host: Option<String>,
    /// Server port.
    #[ortho_config(default = 5432)]
    pub port: u16,
    /// Login role.
    pub user: Option<String>,
    /// Password for `user`.
    pub pswd: Option<String>,
    /// Database name.
    pub name: Option<String>,
    /// Rows per insert statement.
    #[ortho_config(default = 500)]
    pub chunk_size: usize,
    /// Pool ceiling.
    #[ortho_config(default = 10)]
    pub max_connections: u32,
}

/// HTTP server settings (`SERVER_*`).
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SERVER")]
pub struct ServerSettings {
    /// Listen address, `0.0.0.0:8080` when unset.
    pub bind_addr: Option<String>,
    /// Pages fetched per repository before a walk is cut off.
    #[ortho_config(default = 1000)]
    pub max_pages: u32,
}

/// Failure to load or resolve settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// OrthoConfig could not read a settings layer.
    #[error("failed to load settings: {0}")]
    Load(String),
    /// A required variable is unset or blank.
    #[error("missing required setting {0}")]
    Missing(&'static str),
    /// The repository allowlist did not parse.
    #[error("invalid BITBUCKET_REPOS: {0}")]
    Repos(#[from] RepoSlugError),
    /// A value was present but unusable.
    #[error("invalid {name}: {message}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// Why it was rejected.
        message: String,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, message: impl ToString) -> Self {
        Self::Invalid {
            name,
            message: message.to_string(),
        }
    }
}

/// Fully resolved configuration shared by the server and the CLI.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Repositories to mirror, in configured order.
    pub repositories: Vec<RepoSlug>,
    /// Host client settings.
    pub bitbucket: BitbucketClientConfig,
    /// Retry limits for host calls.
    pub retry: RetryConfig,
    /// Database pool settings.
    pub pool: PoolConfig,
    /// Rows per insert statement.
    pub chunk_size: usize,
    /// Walk limits.
    pub sync: SyncConfig,
    /// HTTP listen address.
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Load every settings struct from the environment and resolve them.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when loading fails or a value is missing or
    /// malformed.
    pub fn load() -> Result<Self, ConfigError> {
        let args = || [OsString::from("bitmirror")];
        let bitbucket = BitbucketSettings::load_from_iter(args())
            .map_err(|err| ConfigError::Load(err.to_string()))?;
        let database = DatabaseSettings::load_from_iter(args())
            .map_err(|err| ConfigError::Load(err.to_string()))?;
        let server = ServerSettings::load_from_iter(args())
            .map_err(|err| ConfigError::Load(err.to_string()))?;
        Self::resolve(&bitbucket, &database, &server)
    }

    /// Resolve already-loaded settings.
    ///
    /// # Errors
    /// See [`AppConfig::load`].
    pub fn resolve(
        bitbucket: &BitbucketSettings,
        database: &DatabaseSettings,
        server: &ServerSettings,
    ) -> Result<Self, ConfigError> {
        let repositories = RepoSlug::parse_list(
            bitbucket
                .repos
                .as_deref()
                .ok_or(ConfigError::Missing("BITBUCKET_REPOS"))?,
        )?;
        let base_url = Url::parse(bitbucket.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL))
            .map_err(|err| ConfigError::invalid("BITBUCKET_API_BASE_URL", err))?;
        let client = BitbucketClientConfig {
            base_url,
            username: required(&bitbucket.username, "BITBUCKET_USERNAME")?,
            app_password: required(&bitbucket.app_password, "BITBUCKET_APP_PASSWORD")?,
            timeout: Duration::from_secs(bitbucket.request_timeout_secs),
        };
        let retry = RetryConfig {
            max_attempts: bitbucket.max_attempts,
            initial_backoff: Duration::from_millis(bitbucket.initial_backoff_ms),
            ..RetryConfig::default()
        };

        let pool = PoolConfig::new(database_url(database)?).with_max_size(database.max_connections);
        let bind_addr = server
            .bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err| ConfigError::invalid("SERVER_BIND_ADDR", err))?;

        Ok(Self {
            repositories,
            bitbucket: client,
            retry,
            pool,
            chunk_size: database.chunk_size.max(1),
            sync: SyncConfig {
                max_pages: server.max_pages.max(1),
            },
            bind_addr,
        })
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .ok_or(ConfigError::Missing(name))
}

fn database_url(settings: &DatabaseSettings) -> Result<String, ConfigError> {
    if let Some(url) = settings.url.as_deref().filter(|url| !url.trim().is_empty()) {
        return Ok(url.trim().to_owned());
    }

    let host = required(&settings.host, "DB_HOST")?;
    let name = required(&settings.name, "DB_NAME")?;
    let mut url = Url::parse("postgres://localhost")
        .map_err(|err| ConfigError::invalid("DB_HOST", err))?;
    url.set_host(Some(&host))
        .map_err(|err| ConfigError::invalid("DB_HOST", err))?;
    url.set_port(Some(settings.port))
        .map_err(|()| ConfigError::invalid("DB_PORT", settings.port))?;
    if let Some(user) = settings.user.as_deref() {
        url.set_username(user)
            .map_err(|()| ConfigError::invalid("DB_USER", "cannot be encoded"))?;
    }
    if let Some(password) = settings.pswd.as_deref() {
        url.set_password(Some(password))
            .map_err(|()| ConfigError::invalid("DB_PSWD", "cannot be encoded"))?;
    }
    url.set_path(&name);
    Ok(url.into())
}
