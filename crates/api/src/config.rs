//! Process configuration read from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `CURSOS_BIND_ADDR` | `0.0.0.0:8080` |
//! | `CURSOS_STORE` | `memory` (`postgres` requires `DATABASE_URL`) |
//! | `CURSOS_EMPTY_LIST_NOT_FOUND` | `false` |
//! | `CURSOS_MAX_ATTEMPTS` | `8` |
//! | `CURSOS_LOCK_TIMEOUT_MS` | `5000` |
//! | `CURSOS_LOG_FORMAT` | `json` |

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use cursos_infra::DispatchConfig;
use cursos_observability::LogFormat;

pub const BIND_ADDR: &str = "CURSOS_BIND_ADDR";
pub const STORE: &str = "CURSOS_STORE";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const EMPTY_LIST_NOT_FOUND: &str = "CURSOS_EMPTY_LIST_NOT_FOUND";
pub const MAX_ATTEMPTS: &str = "CURSOS_MAX_ATTEMPTS";
pub const LOCK_TIMEOUT_MS: &str = "CURSOS_LOCK_TIMEOUT_MS";
pub const LOG_FORMAT: &str = "CURSOS_LOG_FORMAT";

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 8080));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}: invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set when {1}")]
    Missing(&'static str, &'static str),
}

/// Where courses are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres { database_url: String },
}

/// How `GET /cursos` answers when there are no courses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyListPolicy {
    /// 200 with `[]`.
    #[default]
    EmptyOk,
    /// 404 `not_found`.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub empty_list: EmptyListPolicy,
    pub dispatch: DispatchConfig,
    pub log_format: LogFormat,
    /// Variables that were absent and fell back to their defaults.
    pub defaulted: Vec<&'static str>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR,
            store: StoreBackend::Memory,
            empty_list: EmptyListPolicy::default(),
            dispatch: DispatchConfig::default(),
            log_format: LogFormat::default(),
            defaulted: Vec::new(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut defaulted = Vec::new();
        let mut read = |var: &'static str| {
            let value = lookup(var).filter(|v| !v.trim().is_empty());
            if value.is_none() {
                defaulted.push(var);
            }
            value
        };

        let bind_addr = parse(BIND_ADDR, read(BIND_ADDR))?.unwrap_or(DEFAULT_BIND_ADDR);

        let store = match read(STORE).as_deref().map(str::trim) {
            None | Some("memory") => StoreBackend::Memory,
            Some("postgres") => {
                let database_url = lookup(DATABASE_URL)
                    .filter(|v| !v.trim().is_empty())
                    .ok_or(ConfigError::Missing(DATABASE_URL, "CURSOS_STORE=postgres"))?;
                StoreBackend::Postgres { database_url }
            }
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: STORE,
                    value: other.to_string(),
                    reason: "expected 'memory' or 'postgres'".to_string(),
                });
            }
        };

        let empty_list = match parse::<bool>(EMPTY_LIST_NOT_FOUND, read(EMPTY_LIST_NOT_FOUND))? {
            Some(true) => EmptyListPolicy::NotFound,
            Some(false) | None => EmptyListPolicy::EmptyOk,
        };

        let mut dispatch = DispatchConfig::default();
        if let Some(max_attempts) = parse::<u32>(MAX_ATTEMPTS, read(MAX_ATTEMPTS))? {
            if max_attempts == 0 {
                return Err(ConfigError::Invalid {
                    var: MAX_ATTEMPTS,
                    value: "0".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            dispatch = dispatch.with_max_attempts(max_attempts);
        }
        if let Some(ms) = parse::<u64>(LOCK_TIMEOUT_MS, read(LOCK_TIMEOUT_MS))? {
            dispatch = dispatch.with_lock_timeout(Duration::from_millis(ms));
        }

        let log_format = parse::<LogFormat>(LOG_FORMAT, read(LOG_FORMAT))?.unwrap_or_default();

        Ok(Self {
            bind_addr,
            store,
            empty_list,
            dispatch,
            log_format,
            defaulted,
        })
    }
}

fn parse<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                value: raw.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}
