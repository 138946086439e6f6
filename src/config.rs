//! Service configuration, read from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `BUDGET_ALERTS_HOST` | `0.0.0.0` |
//! | `BUDGET_ALERTS_PORT` | `3030` |
//! | `BUDGET_STATUS_URL` | unset (no automatic fetching) |
//! | `BUDGET_USER_ID` | unset, required with `BUDGET_STATUS_URL` |
//! | `BUDGET_REFRESH_SECS` | `300` (`0` disables the timer) |
//! | `DISMISSAL_BACKEND` | `sqlite` (`sqlite`, `file` or `memory`) |
//! | `BUDGET_ALERTS_DATA_DIR` | `./data` |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3030;
const DEFAULT_REFRESH_SECS: u64 = 300;
const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("{0} is required when BUDGET_STATUS_URL is set")]
    Missing(&'static str),
}

/// Which [`crate::dismissal::DismissalBackend`] to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DismissalBackendKind {
    #[default]
    Sqlite,
    File,
    Memory,
}

impl FromStr for DismissalBackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "file" | "json" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Where budget snapshots are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSourceConfig {
    pub base_url: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub status_source: Option<StatusSourceConfig>,
    /// `None` disables the periodic refresh.
    pub refresh_interval: Option<Duration>,
    pub dismissal_backend: DismissalBackendKind,
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            status_source: None,
            refresh_interval: Some(Duration::from_secs(DEFAULT_REFRESH_SECS)),
            dismissal_backend: DismissalBackendKind::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let port = match get("BUDGET_ALERTS_PORT") {
            Some(raw) => parse_value("BUDGET_ALERTS_PORT", &raw)?,
            None => defaults.port,
        };

        let refresh_interval = match get("BUDGET_REFRESH_SECS") {
            Some(raw) => match parse_value::<u64>("BUDGET_REFRESH_SECS", &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => defaults.refresh_interval,
        };

        let dismissal_backend = match get("DISMISSAL_BACKEND") {
            Some(raw) => parse_value("DISMISSAL_BACKEND", &raw)?,
            None => defaults.dismissal_backend,
        };

        let status_source = match get("BUDGET_STATUS_URL") {
            Some(base_url) => Some(StatusSourceConfig {
                base_url,
                user_id: get("BUDGET_USER_ID").ok_or(ConfigError::Missing("BUDGET_USER_ID"))?,
            }),
            None => None,
        };

        Ok(Self {
            host: get("BUDGET_ALERTS_HOST").unwrap_or(defaults.host),
            port,
            status_source,
            refresh_interval,
            dismissal_backend,
            data_dir: get("BUDGET_ALERTS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// SQLite database used by the `sqlite` backend.
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("budget_alerts.db")
    }

    /// JSON file used by the `file` backend.
    pub fn dismissal_file_path(&self) -> PathBuf {
        self.data_dir.join("dismissed_alerts.json")
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
    })
}
