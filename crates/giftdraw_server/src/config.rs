//! Environment-driven server configuration.

use giftdraw_core::default_log_level;
use log::{info, warn};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

pub const PORT_VAR: &str = "GIFTDRAW_PORT";
pub const DB_PATH_VAR: &str = "GIFTDRAW_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "GIFTDRAW_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "GIFTDRAW_LOG_DIR";

/// Value of `GIFTDRAW_DB_PATH` that selects an ephemeral store.
pub const IN_MEMORY_DB: &str = ":memory:";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid {key} value `{value}`: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub db_path: String,
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` logs to stderr.
    pub log_dir: Option<String>,
    /// Keys that were absent and fell back to their default.
    pub defaulted: Vec<&'static str>,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// Runs before logging is initialized, so fallbacks are reported by the
    /// caller through [`Config::describe`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut defaulted = Vec::new();
        Ok(Self {
            port: try_load(&lookup, &mut defaulted, PORT_VAR, "3000")?,
            db_path: try_load(&lookup, &mut defaulted, DB_PATH_VAR, "giftdraw.sqlite3")?,
            log_level: try_load(&lookup, &mut defaulted, LOG_LEVEL_VAR, default_log_level())?,
            log_dir: lookup(LOG_DIR_VAR).filter(|value| !value.trim().is_empty()),
            defaulted,
        })
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path == IN_MEMORY_DB
    }

    /// Logs the effective configuration. Call once logging is active.
    pub fn describe(&self) {
        for key in &self.defaulted {
            info!("event=config_default module=config status=ok key={key}");
        }
        info!(
            "event=config_load module=config status=ok port={} db_path={} log_level={} log_dir={}",
            self.port,
            self.db_path,
            self.log_level,
            self.log_dir.as_deref().unwrap_or("stderr")
        );
        if self.is_in_memory() {
            warn!("event=config_load module=config status=warn reason=in_memory_store_is_not_persisted");
        }
    }
}

fn try_load<T, F>(
    lookup: &F,
    defaulted: &mut Vec<&'static str>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| {
        defaulted.push(key);
        default.to_string()
    });
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|err| ConfigError::InvalidValue {
        key,
        reason: err.to_string(),
        value,
    })
}
