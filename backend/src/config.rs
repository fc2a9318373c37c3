//! Runtime configuration, read from `ROSTERDESK_*` environment variables.

use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB: &str = "rosterdesk.sqlite";
const DEFAULT_JSON_LIMIT: usize = 10 * 1024 * 1024; // 10 MB

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file backing the workspace store. Each job opens its own connection to it.
    pub database_path: PathBuf,
    pub json_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DB),
            json_limit: DEFAULT_JSON_LIMIT,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(host) = lookup("ROSTERDESK_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("ROSTERDESK_PORT") {
            config.port = parse_value("ROSTERDESK_PORT", &port)?;
        }
        if let Some(db) = lookup("ROSTERDESK_DB") {
            config.database_path = PathBuf::from(db);
        }
        if let Some(limit) = lookup("ROSTERDESK_JSON_LIMIT") {
            config.json_limit = parse_value("ROSTERDESK_JSON_LIMIT", &limit)?;
        }
        Ok(config)
    }

    pub fn bind_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
