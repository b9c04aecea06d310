//! Server configuration parsed from environment variables.
//!
//! `main` loads `.env` through `dotenvy` first, so everything here can also
//! come from a dotenv file. Unset variables fall back to defaults; set but
//! unparseable ones are a startup error.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 25;
pub const DEFAULT_CLIENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} has invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

impl crate::protocol::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Invalid { .. } => "E_CONFIG_INVALID",
            Self::Zero { .. } => "E_CONFIG_ZERO",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub ping_interval: Duration,
    pub client_channel_capacity: usize,
    pub rating_tau: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            ping_interval: Duration::from_secs(DEFAULT_PING_INTERVAL_SECS),
            client_channel_capacity: DEFAULT_CLIENT_CHANNEL_CAPACITY,
            rating_tau: crate::services::rating::DEFAULT_TAU,
        }
    }
}

impl Config {
    /// Build config from the process environment.
    ///
    /// - `PORT`: default 4000
    /// - `DATABASE_URL`: optional; without it games are not persisted
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `PING_INTERVAL_SECS`: default 25
    /// - `CLIENT_CHANNEL_CAPACITY`: default 256
    /// - `RATING_TAU`: default 0.06
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first variable that fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first variable that fails to parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let ping_secs: u64 = parse(&lookup, "PING_INTERVAL_SECS", DEFAULT_PING_INTERVAL_SECS)?;
        let capacity: usize = parse(&lookup, "CLIENT_CHANNEL_CAPACITY", DEFAULT_CLIENT_CHANNEL_CAPACITY)?;
        let rating_tau: f64 = parse(&lookup, "RATING_TAU", crate::services::rating::DEFAULT_TAU)?;

        nonzero("PING_INTERVAL_SECS", ping_secs)?;
        nonzero("CLIENT_CHANNEL_CAPACITY", u64::try_from(capacity).unwrap_or(u64::MAX))?;
        if !(rating_tau.is_finite() && rating_tau > 0.0) {
            return Err(ConfigError::Invalid { key: "RATING_TAU", value: rating_tau.to_string() });
        }

        Ok(Self {
            port: parse(&lookup, "PORT", DEFAULT_PORT)?,
            database_url,
            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?,
            ping_interval: Duration::from_secs(ping_secs),
            client_channel_capacity: capacity,
            rating_tau,
        })
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn nonzero(key: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 { Err(ConfigError::Zero { key }) } else { Ok(()) }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
