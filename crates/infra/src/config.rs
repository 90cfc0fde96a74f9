//! Service configuration loaded from the environment.

use std::time::Duration;

use tracing::warn;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_QUEUE_FROM: &str = "purchase-requisition-releases:input";
const DEFAULT_QUEUE_TO: &str = "purchase-requisition-releases:output";
const DEFAULT_QUEUE_TO_SQL: &str = "sql-executor:requests";
const DEFAULT_SQL_REPLY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Runtime configuration of the releases worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub redis_url: String,
    /// Inbound list of release requests.
    pub queue_from: String,
    /// Outbound list of release results.
    pub queue_to: String,
    /// Request stream of the SQL executor.
    pub queue_to_sql: String,
    pub sql_reply_timeout: Duration,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let redis_url = lookup("REDIS_URL").unwrap_or_else(|| {
            warn!("REDIS_URL not set; using {DEFAULT_REDIS_URL}");
            DEFAULT_REDIS_URL.to_string()
        });

        let sql_reply_timeout_secs =
            parse_or("SQL_REPLY_TIMEOUT_SECS", &lookup, DEFAULT_SQL_REPLY_TIMEOUT_SECS)?;
        if sql_reply_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "SQL_REPLY_TIMEOUT_SECS",
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            database_url,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", &lookup, DEFAULT_DB_MAX_CONNECTIONS)?,
            redis_url,
            queue_from: lookup("QUEUE_FROM").unwrap_or_else(|| DEFAULT_QUEUE_FROM.to_string()),
            queue_to: lookup("QUEUE_TO").unwrap_or_else(|| DEFAULT_QUEUE_TO.to_string()),
            queue_to_sql: lookup("QUEUE_TO_SQL").unwrap_or_else(|| DEFAULT_QUEUE_TO_SQL.to_string()),
            sql_reply_timeout: Duration::from_secs(sql_reply_timeout_secs),
        })
    }
}

fn parse_or<T>(
    key: &'static str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}
