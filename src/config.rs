//! Configuration handling for the capture service.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use clap::Parser;
use std::time::Duration;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

// Pagination defaults
pub const DEFAULT_ROWS: i64 = 20;
pub const DEFAULT_MAX_ROWS: i64 = 100;

// Pool configuration defaults
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MAX_CONNECTIONS_SQLITE: u32 = 1;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Connection pool options handed through to the driver.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct PoolOptions {
    /// Maximum connections in pool (default: 10 for MySQL/PostgreSQL, 1 for SQLite)
    pub max_connections: Option<u32>,
    /// Minimum connections in pool (default: 1)
    pub min_connections: Option<u32>,
    /// Idle timeout in seconds (default: 600)
    pub idle_timeout_secs: Option<u64>,
    /// Connection acquire timeout in seconds (default: 30)
    pub acquire_timeout_secs: Option<u64>,
}

impl PoolOptions {
    /// Get max_connections with default value based on database type.
    pub fn max_connections_or_default(&self, is_sqlite: bool) -> u32 {
        self.max_connections.unwrap_or(if is_sqlite {
            DEFAULT_MAX_CONNECTIONS_SQLITE
        } else {
            DEFAULT_MAX_CONNECTIONS
        })
    }

    /// Get min_connections with default value.
    pub fn min_connections_or_default(&self) -> u32 {
        self.min_connections.unwrap_or(DEFAULT_MIN_CONNECTIONS)
    }

    pub fn idle_timeout_or_default(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs.unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS))
    }

    pub fn acquire_timeout_or_default(&self) -> Duration {
        Duration::from_secs(
            self.acquire_timeout_secs
                .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        )
    }

    /// Validate pool options and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(max) = self.max_connections {
            if max == 0 {
                return Err("max_connections must be greater than 0".to_string());
            }
        }
        if let Some(min) = self.min_connections {
            if let Some(max) = self.max_connections {
                if min > max {
                    return Err(format!(
                        "min_connections ({}) cannot exceed max_connections ({})",
                        min, max
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Command line and environment configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "capture-service", version, about)]
pub struct Config {
    /// Database connection URL (postgres://, mysql://, or sqlite:)
    #[arg(short = 'd', long = "database-url", value_name = "URL", env = "CAPTURE_DATABASE_URL")]
    pub database_url: String,

    /// HTTP host to bind to
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "CAPTURE_HTTP_HOST")]
    pub http_host: String,

    /// HTTP port to bind to
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "CAPTURE_HTTP_PORT")]
    pub http_port: u16,

    /// Per-query timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS,
        env = "CAPTURE_QUERY_TIMEOUT"
    )]
    pub query_timeout: u64,

    /// Largest page size a list request may ask for
    #[arg(long, default_value_t = DEFAULT_MAX_ROWS, env = "CAPTURE_MAX_ROWS")]
    pub max_rows: i64,

    /// Page size used when a list request does not specify one
    #[arg(long, default_value_t = DEFAULT_ROWS, env = "CAPTURE_DEFAULT_ROWS")]
    pub default_rows: i64,

    /// Maximum pooled connections
    #[arg(long, env = "CAPTURE_MAX_CONNECTIONS")]
    pub max_connections: Option<u32>,

    /// Minimum pooled connections
    #[arg(long, env = "CAPTURE_MIN_CONNECTIONS")]
    pub min_connections: Option<u32>,

    /// Pool acquire timeout in seconds
    #[arg(long, env = "CAPTURE_ACQUIRE_TIMEOUT")]
    pub acquire_timeout: Option<u64>,

    /// Idle connection timeout in seconds
    #[arg(long, env = "CAPTURE_IDLE_TIMEOUT")]
    pub idle_timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "CAPTURE_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "CAPTURE_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Collect the pool flags into [`PoolOptions`].
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            idle_timeout_secs: self.idle_timeout,
            acquire_timeout_secs: self.acquire_timeout,
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Check cross-field constraints clap cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_rows < 1 {
            return Err("max_rows must be at least 1".to_string());
        }
        if self.default_rows < 1 || self.default_rows > self.max_rows {
            return Err(format!(
                "default_rows ({}) must be between 1 and max_rows ({})",
                self.default_rows, self.max_rows
            ));
        }
        if self.query_timeout == 0 {
            return Err("query_timeout must be greater than 0".to_string());
        }
        self.pool_options().validate()
    }
}
