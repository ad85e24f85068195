//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use card_table::table::{TableConfig, TableConfigError};
use std::net::SocketAddr;

/// Origins of the Vite dev server.
const DEFAULT_CORS_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://127.0.0.1:5173"];

/// Allowed browser origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    /// Any origin (`CORS_ORIGINS=*`)
    Any,
    List(Vec<String>),
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Prometheus exporter bind address, if metrics are enabled
    pub metrics_bind: Option<SocketAddr>,
    /// CORS allow-list
    pub cors_origins: CorsOrigins,
    /// Configuration applied to every new table
    pub table: TableConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            metrics_bind: None,
            cors_origins: CorsOrigins::List(
                DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
            ),
            table: TableConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `metrics_override` - Optional metrics address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        metrics_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(bind_override, metrics_override, |key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(
        bind_override: Option<SocketAddr>,
        metrics_override: Option<SocketAddr>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_var(&lookup, "SERVER_BIND")?.unwrap_or(defaults.bind),
        };

        let metrics_bind = match metrics_override {
            Some(addr) => Some(addr),
            None => parse_var(&lookup, "METRICS_BIND")?,
        };

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(raw) if raw.trim() == "*" => CorsOrigins::Any,
            Some(raw) => CorsOrigins::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            None => defaults.cors_origins,
        };

        let table = TableConfig {
            name: lookup("TABLE_NAME").unwrap_or(defaults.table.name),
            max_seats: parse_var(&lookup, "TABLE_MAX_SEATS")?.unwrap_or(defaults.table.max_seats),
            starting_stack: parse_var(&lookup, "TABLE_STARTING_STACK")?
                .unwrap_or(defaults.table.starting_stack),
        };

        Ok(ServerConfig {
            bind,
            metrics_bind,
            cors_origins,
            table,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate().map_err(|e| ConfigError::Invalid {
            var: table_var(&e).to_string(),
            reason: e.to_string(),
        })?;

        if let CorsOrigins::List(origins) = &self.cors_origins
            && origins.is_empty()
        {
            return Err(ConfigError::Invalid {
                var: "CORS_ORIGINS".to_string(),
                reason: "Must list at least one origin, or be *".to_string(),
            });
        }

        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the server address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Environment variable behind a rejected table setting.
fn table_var(error: &TableConfigError) -> &'static str {
    match error {
        TableConfigError::EmptyName => "TABLE_NAME",
        TableConfigError::SeatCount(_) => "TABLE_MAX_SEATS",
        TableConfigError::StartingStack(_) => "TABLE_STARTING_STACK",
    }
}

/// Parses a variable if it is set. A set but unparsable value is an error.
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}
