//! Server configuration read from the environment.
//!
//! Environment variables:
//!   DATABASE_URL        - PostgreSQL URL (default: postgres://localhost/larder)
//!   HOST                - bind address (default: 0.0.0.0)
//!   PORT                - bind port (default: 3000)
//!   STORAGE_BACKEND     - "postgres" or "memory" (default: postgres)
//!   DB_MAX_CONNECTIONS  - pool size (default: 10)
//!   DB_MIN_CONNECTIONS  - connections kept open when idle (default: 0)
//!   DB_ACQUIRE_TIMEOUT_SECS - wait for a free connection (default: 30)
//!   MAX_BODY_BYTES      - request body limit (default: 1 MiB)

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use larder_core::{Error, Result};
use larder_db::{PoolConfig, DEFAULT_ACQUIRE_TIMEOUT_SECS};

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/larder";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_DB_MIN_CONNECTIONS: u32 = 0;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Where recipes are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Postgres,
    /// Process-local; contents are lost on restart.
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            storage: StorageBackend::default(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            db_min_connections: DEFAULT_DB_MIN_CONNECTIONS,
            db_acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Unset or blank variables take
    /// their defaults; values that fail to parse are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            host: var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", var("PORT"), defaults.port)?,
            storage: parse_var("STORAGE_BACKEND", var("STORAGE_BACKEND"), defaults.storage)?,
            db_max_connections: parse_var(
                "DB_MAX_CONNECTIONS",
                var("DB_MAX_CONNECTIONS"),
                defaults.db_max_connections,
            )?,
            db_min_connections: parse_var(
                "DB_MIN_CONNECTIONS",
                var("DB_MIN_CONNECTIONS"),
                defaults.db_min_connections,
            )?,
            db_acquire_timeout_secs: parse_var(
                "DB_ACQUIRE_TIMEOUT_SECS",
                var("DB_ACQUIRE_TIMEOUT_SECS"),
                defaults.db_acquire_timeout_secs,
            )?,
            max_body_bytes: parse_var(
                "MAX_BODY_BYTES",
                var("MAX_BODY_BYTES"),
                defaults.max_body_bytes,
            )?,
        })
    }

    /// Pool settings for the Postgres backend.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::new()
            .max_connections(self.db_max_connections)
            .min_connections(self.db_min_connections.min(self.db_max_connections))
            .acquire_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| Error::Config(format!("invalid bind address {}: {}", addr, e)))
    }
}

fn parse_var<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{}={}: {}", key, raw, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.database_url, "postgres://localhost/larder");
        assert_eq!(config.port, 3000);
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.max_body_bytes, 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://db/recipes"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("STORAGE_BACKEND", "Memory"),
            ("DB_MAX_CONNECTIONS", "3"),
            ("DB_MIN_CONNECTIONS", "1"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "5"),
            ("MAX_BODY_BYTES", "2048"),
        ])
        .unwrap();

        assert_eq!(config.database_url, "postgres://db/recipes");
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.db_max_connections, 3);
        assert_eq!(config.db_min_connections, 1);
        assert_eq!(config.db_acquire_timeout_secs, 5);
        assert_eq!(config.max_body_bytes, 2048);
        assert_eq!(
            config.bind_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config_from(&[("PORT", "  "), ("HOST", "")]).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for (key, value) in [
            ("PORT", "eighty"),
            ("PORT", "70000"),
            ("STORAGE_BACKEND", "sqlite"),
            ("DB_MAX_CONNECTIONS", "-1"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "soon"),
        ] {
            let err = config_from(&[(key, value)]).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{}={}", key, value);
        }
    }

    #[test]
    fn test_pool_config_from_settings() {
        let pool = config_from(&[
            ("DB_MAX_CONNECTIONS", "4"),
            ("DB_MIN_CONNECTIONS", "2"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "7"),
        ])
        .unwrap()
        .pool_config();
        assert_eq!(pool.max_connections, 4);
        assert_eq!(pool.min_connections, 2);
        assert_eq!(pool.acquire_timeout, Duration::from_secs(7));

        // Minimum never exceeds the pool size.
        let pool = config_from(&[("DB_MAX_CONNECTIONS", "2"), ("DB_MIN_CONNECTIONS", "5")])
            .unwrap()
            .pool_config();
        assert_eq!(pool.min_connections, 2);
    }

    #[test]
    fn test_bad_host_fails_bind_addr() {
        let config = config_from(&[("HOST", "not a host")]).unwrap();
        assert!(matches!(config.bind_addr(), Err(Error::Config(_))));
    }
}
