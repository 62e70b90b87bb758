//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `DOSSIER_*` environment
//! variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::retrieval::{RetrievalConfig, RetryPolicy};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `DOSSIER_*` overrides on top of
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Backing entity API base URL. Absent: serve straight from the
    /// local score store.
    pub backing_url: Option<String>,

    /// JSON entity export loaded as the fallback snapshot.
    pub snapshot_path: Option<PathBuf>,

    /// Custom severity dictionary (JSON). Absent: built-in dictionary.
    pub dictionary_path: Option<PathBuf>,

    /// Query cache TTL in seconds. Default: `300`.
    pub cache_ttl_secs: u64,

    /// Max cached query pages. Default: `10_000`.
    pub cache_capacity: u64,

    /// Rows per result page. Default: `25`.
    pub page_size: u32,

    /// Concurrent scoring workers in the batch job. Default: `8`.
    pub scoring_workers: usize,

    /// Backing-call retries after the initial attempt. Default: `3`.
    pub retry_max: u32,

    /// First backoff delay in milliseconds (doubles per retry).
    /// Default: `1000`.
    pub retry_base_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            backing_url: None,
            snapshot_path: Some(PathBuf::from("./.data/entities-snapshot.json")),
            dictionary_path: None,
            cache_ttl_secs: 300,
            cache_capacity: 10_000,
            page_size: 25,
            scoring_workers: 8,
            retry_max: 3,
            retry_base_ms: 1_000,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "DOSSIER_PORT";
    const ENV_BIND_ADDR: &'static str = "DOSSIER_BIND_ADDR";
    const ENV_BACKING_URL: &'static str = "DOSSIER_BACKING_URL";
    const ENV_SNAPSHOT_PATH: &'static str = "DOSSIER_SNAPSHOT_PATH";
    const ENV_DICTIONARY_PATH: &'static str = "DOSSIER_DICTIONARY_PATH";
    const ENV_CACHE_TTL_SECS: &'static str = "DOSSIER_CACHE_TTL_SECS";
    const ENV_CACHE_CAPACITY: &'static str = "DOSSIER_CACHE_CAPACITY";
    const ENV_PAGE_SIZE: &'static str = "DOSSIER_PAGE_SIZE";
    const ENV_SCORING_WORKERS: &'static str = "DOSSIER_SCORING_WORKERS";
    const ENV_RETRY_MAX: &'static str = "DOSSIER_RETRY_MAX";
    const ENV_RETRY_BASE_MS: &'static str = "DOSSIER_RETRY_BASE_MS";

    /// Loads configuration from environment variables (falling back to
    /// defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let backing_url = Self::parse_optional_string_from_env(Self::ENV_BACKING_URL);
        let snapshot_path = Self::parse_optional_path_from_env(Self::ENV_SNAPSHOT_PATH)
            .or(defaults.snapshot_path);
        let dictionary_path = Self::parse_optional_path_from_env(Self::ENV_DICTIONARY_PATH);
        let cache_ttl_secs =
            Self::parse_u64_from_env(Self::ENV_CACHE_TTL_SECS, defaults.cache_ttl_secs);
        let cache_capacity =
            Self::parse_u64_from_env(Self::ENV_CACHE_CAPACITY, defaults.cache_capacity);
        let page_size =
            Self::parse_u64_from_env(Self::ENV_PAGE_SIZE, u64::from(defaults.page_size)) as u32;
        let scoring_workers = Self::parse_u64_from_env(
            Self::ENV_SCORING_WORKERS,
            defaults.scoring_workers as u64,
        ) as usize;
        let retry_max =
            Self::parse_u64_from_env(Self::ENV_RETRY_MAX, u64::from(defaults.retry_max)) as u32;
        let retry_base_ms =
            Self::parse_u64_from_env(Self::ENV_RETRY_BASE_MS, defaults.retry_base_ms);

        Ok(Self {
            port,
            bind_addr,
            backing_url,
            snapshot_path,
            dictionary_path,
            cache_ttl_secs,
            cache_capacity,
            page_size,
            scoring_workers,
            retry_max,
            retry_base_ms,
        })
    }

    /// Validates paths and basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                var: Self::ENV_PAGE_SIZE.to_string(),
                value: "0".to_string(),
            });
        }
        if self.scoring_workers == 0 {
            return Err(ConfigError::InvalidValue {
                var: Self::ENV_SCORING_WORKERS.to_string(),
                value: "0".to_string(),
            });
        }

        if let Some(ref path) = self.dictionary_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Retry policy derived from the retry settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_max, Duration::from_millis(self.retry_base_ms))
    }

    /// Retrieval service tuning derived from this config.
    pub fn retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig {
            page_size: self.page_size,
            cache_capacity: self.cache_capacity,
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            retry: self.retry_policy(),
            snapshot_path: self.snapshot_path.clone(),
            prefetch: true,
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        Self::parse_optional_string_from_env(var_name).map(PathBuf::from)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
