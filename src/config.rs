use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::models::MAX_WINDOW;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}' ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Yahoo,
    Csv,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(ProviderKind::Yahoo),
            "csv" => Ok(ProviderKind::Csv),
            "mock" => Ok(ProviderKind::Mock),
            _ => Err("must be 'yahoo', 'csv' or 'mock'".to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub provider: ProviderKind,
    pub csv_data_dir: PathBuf,
    pub default_window: usize,
    pub series_cache_ttl: Duration,
    pub http_timeout: Duration,
    pub cors_allow_origin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            provider: ProviderKind::Yahoo,
            csv_data_dir: PathBuf::from("data"),
            default_window: 30,
            series_cache_ttl: Duration::from_secs(300),
            http_timeout: Duration::from_secs(10),
            cors_allow_origin: None,
        }
    }
}

fn parse_var<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let default_window = parse_var("DEFAULT_MA_WINDOW", lookup("DEFAULT_MA_WINDOW"), defaults.default_window)?;
        if !(1..=MAX_WINDOW).contains(&default_window) {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_MA_WINDOW",
                value: default_window.to_string(),
                reason: format!("must be between 1 and {}", MAX_WINDOW),
            });
        }

        let cache_ttl_secs = parse_var("SERIES_CACHE_TTL_SECS", lookup("SERIES_CACHE_TTL_SECS"), 300_u64)?;
        let timeout_secs = parse_var("HTTP_TIMEOUT_SECS", lookup("HTTP_TIMEOUT_SECS"), 10_u64)?;

        Ok(Self {
            bind_addr: parse_var("BIND_ADDR", lookup("BIND_ADDR"), defaults.bind_addr)?,
            provider: parse_var("PRICE_PROVIDER", lookup("PRICE_PROVIDER"), defaults.provider)?,
            csv_data_dir: lookup("CSV_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.csv_data_dir),
            default_window,
            series_cache_ttl: Duration::from_secs(cache_ttl_secs),
            http_timeout: Duration::from_secs(timeout_secs),
            cors_allow_origin: lookup("CORS_ALLOW_ORIGIN").filter(|v| !v.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.provider, ProviderKind::Yahoo);
        assert_eq!(config.default_window, 30);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.series_cache_ttl, Duration::from_secs(300));
        assert!(config.cors_allow_origin.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PRICE_PROVIDER", "Mock"),
            ("DEFAULT_MA_WINDOW", "50"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("CSV_DATA_DIR", "/srv/prices"),
        ])
        .unwrap();

        assert_eq!(config.provider, ProviderKind::Mock);
        assert_eq!(config.default_window, 50);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.csv_data_dir, PathBuf::from("/srv/prices"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[("PRICE_PROVIDER", "bloomberg")]).is_err());
        assert!(config_from(&[("DEFAULT_MA_WINDOW", "0")]).is_err());
        assert!(config_from(&[("DEFAULT_MA_WINDOW", "abc")]).is_err());
        assert!(config_from(&[("HTTP_TIMEOUT_SECS", "-1")]).is_err());
    }
}
