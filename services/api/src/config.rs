//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development. Every variable has a default.

use reqwest::Url;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Base URL of the backend REST API, e.g. `http://localhost:5000/api/v1`.
    pub api_base_url: Url,
    /// File backing the local progress cache.
    pub progress_cache_path: PathBuf,
    pub log_level: Level,
    pub cors_origin: String,
    /// Delay between a tab switch and the scroll-to-anchor message.
    pub scroll_delay: Duration,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Server Settings ---
        let bind_address_str = var("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = var("CORS_ORIGIN", "http://localhost:3000");

        // --- Backend and Cache Settings ---
        let api_base_url_str = var("API_BASE_URL", "http://localhost:5000/api/v1");
        let api_base_url = Url::parse(&api_base_url_str).map_err(|e| {
            ConfigError::InvalidValue("API_BASE_URL".to_string(), e.to_string())
        })?;
        if api_base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue(
                "API_BASE_URL".to_string(),
                format!("'{}' cannot be used as a base URL", api_base_url_str),
            ));
        }

        let progress_cache_path = PathBuf::from(var("PROGRESS_CACHE_PATH", "./visamap_progress.json"));

        let scroll_delay_str = var("SCROLL_DELAY_MS", "100");
        let scroll_delay = scroll_delay_str
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidValue("SCROLL_DELAY_MS".to_string(), e.to_string()))?;

        Ok(Self {
            bind_address,
            api_base_url,
            progress_cache_path,
            log_level,
            cors_origin,
            scroll_delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.api_base_url.as_str(), "http://localhost:5000/api/v1");
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(config.scroll_delay, Duration::from_millis(100));
        assert_eq!(config.progress_cache_path, PathBuf::from("./visamap_progress.json"));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("API_BASE_URL", "https://api.visamonk.test/api/v1"),
            ("SCROLL_DELAY_MS", "250"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.api_base_url.host_str(), Some("api.visamonk.test"));
        assert_eq!(config.scroll_delay, Duration::from_millis(250));
        assert_eq!(config.log_level, Level::DEBUG);
    }

    #[test]
    fn bad_values_name_their_variable() {
        assert_matches!(
            Config::from_lookup(lookup(&[("SCROLL_DELAY_MS", "soon")])),
            Err(ConfigError::InvalidValue(var, _)) if var == "SCROLL_DELAY_MS"
        );
        assert_matches!(
            Config::from_lookup(lookup(&[("API_BASE_URL", "not a url")])),
            Err(ConfigError::InvalidValue(var, _)) if var == "API_BASE_URL"
        );
        assert_matches!(
            Config::from_lookup(lookup(&[("BIND_ADDRESS", "localhost")])),
            Err(ConfigError::InvalidValue(var, _)) if var == "BIND_ADDRESS"
        );
    }
}
