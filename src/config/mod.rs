use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file is read from the working directory.
pub const CONFIG_PATH: &str = "config.json";

/// Longest accepted refresh period (one day).
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 86_400;

pub const DEFAULT_UPSTREAM_URL: &str = "https://api.hitbtc.com/api/2/public/ticker";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("refresh_interval_secs must be greater than zero")]
    ZeroRefreshInterval,

    #[error("refresh_interval_secs must be at most {max}, got {got}")]
    RefreshIntervalTooLarge { got: u64, max: u64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Requested symbols. Handed to the fetcher as a hint only.
    pub symbols: Vec<String>,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// `null` turns the Prometheus exporter off.
    #[serde(default = "default_metrics_addr")]
    pub metrics_addr: Option<SocketAddr>,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_refresh_interval_secs() -> u64 {
    10
}

fn default_metrics_addr() -> Option<SocketAddr> {
    Some(SocketAddr::from(([0, 0, 0, 0], 9000)))
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(raw)?;

        if config.refresh_interval_secs == 0 {
            return Err(ConfigError::ZeroRefreshInterval);
        }
        if config.refresh_interval_secs > MAX_REFRESH_INTERVAL_SECS {
            return Err(ConfigError::RefreshIntervalTooLarge {
                got: config.refresh_interval_secs,
                max: MAX_REFRESH_INTERVAL_SECS,
            });
        }

        Ok(config)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

/// Loads `.env` without overriding variables that are already set.
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_only_uses_defaults() {
        let config = Config::from_json(r#"{"symbols": ["BTCUSD", "ETHBTC"]}"#).unwrap();

        assert_eq!(config.symbols, vec!["BTCUSD", "ETHBTC"]);
        assert_eq!(config.listen_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM_URL);
        assert_eq!(config.refresh_interval(), Duration::from_secs(10));
        assert_eq!(config.metrics_addr, Some("0.0.0.0:9000".parse().unwrap()));
    }

    #[test]
    fn overrides_are_honoured() {
        let config = Config::from_json(
            r#"{
                "symbols": [],
                "listen_addr": "127.0.0.1:3000",
                "upstream_url": "http://localhost:9999/ticker",
                "refresh_interval_secs": 2,
                "metrics_addr": null
            }"#,
        )
        .unwrap();

        assert!(config.symbols.is_empty());
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.upstream_url, "http://localhost:9999/ticker");
        assert_eq!(config.refresh_interval(), Duration::from_secs(2));
        assert!(config.metrics_addr.is_none());
    }

    #[test]
    fn missing_symbols_is_rejected() {
        let err = Config::from_json(r#"{"listen_addr": "127.0.0.1:3000"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn wrong_symbol_type_is_rejected() {
        let err = Config::from_json(r#"{"symbols": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = Config::from_json("symbols: BTCUSD").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = Config::from_json(r#"{"symbols": ["BTCUSD"], "refresh_interval_secs": 0}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroRefreshInterval));
    }

    #[test]
    fn oversized_interval_is_rejected() {
        let err = Config::from_json(
            r#"{"symbols": [], "refresh_interval_secs": 18446744073709551615}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::RefreshIntervalTooLarge { got: u64::MAX, max: MAX_REFRESH_INTERVAL_SECS }
        ));

        let config = Config::from_json(r#"{"symbols": [], "refresh_interval_secs": 86400}"#).unwrap();
        assert_eq!(config.refresh_interval(), Duration::from_secs(MAX_REFRESH_INTERVAL_SECS));
    }

    #[test]
    fn missing_file_reports_path() {
        let path = std::env::temp_dir().join("currency-ticker-service-missing-config.json");
        let _ = std::fs::remove_file(&path);

        let err = Config::load(&path).unwrap_err();
        match err {
            ConfigError::Read { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_reads_file_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "currency-ticker-service-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"symbols": ["LTCBTC"]}"#).unwrap();

        let config = Config::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.symbols, vec!["LTCBTC"]);
    }
}
