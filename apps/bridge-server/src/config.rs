//! Server configuration.
//!
//! Server-level settings come from environment variables with defaults; the
//! embedded discovery/sync settings keep their own file+env loading from
//! `bridge_sync::BridgeConfig`.

use std::env;
use std::path::PathBuf;

use bridge_sync::BridgeConfig;

/// Default public radio directory endpoint.
const DEFAULT_RADIO_API_BASE: &str = "https://de1.api.radio-browser.info";

/// Configuration for the bridge server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    pub bind_address: String,

    /// HTTP server port.
    pub http_port: u16,

    /// SQLite database file path.
    pub database_path: PathBuf,

    /// Base URL of the public radio directory the search proxy talks to.
    pub radio_api_base: String,

    /// Discovery and synchronization settings.
    pub bridge: BridgeConfig,
}

impl ServerConfig {
    /// Loads configuration from the environment, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let http_port = env::var("SOUNDBRIDGE_HTTP_PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SOUNDBRIDGE_HTTP_PORT".to_string()))?;

        let bind_address =
            env::var("SOUNDBRIDGE_BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0".to_string());

        let database_path = env::var("SOUNDBRIDGE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_database_path());

        let radio_api_base = env::var("SOUNDBRIDGE_RADIO_API_BASE")
            .unwrap_or_else(|_| DEFAULT_RADIO_API_BASE.to_string());

        let bridge = BridgeConfig::load_or_default(None);

        Ok(ServerConfig {
            bind_address,
            http_port,
            database_path,
            radio_api_base,
            bridge,
        })
    }

    /// Returns the `host:port` string the HTTP listener binds to.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.http_port)
    }

    fn default_database_path() -> PathBuf {
        directories::ProjectDirs::from("org", "soundbridge", "soundbridge")
            .map(|dirs| dirs.data_dir().join("bridge.db"))
            .unwrap_or_else(|| PathBuf::from("bridge.db"))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_addr_format() {
        let config = ServerConfig {
            bind_address: "127.0.0.1".into(),
            http_port: 8000,
            database_path: PathBuf::from("bridge.db"),
            radio_api_base: DEFAULT_RADIO_API_BASE.into(),
            bridge: BridgeConfig::default(),
        };
        assert_eq!(config.http_addr(), "127.0.0.1:8000");
    }
}
