//! # Bridge Configuration
//!
//! Configuration for discovery and synchronization. Constructed once at
//! startup and passed by reference into the synchronizer and service — no
//! ambient global lookup anywhere in the core.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                           │
//! │                                                                     │
//! │  1. Environment Variables (highest priority)                        │
//! │     SOUNDBRIDGE_DISCOVERY_ENABLED=false                             │
//! │     SOUNDBRIDGE_STATIC_ADDRESSES=192.168.1.50,192.168.1.51          │
//! │                                                                     │
//! │  2. TOML Config File                                                │
//! │     ~/.config/soundbridge/bridge.toml (Linux)                       │
//! │                                                                     │
//! │  3. Default Values (lowest priority)                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # bridge.toml
//! fixture_mode = false
//!
//! [discovery]
//! enabled = true
//! timeout_secs = 5
//! device_filter = "SoundTouch"
//!
//! [devices]
//! static_addresses = ["192.168.1.50"]
//! port = 8090
//! fetch_timeout_secs = 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Discovery Settings
// =============================================================================

/// Configuration for network discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySettings {
    /// Enable SSDP multicast discovery.
    ///
    /// Operators disable this where multicast is blocked (containers,
    /// restrictive networks) and rely on static addresses instead.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Discovery window (seconds). Responses arriving later are dropped.
    #[serde(default = "default_discovery_timeout")]
    pub timeout_secs: u64,

    /// Token matched against SSDP response headers to distinguish
    /// compatible speakers from unrelated UPnP responders.
    #[serde(default = "default_device_filter")]
    pub device_filter: String,
}

fn default_true() -> bool {
    true
}

fn default_discovery_timeout() -> u64 {
    5
}

fn default_device_filter() -> String {
    "SoundTouch".to_string()
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        DiscoverySettings {
            enabled: true,
            timeout_secs: default_discovery_timeout(),
            device_filter: default_device_filter(),
        }
    }
}

// =============================================================================
// Device Settings
// =============================================================================

/// Configuration for reaching the speakers themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// Operator-supplied addresses synced in addition to (or instead of)
    /// discovery results. Order is preserved.
    #[serde(default)]
    pub static_addresses: Vec<String>,

    /// Port of the speakers' HTTP control surface.
    #[serde(default = "default_device_port")]
    pub port: u16,

    /// Per-call timeout for detail fetches (seconds). One unresponsive
    /// device must not stall a whole pass.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_device_port() -> u16 {
    bridge_core::DEFAULT_DEVICE_PORT
}

fn default_fetch_timeout() -> u64 {
    3
}

impl Default for DeviceSettings {
    fn default() -> Self {
        DeviceSettings {
            static_addresses: Vec::new(),
            port: default_device_port(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

// =============================================================================
// Main Bridge Configuration
// =============================================================================

/// Complete discovery/sync configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Select the fixture strategy and fixture client instead of real
    /// network I/O. Lets the whole pipeline run without hardware.
    #[serde(default)]
    pub fixture_mode: bool,

    /// Network discovery settings.
    #[serde(default)]
    pub discovery: DiscoverySettings,

    /// Speaker connection settings.
    #[serde(default)]
    pub devices: DeviceSettings,
}

impl BridgeConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (bridge.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading bridge config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load bridge config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Bridge config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.discovery.timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "discovery.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.devices.fetch_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "devices.fetch_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.discovery.device_filter.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "discovery.device_filter must not be empty".into(),
            ));
        }

        // Address format validation is the operator's responsibility; blank
        // entries are always a mistake though.
        for address in &self.devices.static_addresses {
            bridge_core::DiscoveredDevice::validate_address(address).map_err(|e| {
                SyncError::InvalidConfig(format!("devices.static_addresses: {}", e))
            })?;
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(enabled) = std::env::var("SOUNDBRIDGE_DISCOVERY_ENABLED") {
            if let Ok(v) = enabled.parse::<bool>() {
                debug!(enabled = v, "Overriding discovery.enabled from environment");
                self.discovery.enabled = v;
            }
        }

        if let Ok(timeout) = std::env::var("SOUNDBRIDGE_DISCOVERY_TIMEOUT_SECS") {
            if let Ok(v) = timeout.parse::<u64>() {
                self.discovery.timeout_secs = v;
            }
        }

        if let Ok(filter) = std::env::var("SOUNDBRIDGE_DEVICE_FILTER") {
            self.discovery.device_filter = filter;
        }

        if let Ok(addresses) = std::env::var("SOUNDBRIDGE_STATIC_ADDRESSES") {
            debug!(addresses = %addresses, "Overriding static addresses from environment");
            self.devices.static_addresses = addresses
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Ok(port) = std::env::var("SOUNDBRIDGE_DEVICE_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                self.devices.port = p;
            }
        }

        if let Ok(fixture) = std::env::var("SOUNDBRIDGE_FIXTURE_MODE") {
            if let Ok(v) = fixture.parse::<bool>() {
                debug!(fixture_mode = v, "Overriding fixture_mode from environment");
                self.fixture_mode = v;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "soundbridge", "soundbridge")
            .map(|dirs| dirs.config_dir().join("bridge.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the discovery window as a Duration.
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery.timeout_secs)
    }

    /// Returns the per-call detail-fetch timeout as a Duration.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.devices.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert!(config.discovery.enabled);
        assert!(!config.fixture_mode);
        assert_eq!(config.discovery.timeout_secs, 5);
        assert_eq!(config.devices.port, 8090);
        assert!(config.devices.static_addresses.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = BridgeConfig::default();

        config.discovery.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.discovery.timeout_secs = 5;
        config.devices.static_addresses = vec!["192.168.1.50".into(), "  ".into()];
        assert!(config.validate().is_err());

        config.devices.static_addresses = vec!["192.168.1.50".into()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_roundtrip() {
        let toml_str = r#"
            fixture_mode = true

            [discovery]
            enabled = false
            timeout_secs = 2

            [devices]
            static_addresses = ["10.0.0.5"]
        "#;

        let config: BridgeConfig = toml::from_str(toml_str).unwrap();
        assert!(config.fixture_mode);
        assert!(!config.discovery.enabled);
        assert_eq!(config.discovery.timeout_secs, 2);
        // omitted fields fall back to defaults
        assert_eq!(config.discovery.device_filter, "SoundTouch");
        assert_eq!(config.devices.port, 8090);
        assert_eq!(config.devices.fetch_timeout_secs, 3);
        assert_eq!(config.devices.static_addresses, vec!["10.0.0.5".to_string()]);
    }

    #[test]
    fn test_env_overrides() {
        // Setting process env vars is inherently global; this is the only
        // test that touches the SOUNDBRIDGE_* variables.
        std::env::set_var("SOUNDBRIDGE_STATIC_ADDRESSES", "10.0.0.5, 10.0.0.6 ,");
        std::env::set_var("SOUNDBRIDGE_DEVICE_FILTER", "Acme");

        let mut config = BridgeConfig::default();
        config.apply_env_overrides();

        std::env::remove_var("SOUNDBRIDGE_STATIC_ADDRESSES");
        std::env::remove_var("SOUNDBRIDGE_DEVICE_FILTER");

        assert_eq!(
            config.devices.static_addresses,
            vec!["10.0.0.5".to_string(), "10.0.0.6".to_string()]
        );
        assert_eq!(config.discovery.device_filter, "Acme");
    }

    #[test]
    fn test_duration_helpers() {
        let config = BridgeConfig::default();
        assert_eq!(config.discovery_timeout(), Duration::from_secs(5));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(3));
    }
}
