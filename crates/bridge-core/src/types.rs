//! # Domain Types
//!
//! Core domain types used throughout soundbridge.
//!
//! ## Device Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     From Candidate to Registry Row                  │
//! │                                                                     │
//! │  Discovery strategy                                                 │
//! │       │ yields                                                      │
//! │       ▼                                                             │
//! │  DiscoveredDevice ── address only, identity usually unknown         │
//! │       │ detail fetch (GET /info)                                    │
//! │       ▼                                                             │
//! │  DeviceInfo ──────── authoritative identity from the speaker        │
//! │       │ upsert keyed by device_id                                   │
//! │       ▼                                                             │
//! │  Device ──────────── durable registry row, last-write-wins          │
//! │                                                                     │
//! │  One SyncReport tallies the whole pass: synced + failed equals      │
//! │  discovered, always.                                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Constants
// =============================================================================

/// Well-known port of the speakers' HTTP control surface.
pub const DEFAULT_DEVICE_PORT: u16 = 8090;

/// Lowest valid preset slot (physical button 1).
pub const PRESET_SLOT_MIN: u16 = 1;

/// Highest valid preset slot (physical button 6).
pub const PRESET_SLOT_MAX: u16 = 6;

// =============================================================================
// Discovered Device
// =============================================================================

/// A candidate speaker learned from one discovery probe.
///
/// Cheap discovery mechanisms (SSDP, a static address list) usually only
/// know the network address; identity fields stay `None` until the
/// synchronizer performs the follow-up detail fetch. Candidates are
/// ephemeral: they live for one sync pass and are never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    /// Network address (IP or hostname). Always present.
    pub address: String,

    /// Port of the device's HTTP control surface.
    pub port: u16,

    /// Human-readable name, if the probe could retrieve it.
    pub name: Option<String>,

    /// Model string, if known.
    pub model: Option<String>,

    /// Hardware identifier (MAC), if known.
    pub device_id: Option<String>,

    /// Firmware version, if known.
    pub firmware: Option<String>,
}

impl DiscoveredDevice {
    /// Creates a minimal candidate: address only, default port.
    pub fn new(address: impl Into<String>) -> Self {
        DiscoveredDevice {
            address: address.into(),
            port: DEFAULT_DEVICE_PORT,
            name: None,
            model: None,
            device_id: None,
            firmware: None,
        }
    }

    /// Sets a non-default control port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Validates an address string before it becomes a candidate.
    pub fn validate_address(address: &str) -> CoreResult<()> {
        if address.trim().is_empty() {
            Err(CoreError::EmptyAddress)
        } else {
            Ok(())
        }
    }

    /// Returns true when the candidate already carries full identity
    /// (fixture strategies populate everything up front), letting the
    /// synchronizer skip the detail fetch.
    pub fn is_complete(&self) -> bool {
        self.device_id.is_some() && self.name.is_some()
    }
}

// =============================================================================
// Device (registry entity)
// =============================================================================

/// A known speaker as persisted in the device registry.
///
/// ## Identity
/// `device_id` is the primary key — the speaker's hardware MAC, reported by
/// the device itself via `/info`. Re-synchronizing a known `device_id`
/// overwrites the mutable fields in place; the registry never holds two rows
/// for one identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Device {
    /// Unique device identifier (hardware MAC).
    pub device_id: String,

    /// Last known network address.
    pub address: String,

    /// Port of the HTTP control surface.
    pub port: u16,

    /// Human-readable name (e.g., "Kitchen").
    pub name: String,

    /// Model string (e.g., "SoundTouch 20").
    pub model: String,

    /// Firmware version, when the device reports one.
    pub firmware: Option<String>,

    /// When this row was last written by a sync pass.
    pub updated_at: DateTime<Utc>,
}

impl Device {
    /// Builds a registry entity from a detail-fetch result.
    pub fn from_info(address: impl Into<String>, port: u16, info: DeviceInfo) -> Self {
        Device {
            device_id: info.device_id,
            address: address.into(),
            port,
            name: info.name,
            model: info.device_type,
            firmware: info.firmware,
            updated_at: Utc::now(),
        }
    }

    /// Builds a registry entity directly from a complete candidate.
    ///
    /// Returns `None` unless the candidate carries full identity
    /// (see [`DiscoveredDevice::is_complete`]).
    pub fn from_discovered(candidate: &DiscoveredDevice) -> Option<Self> {
        let device_id = candidate.device_id.clone()?;
        let name = candidate.name.clone()?;
        Some(Device {
            device_id,
            address: candidate.address.clone(),
            port: candidate.port,
            name,
            model: candidate.model.clone().unwrap_or_default(),
            firmware: candidate.firmware.clone(),
            updated_at: Utc::now(),
        })
    }
}

// =============================================================================
// Detail-Fetch Payloads
// =============================================================================

/// Authoritative identity reported by a speaker via `GET /info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Hardware identifier (MAC).
    pub device_id: String,

    /// Human-readable name.
    pub name: String,

    /// Model string.
    pub device_type: String,

    /// Firmware version of the main component, if reported.
    pub firmware: Option<String>,
}

/// Live playback status reported via `GET /now_playing`.
///
/// The default value models a speaker in standby with nothing queued.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    /// Active source (e.g., "INTERNET_RADIO", "STANDBY").
    pub source: String,

    /// Transport state (e.g., "PLAY_STATE", "STOP_STATE").
    pub play_status: Option<String>,

    /// Station name, when tuned to radio.
    pub station: Option<String>,

    /// Current track, when the source reports one.
    pub track: Option<String>,

    /// Current artist.
    pub artist: Option<String>,

    /// Current album.
    pub album: Option<String>,
}

// =============================================================================
// Sync Report
// =============================================================================

/// Summary of one synchronization pass.
///
/// ## Invariant
/// `synced + failed == discovered` — every candidate is resolved exactly
/// once per pass, successfully or not. Callers rely on this for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Candidates produced by discovery plus merged static addresses.
    pub discovered: usize,

    /// Candidates whose detail was fetched and persisted.
    pub synced: usize,

    /// Candidates that failed detail fetch and were skipped.
    pub failed: usize,
}

impl SyncReport {
    /// Creates an empty report (the zero-candidates pass).
    pub fn new() -> Self {
        SyncReport::default()
    }

    /// Returns true when the tally invariant holds.
    pub fn is_consistent(&self) -> bool {
        self.synced + self.failed == self.discovered
    }
}

// =============================================================================
// Preset
// =============================================================================

/// A station descriptor bound to one physical preset button.
///
/// When a speaker button is pressed the device fetches this descriptor from
/// the bridge and tunes to `location`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Preset {
    /// Preset slot (1..=6, matching the hardware buttons).
    pub id: u16,

    /// Station display name.
    pub name: String,

    /// Source tag the speaker expects (e.g., "INTERNET_RADIO").
    pub source: String,

    /// Stream URL the speaker tunes to.
    pub location: String,

    /// Station artwork, if any.
    pub artwork_url: Option<String>,

    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Preset {
    /// Builds a preset after validating the slot number.
    pub fn new(
        slot: u16,
        name: impl Into<String>,
        source: impl Into<String>,
        location: impl Into<String>,
        artwork_url: Option<String>,
    ) -> CoreResult<Self> {
        if !Self::is_valid_slot(slot) {
            return Err(CoreError::InvalidPresetSlot(slot));
        }
        Ok(Preset {
            id: slot,
            name: name.into(),
            source: source.into(),
            location: location.into(),
            artwork_url,
            updated_at: Utc::now(),
        })
    }

    /// Returns true when the slot number maps to a hardware button.
    pub fn is_valid_slot(slot: u16) -> bool {
        (PRESET_SLOT_MIN..=PRESET_SLOT_MAX).contains(&slot)
    }
}

// =============================================================================
// Station (radio search result)
// =============================================================================

/// One radio station as returned by the directory search proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// Stable identifier in the public directory.
    pub id: String,

    /// Station display name.
    pub name: String,

    /// Resolved stream URL.
    pub stream_url: String,

    /// Station artwork, if any.
    pub artwork_url: Option<String>,

    /// Country of origin, if listed.
    pub country: Option<String>,

    /// Stream codec (e.g., "MP3", "AAC").
    pub codec: Option<String>,

    /// Stream bitrate in kbit/s; 0/unknown omitted.
    pub bitrate: Option<u32>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovered_device_defaults() {
        let candidate = DiscoveredDevice::new("192.168.1.100");
        assert_eq!(candidate.address, "192.168.1.100");
        assert_eq!(candidate.port, DEFAULT_DEVICE_PORT);
        assert!(candidate.name.is_none());
        assert!(!candidate.is_complete());
    }

    #[test]
    fn test_discovered_device_complete() {
        let mut candidate = DiscoveredDevice::new("10.0.0.7").with_port(8091);
        candidate.device_id = Some("AABBCCDDEEFF".into());
        candidate.name = Some("Office".into());
        assert!(candidate.is_complete());
        assert_eq!(candidate.port, 8091);
    }

    #[test]
    fn test_device_from_info() {
        let info = DeviceInfo {
            device_id: "AABBCCDDEEFF".into(),
            name: "Kitchen".into(),
            device_type: "SoundTouch 20".into(),
            firmware: Some("27.0.6".into()),
        };
        let device = Device::from_info("192.168.1.100", DEFAULT_DEVICE_PORT, info);
        assert_eq!(device.device_id, "AABBCCDDEEFF");
        assert_eq!(device.address, "192.168.1.100");
        assert_eq!(device.model, "SoundTouch 20");
        assert_eq!(device.firmware.as_deref(), Some("27.0.6"));
    }

    #[test]
    fn test_device_from_discovered_requires_identity() {
        let candidate = DiscoveredDevice::new("192.168.1.50");
        assert!(Device::from_discovered(&candidate).is_none());

        let mut complete = candidate.clone();
        complete.device_id = Some("112233445566".into());
        complete.name = Some("Bedroom".into());
        let device = Device::from_discovered(&complete).unwrap();
        assert_eq!(device.device_id, "112233445566");
        assert_eq!(device.model, ""); // unknown model collapses to empty
    }

    #[test]
    fn test_sync_report_consistency() {
        let report = SyncReport {
            discovered: 3,
            synced: 2,
            failed: 1,
        };
        assert!(report.is_consistent());

        let broken = SyncReport {
            discovered: 3,
            synced: 1,
            failed: 1,
        };
        assert!(!broken.is_consistent());

        assert!(SyncReport::new().is_consistent());
    }

    #[test]
    fn test_preset_slot_bounds() {
        assert!(Preset::is_valid_slot(1));
        assert!(Preset::is_valid_slot(6));
        assert!(!Preset::is_valid_slot(0));
        assert!(!Preset::is_valid_slot(7));

        assert!(Preset::new(3, "Jazz FM", "INTERNET_RADIO", "http://s/1", None).is_ok());
        assert_eq!(
            Preset::new(7, "Nope", "INTERNET_RADIO", "http://s/1", None).unwrap_err(),
            CoreError::InvalidPresetSlot(7)
        );
    }

    #[test]
    fn test_address_validation() {
        assert!(DiscoveredDevice::validate_address("192.168.1.50").is_ok());
        assert_eq!(
            DiscoveredDevice::validate_address("   ").unwrap_err(),
            CoreError::EmptyAddress
        );
    }

    #[test]
    fn test_sync_report_serializes_flat() {
        let report = SyncReport {
            discovered: 2,
            synced: 2,
            failed: 0,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"discovered\":2"));
        assert!(json.contains("\"failed\":0"));
    }
}
