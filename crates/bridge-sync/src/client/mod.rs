//! # Device Detail Clients
//!
//! Per-device clients that talk to one speaker's control surface, and the
//! factory that mints them. The synchronizer only sees the traits, so the
//! same pass logic runs against real hardware ([`http::SpeakerClient`]) and
//! against in-memory fixtures ([`FixtureClient`]).
//!
//! A client is scoped to a single device: construct, query, close. Closing
//! is tolerant and idempotent — a client that was never usable still closes
//! cleanly.

pub mod http;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{ClientError, SyncError, SyncResult};
use bridge_core::{DeviceInfo, NowPlaying};

// =============================================================================
// Client Traits
// =============================================================================

/// Operations against one speaker's control surface.
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// Fetches identity and hardware detail.
    async fn get_info(&self) -> Result<DeviceInfo, ClientError>;

    /// Fetches the current playback state.
    async fn get_now_playing(&self) -> Result<NowPlaying, ClientError>;

    /// Releases the client. Safe to call on a client that never connected,
    /// and safe to call more than once.
    async fn close(&self) {}
}

/// Mints a [`DeviceClient`] for an address. Construction does not touch the
/// network; reachability is only learned when the client is used.
pub trait DeviceClientFactory: Send + Sync {
    fn client(&self, address: &str, port: u16) -> SyncResult<Box<dyn DeviceClient>>;
}

// =============================================================================
// Fixture Client
// =============================================================================

/// Canned per-address behavior for the fixture factory.
#[derive(Clone)]
enum FixtureBehavior {
    Respond {
        info: DeviceInfo,
        now_playing: Option<NowPlaying>,
    },
    FailConnectivity,
}

/// A client that replays registered responses without any I/O.
pub struct FixtureClient {
    address: String,
    behavior: FixtureBehavior,
}

#[async_trait]
impl DeviceClient for FixtureClient {
    async fn get_info(&self) -> Result<DeviceInfo, ClientError> {
        match &self.behavior {
            FixtureBehavior::Respond { info, .. } => Ok(info.clone()),
            FixtureBehavior::FailConnectivity => {
                Err(ClientError::Unreachable(self.address.clone()))
            }
        }
    }

    async fn get_now_playing(&self) -> Result<NowPlaying, ClientError> {
        match &self.behavior {
            FixtureBehavior::Respond {
                now_playing: Some(np),
                ..
            } => Ok(np.clone()),
            FixtureBehavior::Respond { .. } => Ok(NowPlaying::default()),
            FixtureBehavior::FailConnectivity => {
                Err(ClientError::Unreachable(self.address.clone()))
            }
        }
    }
}

/// Factory producing [`FixtureClient`]s from registered responses.
///
/// Requesting a client for an unregistered address fails at construction
/// with [`SyncError::UnknownFixture`], surfacing setup mistakes immediately
/// instead of as a confusing downstream fetch failure.
#[derive(Default)]
pub struct FixtureClientFactory {
    behaviors: std::sync::Mutex<HashMap<String, FixtureBehavior>>,
}

impl FixtureClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a device that answers info queries with `info`.
    pub fn register(&self, address: impl Into<String>, info: DeviceInfo) {
        self.behaviors.lock().unwrap().insert(
            address.into(),
            FixtureBehavior::Respond {
                info,
                now_playing: None,
            },
        );
    }

    /// Registers the playback state for an already-registered device.
    /// No-op when the address has no info registered or is set to fail.
    pub fn register_now_playing(&self, address: &str, now_playing: NowPlaying) {
        let mut behaviors = self.behaviors.lock().unwrap();
        if let Some(FixtureBehavior::Respond {
            now_playing: slot, ..
        }) = behaviors.get_mut(address)
        {
            *slot = Some(now_playing);
        }
    }

    /// Registers a device whose every request fails as unreachable.
    pub fn fail_with_connectivity(&self, address: impl Into<String>) {
        self.behaviors
            .lock()
            .unwrap()
            .insert(address.into(), FixtureBehavior::FailConnectivity);
    }

    /// Convenience for seeding a default-mode factory alongside
    /// [`crate::discovery::FixtureDiscovery::default`].
    pub fn with_default_devices() -> Arc<Self> {
        let factory = Self::new();
        factory.register(
            "192.0.2.10",
            DeviceInfo {
                device_id: "F0DEADBEEF01".into(),
                name: "Living Room".into(),
                device_type: "SoundTouch 20".into(),
                firmware: Some("27.0.6".into()),
            },
        );
        factory.register(
            "192.0.2.11",
            DeviceInfo {
                device_id: "F0DEADBEEF02".into(),
                name: "Kitchen".into(),
                device_type: "SoundTouch 10".into(),
                firmware: Some("27.0.6".into()),
            },
        );
        Arc::new(factory)
    }
}

impl DeviceClientFactory for FixtureClientFactory {
    fn client(&self, address: &str, _port: u16) -> SyncResult<Box<dyn DeviceClient>> {
        let behaviors = self.behaviors.lock().unwrap();
        let behavior = behaviors
            .get(address)
            .cloned()
            .ok_or_else(|| SyncError::UnknownFixture(address.to_string()))?;

        debug!(%address, "Minted fixture client");
        Ok(Box::new(FixtureClient {
            address: address.to_string(),
            behavior,
        }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> DeviceInfo {
        DeviceInfo {
            device_id: "AABBCCDDEEFF".into(),
            name: "Office".into(),
            device_type: "SoundTouch 10".into(),
            firmware: Some("27.0.6".into()),
        }
    }

    #[tokio::test]
    async fn test_fixture_replays_registered_info() {
        let factory = FixtureClientFactory::new();
        factory.register("192.0.2.20", sample_info());

        let client = factory.client("192.0.2.20", 8090).unwrap();
        let info = client.get_info().await.unwrap();
        assert_eq!(info.device_id, "AABBCCDDEEFF");
        assert_eq!(info.name, "Office");
        client.close().await;
    }

    #[tokio::test]
    async fn test_unknown_address_fails_at_construction() {
        let factory = FixtureClientFactory::new();
        let Err(err) = factory.client("192.0.2.99", 8090) else {
            panic!("expected construction to fail for an unregistered address");
        };
        assert!(matches!(err, SyncError::UnknownFixture(_)));
        assert!(err.to_string().contains("192.0.2.99"));
    }

    #[tokio::test]
    async fn test_connectivity_failure_surfaces_on_use() {
        let factory = FixtureClientFactory::new();
        factory.fail_with_connectivity("192.0.2.30");

        // Construction succeeds; use fails, like a real unreachable device.
        let client = factory.client("192.0.2.30", 8090).unwrap();
        let err = client.get_info().await.unwrap_err();
        assert!(err.is_connectivity());
    }

    #[tokio::test]
    async fn test_now_playing_defaults_until_registered() {
        let factory = FixtureClientFactory::new();
        factory.register("192.0.2.40", sample_info());

        let client = factory.client("192.0.2.40", 8090).unwrap();
        let np = client.get_now_playing().await.unwrap();
        assert!(np.station.is_none());

        factory.register_now_playing(
            "192.0.2.40",
            NowPlaying {
                source: "TUNEIN".into(),
                play_status: Some("PLAY_STATE".into()),
                station: Some("Radio Paradise".into()),
                ..NowPlaying::default()
            },
        );

        let client = factory.client("192.0.2.40", 8090).unwrap();
        let np = client.get_now_playing().await.unwrap();
        assert_eq!(np.station.as_deref(), Some("Radio Paradise"));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let factory = FixtureClientFactory::new();
        factory.register("192.0.2.50", sample_info());
        let client = factory.client("192.0.2.50", 8090).unwrap();
        client.close().await;
        client.close().await;
    }
}
