//! # Device Service
//!
//! Facade over the synchronizer, registry, and device clients: the one type
//! API handlers and the server binary talk to. Wires real or fixture
//! collaborators from configuration so callers never branch on mode.

use std::sync::Arc;

use tracing::info;

use crate::client::http::SpeakerClientFactory;
use crate::client::{DeviceClientFactory, FixtureClientFactory};
use crate::config::BridgeConfig;
use crate::discovery::ssdp::SsdpDiscovery;
use crate::discovery::{DiscoveryStrategy, FixtureDiscovery};
use crate::error::SyncResult;
use crate::synchronizer::DeviceSynchronizer;
use bridge_core::{Device, NowPlaying, SyncReport};
use bridge_db::{Database, DeviceRegistry};

/// Application-facing device operations.
pub struct DeviceService {
    registry: DeviceRegistry,
    synchronizer: DeviceSynchronizer,
    clients: Arc<dyn DeviceClientFactory>,
}

impl DeviceService {
    /// Builds the service, selecting real or fixture collaborators from
    /// `config.fixture_mode`.
    pub fn new(config: &BridgeConfig, db: &Database) -> Self {
        let registry = db.registry();

        let (strategy, clients): (Box<dyn DiscoveryStrategy>, Arc<dyn DeviceClientFactory>) =
            if config.fixture_mode {
                info!("Fixture mode: using canned devices, no network I/O");
                (
                    Box::new(FixtureDiscovery::default()),
                    FixtureClientFactory::with_default_devices(),
                )
            } else {
                (
                    Box::new(SsdpDiscovery::new(
                        config.discovery.device_filter.clone(),
                        config.devices.port,
                    )),
                    Arc::new(SpeakerClientFactory::new(config.fetch_timeout())),
                )
            };

        let synchronizer =
            DeviceSynchronizer::new(config, registry.clone(), strategy, clients.clone());

        DeviceService {
            registry,
            synchronizer,
            clients,
        }
    }

    /// Runs one synchronization pass.
    pub async fn sync(&self) -> SyncResult<SyncReport> {
        self.synchronizer.sync().await
    }

    /// Returns all registered devices.
    pub async fn get_all(&self) -> SyncResult<Vec<Device>> {
        Ok(self.registry.get_all().await?)
    }

    /// Looks up one device by its hardware identifier.
    pub async fn get_by_device_id(&self, device_id: &str) -> SyncResult<Option<Device>> {
        Ok(self.registry.get_by_device_id(device_id).await?)
    }

    /// Fetches live playback state from a registered device.
    ///
    /// Returns `Ok(None)` for an unknown `device_id`; errors only when the
    /// known device cannot be queried.
    pub async fn now_playing(&self, device_id: &str) -> SyncResult<Option<NowPlaying>> {
        let Some(device) = self.registry.get_by_device_id(device_id).await? else {
            return Ok(None);
        };

        let client = self.clients.client(&device.address, device.port)?;
        let result = client.get_now_playing().await;
        client.close().await;

        Ok(Some(result?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_db::DbConfig;

    fn fixture_config() -> BridgeConfig {
        let mut config = BridgeConfig::default();
        config.fixture_mode = true;
        config
    }

    #[tokio::test]
    async fn test_fixture_mode_end_to_end() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = DeviceService::new(&fixture_config(), &db);

        let report = service.sync().await.unwrap();
        assert_eq!(report.synced, 2);
        assert_eq!(report.failed, 0);

        let devices = service.get_all().await.unwrap();
        assert_eq!(devices.len(), 2);

        let device = service
            .get_by_device_id("F0DEADBEEF01")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(device.name, "Living Room");
    }

    #[tokio::test]
    async fn test_sync_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = DeviceService::new(&fixture_config(), &db);

        service.sync().await.unwrap();
        service.sync().await.unwrap();

        assert_eq!(service.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_now_playing_unknown_device_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = DeviceService::new(&fixture_config(), &db);

        let np = service.now_playing("000000000000").await.unwrap();
        assert!(np.is_none());
    }

    #[tokio::test]
    async fn test_now_playing_known_fixture_device() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let service = DeviceService::new(&fixture_config(), &db);
        service.sync().await.unwrap();

        let np = service
            .now_playing("F0DEADBEEF01")
            .await
            .unwrap()
            .unwrap();
        // default fixture playback state is standby-ish: nothing queued
        assert!(np.station.is_none());
    }
}
