//! # Discovery Strategies
//!
//! Polymorphic "find candidate addresses" capability. Each strategy answers
//! the same question — which addresses might host a compatible speaker —
//! via a different mechanism:
//!
//! - [`ssdp::SsdpDiscovery`] — SSDP multicast probe over the local network
//! - [`StaticDiscovery`] — operator-configured address list
//! - [`FixtureDiscovery`] — canned devices for tests and offline operation
//!
//! Strategies produce candidates, nothing more; confirming identity is the
//! synchronizer's follow-up detail fetch. A strategy never errors for the
//! normal absence of devices (empty network, timeout) — only for setup
//! failures that make the mechanism itself unusable.

pub mod ssdp;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::SyncResult;
use bridge_core::DiscoveredDevice;

/// Capability: produce candidate addresses within a timeout window.
#[async_trait]
pub trait DiscoveryStrategy: Send + Sync {
    /// Runs one discovery probe.
    ///
    /// Soft misses (no responses, timeout) yield `Ok(vec![])`. Errors are
    /// reserved for setup failures that make the mechanism unusable.
    async fn discover(&self, timeout: Duration) -> SyncResult<Vec<DiscoveredDevice>>;

    /// Strategy name for logging.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Static Strategy
// =============================================================================

/// Returns one candidate per configured address, verbatim.
///
/// Deterministic and immediate: the timeout parameter is ignored. The list
/// is intentionally NOT deduplicated here — the configured order and
/// content reflect operator intent, and address-level dedup is the
/// synchronizer's job.
pub struct StaticDiscovery {
    addresses: Vec<String>,
    port: u16,
}

impl StaticDiscovery {
    /// Creates a strategy over a pre-configured ordered address list.
    pub fn new(addresses: Vec<String>, port: u16) -> Self {
        StaticDiscovery { addresses, port }
    }
}

#[async_trait]
impl DiscoveryStrategy for StaticDiscovery {
    async fn discover(&self, _timeout: Duration) -> SyncResult<Vec<DiscoveredDevice>> {
        debug!(count = self.addresses.len(), "Static discovery");
        Ok(self
            .addresses
            .iter()
            .map(|addr| DiscoveredDevice::new(addr.clone()).with_port(self.port))
            .collect())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

// =============================================================================
// Fixture Strategy
// =============================================================================

/// Returns a fixed set of devices with complete detail already populated.
///
/// Because identity is pre-filled, the synchronizer can persist these
/// candidates without a follow-up detail fetch, letting the whole pipeline
/// run without real hardware.
pub struct FixtureDiscovery {
    devices: Vec<DiscoveredDevice>,
}

impl FixtureDiscovery {
    /// Creates a strategy over explicit fixture devices.
    pub fn new(devices: Vec<DiscoveredDevice>) -> Self {
        FixtureDiscovery { devices }
    }
}

impl Default for FixtureDiscovery {
    /// Two canned speakers on TEST-NET addresses.
    fn default() -> Self {
        let mut living_room = DiscoveredDevice::new("192.0.2.10");
        living_room.device_id = Some("F0DEADBEEF01".into());
        living_room.name = Some("Living Room".into());
        living_room.model = Some("SoundTouch 20".into());
        living_room.firmware = Some("27.0.6".into());

        let mut kitchen = DiscoveredDevice::new("192.0.2.11");
        kitchen.device_id = Some("F0DEADBEEF02".into());
        kitchen.name = Some("Kitchen".into());
        kitchen.model = Some("SoundTouch 10".into());
        kitchen.firmware = Some("27.0.6".into());

        FixtureDiscovery::new(vec![living_room, kitchen])
    }
}

#[async_trait]
impl DiscoveryStrategy for FixtureDiscovery {
    async fn discover(&self, _timeout: Duration) -> SyncResult<Vec<DiscoveredDevice>> {
        debug!(count = self.devices.len(), "Fixture discovery");
        Ok(self.devices.clone())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_returns_one_candidate_per_address() {
        let strategy = StaticDiscovery::new(
            vec!["192.168.1.100".into(), "192.168.1.101".into()],
            8090,
        );

        let candidates = strategy.discover(Duration::from_secs(5)).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].address, "192.168.1.100");
        assert_eq!(candidates[1].address, "192.168.1.101");
        assert!(candidates.iter().all(|c| c.port == 8090));
        assert!(candidates.iter().all(|c| !c.is_complete()));
    }

    #[tokio::test]
    async fn test_static_empty_list_is_not_an_error() {
        let strategy = StaticDiscovery::new(vec![], 8090);
        let candidates = strategy.discover(Duration::from_secs(1)).await.unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_static_preserves_duplicates_verbatim() {
        // Dedup is the synchronizer's responsibility, not the strategy's.
        let strategy =
            StaticDiscovery::new(vec!["10.0.0.5".into(), "10.0.0.5".into()], 8090);
        let candidates = strategy.discover(Duration::from_secs(1)).await.unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn test_fixture_devices_are_complete() {
        let strategy = FixtureDiscovery::default();
        let candidates = strategy.discover(Duration::from_secs(1)).await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.is_complete()));
    }
}
