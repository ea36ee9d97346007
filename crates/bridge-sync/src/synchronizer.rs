//! # Device Synchronizer
//!
//! Reconciles network-visible speakers with the device registry.
//!
//! ## Sync Pass
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Synchronization Pass                            │
//! │                                                                          │
//! │  Discovery strategy ──┐                                                  │
//! │   (when enabled)      │  candidates                                      │
//! │                       ▼                                                  │
//! │              dedup by address ◀── static addresses (merged after,        │
//! │              (first wins)          so discovery detail wins ties)        │
//! │                       │                                                  │
//! │                       ▼                                                  │
//! │          resolve candidates concurrently (bounded fan-out)               │
//! │            │                                                             │
//! │            ├─ complete candidate ───────────▶ upsert directly            │
//! │            ├─ incomplete ──▶ GET /info ─────▶ upsert                     │
//! │            └─ fetch failed ─▶ warn! ────────▶ failed += 1                │
//! │                       │                                                  │
//! │                       ▼                                                  │
//! │              SyncReport { discovered, synced, failed }                   │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Semantics
//! Per-device failures (unreachable, timeout, malformed response) are
//! absorbed: logged, counted, and the pass continues. Structural failures
//! (registry down, discovery socket unusable) abort the pass with an error.
//! Rows for devices that fail or vanish are kept — absence from one pass is
//! not evidence of decommissioning.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::client::DeviceClientFactory;
use crate::config::BridgeConfig;
use crate::discovery::DiscoveryStrategy;
use crate::error::SyncResult;
use bridge_core::{Device, DiscoveredDevice, SyncReport};
use bridge_db::DeviceRegistry;

/// Upper bound on concurrent detail fetches per pass.
const MAX_CONCURRENT_FETCHES: usize = 8;

/// Outcome of resolving one candidate.
enum CandidateOutcome {
    Synced,
    Failed,
}

// =============================================================================
// Synchronizer
// =============================================================================

/// Runs synchronization passes against the registry.
pub struct DeviceSynchronizer {
    discovery_enabled: bool,
    discovery_timeout: std::time::Duration,
    static_addresses: Vec<String>,
    device_port: u16,
    registry: DeviceRegistry,
    strategy: Box<dyn DiscoveryStrategy>,
    clients: Arc<dyn DeviceClientFactory>,
}

impl DeviceSynchronizer {
    /// Creates a synchronizer from configuration and its collaborators.
    pub fn new(
        config: &BridgeConfig,
        registry: DeviceRegistry,
        strategy: Box<dyn DiscoveryStrategy>,
        clients: Arc<dyn DeviceClientFactory>,
    ) -> Self {
        DeviceSynchronizer {
            discovery_enabled: config.discovery.enabled,
            discovery_timeout: config.discovery_timeout(),
            static_addresses: config.devices.static_addresses.clone(),
            device_port: config.devices.port,
            registry,
            strategy,
            clients,
        }
    }

    /// Runs one synchronization pass.
    ///
    /// Every candidate is resolved exactly once; the returned report always
    /// satisfies `synced + failed == discovered`.
    pub async fn sync(&self) -> SyncResult<SyncReport> {
        let candidates = self.gather_candidates().await?;
        let discovered = candidates.len();

        if discovered == 0 {
            info!("Sync pass found no candidates");
            return Ok(SyncReport::new());
        }

        info!(count = discovered, "Resolving candidates");

        let mut report = SyncReport {
            discovered,
            ..SyncReport::new()
        };

        let mut outcomes = stream::iter(candidates)
            .map(|candidate| self.resolve_candidate(candidate))
            .buffer_unordered(MAX_CONCURRENT_FETCHES);

        while let Some(outcome) = outcomes.next().await {
            // Registry errors propagate and abort the pass.
            match outcome? {
                CandidateOutcome::Synced => report.synced += 1,
                CandidateOutcome::Failed => report.failed += 1,
            }
        }

        info!(
            discovered = report.discovered,
            synced = report.synced,
            failed = report.failed,
            "Sync pass complete"
        );

        Ok(report)
    }

    /// Collects candidates from the strategy and the static address list,
    /// deduplicated by address.
    ///
    /// Discovery candidates are taken first, so when a static address is
    /// also found on the network the (possibly richer) discovery candidate
    /// wins. Within either source, first occurrence wins.
    async fn gather_candidates(&self) -> SyncResult<Vec<DiscoveredDevice>> {
        let mut candidates = Vec::new();

        if self.discovery_enabled {
            let found = self.strategy.discover(self.discovery_timeout).await?;
            debug!(
                strategy = self.strategy.name(),
                count = found.len(),
                "Discovery produced candidates"
            );
            candidates.extend(found);
        } else {
            debug!("Network discovery disabled, using static addresses only");
        }

        for address in &self.static_addresses {
            candidates.push(DiscoveredDevice::new(address.clone()).with_port(self.device_port));
        }

        let mut seen = HashSet::new();
        candidates.retain(|c| seen.insert(c.address.clone()));

        Ok(candidates)
    }

    /// Resolves one candidate: establish identity, persist, report outcome.
    ///
    /// Returns `Err` only for registry failures; fetch failures become
    /// `CandidateOutcome::Failed`.
    async fn resolve_candidate(
        &self,
        candidate: DiscoveredDevice,
    ) -> SyncResult<CandidateOutcome> {
        // Fixture strategies ship full identity; no fetch needed.
        if let Some(device) = Device::from_discovered(&candidate) {
            self.registry.upsert(&device).await?;
            debug!(device_id = %device.device_id, address = %device.address, "Synced (pre-resolved)");
            return Ok(CandidateOutcome::Synced);
        }

        let client = match self.clients.client(&candidate.address, candidate.port) {
            Ok(client) => client,
            Err(e) => {
                warn!(address = %candidate.address, error = %e, "Could not create device client");
                return Ok(CandidateOutcome::Failed);
            }
        };

        let outcome = match client.get_info().await {
            Ok(info) => {
                let device = Device::from_info(&candidate.address, candidate.port, info);
                self.registry.upsert(&device).await?;
                debug!(device_id = %device.device_id, address = %device.address, "Synced");
                CandidateOutcome::Synced
            }
            Err(e) => {
                warn!(address = %candidate.address, error = %e, "Device detail fetch failed, skipping");
                CandidateOutcome::Failed
            }
        };

        client.close().await;
        Ok(outcome)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
