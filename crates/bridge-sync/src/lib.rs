//! # bridge-sync: Discovery and Synchronization Engine for soundbridge
//!
//! Finds speakers on the network, fetches their identity, and reconciles
//! the result with the device registry.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     bridge-sync (THIS CRATE)                             │
//! │                                                                          │
//! │  DeviceService (service.rs) ── facade the server binary talks to         │
//! │       │                                                                  │
//! │       ▼                                                                  │
//! │  DeviceSynchronizer (synchronizer.rs)                                    │
//! │       │                          │                                       │
//! │       ▼                          ▼                                       │
//! │  DiscoveryStrategy          DeviceClient                                 │
//! │   ├─ SsdpDiscovery           ├─ SpeakerClient (XML over HTTP)            │
//! │   ├─ StaticDiscovery         └─ FixtureClient                            │
//! │   └─ FixtureDiscovery                                                    │
//! │       │                          │                                       │
//! │       ▼                          ▼                                       │
//! │  Local network (SSDP)       Speakers' control surface (:8090)            │
//! │                                                                          │
//! │  Persistence goes through bridge_db::DeviceRegistry.                     │
//! └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_sync::{BridgeConfig, DeviceService};
//!
//! let config = BridgeConfig::load(None)?;
//! let service = DeviceService::new(&config, &db);
//! let report = service.sync().await?;
//! println!("synced {} of {}", report.synced, report.discovered);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod service;
pub mod synchronizer;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{BridgeConfig, DeviceSettings, DiscoverySettings};
pub use error::{ClientError, SyncError, SyncResult};
pub use service::DeviceService;
pub use synchronizer::DeviceSynchronizer;

pub use client::http::{SpeakerClient, SpeakerClientFactory};
pub use client::{DeviceClient, DeviceClientFactory, FixtureClient, FixtureClientFactory};
pub use discovery::ssdp::SsdpDiscovery;
pub use discovery::{DiscoveryStrategy, FixtureDiscovery, StaticDiscovery};
