//! # bridge-core: Pure Domain Types for soundbridge
//!
//! This crate holds the domain vocabulary shared by every other crate:
//! what a speaker looks like before and after identification, what one
//! synchronization pass reports, and the preset/station metadata the
//! speakers fetch from the bridge.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     soundbridge Architecture                        │
//! │                                                                     │
//! │   HTTP API (apps/bridge-server)                                     │
//! │        │                                                            │
//! │   bridge-sync ──── discovery, detail fetch, synchronizer            │
//! │        │                                                            │
//! │   bridge-db ────── SQLite registry and preset storage               │
//! │        │                                                            │
//! │   ★ bridge-core (THIS CRATE) ★                                      │
//! │        DiscoveredDevice • Device • SyncReport • Preset • Station    │
//! │                                                                     │
//! │   NO I/O • NO DATABASE • NO NETWORK                                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **No I/O**: database, network and file system access is forbidden here
//! 2. **Serde everywhere**: every type crosses the API boundary as JSON
//! 3. **Explicit errors**: typed errors, never strings or panics

pub mod error;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use types::{
    Device, DeviceInfo, DiscoveredDevice, NowPlaying, Preset, Station, SyncReport,
    DEFAULT_DEVICE_PORT, PRESET_SLOT_MAX, PRESET_SLOT_MIN,
};
