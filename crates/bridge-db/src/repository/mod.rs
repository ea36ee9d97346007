//! # Repository Module
//!
//! Database repository implementations for soundbridge.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Synchronizer / API handler                                         │
//! │       │                                                             │
//! │       │  db.registry().upsert(&device)                              │
//! │       ▼                                                             │
//! │  DeviceRegistry                                                     │
//! │  ├── upsert(&self, device)                                          │
//! │  ├── get_all(&self)                                                 │
//! │  ├── get_by_device_id(&self, id)                                    │
//! │  └── delete_all(&self)                                              │
//! │       │  SQL                                                        │
//! │       ▼                                                             │
//! │  SQLite Database                                                    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All reads and writes go through the repositories; nothing bypasses them
//! with raw pool access.
//!
//! ## Available Repositories
//!
//! - [`device::DeviceRegistry`] - durable device registry
//! - [`preset::PresetRepository`] - preset button storage

pub mod device;
pub mod preset;
