//! # bridge-db: Database Layer for soundbridge
//!
//! This crate provides database access for the bridge. It uses SQLite for
//! local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Synchronizer / API handlers                                        │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐  │
//! │  │                   bridge-db (THIS CRATE)                      │  │
//! │  │                                                               │  │
//! │  │   Database (pool.rs)   Repositories       Migrations          │  │
//! │  │   SqlitePool, WAL      DeviceRegistry     001_initial.sql     │  │
//! │  │                        PresetRepository                       │  │
//! │  └───────────────────────────────────────────────────────────────┘  │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite file (e.g. ~/.local/share/soundbridge/bridge.db)            │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bridge_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("bridge.db")).await?;
//! let registry = db.registry();
//! registry.upsert(&device).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::device::DeviceRegistry;
pub use repository::preset::PresetRepository;
