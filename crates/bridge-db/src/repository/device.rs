//! # Device Registry
//!
//! Durable persistence of the device set, independent of how devices were
//! learned.
//!
//! ## Upsert Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                   Idempotent Upsert by device_id                    │
//! │                                                                     │
//! │  upsert(Device { device_id: "MAC1", address: "192.168.1.100" })     │
//! │       │                                                             │
//! │       ├── no row with MAC1?  INSERT                                 │
//! │       └── row exists?        UPDATE address/name/model/firmware     │
//! │                                                                     │
//! │  Repeating the call with identical data leaves exactly one row      │
//! │  with identical values. A later sync pass overwrites an earlier     │
//! │  one for the same identifier: last-write-wins, no conflict checks.  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bridge_core::Device;

/// Repository for the device registry.
///
/// Obtained from [`crate::Database::registry`]; existence of a value of this
/// type implies the pool and schema are initialized.
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    pool: SqlitePool,
}

impl DeviceRegistry {
    /// Creates a new DeviceRegistry over an initialized pool.
    pub fn new(pool: SqlitePool) -> Self {
        DeviceRegistry { pool }
    }

    /// Inserts or updates a device, keyed by `device_id`.
    ///
    /// All mutable fields (address, port, name, model, firmware,
    /// updated_at) are overwritten on conflict. The statement is atomic, so
    /// concurrent or repeated calls never create duplicate rows.
    pub async fn upsert(&self, device: &Device) -> DbResult<()> {
        debug!(device_id = %device.device_id, address = %device.address, "Upserting device");

        sqlx::query(
            r#"
            INSERT INTO devices (device_id, address, port, name, model, firmware, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(device_id) DO UPDATE SET
                address = excluded.address,
                port = excluded.port,
                name = excluded.name,
                model = excluded.model,
                firmware = excluded.firmware,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&device.device_id)
        .bind(&device.address)
        .bind(device.port)
        .bind(&device.name)
        .bind(&device.model)
        .bind(&device.firmware)
        .bind(device.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns every known device, ordered by name.
    ///
    /// Empty collection (not an error) when none exist.
    pub async fn get_all(&self) -> DbResult<Vec<Device>> {
        let devices = sqlx::query_as::<_, Device>(
            r#"
            SELECT device_id, address, port, name, model, firmware, updated_at
            FROM devices
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = devices.len(), "Listed devices");
        Ok(devices)
    }

    /// Point lookup by device identifier.
    ///
    /// ## Returns
    /// * `Ok(Some(Device))` - device found
    /// * `Ok(None)` - not found (not an error)
    pub async fn get_by_device_id(&self, device_id: &str) -> DbResult<Option<Device>> {
        let device = sqlx::query_as::<_, Device>(
            r#"
            SELECT device_id, address, port, name, model, firmware, updated_at
            FROM devices
            WHERE device_id = ?1
            "#,
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(device)
    }

    /// Destructive full clear.
    ///
    /// Used for resets and tests, never by the synchronizer itself.
    /// Returns the number of rows removed.
    pub async fn delete_all(&self) -> DbResult<u64> {
        debug!("Clearing device registry");

        let result = sqlx::query("DELETE FROM devices").execute(&self.pool).await?;

        Ok(result.rows_affected())
    }

    /// Counts registered devices (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM devices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use bridge_core::DeviceInfo;

    async fn registry() -> DeviceRegistry {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.registry()
    }

    fn device(device_id: &str, address: &str) -> Device {
        Device::from_info(
            address,
            8090,
            DeviceInfo {
                device_id: device_id.to_string(),
                name: format!("Speaker {}", device_id),
                device_type: "SoundTouch 20".to_string(),
                firmware: Some("27.0.6".to_string()),
            },
        )
    }

    #[tokio::test]
    async fn test_upsert_inserts_new_device() {
        let registry = registry().await;

        registry.upsert(&device("MAC1", "192.168.1.100")).await.unwrap();

        let found = registry.get_by_device_id("MAC1").await.unwrap().unwrap();
        assert_eq!(found.address, "192.168.1.100");
        assert_eq!(found.model, "SoundTouch 20");
        assert_eq!(registry.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let registry = registry().await;
        let dev = device("MAC1", "192.168.1.100");

        registry.upsert(&dev).await.unwrap();
        registry.upsert(&dev).await.unwrap();

        let all = registry.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].address, "192.168.1.100");
        assert_eq!(all[0].name, dev.name);
    }

    #[tokio::test]
    async fn test_upsert_updates_address_in_place() {
        let registry = registry().await;

        registry.upsert(&device("MAC1", "192.168.1.100")).await.unwrap();
        registry.upsert(&device("MAC1", "192.168.1.200")).await.unwrap();

        let all = registry.get_all().await.unwrap();
        assert_eq!(all.len(), 1); // no second row after the address change
        assert_eq!(all[0].address, "192.168.1.200");
    }

    #[tokio::test]
    async fn test_get_all_empty() {
        let registry = registry().await;
        assert!(registry.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_device_id_absent() {
        let registry = registry().await;
        assert!(registry.get_by_device_id("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_all() {
        let registry = registry().await;

        registry.upsert(&device("MAC1", "192.168.1.100")).await.unwrap();
        registry.upsert(&device("MAC2", "192.168.1.101")).await.unwrap();

        let removed = registry.delete_all().await.unwrap();
        assert_eq!(removed, 2);
        assert!(registry.get_all().await.unwrap().is_empty());
    }
}
