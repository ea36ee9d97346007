//! # Preset Repository
//!
//! Storage for the station descriptors bound to the speakers' physical
//! preset buttons. When a button is pressed the speaker asks the bridge for
//! the descriptor stored in that slot.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bridge_core::{Preset, PRESET_SLOT_MAX, PRESET_SLOT_MIN};

/// Repository for preset button storage.
#[derive(Debug, Clone)]
pub struct PresetRepository {
    pool: SqlitePool,
}

impl PresetRepository {
    /// Creates a new PresetRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PresetRepository { pool }
    }

    /// Inserts or replaces the descriptor in a preset slot.
    ///
    /// ## Errors
    /// `DbError::QueryFailed` when the slot is outside the range of
    /// physical buttons (1..=6); slot validation belongs here because the
    /// table's primary key is the slot number.
    pub async fn set(&self, preset: &Preset) -> DbResult<()> {
        if !(PRESET_SLOT_MIN..=PRESET_SLOT_MAX).contains(&preset.id) {
            return Err(DbError::QueryFailed(format!(
                "preset slot {} out of range {}..={}",
                preset.id, PRESET_SLOT_MIN, PRESET_SLOT_MAX
            )));
        }

        debug!(slot = preset.id, name = %preset.name, "Storing preset");

        sqlx::query(
            r#"
            INSERT INTO presets (id, name, source, location, artwork_url, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                source = excluded.source,
                location = excluded.location,
                artwork_url = excluded.artwork_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(preset.id)
        .bind(&preset.name)
        .bind(&preset.source)
        .bind(&preset.location)
        .bind(&preset.artwork_url)
        .bind(preset.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches the descriptor for one slot, `None` when unset.
    pub async fn get(&self, slot: u16) -> DbResult<Option<Preset>> {
        let preset = sqlx::query_as::<_, Preset>(
            r#"
            SELECT id, name, source, location, artwork_url, updated_at
            FROM presets
            WHERE id = ?1
            "#,
        )
        .bind(slot)
        .fetch_optional(&self.pool)
        .await?;

        Ok(preset)
    }

    /// Lists all configured presets in slot order.
    pub async fn list(&self) -> DbResult<Vec<Preset>> {
        let presets = sqlx::query_as::<_, Preset>(
            r#"
            SELECT id, name, source, location, artwork_url, updated_at
            FROM presets
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(presets)
    }

    /// Clears every preset slot.
    pub async fn delete_all(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM presets").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;

    fn preset(slot: u16, name: &str) -> Preset {
        Preset {
            id: slot,
            name: name.to_string(),
            source: "INTERNET_RADIO".to_string(),
            location: format!("http://streams.example/{}", name),
            artwork_url: None,
            updated_at: Utc::now(),
        }
    }

    async fn repo() -> PresetRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.presets()
    }

    #[tokio::test]
    async fn test_set_and_get_roundtrip() {
        let repo = repo().await;
        repo.set(&preset(1, "Jazz FM")).await.unwrap();

        let stored = repo.get(1).await.unwrap().unwrap();
        assert_eq!(stored.name, "Jazz FM");
        assert_eq!(stored.source, "INTERNET_RADIO");
    }

    #[tokio::test]
    async fn test_set_replaces_slot() {
        let repo = repo().await;
        repo.set(&preset(2, "Jazz FM")).await.unwrap();
        repo.set(&preset(2, "News 24")).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "News 24");
    }

    #[tokio::test]
    async fn test_invalid_slot_rejected() {
        let repo = repo().await;
        assert!(repo.set(&preset(0, "Nope")).await.is_err());
        assert!(repo.set(&preset(7, "Nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_unset_slot_is_none() {
        let repo = repo().await;
        assert!(repo.get(3).await.unwrap().is_none());
    }
}
