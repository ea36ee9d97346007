//! HTTP route handlers.
//!
//! ## API Surface
//! ```text
//! GET  /health                        liveness probe
//! POST /sync                          run one synchronization pass
//! GET  /devices                       all registered devices
//! GET  /devices/{id}                  one device by hardware id
//! GET  /devices/{id}/now_playing      live playback state
//! GET  /presets                       all preset slots
//! GET  /presets/{slot}                one preset slot
//! PUT  /presets/{slot}                bind a station to a slot
//! GET  /radio/search?name=...         proxy search against the directory
//! ```

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::ApiError;
use crate::radio::RadioDirectory;
use bridge_core::{Device, NowPlaying, Preset, Station, SyncReport};
use bridge_db::{Database, PresetRepository};
use bridge_sync::DeviceService;

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub devices: DeviceService,
    pub presets: PresetRepository,
    pub radio: RadioDirectory,
}

/// Builds the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sync", post(sync))
        .route("/devices", get(list_devices))
        .route("/devices/{device_id}", get(get_device))
        .route("/devices/{device_id}/now_playing", get(now_playing))
        .route("/presets", get(list_presets))
        .route("/presets/{slot}", get(get_preset).put(set_preset))
        .route("/radio/search", get(radio_search))
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

/// Liveness probe. Reports the one structural dependency worth surfacing:
/// registry availability. 503 when the database cannot execute queries.
async fn health(State(state): State<Arc<AppState>>) -> Response {
    if state.db.health_check().await {
        Json(json!({ "status": "ok" })).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable", "reason": "database unreachable" })),
        )
            .into_response()
    }
}

// =============================================================================
// Sync + Devices
// =============================================================================

async fn sync(State(state): State<Arc<AppState>>) -> Result<Json<SyncReport>, ApiError> {
    info!("Sync requested via API");
    let report = state.devices.sync().await?;
    Ok(Json(report))
}

async fn list_devices(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(state.devices.get_all().await?))
}

async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(device_id): Path<String>,
) -> Result<Json<Device>, ApiError> {
    state
        .devices
        .get_by_device_id(&device_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("device {}", device_id)))
}

async fn now_playing(
    State(state): State<Arc<AppState>>,
    Path(device_id): Path<String>,
) -> Result<Json<NowPlaying>, ApiError> {
    state
        .devices
        .now_playing(&device_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("device {}", device_id)))
}

// =============================================================================
// Presets
// =============================================================================

/// Body of `PUT /presets/{slot}`.
#[derive(Debug, Deserialize)]
pub struct SetPresetRequest {
    pub name: String,
    pub source: String,
    pub location: String,
    #[serde(default)]
    pub artwork_url: Option<String>,
}

async fn list_presets(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Preset>>, ApiError> {
    Ok(Json(state.presets.list().await?))
}

async fn get_preset(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<u16>,
) -> Result<Json<Preset>, ApiError> {
    if !Preset::is_valid_slot(slot) {
        return Err(ApiError::InvalidRequest(format!("invalid preset slot {}", slot)));
    }
    state
        .presets
        .get(slot)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("preset {}", slot)))
}

async fn set_preset(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<u16>,
    Json(body): Json<SetPresetRequest>,
) -> Result<Json<Preset>, ApiError> {
    if body.location.trim().is_empty() {
        return Err(ApiError::InvalidRequest("location must not be empty".into()));
    }

    let preset = Preset::new(slot, body.name, body.source, body.location, body.artwork_url)
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    state.presets.set(&preset).await?;
    info!(slot, name = %preset.name, "Preset updated");
    Ok(Json(preset))
}

// =============================================================================
// Radio Directory
// =============================================================================

/// Query string of `GET /radio/search`.
#[derive(Debug, Deserialize)]
pub struct RadioSearchQuery {
    pub name: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

async fn radio_search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RadioSearchQuery>,
) -> Result<Json<Vec<Station>>, ApiError> {
    if query.name.trim().is_empty() {
        return Err(ApiError::InvalidRequest("name must not be empty".into()));
    }
    Ok(Json(state.radio.search(query.name.trim(), query.limit).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_db::DbConfig;
    use bridge_sync::BridgeConfig;

    async fn state() -> (Database, Arc<AppState>) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = Arc::new(AppState {
            db: db.clone(),
            devices: DeviceService::new(&BridgeConfig::default(), &db),
            presets: db.presets(),
            radio: RadioDirectory::new("http://127.0.0.1:0"),
        });
        (db, state)
    }

    #[tokio::test]
    async fn test_health_reflects_database_availability() {
        let (db, state) = state().await;

        let response = health(State(state.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);

        // Closing the pool is the structural failure the probe must surface.
        db.close().await;
        let response = health(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
