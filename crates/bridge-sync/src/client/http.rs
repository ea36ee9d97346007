//! # Speaker HTTP Client
//!
//! Client for the speakers' XML-over-HTTP control surface on port 8090.
//!
//! ## Endpoints
//! ```text
//! GET http://{address}:{port}/info          identity and hardware detail
//! GET http://{address}:{port}/now_playing   current playback state
//! ```
//!
//! Responses are small XML documents:
//! ```text
//! <info deviceID="AABBCCDDEEFF">
//!   <name>Kitchen</name>
//!   <type>SoundTouch 20</type>
//!   <components>
//!     <component><softwareVersion>27.0.6</softwareVersion></component>
//!   </components>
//! </info>
//! ```
//!
//! Every request carries the configured per-call timeout; an unresponsive
//! speaker costs at most that long, never a hung pass.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::client::{DeviceClient, DeviceClientFactory};
use crate::error::{ClientError, SyncError, SyncResult};
use bridge_core::{DeviceInfo, NowPlaying};

// =============================================================================
// Wire Payloads
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename = "info")]
struct InfoPayload {
    #[serde(rename = "@deviceID")]
    device_id: String,
    name: String,
    #[serde(rename = "type")]
    device_type: String,
    #[serde(default)]
    components: Option<ComponentsPayload>,
}

#[derive(Debug, Deserialize)]
struct ComponentsPayload {
    #[serde(default)]
    component: Vec<ComponentPayload>,
}

#[derive(Debug, Deserialize)]
struct ComponentPayload {
    #[serde(rename = "softwareVersion", default)]
    software_version: Option<String>,
}

impl From<InfoPayload> for DeviceInfo {
    fn from(payload: InfoPayload) -> Self {
        // Firmware lives on the first component that reports one.
        let firmware = payload
            .components
            .into_iter()
            .flat_map(|c| c.component)
            .find_map(|c| c.software_version);

        DeviceInfo {
            device_id: payload.device_id,
            name: payload.name,
            device_type: payload.device_type,
            firmware,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename = "nowPlaying")]
struct NowPlayingPayload {
    #[serde(rename = "@source")]
    source: String,
    #[serde(rename = "playStatus", default)]
    play_status: Option<String>,
    #[serde(rename = "stationName", default)]
    station_name: Option<String>,
    #[serde(default)]
    track: Option<String>,
    #[serde(default)]
    artist: Option<String>,
    #[serde(default)]
    album: Option<String>,
}

impl From<NowPlayingPayload> for NowPlaying {
    fn from(payload: NowPlayingPayload) -> Self {
        // Speakers emit empty elements for absent metadata; collapse them.
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

        NowPlaying {
            source: payload.source,
            play_status: non_empty(payload.play_status),
            station: non_empty(payload.station_name),
            track: non_empty(payload.track),
            artist: non_empty(payload.artist),
            album: non_empty(payload.album),
        }
    }
}

// =============================================================================
// Speaker Client
// =============================================================================

/// HTTP client bound to one speaker's control surface.
pub struct SpeakerClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl SpeakerClient {
    /// Creates a client for the speaker at `address:port`.
    pub fn new(address: &str, port: u16, fetch_timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(|e| ClientError::Unreachable(e.to_string()))?;

        Ok(SpeakerClient {
            http,
            base_url: format!("http://{}:{}", address, port),
            timeout_secs: fetch_timeout.as_secs(),
        })
    }

    async fn get_xml(&self, path: &str) -> Result<String, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Device request");

        let response = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(self.timeout_secs)
            } else {
                ClientError::Unreachable(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(ClientError::Parse(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(self.timeout_secs)
            } else {
                ClientError::Parse(e.to_string())
            }
        })
    }
}

#[async_trait]
impl DeviceClient for SpeakerClient {
    async fn get_info(&self) -> Result<DeviceInfo, ClientError> {
        let body = self.get_xml("/info").await?;
        let payload: InfoPayload =
            quick_xml::de::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))?;
        Ok(payload.into())
    }

    async fn get_now_playing(&self) -> Result<NowPlaying, ClientError> {
        let body = self.get_xml("/now_playing").await?;
        let payload: NowPlayingPayload =
            quick_xml::de::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))?;
        Ok(payload.into())
    }
}

// =============================================================================
// Speaker Client Factory
// =============================================================================

/// Mints [`SpeakerClient`]s sharing one per-call timeout.
pub struct SpeakerClientFactory {
    fetch_timeout: Duration,
}

impl SpeakerClientFactory {
    pub fn new(fetch_timeout: Duration) -> Self {
        SpeakerClientFactory { fetch_timeout }
    }
}

impl DeviceClientFactory for SpeakerClientFactory {
    fn client(&self, address: &str, port: u16) -> SyncResult<Box<dyn DeviceClient>> {
        let client = SpeakerClient::new(address, port, self.fetch_timeout)
            .map_err(|e| SyncError::Internal(e.to_string()))?;
        Ok(Box::new(client))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
