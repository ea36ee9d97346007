//! Radio directory search proxy.
//!
//! Thin client for the public radio-browser directory. The bridge proxies
//! searches rather than letting frontends call the directory themselves, so
//! the response shape stays stable even if the upstream API changes.

use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use bridge_core::Station;

/// Default result count per search.
const DEFAULT_SEARCH_LIMIT: u32 = 30;

/// Upper bound on caller-requested result counts.
const MAX_SEARCH_LIMIT: u32 = 100;

/// One station as the upstream directory returns it.
#[derive(Debug, Deserialize)]
struct UpstreamStation {
    stationuuid: String,
    name: String,
    #[serde(default)]
    url_resolved: String,
    #[serde(default)]
    favicon: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    codec: String,
    #[serde(default)]
    bitrate: u32,
}

impl From<UpstreamStation> for Station {
    fn from(upstream: UpstreamStation) -> Self {
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

        Station {
            id: upstream.stationuuid,
            name: upstream.name,
            stream_url: upstream.url_resolved,
            artwork_url: non_empty(upstream.favicon),
            country: non_empty(upstream.country),
            codec: non_empty(upstream.codec),
            bitrate: (upstream.bitrate > 0).then_some(upstream.bitrate),
        }
    }
}

/// Client for the public radio directory.
pub struct RadioDirectory {
    http: reqwest::Client,
    base_url: String,
}

impl RadioDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        RadioDirectory {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Searches stations by name. Stations with no resolvable stream URL
    /// are dropped — the speakers cannot tune to them.
    pub async fn search(&self, query: &str, limit: Option<u32>) -> Result<Vec<Station>, ApiError> {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);
        let url = format!("{}/json/stations/byname/{}", self.base_url, query);
        debug!(%url, limit, "Radio directory search");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("limit", limit.to_string()),
                ("hidebroken", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "directory returned HTTP {}",
                response.status()
            )));
        }

        let stations: Vec<UpstreamStation> = response
            .json()
            .await
            .map_err(|e| ApiError::Upstream(e.to_string()))?;

        Ok(stations
            .into_iter()
            .map(Station::from)
            .filter(|s| !s.stream_url.is_empty())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_BODY: &str = r#"[
        {
            "stationuuid": "9608b51d-0601-11e8-ae97-52543be04c81",
            "name": "Radio Paradise",
            "url_resolved": "https://stream.radioparadise.com/aac-320",
            "favicon": "https://radioparadise.com/favicon.ico",
            "country": "The United States Of America",
            "codec": "AAC",
            "bitrate": 320
        },
        {
            "stationuuid": "broken-no-url",
            "name": "Dead Station",
            "url_resolved": "",
            "favicon": "",
            "country": "",
            "codec": "",
            "bitrate": 0
        }
    ]"#;

    #[tokio::test]
    async fn test_search_maps_and_filters_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/json/stations/byname/paradise")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("limit".into(), DEFAULT_SEARCH_LIMIT.to_string()),
                mockito::Matcher::UrlEncoded("hidebroken".into(), "true".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SAMPLE_BODY)
            .create_async()
            .await;

        let directory = RadioDirectory::new(server.url());
        let stations = directory.search("paradise", None).await.unwrap();

        // the URL-less entry is filtered out
        assert_eq!(stations.len(), 1);
        let station = &stations[0];
        assert_eq!(station.name, "Radio Paradise");
        assert_eq!(station.codec.as_deref(), Some("AAC"));
        assert_eq!(station.bitrate, Some(320));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_an_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/json/stations/byname/x")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let directory = RadioDirectory::new(server.url());
        let err = directory.search("x", None).await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
    }
}
