//! # SSDP Discovery
//!
//! Network discovery of speakers via SSDP (Simple Service Discovery
//! Protocol) multicast.
//!
//! ## Probe Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SsdpDiscovery::discover() - One-Shot Probe                             │
//! │                                                                         │
//! │  1. Bind temporary UDP socket (0.0.0.0:0)                               │
//! │  2. Send M-SEARCH to 239.255.255.250:1900                               │
//! │  3. Collect responses until the timeout window closes                   │
//! │  4. Filter by device token, dedup by address                            │
//! │                                                                         │
//! │  Timeline:                                                              │
//! │  ─────────────────────────────────────────────────────────────────────▶ │
//! │  T+0ms     T+120ms    T+800ms    T+2400ms   T+5000ms                    │
//! │  │         │          │          │          │                           │
//! │  Send      Recv       Recv       Recv       Window closes               │
//! │  M-SEARCH  Response1  Response2  Response3  Return candidates           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bind and send failures are setup errors. Everything after the probe is
//! on the air is soft: malformed datagrams are skipped, a quiet network
//! yields an empty candidate list.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use crate::discovery::DiscoveryStrategy;
use crate::error::{SyncError, SyncResult};
use bridge_core::DiscoveredDevice;

// =============================================================================
// Constants
// =============================================================================

/// SSDP multicast group and port.
const SSDP_MULTICAST_ADDR: &str = "239.255.255.250:1900";

/// Search target: speakers present as UPnP media renderers.
const SSDP_SEARCH_TARGET: &str = "urn:schemas-upnp-org:device:MediaRenderer:1";

/// MX value in the M-SEARCH request (seconds responders may delay).
const SSDP_MX_SECS: u8 = 2;

// =============================================================================
// SSDP Response
// =============================================================================

/// Parsed SSDP unicast response.
#[derive(Debug, Clone, PartialEq)]
struct SsdpResponse {
    location: String,
    st: String,
    usn: String,
    server: Option<String>,
}

impl SsdpResponse {
    /// Checks whether any identifying header carries the filter token.
    ///
    /// Different firmware generations put the product token in different
    /// headers (SERVER most often, sometimes USN or ST), so all three are
    /// checked, case-insensitively.
    fn matches_filter(&self, filter: &str) -> bool {
        let needle = filter.to_ascii_lowercase();
        self.server
            .as_deref()
            .is_some_and(|s| s.to_ascii_lowercase().contains(&needle))
            || self.usn.to_ascii_lowercase().contains(&needle)
            || self.st.to_ascii_lowercase().contains(&needle)
    }
}

/// Parses an SSDP response from HTTP-over-UDP text.
///
/// Returns None when any mandatory header (LOCATION, ST, USN) is absent —
/// such datagrams are skipped, not errors.
fn parse_ssdp_response(response: &str) -> Option<SsdpResponse> {
    let mut location = None;
    let mut st = None;
    let mut usn = None;
    let mut server = None;

    for line in response.lines() {
        let line = line.trim();

        if let Some(value) = extract_header_value(line, "LOCATION:") {
            location = Some(value);
        } else if let Some(value) = extract_header_value(line, "ST:") {
            st = Some(value);
        } else if let Some(value) = extract_header_value(line, "USN:") {
            usn = Some(value);
        } else if let Some(value) = extract_header_value(line, "SERVER:") {
            server = Some(value);
        }
    }

    match (location, st, usn) {
        (Some(location), Some(st), Some(usn)) => Some(SsdpResponse {
            location,
            st,
            usn,
            server,
        }),
        _ => None,
    }
}

/// Extracts a header value from a line like "HEADER: value" (case-insensitive).
fn extract_header_value(line: &str, header: &str) -> Option<String> {
    if line.len() > header.len() && line[..header.len()].eq_ignore_ascii_case(header) {
        Some(line[header.len()..].trim().to_string())
    } else {
        None
    }
}

/// Pulls the host out of a LOCATION URL like
/// `http://192.168.1.50:8091/description.xml`.
fn extract_host_from_location(location: &str) -> Option<String> {
    let rest = location
        .strip_prefix("http://")
        .or_else(|| location.strip_prefix("https://"))?;
    let authority = rest.split('/').next()?;
    let host = authority.split(':').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

// =============================================================================
// SSDP Strategy
// =============================================================================

/// Discovers speakers by multicasting an SSDP M-SEARCH probe and collecting
/// unicast responses for the length of the timeout window.
pub struct SsdpDiscovery {
    /// Token matched against SSDP headers to separate compatible speakers
    /// from unrelated UPnP responders on the same network.
    device_filter: String,
    /// Port assigned to each candidate (the speakers' HTTP control port,
    /// not the UPnP port in LOCATION).
    device_port: u16,
}

impl SsdpDiscovery {
    /// Creates an SSDP strategy with the given filter token and device port.
    pub fn new(device_filter: impl Into<String>, device_port: u16) -> Self {
        SsdpDiscovery {
            device_filter: device_filter.into(),
            device_port,
        }
    }

    fn build_search_request() -> String {
        format!(
            "M-SEARCH * HTTP/1.1\r\n\
             HOST: {}\r\n\
             MAN: \"ssdp:discover\"\r\n\
             MX: {}\r\n\
             ST: {}\r\n\
             USER-AGENT: soundbridge/0.1 UPnP/1.0\r\n\
             \r\n",
            SSDP_MULTICAST_ADDR, SSDP_MX_SECS, SSDP_SEARCH_TARGET
        )
    }
}

#[async_trait]
impl DiscoveryStrategy for SsdpDiscovery {
    async fn discover(&self, window: Duration) -> SyncResult<Vec<DiscoveredDevice>> {
        info!(filter = %self.device_filter, timeout = ?window, "Starting SSDP discovery scan");

        let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(|e| {
            SyncError::DiscoverySetup(format!("Failed to bind SSDP socket: {}", e))
        })?;

        let request = Self::build_search_request();
        socket
            .send_to(request.as_bytes(), SSDP_MULTICAST_ADDR)
            .await
            .map_err(|e| {
                SyncError::DiscoverySetup(format!("Failed to send M-SEARCH probe: {}", e))
            })?;

        debug!("Sent M-SEARCH probe, collecting responses");

        // Collect until the window closes. Same device may answer several
        // times (once per advertised service), hence the address keying.
        let mut candidates: HashMap<String, DiscoveredDevice> = HashMap::new();
        let mut buf = [0u8; 2048];

        let deadline = Instant::now() + window;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            match timeout(remaining, socket.recv_from(&mut buf)).await {
                Ok(Ok((len, sender))) => {
                    let Ok(text) = std::str::from_utf8(&buf[..len]) else {
                        debug!(%sender, "Skipping non-UTF-8 SSDP datagram");
                        continue;
                    };

                    let Some(response) = parse_ssdp_response(text) else {
                        debug!(%sender, "Skipping malformed SSDP response");
                        continue;
                    };

                    if !response.matches_filter(&self.device_filter) {
                        debug!(%sender, st = %response.st, "Skipping non-matching responder");
                        continue;
                    }

                    let address = extract_host_from_location(&response.location)
                        .unwrap_or_else(|| sender.ip().to_string());

                    debug!(%address, usn = %response.usn, "Found candidate speaker");
                    candidates
                        .entry(address.clone())
                        .or_insert_with(|| DiscoveredDevice::new(address).with_port(self.device_port));
                }
                Ok(Err(e)) => {
                    warn!(?e, "Error receiving SSDP response");
                }
                Err(_) => {
                    // Window closed.
                    break;
                }
            }
        }

        let result: Vec<DiscoveredDevice> = candidates.into_values().collect();
        info!(count = result.len(), "SSDP scan complete");

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "ssdp"
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RESPONSE: &str = "HTTP/1.1 200 OK\r\n\
        CACHE-CONTROL: max-age=1800\r\n\
        LOCATION: http://192.168.1.50:8091/XD/BO5EBO5E-F00D-F00D-FEED-AABBCCDDEEFF.xml\r\n\
        ST: urn:schemas-upnp-org:device:MediaRenderer:1\r\n\
        USN: uuid:BO5EBO5E-F00D-F00D-FEED-AABBCCDDEEFF::urn:schemas-upnp-org:device:MediaRenderer:1\r\n\
        SERVER: Linux UPnP/1.0 SoundTouch/27.0.6\r\n\
        \r\n";

    #[test]
    fn test_parse_full_response() {
        let parsed = parse_ssdp_response(SAMPLE_RESPONSE).unwrap();
        assert_eq!(
            parsed.location,
            "http://192.168.1.50:8091/XD/BO5EBO5E-F00D-F00D-FEED-AABBCCDDEEFF.xml"
        );
        assert_eq!(parsed.st, "urn:schemas-upnp-org:device:MediaRenderer:1");
        assert!(parsed.server.unwrap().contains("SoundTouch"));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let response = "HTTP/1.1 200 OK\r\n\
            location: http://10.0.0.7:8091/desc.xml\r\n\
            st: urn:schemas-upnp-org:device:MediaRenderer:1\r\n\
            usn: uuid:1234\r\n\
            \r\n";
        let parsed = parse_ssdp_response(response).unwrap();
        assert_eq!(parsed.location, "http://10.0.0.7:8091/desc.xml");
        assert_eq!(parsed.server, None);
    }

    #[test]
    fn test_parse_rejects_missing_mandatory_headers() {
        let response = "HTTP/1.1 200 OK\r\n\
            ST: urn:schemas-upnp-org:device:MediaRenderer:1\r\n\
            USN: uuid:1234\r\n\
            \r\n";
        assert!(parse_ssdp_response(response).is_none());
        assert!(parse_ssdp_response("").is_none());
        assert!(parse_ssdp_response("not an ssdp response\r\n").is_none());
    }

    #[test]
    fn test_filter_matches_any_identifying_header() {
        let parsed = parse_ssdp_response(SAMPLE_RESPONSE).unwrap();
        assert!(parsed.matches_filter("SoundTouch"));
        assert!(parsed.matches_filter("soundtouch"));
        assert!(parsed.matches_filter("MediaRenderer"));
        assert!(!parsed.matches_filter("ZonePlayer"));
    }

    #[test]
    fn test_extract_host_from_location() {
        assert_eq!(
            extract_host_from_location("http://192.168.1.50:8091/desc.xml"),
            Some("192.168.1.50".to_string())
        );
        assert_eq!(
            extract_host_from_location("http://192.168.1.50/desc.xml"),
            Some("192.168.1.50".to_string())
        );
        assert_eq!(extract_host_from_location("garbage"), None);
        assert_eq!(extract_host_from_location("http:///desc.xml"), None);
    }

    #[test]
    fn test_search_request_shape() {
        let request = SsdpDiscovery::build_search_request();
        assert!(request.starts_with("M-SEARCH * HTTP/1.1\r\n"));
        assert!(request.contains("HOST: 239.255.255.250:1900\r\n"));
        assert!(request.contains("MAN: \"ssdp:discover\"\r\n"));
        assert!(request.contains(SSDP_SEARCH_TARGET));
        assert!(request.ends_with("\r\n\r\n"));
    }
}
