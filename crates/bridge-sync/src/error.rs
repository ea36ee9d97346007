//! # Sync Error Types
//!
//! Error types for discovery and synchronization.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Sync Error Categories                          │
//! │                                                                     │
//! │  ┌───────────────┐  ┌────────────────┐  ┌───────────────────────┐  │
//! │  │ Configuration │  │ Pass-fatal     │  │ Per-device (absorbed) │  │
//! │  │               │  │                │  │                       │  │
//! │  │ InvalidConfig │  │ DiscoverySetup │  │ ClientError::         │  │
//! │  │ ConfigLoad/   │  │ Database       │  │   Unreachable         │  │
//! │  │ SaveFailed    │  │ UnknownFixture │  │   Timeout             │  │
//! │  └───────────────┘  └────────────────┘  │   Parse               │  │
//! │                                         └───────────────────────┘  │
//! │                                                                     │
//! │  Per-device errors never leave the synchronizer: they become the    │
//! │  `failed` counter plus a warn! log line. Only structural failures   │
//! │  (registry down, discovery socket unusable) reach the caller.       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Pass-level errors: configuration problems and structural failures that
/// abort a whole synchronization pass.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid bridge configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Pass-Fatal Errors
    // =========================================================================
    /// The discovery mechanism itself is unusable on this host
    /// (cannot bind a socket, cannot send the multicast probe).
    #[error("Discovery setup failed: {0}")]
    DiscoverySetup(String),

    /// Registry unavailable: nothing can be persisted.
    #[error("Database error: {0}")]
    Database(String),

    /// A fixture client was requested for an address no fixture was
    /// registered for. Surfaces test-setup mistakes immediately instead of
    /// as a confusing downstream fetch failure.
    #[error("No fixture registered for address: {0}")]
    UnknownFixture(String),

    /// A direct device request (outside a sync pass) failed.
    #[error("Device request failed: {0}")]
    DeviceRequest(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Per-device errors from the detail client. These are recoverable within a
/// sync pass: the synchronizer logs them, counts the candidate as failed
/// and moves on.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Device unreachable (connection refused, DNS failure, reset).
    #[error("Device unreachable: {0}")]
    Unreachable(String),

    /// Per-call timeout exceeded; an unresponsive device must not stall
    /// the whole pass.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The device answered with a malformed or unexpected body.
    #[error("Unexpected response: {0}")]
    Parse(String),
}

impl ClientError {
    /// Returns true for connectivity-class failures (vs. parse failures).
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ClientError::Unreachable(_) | ClientError::Timeout(_))
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<bridge_db::DbError> for SyncError {
    fn from(err: bridge_db::DbError) -> Self {
        SyncError::Database(err.to_string())
    }
}

impl From<ClientError> for SyncError {
    fn from(err: ClientError) -> Self {
        SyncError::DeviceRequest(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        )
    }

    /// Returns true for structural failures that abort a sync pass.
    pub fn is_pass_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::DiscoverySetup(_) | SyncError::Database(_) | SyncError::UnknownFixture(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorization() {
        assert!(SyncError::InvalidConfig("bad".into()).is_config_error());
        assert!(!SyncError::InvalidConfig("bad".into()).is_pass_fatal());

        assert!(SyncError::DiscoverySetup("no socket".into()).is_pass_fatal());
        assert!(SyncError::Database("down".into()).is_pass_fatal());
    }

    #[test]
    fn test_client_error_classes() {
        assert!(ClientError::Unreachable("refused".into()).is_connectivity());
        assert!(ClientError::Timeout(3).is_connectivity());
        assert!(!ClientError::Parse("bad xml".into()).is_connectivity());
    }

    #[test]
    fn test_display_includes_address_context() {
        let err = SyncError::UnknownFixture("192.0.2.99".into());
        assert!(err.to_string().contains("192.0.2.99"));
    }
}
