//! # Domain Error Types
//!
//! Validation errors for pure domain rules. I/O layers define their own
//! error types (`DbError` in bridge-db, `SyncError` in bridge-sync) and
//! convert as needed.

use thiserror::Error;

/// Result type for domain validation.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors for domain-level rule violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Preset slot outside the range of physical buttons.
    #[error("Invalid preset slot {0}: must be between 1 and 6")]
    InvalidPresetSlot(u16),

    /// A candidate address was empty or blank.
    #[error("Device address must not be empty")]
    EmptyAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::InvalidPresetSlot(9);
        assert!(err.to_string().contains('9'));
        assert!(err.to_string().contains('6'));
    }
}
