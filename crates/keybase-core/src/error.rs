//! Error types for keybase operations.
//!
//! Every facade operation reports failures through [`KeybaseError`]. The
//! variants are coarse on purpose where secrets are involved: a wrong
//! passphrase and a tampered ciphertext both surface as
//! [`KeybaseError::Authentication`].

use std::time::Duration;

use thiserror::Error;

/// Result type alias for keybase operations.
pub type Result<T> = std::result::Result<T, KeybaseError>;

/// Core error type for keybase operations.
#[derive(Debug, Error)]
pub enum KeybaseError {
    /// Storage backend could not be opened, read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Store is held exclusively by another handle
    #[error("Storage busy: {0}")]
    StorageBusy(String),

    /// No record for the given name or address
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record with this name already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Passphrase did not authenticate the encrypted key
    #[error("Authentication failed: invalid passphrase or corrupted key")]
    Authentication,

    /// Armored text is malformed or fails its checksum
    #[error("Format error: {0}")]
    Format(String),

    /// Malformed mnemonic, derivation path, algorithm or key
    #[error("Validation error: {0}")]
    Validation(String),

    /// The record kind cannot support the requested operation
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// The OS entropy source failed
    #[error("Entropy source failure: {0}")]
    Entropy(String),

    /// Key derivation or cipher setup failed
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Error reported by the hardware wallet collaborator
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

impl KeybaseError {
    /// Whether the caller may retry the same call after a backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            KeybaseError::StorageBusy(_) | KeybaseError::Hardware(HardwareError::Timeout(_))
        )
    }
}

/// Errors surfaced by a hardware wallet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HardwareError {
    /// No device is attached or reachable
    #[error("Hardware wallet not connected: {0}")]
    NotConnected(String),

    /// The user declined the request on the device
    #[error("Hardware wallet rejected the request: {0}")]
    Rejected(String),

    /// The device did not answer in time
    #[error("Hardware wallet timed out after {0:?}")]
    Timeout(Duration),

    /// Any other device-reported failure
    #[error("Hardware wallet error: {0}")]
    Device(String),
}

impl From<std::io::Error> for KeybaseError {
    fn from(err: std::io::Error) -> Self {
        KeybaseError::Storage(err.to_string())
    }
}

impl From<rusqlite::Error> for KeybaseError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
                KeybaseError::StorageBusy(err.to_string())
            }
            _ => KeybaseError::Storage(format!("SQLite error: {}", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(KeybaseError::StorageBusy("locked".to_string()).is_retryable());
        assert!(
            KeybaseError::Hardware(HardwareError::Timeout(Duration::from_secs(1))).is_retryable()
        );
        assert!(!KeybaseError::Authentication.is_retryable());
        assert!(!KeybaseError::Hardware(HardwareError::Rejected("no".to_string())).is_retryable());
    }

    #[test]
    fn test_authentication_message_is_generic() {
        let message = KeybaseError::Authentication.to_string();
        assert!(message.contains("invalid passphrase or corrupted key"));
    }

    #[test]
    fn test_sqlite_busy_maps_to_storage_busy() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".to_string()),
        );
        assert!(matches!(
            KeybaseError::from(err),
            KeybaseError::StorageBusy(_)
        ));
    }
}
