//! Keybase configuration.
//!
//! Configuration is a plain value handed to [`Keybase::new`](crate::Keybase::new);
//! nothing is read from global state.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::{KdfParams, SigningAlgo, DEFAULT_COIN_TYPE};
use crate::error::{KeybaseError, Result};

/// Default hardware wallet call timeout in seconds.
pub const DEFAULT_HARDWARE_TIMEOUT_SECS: u64 = 30;

/// Where a keybase lives and how it behaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeybaseConfig {
    /// Store name inside `dir`
    pub name: String,
    /// Directory holding the store
    pub dir: PathBuf,
    #[serde(default)]
    pub options: KeybaseOptions,
}

impl KeybaseConfig {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            options: KeybaseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: KeybaseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(KeybaseError::Validation(
                "Keybase name cannot be empty".to_string(),
            ));
        }
        self.options.validate()
    }
}

/// Tunables for key creation and hardware access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybaseOptions {
    /// BIP44 coin type used for new accounts
    pub coin_type: u32,
    /// Algorithm used when the caller does not pick one
    pub default_algo: SigningAlgo,
    /// Algorithms accepted for local keys
    pub supported_algos: Vec<SigningAlgo>,
    /// Argon2id cost for keys encrypted by this store
    pub kdf: KdfParams,
    /// Upper bound on a single hardware wallet call
    pub hardware_timeout_secs: u64,
}

impl Default for KeybaseOptions {
    fn default() -> Self {
        Self {
            coin_type: DEFAULT_COIN_TYPE,
            default_algo: SigningAlgo::Secp256k1,
            supported_algos: vec![SigningAlgo::Secp256k1, SigningAlgo::Ed25519],
            kdf: KdfParams::default(),
            hardware_timeout_secs: DEFAULT_HARDWARE_TIMEOUT_SECS,
        }
    }
}

impl KeybaseOptions {
    pub fn hardware_timeout(&self) -> Duration {
        Duration::from_secs(self.hardware_timeout_secs)
    }

    /// # Errors
    ///
    /// `Validation` if `algo` is not enabled for this store.
    pub fn ensure_supported(&self, algo: SigningAlgo) -> Result<()> {
        if self.supported_algos.contains(&algo) {
            Ok(())
        } else {
            Err(KeybaseError::Validation(format!(
                "Signing algorithm {} is not supported by this keybase",
                algo
            )))
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.supported_algos.is_empty() {
            return Err(KeybaseError::Validation(
                "At least one signing algorithm must be supported".to_string(),
            ));
        }
        self.ensure_supported(self.default_algo)?;
        if self.hardware_timeout_secs == 0 {
            return Err(KeybaseError::Validation(
                "Hardware timeout must be at least one second".to_string(),
            ));
        }
        self.kdf.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KeybaseConfig::new("keys", "/tmp/keybase");
        assert_eq!(config.options.coin_type, 118);
        assert_eq!(config.options.default_algo, SigningAlgo::Secp256k1);
        assert_eq!(config.options.hardware_timeout(), Duration::from_secs(30));
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_options_fall_back_to_defaults() {
        let config: KeybaseConfig =
            serde_json::from_str(r#"{"name":"keys","dir":"/tmp/k","options":{"coin_type":60}}"#)
                .unwrap();
        assert_eq!(config.options.coin_type, 60);
        assert_eq!(config.options.kdf, KdfParams::default());

        let config: KeybaseConfig = serde_json::from_str(r#"{"name":"keys","dir":"/tmp/k"}"#).unwrap();
        assert_eq!(config.options, KeybaseOptions::default());
    }

    #[test]
    fn test_validate_rejects_inconsistent_options() {
        let options = KeybaseOptions {
            supported_algos: vec![SigningAlgo::Ed25519],
            ..KeybaseOptions::default()
        };
        assert!(options.validate().is_err());

        let options = KeybaseOptions {
            hardware_timeout_secs: 0,
            ..KeybaseOptions::default()
        };
        assert!(options.validate().is_err());

        assert!(KeybaseConfig::new(" ", "/tmp").validate().is_err());
    }
}
