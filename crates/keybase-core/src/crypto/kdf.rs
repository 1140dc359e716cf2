//! Passphrase key derivation using Argon2id.
//!
//! Keys protecting stored private keys are derived from the user's
//! passphrase with Argon2id, which is memory-hard and resistant to
//! GPU-based brute force. The parameters travel with every encrypted blob
//! so a store can raise its cost without breaking older records.

use std::fmt;
use std::str::FromStr;

use argon2::Argon2;
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

use crate::error::{KeybaseError, Result};

/// Default memory cost: 64 MiB.
pub const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
/// Default number of passes.
pub const DEFAULT_ITERATIONS: u32 = 3;
/// Default degree of parallelism.
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Largest memory cost accepted anywhere, including imported blobs (256 MiB).
pub const MAX_MEMORY_KIB: u32 = 256 * 1024;
/// Largest number of passes accepted.
pub const MAX_ITERATIONS: u32 = 16;
/// Largest degree of parallelism accepted.
pub const MAX_PARALLELISM: u32 = 16;

/// Minimum salt length in bytes.
pub const MIN_SALT_LENGTH: usize = 16;

/// Length of derived key in bytes (AES-256).
pub const KEY_LENGTH: usize = 32;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl KdfParams {
    /// Check the parameters are usable and within the accepted bounds.
    ///
    /// Parameters read from a blob are untrusted; this check runs before
    /// any hashing so a hostile cost is rejected instead of paid.
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("memory cost", self.memory_kib, MAX_MEMORY_KIB),
            ("iterations", self.iterations, MAX_ITERATIONS),
            ("parallelism", self.parallelism, MAX_PARALLELISM),
        ];
        if let Some((what, value, max)) = limits.iter().find(|(_, value, max)| value > max) {
            return Err(KeybaseError::Validation(format!(
                "KDF {} {} exceeds the maximum of {}",
                what, value, max
            )));
        }
        self.argon2_params().map(|_| ())
    }

    fn argon2_params(&self) -> Result<argon2::Params> {
        argon2::Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_LENGTH),
        )
        .map_err(|e| KeybaseError::Validation(format!("Invalid KDF parameters: {}", e)))
    }
}

impl fmt::Display for KdfParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m={},t={},p={}",
            self.memory_kib, self.iterations, self.parallelism
        )
    }
}

impl FromStr for KdfParams {
    type Err = KeybaseError;

    fn from_str(s: &str) -> Result<Self> {
        let mut memory_kib = None;
        let mut iterations = None;
        let mut parallelism = None;

        for part in s.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| KeybaseError::Validation(format!("Invalid KDF parameter: {}", part)))?;
            let value: u32 = value
                .parse()
                .map_err(|_| KeybaseError::Validation(format!("Invalid KDF value: {}", part)))?;
            match key {
                "m" => memory_kib = Some(value),
                "t" => iterations = Some(value),
                "p" => parallelism = Some(value),
                other => {
                    return Err(KeybaseError::Validation(format!(
                        "Unknown KDF parameter: {}",
                        other
                    )))
                }
            }
        }

        match (memory_kib, iterations, parallelism) {
            (Some(memory_kib), Some(iterations), Some(parallelism)) => Ok(Self {
                memory_kib,
                iterations,
                parallelism,
            }),
            _ => Err(KeybaseError::Validation(
                "KDF parameters must include m, t and p".to_string(),
            )),
        }
    }
}

/// A symmetric key derived from a passphrase.
///
/// Zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LENGTH],
}

impl DerivedKey {
    /// Get a reference to the raw key bytes.
    ///
    /// Avoid storing or logging this value.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive an encryption key from a passphrase using Argon2id.
///
/// Same passphrase, salt and parameters always produce the same key.
///
/// # Errors
///
/// Returns `KeybaseError::Validation` for an empty passphrase, a salt
/// shorter than 16 bytes or out-of-range parameters.
pub fn derive_key(passphrase: &str, salt: &[u8], params: &KdfParams) -> Result<DerivedKey> {
    if passphrase.is_empty() {
        return Err(KeybaseError::Validation(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    if salt.len() < MIN_SALT_LENGTH {
        return Err(KeybaseError::Validation(format!(
            "Salt must be at least {} bytes",
            MIN_SALT_LENGTH
        )));
    }

    params.validate()?;
    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params.argon2_params()?,
    );

    let mut key = [0u8; KEY_LENGTH];
    argon2
        .hash_password_into(passphrase.as_bytes(), salt, &mut key)
        .map_err(|e| KeybaseError::Crypto(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light() -> KdfParams {
        KdfParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_key_derivation_deterministic() {
        let salt = b"unique-salt-1234567890123456";

        let key1 = derive_key("test-passphrase", salt, &light()).unwrap();
        let key2 = derive_key("test-passphrase", salt, &light()).unwrap();

        assert_eq!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_derived_key_wipes_on_drop() {
        fn wipes_on_drop<T: ZeroizeOnDrop>() {}
        wipes_on_drop::<DerivedKey>();
    }

    #[test]
    fn test_different_salt_different_key() {
        let key1 = derive_key("test-passphrase", b"salt1-1234567890123456", &light()).unwrap();
        let key2 = derive_key("test-passphrase", b"salt2-1234567890123456", &light()).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_different_params_different_key() {
        let salt = b"fixed-salt-123456789012345";
        let heavier = KdfParams {
            iterations: 2,
            ..light()
        };

        let key1 = derive_key("passphrase", salt, &light()).unwrap();
        let key2 = derive_key("passphrase", salt, &heavier).unwrap();

        assert_ne!(key1.as_bytes(), key2.as_bytes());
    }

    #[test]
    fn test_empty_passphrase_rejected() {
        let result = derive_key("", b"salt-1234567890123456", &light());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Passphrase cannot be empty"));
    }

    #[test]
    fn test_short_salt_rejected() {
        let result = derive_key("test-passphrase", b"short", &light());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Salt must be at least 16 bytes"));
    }

    #[test]
    fn test_oversized_memory_rejected() {
        let params = KdfParams {
            memory_kib: MAX_MEMORY_KIB + 1,
            ..light()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_cost_ceilings() {
        assert!(KdfParams::default().validate().is_ok());
        for params in [
            KdfParams { iterations: 4_000_000_000, ..light() },
            KdfParams { iterations: MAX_ITERATIONS + 1, ..light() },
            KdfParams { parallelism: MAX_PARALLELISM + 1, memory_kib: 8 * 1024, ..light() },
        ] {
            assert!(matches!(params.validate(), Err(KeybaseError::Validation(_))), "{}", params);
        }
        let at_limit = KdfParams {
            memory_kib: MAX_MEMORY_KIB,
            iterations: MAX_ITERATIONS,
            parallelism: MAX_PARALLELISM,
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_huge_iterations_fail_without_hashing() {
        let params = KdfParams { iterations: 4_000_000_000, ..light() };
        let started = std::time::Instant::now();
        assert!(derive_key("passphrase", b"salt-1234567890123456", &params).is_err());
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_params_text_round_trip() {
        let params = KdfParams::default();
        let text = params.to_string();
        assert_eq!(text, "m=65536,t=3,p=1");
        assert_eq!(text.parse::<KdfParams>().unwrap(), params);
        assert!("m=1,t=2".parse::<KdfParams>().is_err());
        assert!("m=1,t=2,p=1,x=4".parse::<KdfParams>().is_err());
    }

    #[test]
    fn test_derived_key_debug_redacts() {
        let key = derive_key("test-passphrase", b"salt-1234567890123456", &light()).unwrap();

        let debug_output = format!("{:?}", key);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains(&hex::encode(&key.as_bytes()[..4])));
    }
}
