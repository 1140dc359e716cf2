//! Private key encryption at rest.
//!
//! A private key is sealed with AES-256-GCM under a key derived from the
//! passphrase with Argon2id. Every call draws a fresh salt and nonce, so
//! encrypting the same key twice never yields the same blob.

use std::fmt;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::kdf::{derive_key, KdfParams};
use crate::error::{KeybaseError, Result};

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;

/// AES-GCM nonce length in bytes.
pub const NONCE_LENGTH: usize = 12;

/// AES-GCM authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;

/// An encrypted private key together with everything needed to open it
/// except the passphrase.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedKey {
    /// Argon2id parameters used to derive the sealing key
    pub kdf: KdfParams,
    /// Argon2id salt
    #[serde(with = "hex::serde")]
    pub salt: Vec<u8>,
    /// AES-GCM nonce
    #[serde(with = "hex::serde")]
    pub nonce: Vec<u8>,
    /// Ciphertext followed by the authentication tag
    #[serde(with = "hex::serde")]
    pub ciphertext: Vec<u8>,
}

impl fmt::Debug for EncryptedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptedKey")
            .field("kdf", &self.kdf)
            .field("salt", &hex::encode(&self.salt))
            .field("nonce", &hex::encode(&self.nonce))
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

/// Fill a fixed-size buffer from the OS entropy source.
pub(crate) fn random_bytes<const N: usize>() -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| KeybaseError::Entropy(e.to_string()))?;
    Ok(buf)
}

/// Encrypt private key bytes under a passphrase.
///
/// # Errors
///
/// Returns `KeybaseError::Validation` for an empty passphrase or invalid
/// KDF parameters, and `KeybaseError::Entropy` if the OS cannot supply
/// randomness.
pub fn encrypt_private_key(
    secret: &[u8],
    passphrase: &str,
    kdf: &KdfParams,
) -> Result<EncryptedKey> {
    let salt = random_bytes::<SALT_LENGTH>()?;
    let nonce = random_bytes::<NONCE_LENGTH>()?;
    let key = derive_key(passphrase, &salt, kdf)?;

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| KeybaseError::Crypto(format!("Failed to create cipher: {}", e)))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), secret)
        .map_err(|e| KeybaseError::Crypto(format!("Encryption failed: {}", e)))?;

    Ok(EncryptedKey {
        kdf: *kdf,
        salt: salt.to_vec(),
        nonce: nonce.to_vec(),
        ciphertext,
    })
}

/// Decrypt private key bytes with a passphrase.
///
/// Fails closed: a wrong passphrase, a tampered ciphertext and a malformed
/// blob all return the same `KeybaseError::Authentication`.
pub fn decrypt_private_key(blob: &EncryptedKey, passphrase: &str) -> Result<Zeroizing<Vec<u8>>> {
    if blob.salt.len() != SALT_LENGTH
        || blob.nonce.len() != NONCE_LENGTH
        || blob.ciphertext.len() < TAG_LENGTH
        || blob.kdf.validate().is_err()
    {
        return Err(KeybaseError::Authentication);
    }

    let key = derive_key(passphrase, &blob.salt, &blob.kdf)
        .map_err(|_| KeybaseError::Authentication)?;
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| KeybaseError::Authentication)?;

    cipher
        .decrypt(Nonce::from_slice(&blob.nonce), blob.ciphertext.as_slice())
        .map(Zeroizing::new)
        .map_err(|_| KeybaseError::Authentication)
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

    const SECRET: [u8; 32] = [7u8; 32];

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let blob = encrypt_private_key(&SECRET, "correct horse", &light()).unwrap();
        let plain = decrypt_private_key(&blob, "correct horse").unwrap();
        assert_eq!(plain.as_slice(), &SECRET);
    }

    #[test]
    fn test_encryption_is_not_deterministic() {
        let first = encrypt_private_key(&SECRET, "correct horse", &light()).unwrap();
        let second = encrypt_private_key(&SECRET, "correct horse", &light()).unwrap();

        assert_ne!(first.salt, second.salt);
        assert_ne!(first.nonce, second.nonce);
        assert_ne!(first.ciphertext, second.ciphertext);
        assert_eq!(
            decrypt_private_key(&first, "correct horse").unwrap().as_slice(),
            decrypt_private_key(&second, "correct horse").unwrap().as_slice()
        );
    }

    #[test]
    fn test_ciphertext_does_not_contain_secret() {
        let blob = encrypt_private_key(&SECRET, "correct horse", &light()).unwrap();
        assert_eq!(blob.ciphertext.len(), SECRET.len() + TAG_LENGTH);
        assert!(!blob
            .ciphertext
            .windows(SECRET.len())
            .any(|window| window == SECRET));
    }

    #[test]
    fn test_wrong_passphrase_fails_closed() {
        let blob = encrypt_private_key(&SECRET, "correct horse", &light()).unwrap();
        for wrong in ["wrong horse", "", "correct horse "] {
            assert!(matches!(
                decrypt_private_key(&blob, wrong),
                Err(KeybaseError::Authentication)
            ));
        }
    }

    #[test]
    fn test_tampered_blob_fails_closed() {
        let blob = encrypt_private_key(&SECRET, "correct horse", &light()).unwrap();

        let mut flipped = blob.clone();
        flipped.ciphertext[0] ^= 0x01;
        assert!(matches!(
            decrypt_private_key(&flipped, "correct horse"),
            Err(KeybaseError::Authentication)
        ));

        let mut short_nonce = blob.clone();
        short_nonce.nonce.truncate(4);
        assert!(matches!(
            decrypt_private_key(&short_nonce, "correct horse"),
            Err(KeybaseError::Authentication)
        ));

        let mut bad_kdf = blob;
        bad_kdf.kdf.iterations = 0;
        assert!(matches!(
            decrypt_private_key(&bad_kdf, "correct horse"),
            Err(KeybaseError::Authentication)
        ));
    }

    #[test]
    fn test_excessive_kdf_cost_fails_closed_immediately() {
        let mut blob = encrypt_private_key(&SECRET, "correct horse", &light()).unwrap();
        blob.kdf.iterations = 4_000_000_000;

        let started = std::time::Instant::now();
        assert!(matches!(
            decrypt_private_key(&blob, "correct horse"),
            Err(KeybaseError::Authentication)
        ));
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_empty_passphrase_rejected_on_encrypt() {
        assert!(matches!(
            encrypt_private_key(&SECRET, "", &light()),
            Err(KeybaseError::Validation(_))
        ));
    }

    #[test]
    fn test_debug_hides_ciphertext() {
        let blob = encrypt_private_key(&SECRET, "correct horse", &light()).unwrap();
        let debug_output = format!("{:?}", blob);
        assert!(debug_output.contains("ciphertext_len"));
        assert!(!debug_output.contains(&hex::encode(&blob.ciphertext)));
    }
}
