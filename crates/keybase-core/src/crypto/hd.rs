//! Hierarchical deterministic key derivation.
//!
//! secp256k1 keys follow BIP32 and accept hardened and normal segments.
//! ed25519 keys follow SLIP-0010, which only defines hardened children, so
//! every segment is hardened during derivation regardless of how the path
//! is written.

use std::fmt;
use std::str::FromStr;

use bip32::XPrv;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha512;
use zeroize::{Zeroize, Zeroizing};

use super::keys::{PrivateKey, PublicKey, SigningAlgo};
use crate::error::{KeybaseError, Result};

type HmacSha512 = Hmac<Sha512>;

/// BIP44 purpose field.
pub const BIP44_PURPOSE: u32 = 44;

/// Registered coin type used when none is configured.
pub const DEFAULT_COIN_TYPE: u32 = 118;

/// Bit marking a hardened child index.
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

const ED25519_CURVE_KEY: &[u8] = b"ed25519 seed";

/// One segment of a derivation path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChildIndex {
    pub index: u32,
    pub hardened: bool,
}

impl ChildIndex {
    pub fn normal(index: u32) -> Self {
        Self {
            index,
            hardened: false,
        }
    }

    pub fn hardened(index: u32) -> Self {
        Self {
            index,
            hardened: true,
        }
    }

    fn raw(&self, force_hardened: bool) -> u32 {
        if self.hardened || force_hardened {
            self.index | HARDENED_OFFSET
        } else {
            self.index
        }
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// A BIP44-style derivation path such as `m/44'/118'/0'/0/0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    segments: Vec<ChildIndex>,
}

impl DerivationPath {
    /// Build a path from explicit segments.
    pub fn new(segments: Vec<ChildIndex>) -> Result<Self> {
        if segments.is_empty() {
            return Err(KeybaseError::Validation(
                "Derivation path must have at least one segment".to_string(),
            ));
        }
        if let Some(bad) = segments.iter().find(|s| s.index >= HARDENED_OFFSET) {
            return Err(KeybaseError::Validation(format!(
                "Derivation index out of range: {}",
                bad.index
            )));
        }
        Ok(Self { segments })
    }

    /// `44'/coin_type'/account'/0/index`
    pub fn bip44(coin_type: u32, account: u32, index: u32) -> Result<Self> {
        Self::new(vec![
            ChildIndex::hardened(BIP44_PURPOSE),
            ChildIndex::hardened(coin_type),
            ChildIndex::hardened(account),
            ChildIndex::normal(0),
            ChildIndex::normal(index),
        ])
    }

    pub fn segments(&self) -> &[ChildIndex] {
        &self.segments
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = KeybaseError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("m/")
            .or_else(|| trimmed.strip_prefix("M/"))
            .unwrap_or(trimmed);

        let segments = body
            .split('/')
            .map(|part| {
                let (digits, hardened) = match part
                    .strip_suffix('\'')
                    .or_else(|| part.strip_suffix('h'))
                    .or_else(|| part.strip_suffix('H'))
                {
                    Some(digits) => (digits, true),
                    None => (part, false),
                };
                let index = digits.parse::<u32>().map_err(|_| {
                    KeybaseError::Validation(format!("Invalid derivation path segment: '{}'", part))
                })?;
                Ok(ChildIndex { index, hardened })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(segments)
    }
}

impl Serialize for DerivationPath {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DerivationPath {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Derive the key pair at `path` from a BIP39 seed.
///
/// Deterministic: the same seed, path and algorithm always give the same
/// keys, and distinct paths give unrelated keys.
pub fn derive_key_pair(
    seed: &[u8],
    path: &DerivationPath,
    algo: SigningAlgo,
) -> Result<(PrivateKey, PublicKey)> {
    let private = match algo {
        SigningAlgo::Secp256k1 => derive_secp256k1(seed, path)?,
        SigningAlgo::Ed25519 => derive_ed25519(seed, path)?,
    };
    let public = private.public_key();
    Ok((private, public))
}

fn derive_secp256k1(seed: &[u8], path: &DerivationPath) -> Result<PrivateKey> {
    let bip32_path = bip32::DerivationPath::from_str(&path.to_string())
        .map_err(|e| KeybaseError::Validation(format!("Invalid derivation path: {}", e)))?;
    let child = XPrv::derive_from_path(seed, &bip32_path)
        .map_err(|e| KeybaseError::Crypto(format!("BIP32 derivation failed: {}", e)))?;

    Ok(PrivateKey::Secp256k1(child.private_key().clone()))
}

fn derive_ed25519(seed: &[u8], path: &DerivationPath) -> Result<PrivateKey> {
    let (mut key, mut chain_code) = slip10_step(ED25519_CURVE_KEY, &[seed])?;

    for segment in path.segments() {
        let index = segment.raw(true).to_be_bytes();
        let (next_key, next_chain) =
            slip10_step(&chain_code[..], &[&[0x00u8][..], &key[..], &index[..]])?;
        key = next_key;
        chain_code = next_chain;
    }

    PrivateKey::from_bytes(SigningAlgo::Ed25519, &key[..])
}

/// One HMAC-SHA512 round, split into (key, chain code).
fn slip10_step(
    hmac_key: &[u8],
    data: &[&[u8]],
) -> Result<(Zeroizing<[u8; 32]>, Zeroizing<[u8; 32]>)> {
    let mut mac = <HmacSha512 as Mac>::new_from_slice(hmac_key)
        .map_err(|e| KeybaseError::Crypto(format!("HMAC setup failed: {}", e)))?;
    for chunk in data {
        mac.update(chunk);
    }
    let mut output = mac.finalize().into_bytes();

    let mut key = Zeroizing::new([0u8; 32]);
    let mut chain_code = Zeroizing::new([0u8; 32]);
    key.copy_from_slice(&output[..32]);
    chain_code.copy_from_slice(&output[32..]);
    output.as_mut_slice().zeroize();
    Ok((key, chain_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bip44_path_display() {
        let path = DerivationPath::bip44(DEFAULT_COIN_TYPE, 0, 0).unwrap();
        assert_eq!(path.to_string(), "m/44'/118'/0'/0/0");

        let path = DerivationPath::bip44(60, 2, 7).unwrap();
        assert_eq!(path.to_string(), "m/44'/60'/2'/0/7");
    }

    #[test]
    fn test_path_parse_forms() {
        let expected = DerivationPath::bip44(118, 0, 3).unwrap();
        for text in ["m/44'/118'/0'/0/3", "44'/118'/0'/0/3", "m/44h/118h/0h/0/3"] {
            assert_eq!(text.parse::<DerivationPath>().unwrap(), expected);
        }
    }

    #[test]
    fn test_path_parse_rejects_garbage() {
        for text in ["", "m/", "m/44'/x/0", "m/44''/0", "m/2147483648", "m//0"] {
            assert!(
                text.parse::<DerivationPath>().is_err(),
                "{} should be rejected",
                text
            );
        }
    }

    #[test]
    fn test_path_serde_as_string() {
        let path = DerivationPath::bip44(118, 1, 2).unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"m/44'/118'/1'/0/2\"");
        assert_eq!(serde_json::from_str::<DerivationPath>(&json).unwrap(), path);
    }

    #[test]
    fn test_secp256k1_matches_bip32_vector() {
        // BIP32 test vector 1, chain m/0'/1
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let path: DerivationPath = "m/0'/1".parse().unwrap();
        let (private, _) = derive_key_pair(&seed, &path, SigningAlgo::Secp256k1).unwrap();
        assert_eq!(
            hex::encode(&*private.to_bytes()),
            "3c6cb8d0f6a264c91ea8b5030fadaa8e538b020f0a387421a12de9319dc93368"
        );
    }

    #[test]
    fn test_ed25519_matches_slip10_vector() {
        // SLIP-0010 ed25519 test vector 1, chain m/0'
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let path: DerivationPath = "m/0'".parse().unwrap();
        let (private, _) = derive_key_pair(&seed, &path, SigningAlgo::Ed25519).unwrap();
        assert_eq!(
            hex::encode(&*private.to_bytes()),
            "68e0fe46dfb67e368c75379acec591dad19df3cde26e63b93a8e704f1dade7a3"
        );
    }

    #[test]
    fn test_ed25519_hardens_every_segment() {
        let seed = [5u8; 64];
        let soft: DerivationPath = "m/44'/118'/0'/0/0".parse().unwrap();
        let hard: DerivationPath = "m/44'/118'/0'/0'/0'".parse().unwrap();

        let (a, _) = derive_key_pair(&seed, &soft, SigningAlgo::Ed25519).unwrap();
        let (b, _) = derive_key_pair(&seed, &hard, SigningAlgo::Ed25519).unwrap();
        assert_eq!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let seed = [9u8; 64];
        let path = DerivationPath::bip44(118, 0, 0).unwrap();
        for algo in [SigningAlgo::Secp256k1, SigningAlgo::Ed25519] {
            let (_, first) = derive_key_pair(&seed, &path, algo).unwrap();
            let (_, second) = derive_key_pair(&seed, &path, algo).unwrap();
            assert_eq!(first, second);
        }
    }
}
