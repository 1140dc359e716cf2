//! Signing algorithms, key types and addresses.
//!
//! Public keys have one canonical byte encoding used for armor bodies,
//! storage and address derivation:
//!
//! ```text
//! 0x01 || compressed secp256k1 point (33 bytes)
//! 0x02 || ed25519 point (32 bytes)
//! 0x03 || threshold (u32 BE) || count (u32 BE) || { len (u16 BE) || member }*
//! ```

use std::fmt;
use std::str::FromStr;

use k256::ecdsa::signature::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{KeybaseError, Result};

/// Length of an address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Length of a raw private key in bytes (both algorithms).
pub const PRIVATE_KEY_LENGTH: usize = 32;

/// Maximum number of members in a multisig composite.
pub const MAX_MULTISIG_KEYS: usize = 64;

const TAG_SECP256K1: u8 = 0x01;
const TAG_ED25519: u8 = 0x02;
const TAG_MULTISIG: u8 = 0x03;

/// Supported signing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningAlgo {
    Secp256k1,
    Ed25519,
}

impl SigningAlgo {
    pub fn as_str(&self) -> &'static str {
        match self {
            SigningAlgo::Secp256k1 => "secp256k1",
            SigningAlgo::Ed25519 => "ed25519",
        }
    }
}

impl fmt::Display for SigningAlgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningAlgo {
    type Err = KeybaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "secp256k1" => Ok(SigningAlgo::Secp256k1),
            "ed25519" => Ok(SigningAlgo::Ed25519),
            other => Err(KeybaseError::Validation(format!(
                "Unsupported signing algorithm: {}",
                other
            ))),
        }
    }
}

/// An account address: the first 20 bytes of SHA-256 over the canonical
/// public key encoding.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    pub fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = KeybaseError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| KeybaseError::Validation(format!("Invalid address hex: {}", e)))?;
        let bytes: [u8; ADDRESS_LENGTH] = bytes.try_into().map_err(|_| {
            KeybaseError::Validation(format!("Address must be {} bytes", ADDRESS_LENGTH))
        })?;
        Ok(Self(bytes))
    }
}

/// A threshold composite of single public keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigThreshold {
    threshold: u32,
    keys: Vec<PublicKey>,
}

impl MultisigThreshold {
    /// Build a composite requiring `threshold` of the ordered `keys`.
    ///
    /// # Errors
    ///
    /// Returns `KeybaseError::Validation` if the threshold is zero or larger
    /// than the member count, if there are no or too many members, or if a
    /// member is itself a composite.
    pub fn new(threshold: u32, keys: Vec<PublicKey>) -> Result<Self> {
        if keys.is_empty() || keys.len() > MAX_MULTISIG_KEYS {
            return Err(KeybaseError::Validation(format!(
                "Multisig must have between 1 and {} keys",
                MAX_MULTISIG_KEYS
            )));
        }
        if threshold == 0 || threshold as usize > keys.len() {
            return Err(KeybaseError::Validation(format!(
                "Multisig threshold must be between 1 and {}",
                keys.len()
            )));
        }
        if keys.iter().any(|key| matches!(key, PublicKey::Multisig(_))) {
            return Err(KeybaseError::Validation(
                "Multisig members cannot be composites".to_string(),
            ));
        }
        Ok(Self { threshold, keys })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn keys(&self) -> &[PublicKey] {
        &self.keys
    }
}

/// A public key of any supported kind.
#[derive(Clone, PartialEq, Eq)]
pub enum PublicKey {
    Secp256k1(k256::ecdsa::VerifyingKey),
    Ed25519(ed25519_dalek::VerifyingKey),
    Multisig(MultisigThreshold),
}

impl PublicKey {
    /// Signing algorithm of a single key; `None` for composites.
    pub fn algo(&self) -> Option<SigningAlgo> {
        match self {
            PublicKey::Secp256k1(_) => Some(SigningAlgo::Secp256k1),
            PublicKey::Ed25519(_) => Some(SigningAlgo::Ed25519),
            PublicKey::Multisig(_) => None,
        }
    }

    /// Name of the key type as written in armor headers.
    pub fn type_name(&self) -> &'static str {
        match self.algo() {
            Some(algo) => algo.as_str(),
            None => "multisig",
        }
    }

    /// Canonical byte encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::Secp256k1(key) => {
                let point = key.to_encoded_point(true);
                let mut out = Vec::with_capacity(1 + point.len());
                out.push(TAG_SECP256K1);
                out.extend_from_slice(point.as_bytes());
                out
            }
            PublicKey::Ed25519(key) => {
                let mut out = Vec::with_capacity(33);
                out.push(TAG_ED25519);
                out.extend_from_slice(key.as_bytes());
                out
            }
            PublicKey::Multisig(multi) => {
                let mut out = vec![TAG_MULTISIG];
                out.extend_from_slice(&multi.threshold.to_be_bytes());
                out.extend_from_slice(&(multi.keys.len() as u32).to_be_bytes());
                for key in &multi.keys {
                    let member = key.to_bytes();
                    out.extend_from_slice(&(member.len() as u16).to_be_bytes());
                    out.extend_from_slice(&member);
                }
                out
            }
        }
    }

    /// Decode the canonical byte encoding, validating every point.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (tag, rest) = bytes
            .split_first()
            .ok_or_else(|| KeybaseError::Validation("Empty public key".to_string()))?;

        match *tag {
            TAG_SECP256K1 => k256::ecdsa::VerifyingKey::from_sec1_bytes(rest)
                .map(PublicKey::Secp256k1)
                .map_err(|_| KeybaseError::Validation("Invalid secp256k1 public key".to_string())),
            TAG_ED25519 => {
                let raw: [u8; 32] = rest.try_into().map_err(|_| {
                    KeybaseError::Validation("ed25519 public key must be 32 bytes".to_string())
                })?;
                ed25519_dalek::VerifyingKey::from_bytes(&raw)
                    .map(PublicKey::Ed25519)
                    .map_err(|_| KeybaseError::Validation("Invalid ed25519 public key".to_string()))
            }
            TAG_MULTISIG => decode_multisig(rest).map(PublicKey::Multisig),
            other => Err(KeybaseError::Validation(format!(
                "Unknown public key tag: {:#04x}",
                other
            ))),
        }
    }

    /// Derive the address of this key.
    pub fn address(&self) -> Address {
        let digest = Sha256::digest(self.to_bytes());
        let mut out = [0u8; ADDRESS_LENGTH];
        out.copy_from_slice(&digest[..ADDRESS_LENGTH]);
        Address(out)
    }

    /// Verify a signature over `msg`.
    ///
    /// Composite keys have no single-signature form and never verify.
    pub fn verify(&self, msg: &[u8], signature: &[u8]) -> bool {
        match self {
            PublicKey::Secp256k1(key) => k256::ecdsa::Signature::from_slice(signature)
                .map(|sig| key.verify(msg, &sig).is_ok())
                .unwrap_or(false),
            PublicKey::Ed25519(key) => ed25519_dalek::Signature::from_slice(signature)
                .map(|sig| key.verify(msg, &sig).is_ok())
                .unwrap_or(false),
            PublicKey::Multisig(_) => false,
        }
    }
}

fn decode_multisig(bytes: &[u8]) -> Result<MultisigThreshold> {
    let invalid = || KeybaseError::Validation("Malformed multisig public key".to_string());

    if bytes.len() < 8 {
        return Err(invalid());
    }
    let threshold = u32::from_be_bytes(bytes[0..4].try_into().map_err(|_| invalid())?);
    let count = u32::from_be_bytes(bytes[4..8].try_into().map_err(|_| invalid())?) as usize;
    if count > MAX_MULTISIG_KEYS {
        return Err(invalid());
    }

    let mut keys = Vec::with_capacity(count);
    let mut rest = &bytes[8..];
    for _ in 0..count {
        if rest.len() < 2 {
            return Err(invalid());
        }
        let len = u16::from_be_bytes([rest[0], rest[1]]) as usize;
        rest = &rest[2..];
        if rest.len() < len {
            return Err(invalid());
        }
        let member = &rest[..len];
        if member.first() == Some(&TAG_MULTISIG) {
            return Err(KeybaseError::Validation(
                "Multisig members cannot be composites".to_string(),
            ));
        }
        keys.push(PublicKey::from_bytes(member)?);
        rest = &rest[len..];
    }
    if !rest.is_empty() {
        return Err(invalid());
    }

    MultisigThreshold::new(threshold, keys)
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}:{})", self.type_name(), hex::encode(self.to_bytes()))
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(self.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(serde::de::Error::custom)?;
        PublicKey::from_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// A private key of a supported algorithm.
///
/// Key material is zeroized by the underlying types when dropped.
#[derive(Clone)]
pub enum PrivateKey {
    Secp256k1(k256::ecdsa::SigningKey),
    Ed25519(ed25519_dalek::SigningKey),
}

impl PrivateKey {
    /// Rebuild a private key from its 32 raw bytes.
    pub fn from_bytes(algo: SigningAlgo, bytes: &[u8]) -> Result<Self> {
        match algo {
            SigningAlgo::Secp256k1 => k256::ecdsa::SigningKey::from_slice(bytes)
                .map(PrivateKey::Secp256k1)
                .map_err(|_| KeybaseError::Validation("Invalid secp256k1 private key".to_string())),
            SigningAlgo::Ed25519 => {
                let raw: &[u8; PRIVATE_KEY_LENGTH] = bytes.try_into().map_err(|_| {
                    KeybaseError::Validation(format!(
                        "ed25519 private key must be {} bytes",
                        PRIVATE_KEY_LENGTH
                    ))
                })?;
                Ok(PrivateKey::Ed25519(ed25519_dalek::SigningKey::from_bytes(
                    raw,
                )))
            }
        }
    }

    /// Raw private key bytes.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        match self {
            PrivateKey::Secp256k1(key) => Zeroizing::new(key.to_bytes().to_vec()),
            PrivateKey::Ed25519(key) => Zeroizing::new(key.to_bytes().to_vec()),
        }
    }

    pub fn algo(&self) -> SigningAlgo {
        match self {
            PrivateKey::Secp256k1(_) => SigningAlgo::Secp256k1,
            PrivateKey::Ed25519(_) => SigningAlgo::Ed25519,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            PrivateKey::Secp256k1(key) => PublicKey::Secp256k1(*key.verifying_key()),
            PrivateKey::Ed25519(key) => PublicKey::Ed25519(key.verifying_key()),
        }
    }

    /// Sign `msg`.
    ///
    /// secp256k1 produces a 64-byte `r || s` ECDSA signature over SHA-256
    /// with low-S normalization; ed25519 produces a 64-byte signature.
    pub fn sign(&self, msg: &[u8]) -> Vec<u8> {
        match self {
            PrivateKey::Secp256k1(key) => {
                let signature: k256::ecdsa::Signature = key.sign(msg);
                let signature = signature.normalize_s().unwrap_or(signature);
                signature.to_bytes().to_vec()
            }
            PrivateKey::Ed25519(key) => key.sign(msg).to_bytes().to_vec(),
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algo", &self.algo())
            .field("key", &"[REDACTED]")
            .finish()
    }
}
