//! Key records.
//!
//! A [`KeyRecord`] is the unit of storage: a unique name, a public key and
//! a [`RecordKind`] saying where the private half lives. The address is
//! always recomputed from the public key and never stored in the record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::crypto::{Address, DerivationPath, EncryptedKey, PublicKey, SigningAlgo};
use crate::error::{KeybaseError, Result};

/// Maximum length of a record name in bytes.
pub const MAX_NAME_LENGTH: usize = 128;

/// Where the private key of a record lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RecordKind {
    /// Private key held in this store, encrypted under a passphrase
    Local { encrypted_key: EncryptedKey },
    /// Private key held by a hardware wallet at a fixed path
    Ledger { path: DerivationPath },
    /// Public key only
    Offline,
    /// Threshold composite of public keys
    Multisig,
}

/// Kind discriminant without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    Local,
    Ledger,
    Offline,
    Multisig,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Local => "local",
            KeyType::Ledger => "ledger",
            KeyType::Offline => "offline",
            KeyType::Multisig => "multisig",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named key stored in the keybase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    name: String,
    public_key: PublicKey,
    #[serde(flatten)]
    kind: RecordKind,
}

impl KeyRecord {
    /// A record whose encrypted private key is kept in the store.
    pub fn local(name: &str, public_key: PublicKey, encrypted_key: EncryptedKey) -> Result<Self> {
        require_single(&public_key, KeyType::Local)?;
        Self::new(name, public_key, RecordKind::Local { encrypted_key })
    }

    /// A record that delegates signing to a hardware wallet.
    pub fn ledger(name: &str, public_key: PublicKey, path: DerivationPath) -> Result<Self> {
        require_single(&public_key, KeyType::Ledger)?;
        Self::new(name, public_key, RecordKind::Ledger { path })
    }

    /// A public-key-only record.
    pub fn offline(name: &str, public_key: PublicKey) -> Result<Self> {
        Self::new(name, public_key, RecordKind::Offline)
    }

    /// A multisig record. The key must be a composite.
    pub fn multisig(name: &str, public_key: PublicKey) -> Result<Self> {
        if !matches!(public_key, PublicKey::Multisig(_)) {
            return Err(KeybaseError::Validation(
                "Multisig records require a composite public key".to_string(),
            ));
        }
        Self::new(name, public_key, RecordKind::Multisig)
    }

    fn new(name: &str, public_key: PublicKey, kind: RecordKind) -> Result<Self> {
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            public_key,
            kind,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn kind(&self) -> &RecordKind {
        &self.kind
    }

    pub fn key_type(&self) -> KeyType {
        match self.kind {
            RecordKind::Local { .. } => KeyType::Local,
            RecordKind::Ledger { .. } => KeyType::Ledger,
            RecordKind::Offline => KeyType::Offline,
            RecordKind::Multisig => KeyType::Multisig,
        }
    }

    /// Signing algorithm, `None` for multisig composites.
    pub fn algo(&self) -> Option<SigningAlgo> {
        self.public_key.algo()
    }

    pub fn address(&self) -> Address {
        self.public_key.address()
    }

    /// Derivation path for hardware-backed records.
    pub fn path(&self) -> Option<&DerivationPath> {
        match &self.kind {
            RecordKind::Ledger { path } => Some(path),
            _ => None,
        }
    }

    /// Same record under a different name.
    pub fn renamed(mut self, name: &str) -> Result<Self> {
        validate_name(name)?;
        self.name = name.to_string();
        Ok(self)
    }

    /// Same record with a replacement encrypted key.
    ///
    /// # Errors
    ///
    /// `UnsupportedOperation` unless the record is `Local`.
    pub fn with_encrypted_key(mut self, encrypted_key: EncryptedKey) -> Result<Self> {
        match &mut self.kind {
            RecordKind::Local { encrypted_key: slot } => {
                *slot = encrypted_key;
                Ok(self)
            }
            _ => Err(KeybaseError::UnsupportedOperation(format!(
                "'{}' is a {} key and holds no private key",
                self.name,
                self.key_type()
            ))),
        }
    }

    /// Stored encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| KeybaseError::Storage(format!("Failed to encode record: {}", e)))
    }

    /// Decode the stored encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let record: Self = serde_json::from_slice(bytes)
            .map_err(|e| KeybaseError::Storage(format!("Corrupted key record: {}", e)))?;
        validate_name(&record.name)?;
        Ok(record)
    }
}

/// Check a record name is usable.
///
/// Names must be non-blank, at most 128 bytes and free of control
/// characters.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(KeybaseError::Validation(
            "Key name cannot be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(KeybaseError::Validation(format!(
            "Key name too long (max {} bytes)",
            MAX_NAME_LENGTH
        )));
    }
    if name.chars().any(char::is_control) {
        return Err(KeybaseError::Validation(
            "Key name cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}

fn require_single(public_key: &PublicKey, key_type: KeyType) -> Result<()> {
    if matches!(public_key, PublicKey::Multisig(_)) {
        return Err(KeybaseError::Validation(format!(
            "{} records cannot hold a composite public key",
            key_type
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{encrypt_private_key, KdfParams, MultisigThreshold, PrivateKey};

    fn light() -> KdfParams {
        KdfParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn key(byte: u8) -> PrivateKey {
        PrivateKey::from_bytes(SigningAlgo::Secp256k1, &[byte; 32]).unwrap()
    }

    fn multi() -> PublicKey {
        PublicKey::Multisig(
            MultisigThreshold::new(1, vec![key(1).public_key(), key(2).public_key()]).unwrap(),
        )
    }

    #[test]
    fn test_record_bytes_round_trip_for_every_kind() {
        let private = key(7);
        let blob = encrypt_private_key(&private.to_bytes(), "pw", &light()).unwrap();
        let path = DerivationPath::bip44(118, 0, 0).unwrap();

        let records = vec![
            KeyRecord::local("a", private.public_key(), blob).unwrap(),
            KeyRecord::ledger("b", private.public_key(), path).unwrap(),
            KeyRecord::offline("c", private.public_key()).unwrap(),
            KeyRecord::multisig("d", multi()).unwrap(),
        ];

        for record in records {
            let back = KeyRecord::from_bytes(&record.to_bytes().unwrap()).unwrap();
            assert_eq!(back, record);
            assert_eq!(back.address(), record.public_key().address());
        }
    }

    #[test]
    fn test_stored_form_is_tagged() {
        let record = KeyRecord::offline("carol", key(3).public_key()).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&record.to_bytes().unwrap()).unwrap();
        assert_eq!(json["type"], "offline");
        assert_eq!(json["name"], "carol");
        assert!(json.get("address").is_none());
    }

    #[test]
    fn test_kind_constructors_validate_key_shape() {
        assert!(KeyRecord::multisig("m", key(1).public_key()).is_err());
        assert!(KeyRecord::ledger("l", multi(), DerivationPath::bip44(118, 0, 0).unwrap()).is_err());
        assert!(KeyRecord::offline("o", multi()).is_ok());
    }

    #[test]
    fn test_names_validated() {
        assert!(KeyRecord::offline("", key(1).public_key()).is_err());
        assert!(KeyRecord::offline("   ", key(1).public_key()).is_err());
        assert!(KeyRecord::offline("bad\nname", key(1).public_key()).is_err());
        assert!(KeyRecord::offline(&"x".repeat(MAX_NAME_LENGTH + 1), key(1).public_key()).is_err());
        assert!(KeyRecord::offline("alice's key", key(1).public_key()).is_ok());
    }

    #[test]
    fn test_renamed_keeps_key() {
        let record = KeyRecord::offline("alice", key(1).public_key()).unwrap();
        let renamed = record.clone().renamed("alice2").unwrap();
        assert_eq!(renamed.name(), "alice2");
        assert_eq!(renamed.public_key(), record.public_key());
    }

    #[test]
    fn test_with_encrypted_key_requires_local() {
        let blob = encrypt_private_key(&[1u8; 32], "pw", &light()).unwrap();
        let offline = KeyRecord::offline("bob", key(1).public_key()).unwrap();
        assert!(matches!(
            offline.with_encrypted_key(blob),
            Err(KeybaseError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_corrupted_bytes_rejected() {
        assert!(matches!(
            KeyRecord::from_bytes(b"{not json"),
            Err(KeybaseError::Storage(_))
        ));
    }
}
