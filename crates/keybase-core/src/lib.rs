//! # Keybase Core
//!
//! A persistent, named registry of signing keys.
//!
//! Keys are created from BIP39 mnemonics along BIP44 paths, imported from
//! armored text, registered as public-key-only or multisig records, or
//! delegated to a hardware wallet. Local private keys are stored encrypted
//! under a passphrase and are only ever decrypted for the duration of a
//! single call.
//!
//! ## Architecture
//!
//! - **crypto**: mnemonics, HD derivation, keys, addresses and key encryption
//! - **record**: the persisted key record and its kinds
//! - **armor**: ASCII armor for exported keys and records
//! - **storage**: storage engine trait, SQLite backend and scoped handles
//! - **registry**: records by name with an address index
//! - **hardware**: the hardware wallet seam
//! - **keybase**: the facade every caller goes through

pub mod armor;
pub mod config;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod hardware;
pub mod keybase;
pub mod record;
pub mod registry;
pub mod storage;

pub use armor::{decode_armor, encode_armor, ArmorEnvelope, ArmorKind};
pub use config::{KeybaseConfig, KeybaseOptions};
pub use crypto::{
    Address, DerivationPath, KdfParams, Language, Mnemonic, MultisigThreshold, PrivateKey,
    PublicKey, SigningAlgo,
};
pub use error::{HardwareError, KeybaseError, Result};
pub use hardware::HardwareWallet;
pub use keybase::Keybase;
pub use record::{KeyRecord, KeyType, RecordKind};
pub use storage::{SqliteStorage, StorageEngine};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
