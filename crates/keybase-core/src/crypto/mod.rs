//! Cryptographic primitives for the keybase.
//!
//! - [`mnemonic`]: BIP39 phrase generation, parsing and seed derivation
//! - [`hd`]: BIP32 / SLIP-0010 derivation along BIP44 paths
//! - [`keys`]: signing algorithms, private and public keys, addresses
//! - [`kdf`]: Argon2id passphrase key derivation
//! - [`cipher`]: AES-256-GCM sealing of private keys at rest
//! - [`passphrase`]: rules for newly chosen passphrases

pub mod cipher;
pub mod hd;
pub mod kdf;
pub mod keys;
pub mod mnemonic;
pub mod passphrase;

pub use cipher::{decrypt_private_key, encrypt_private_key, EncryptedKey};
pub use hd::{derive_key_pair, ChildIndex, DerivationPath, DEFAULT_COIN_TYPE};
pub use kdf::{derive_key, DerivedKey, KdfParams};
pub use keys::{Address, MultisigThreshold, PrivateKey, PublicKey, SigningAlgo};
pub use mnemonic::{generate_mnemonic, mnemonic_to_seed, Language, Mnemonic};
pub use passphrase::validate_passphrase;
