//! The keybase facade.
//!
//! [`Keybase`] holds configuration and nothing else. Every public operation
//! acquires a storage handle, does its work through a [`Registry`] and
//! releases the handle before returning, so no call holds the store lock
//! longer than it runs. Expensive or slow steps (mnemonic generation, key
//! derivation, device calls) happen before the store is opened, and
//! records are written only once everything else has succeeded.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::armor::{decode_armor, encode_armor, ArmorEnvelope, ArmorKind};
use crate::config::KeybaseConfig;
use crate::crypto::{
    decrypt_private_key, derive_key_pair, encrypt_private_key, Address, DerivationPath, Language,
    Mnemonic, PrivateKey, PublicKey, SigningAlgo,
};
use crate::crypto::mnemonic::DEFAULT_STRENGTH_BITS;
use crate::error::{HardwareError, KeybaseError, Result};
use crate::hardware::{call_with_timeout, HardwareWallet};
use crate::record::{validate_name, KeyRecord, RecordKind};
use crate::registry::Registry;
use crate::storage::{with_store, SqliteStorage, StorageEngine};

/// A persistent, named registry of signing keys.
pub struct Keybase<S: StorageEngine = SqliteStorage> {
    config: KeybaseConfig,
    hardware: Option<Arc<dyn HardwareWallet>>,
    _backend: PhantomData<fn() -> S>,
}

impl Keybase<SqliteStorage> {
    /// Keybase backed by SQLite.
    ///
    /// # Errors
    ///
    /// `Validation` if the configuration is inconsistent.
    pub fn new(config: KeybaseConfig) -> Result<Self> {
        Self::with_backend(config)
    }
}

impl<S: StorageEngine> Keybase<S> {
    /// Keybase backed by any [`StorageEngine`].
    pub fn with_backend(config: KeybaseConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            hardware: None,
            _backend: PhantomData,
        })
    }

    /// Attach the hardware wallet used for `Ledger` records.
    pub fn with_hardware(mut self, wallet: Arc<dyn HardwareWallet>) -> Self {
        self.hardware = Some(wallet);
        self
    }

    pub fn config(&self) -> &KeybaseConfig {
        &self.config
    }

    fn scoped<T, F>(&self, op: &str, name: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Registry<'_, S>) -> Result<T>,
    {
        debug!(store = %self.config.name, op, name, "keybase call");
        with_store::<S, T, _>(&self.config.name, &self.config.dir, |store| {
            f(&mut Registry::new(store))
        })
    }

    fn wallet(&self) -> Result<Arc<dyn HardwareWallet>> {
        self.hardware.clone().ok_or_else(|| {
            KeybaseError::Hardware(HardwareError::NotConnected(
                "no hardware wallet configured".to_string(),
            ))
        })
    }

    fn store_new(&self, op: &str, record: KeyRecord) -> Result<KeyRecord> {
        self.scoped(op, record.name(), |registry| registry.put(&record))?;
        info!(
            name = record.name(),
            key_type = %record.key_type(),
            address = %record.address(),
            "created key"
        );
        Ok(record)
    }

    /// All records, ordered by name.
    pub fn list(&self) -> Result<Vec<KeyRecord>> {
        self.scoped("list", "", |registry| registry.list())
    }

    pub fn get(&self, name: &str) -> Result<KeyRecord> {
        self.scoped("get", name, |registry| registry.get_by_name(name))
    }

    pub fn get_by_address(&self, address: &Address) -> Result<KeyRecord> {
        self.scoped("get_by_address", "", |registry| {
            registry.get_by_address(address)
        })
    }

    /// Create a local key from a fresh 24-word mnemonic.
    ///
    /// The key sits at `44'/coin'/0'/0/0` with an empty BIP39 passphrase.
    /// The mnemonic is returned to the caller once and never stored.
    pub fn create_mnemonic(
        &self,
        name: &str,
        language: Language,
        passwd: &str,
        algo: SigningAlgo,
    ) -> Result<(KeyRecord, Mnemonic)> {
        validate_name(name)?;
        self.config.options.ensure_supported(algo)?;

        let mnemonic = Mnemonic::generate(DEFAULT_STRENGTH_BITS, language)?;
        let path = DerivationPath::bip44(self.config.options.coin_type, 0, 0)?;
        let record = self.derive_record(name, &mnemonic, "", passwd, &path, algo)?;

        let record = self.store_new("create_mnemonic", record)?;
        Ok((record, mnemonic))
    }

    /// Recover a local key from a mnemonic at `44'/coin'/account'/0/index`
    /// using the default algorithm.
    pub fn create_account(
        &self,
        name: &str,
        mnemonic: &str,
        bip39_passwd: &str,
        encrypt_passwd: &str,
        account: u32,
        index: u32,
    ) -> Result<KeyRecord> {
        let path = DerivationPath::bip44(self.config.options.coin_type, account, index)?;
        self.derive(
            name,
            mnemonic,
            bip39_passwd,
            encrypt_passwd,
            &path,
            self.config.options.default_algo,
        )
    }

    /// Recover a local key from a mnemonic at an explicit path.
    pub fn derive(
        &self,
        name: &str,
        mnemonic: &str,
        bip39_passwd: &str,
        encrypt_passwd: &str,
        path: &DerivationPath,
        algo: SigningAlgo,
    ) -> Result<KeyRecord> {
        validate_name(name)?;
        self.config.options.ensure_supported(algo)?;

        let mnemonic = Mnemonic::from_phrase(mnemonic)?;
        let record = self.derive_record(name, &mnemonic, bip39_passwd, encrypt_passwd, path, algo)?;
        self.store_new("derive", record)
    }

    fn derive_record(
        &self,
        name: &str,
        mnemonic: &Mnemonic,
        bip39_passwd: &str,
        encrypt_passwd: &str,
        path: &DerivationPath,
        algo: SigningAlgo,
    ) -> Result<KeyRecord> {
        let seed = mnemonic.to_seed(bip39_passwd);
        let (private, public) = derive_key_pair(seed.as_slice(), path, algo)?;
        let encrypted = encrypt_private_key(
            &private.to_bytes(),
            encrypt_passwd,
            &self.config.options.kdf,
        )?;
        KeyRecord::local(name, public, encrypted)
    }

    /// Register a key held by the attached hardware wallet.
    ///
    /// The device is queried before the store is opened; nothing is written
    /// if it fails, refuses or times out.
    pub fn create_ledger(
        &self,
        name: &str,
        algo: SigningAlgo,
        hrp: &str,
        account: u32,
        index: u32,
    ) -> Result<KeyRecord> {
        validate_name(name)?;
        if algo != SigningAlgo::Secp256k1 {
            return Err(KeybaseError::Validation(format!(
                "Hardware wallets only support secp256k1 keys, not {}",
                algo
            )));
        }

        let path = DerivationPath::bip44(self.config.options.coin_type, account, index)?;
        let device_path = path.clone();
        let hrp = hrp.to_string();
        let public_key = call_with_timeout(
            self.wallet()?,
            self.config.options.hardware_timeout(),
            move |wallet| wallet.get_public_key(&device_path, &hrp),
        )?;
        if public_key.algo() != Some(SigningAlgo::Secp256k1) {
            return Err(KeybaseError::Hardware(HardwareError::Device(format!(
                "device returned a {} key",
                public_key.type_name()
            ))));
        }

        self.store_new("create_ledger", KeyRecord::ledger(name, public_key, path)?)
    }

    /// Register a public key with no private half.
    pub fn create_offline(&self, name: &str, public_key: PublicKey) -> Result<KeyRecord> {
        self.store_new("create_offline", KeyRecord::offline(name, public_key)?)
    }

    /// Register a multisig composite.
    pub fn create_multi(&self, name: &str, public_key: PublicKey) -> Result<KeyRecord> {
        self.store_new("create_multi", KeyRecord::multisig(name, public_key)?)
    }

    /// Sign `msg` with the named key.
    ///
    /// Local keys are unlocked with `passphrase`; hardware-backed keys are
    /// signed on the device and ignore it.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Authentication`, hardware errors for `Ledger` records
    /// and `UnsupportedOperation` for `Offline` and `Multisig` records.
    pub fn sign(&self, name: &str, passphrase: &str, msg: &[u8]) -> Result<(Vec<u8>, PublicKey)> {
        let record = self.scoped("sign", name, |registry| registry.get_by_name(name))?;

        match record.kind() {
            RecordKind::Local { .. } => {
                let private = unlock(&record, passphrase)?;
                Ok((private.sign(msg), record.public_key().clone()))
            }
            RecordKind::Ledger { path } => {
                let path = path.clone();
                let msg = msg.to_vec();
                let signature = call_with_timeout(
                    self.wallet()?,
                    self.config.options.hardware_timeout(),
                    move |wallet| wallet.sign(&path, &msg),
                )?;
                Ok((signature, record.public_key().clone()))
            }
            RecordKind::Offline | RecordKind::Multisig => {
                Err(no_private_key(&record, "cannot sign locally"))
            }
        }
    }

    /// Re-encrypt a local key under a new passphrase.
    ///
    /// `new_pass` is called at most once, after `oldpass` authenticates.
    /// If it fails the record is left as it was. The store stays locked
    /// while it runs, so it should not wait on a person; interactive
    /// callers collect the new passphrase first and hand in a closure that
    /// returns it.
    pub fn update<F>(&self, name: &str, oldpass: &str, new_pass: F) -> Result<KeyRecord>
    where
        F: FnOnce() -> Result<String>,
    {
        let kdf = self.config.options.kdf;
        let record = self.scoped("update", name, |registry| {
            let record = registry.get_by_name(name)?;
            let private = unlock(&record, oldpass)?;
            let new_pass = new_pass()?;

            let encrypted = encrypt_private_key(&private.to_bytes(), &new_pass, &kdf)?;
            let updated = record.with_encrypted_key(encrypted)?;
            registry.overwrite(&updated)?;
            Ok(updated)
        })?;

        info!(name, "changed key passphrase");
        Ok(record)
    }

    /// Remove a record.
    ///
    /// Local keys must be unlocked with `passphrase` unless `skip_pass`.
    pub fn delete(&self, name: &str, passphrase: &str, skip_pass: bool) -> Result<()> {
        self.scoped("delete", name, |registry| {
            let record = registry.get_by_name(name)?;
            if matches!(record.kind(), RecordKind::Local { .. }) && !skip_pass {
                unlock(&record, passphrase)?;
            }
            registry.delete(name).map(|_| ())
        })?;

        info!(name, "deleted key");
        Ok(())
    }

    /// Install a record from info or public key armor.
    ///
    /// Info armor restores the exported record under `name`; public key
    /// armor creates an `Offline` record. Private key armor needs
    /// [`import_priv_key`](Self::import_priv_key).
    pub fn import(&self, name: &str, armor: &str) -> Result<KeyRecord> {
        let envelope = decode_armor(armor)?;
        let record = match envelope.kind() {
            ArmorKind::Info => envelope.to_record()?.renamed(name)?,
            ArmorKind::PubKey => KeyRecord::offline(name, envelope.to_public_key()?)?,
            ArmorKind::PrivKey => {
                return Err(KeybaseError::Format(
                    "private key armor must be imported with a passphrase".to_string(),
                ))
            }
        };
        self.store_new("import", record)
    }

    /// Install a local key from private key armor, re-encrypted with this
    /// store's KDF settings under the same passphrase.
    pub fn import_priv_key(&self, name: &str, armor: &str, passphrase: &str) -> Result<KeyRecord> {
        validate_name(name)?;
        let (algo, encrypted) = decode_armor(armor)?.to_encrypted_key()?;
        self.config.options.ensure_supported(algo)?;

        let secret = decrypt_private_key(&encrypted, passphrase).map_err(|e| {
            warn!(name, "passphrase did not authenticate imported key");
            e
        })?;
        let private = PrivateKey::from_bytes(algo, &secret)
            .map_err(|_| KeybaseError::Format("armored private key is malformed".to_string()))?;
        let reencrypted =
            encrypt_private_key(&private.to_bytes(), passphrase, &self.config.options.kdf)?;

        self.store_new(
            "import_priv_key",
            KeyRecord::local(name, private.public_key(), reencrypted)?,
        )
    }

    /// Install an `Offline` record from public key armor.
    pub fn import_pub_key(&self, name: &str, armor: &str) -> Result<KeyRecord> {
        let public_key = decode_armor(armor)?.to_public_key()?;
        self.store_new("import_pub_key", KeyRecord::offline(name, public_key)?)
    }

    /// Armor the whole record.
    pub fn export(&self, name: &str) -> Result<String> {
        let record = self.get(name)?;
        Ok(encode_armor(&ArmorEnvelope::info(&record)?))
    }

    /// Armor the record's public key.
    pub fn export_pub_key(&self, name: &str) -> Result<String> {
        let record = self.get(name)?;
        Ok(encode_armor(&ArmorEnvelope::public_key(record.public_key())?))
    }

    /// Decrypt and return a local private key.
    pub fn export_private_key_object(&self, name: &str, passphrase: &str) -> Result<PrivateKey> {
        let record = self.scoped("export_private_key_object", name, |registry| {
            registry.get_by_name(name)
        })?;
        unlock(&record, passphrase)
    }

    /// Armor a local private key, re-encrypted under `encrypt_pass`.
    pub fn export_priv_key(
        &self,
        name: &str,
        decrypt_pass: &str,
        encrypt_pass: &str,
    ) -> Result<String> {
        let private = self.export_private_key_object(name, decrypt_pass)?;
        let encrypted =
            encrypt_private_key(&private.to_bytes(), encrypt_pass, &self.config.options.kdf)?;
        Ok(encode_armor(&ArmorEnvelope::private_key(
            private.algo(),
            &encrypted,
        )?))
    }
}

fn no_private_key(record: &KeyRecord, what: &str) -> KeybaseError {
    KeybaseError::UnsupportedOperation(format!(
        "'{}' is a {} key and {}",
        record.name(),
        record.key_type(),
        what
    ))
}

/// Decrypt the private key of a local record.
fn unlock(record: &KeyRecord, passphrase: &str) -> Result<PrivateKey> {
    let encrypted_key = match record.kind() {
        RecordKind::Local { encrypted_key } => encrypted_key,
        _ => return Err(no_private_key(record, "holds no private key")),
    };
    let algo = record.algo().ok_or_else(|| {
        KeybaseError::Storage(format!("local key '{}' has a composite public key", record.name()))
    })?;

    let secret = decrypt_private_key(encrypted_key, passphrase).map_err(|e| {
        warn!(name = record.name(), "passphrase did not authenticate key");
        e
    })?;
    let private = PrivateKey::from_bytes(algo, &secret).map_err(|_| KeybaseError::Authentication)?;

    if private.public_key() != *record.public_key() {
        return Err(KeybaseError::Storage(format!(
            "private key of '{}' does not match its public key",
            record.name()
        )));
    }
    Ok(private)
}
