//! Key record registry over an open store.
//!
//! Layout inside the key-value store:
//!
//! - `info/<name>` holds the encoded [`KeyRecord`]
//! - `addr/<hex address>` holds the name of the record that owns the address
//!
//! Both entries are always written in one `write_batch`. The registry never
//! opens or closes storage; it borrows a store somebody else acquired.

use tracing::debug;

use crate::crypto::Address;
use crate::error::{KeybaseError, Result};
use crate::record::{validate_name, KeyRecord};
use crate::storage::{StorageEngine, WriteBatch};

const INFO_PREFIX: &str = "info/";
const ADDR_PREFIX: &str = "addr/";

fn info_key(name: &str) -> Vec<u8> {
    format!("{}{}", INFO_PREFIX, name).into_bytes()
}

fn addr_key(address: &Address) -> Vec<u8> {
    format!("{}{}", ADDR_PREFIX, address).into_bytes()
}

/// Named key records with an address index.
pub struct Registry<'a, S: StorageEngine> {
    store: &'a mut S,
}

impl<'a, S: StorageEngine> Registry<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// All records, ordered by name.
    pub fn list(&self) -> Result<Vec<KeyRecord>> {
        self.store
            .iterate(INFO_PREFIX.as_bytes())?
            .into_iter()
            .map(|(_, value)| KeyRecord::from_bytes(&value))
            .collect()
    }

    pub fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.store.get(&info_key(name))?.is_some())
    }

    /// # Errors
    ///
    /// `NotFound` if no record has this name.
    pub fn get_by_name(&self, name: &str) -> Result<KeyRecord> {
        match self.store.get(&info_key(name))? {
            Some(bytes) => KeyRecord::from_bytes(&bytes),
            None => Err(KeybaseError::NotFound(format!("key '{}'", name))),
        }
    }

    /// Look up the record indexed under `address`.
    ///
    /// When several records share an address, the one that claimed the
    /// index entry first is returned.
    pub fn get_by_address(&self, address: &Address) -> Result<KeyRecord> {
        let name = match self.store.get(&addr_key(address))? {
            Some(bytes) => String::from_utf8(bytes).map_err(|_| {
                KeybaseError::Storage(format!("Corrupted address index for {}", address))
            })?,
            None => return Err(KeybaseError::NotFound(format!("address {}", address))),
        };

        self.get_by_name(&name).map_err(|e| match e {
            KeybaseError::NotFound(_) => KeybaseError::Storage(format!(
                "Address index for {} points at missing key '{}'",
                address, name
            )),
            other => other,
        })
    }

    /// Insert a new record. Create-only.
    ///
    /// # Errors
    ///
    /// `Conflict` if the name is taken; the store is left unchanged.
    pub fn put(&mut self, record: &KeyRecord) -> Result<()> {
        validate_name(record.name())?;
        if self.contains(record.name())? {
            return Err(KeybaseError::Conflict(format!(
                "key '{}' already exists",
                record.name()
            )));
        }

        let mut batch = WriteBatch::new();
        batch.put(info_key(record.name()), record.to_bytes()?);
        self.claim_address(&mut batch, record)?;
        self.store.write_batch(batch)?;

        debug!(name = record.name(), "stored key record");
        Ok(())
    }

    /// Replace an existing record of the same name.
    ///
    /// # Errors
    ///
    /// `NotFound` if there is nothing to replace.
    pub fn overwrite(&mut self, record: &KeyRecord) -> Result<()> {
        let existing = self.get_by_name(record.name())?;

        let mut batch = WriteBatch::new();
        batch.put(info_key(record.name()), record.to_bytes()?);
        if existing.address() != record.address() {
            self.release_address(&mut batch, &existing)?;
            self.claim_address(&mut batch, record)?;
        }
        self.store.write_batch(batch)?;

        debug!(name = record.name(), "replaced key record");
        Ok(())
    }

    /// Remove a record and return it.
    ///
    /// # Errors
    ///
    /// `NotFound` if no record has this name.
    pub fn delete(&mut self, name: &str) -> Result<KeyRecord> {
        let existing = self.get_by_name(name)?;

        let mut batch = WriteBatch::new();
        batch.delete(info_key(name));
        self.release_address(&mut batch, &existing)?;
        self.store.write_batch(batch)?;

        debug!(name, "deleted key record");
        Ok(existing)
    }

    /// Point the address index at `record` unless another record owns it.
    fn claim_address(&self, batch: &mut WriteBatch, record: &KeyRecord) -> Result<()> {
        let key = addr_key(&record.address());
        match self.store.get(&key)? {
            Some(owner) if owner != record.name().as_bytes() => {
                debug!(
                    name = record.name(),
                    address = %record.address(),
                    "address already indexed by another key"
                );
            }
            _ => {
                batch.put(key, record.name().as_bytes().to_vec());
            }
        }
        Ok(())
    }

    /// Drop or hand over the index entry owned by `record`.
    fn release_address(&self, batch: &mut WriteBatch, record: &KeyRecord) -> Result<()> {
        let address = record.address();
        let key = addr_key(&address);
        if self.store.get(&key)?.as_deref() != Some(record.name().as_bytes()) {
            return Ok(());
        }

        let successor = self
            .list()?
            .into_iter()
            .find(|other| other.name() != record.name() && other.address() == address);
        match successor {
            Some(other) => {
                batch.put(key, other.name().as_bytes().to_vec());
            }
            None => {
                batch.delete(key);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{PrivateKey, SigningAlgo};
    use crate::storage::SqliteStorage;

    fn open_temp() -> (tempfile::TempDir, SqliteStorage) {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let store = SqliteStorage::open("keybase", dir.path()).expect("open should succeed");
        (dir, store)
    }

    fn offline(name: &str, byte: u8) -> KeyRecord {
        let key = PrivateKey::from_bytes(SigningAlgo::Secp256k1, &[byte; 32]).unwrap();
        KeyRecord::offline(name, key.public_key()).unwrap()
    }

    #[test]
    fn test_put_get_list() {
        let (_dir, mut store) = open_temp();
        let mut registry = Registry::new(&mut store);

        registry.put(&offline("carol", 3)).unwrap();
        registry.put(&offline("alice", 1)).unwrap();
        registry.put(&offline("bob", 2)).unwrap();

        let names: Vec<String> = registry
            .list()
            .unwrap()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
        assert_eq!(registry.get_by_name("bob").unwrap(), offline("bob", 2));
    }

    #[test]
    fn test_missing_name_is_not_found() {
        let (_dir, mut store) = open_temp();
        let mut registry = Registry::new(&mut store);
        assert!(matches!(
            registry.get_by_name("ghost"),
            Err(KeybaseError::NotFound(_))
        ));
        assert!(matches!(
            registry.delete("ghost"),
            Err(KeybaseError::NotFound(_))
        ));
    }

    #[test]
    fn test_put_is_create_only_and_leaves_store_unchanged() {
        let (_dir, mut store) = open_temp();
        let mut registry = Registry::new(&mut store);
        let original = offline("alice", 1);
        registry.put(&original).unwrap();

        let err = registry.put(&offline("alice", 2)).unwrap_err();
        assert!(matches!(err, KeybaseError::Conflict(_)));

        assert_eq!(registry.get_by_name("alice").unwrap(), original);
        assert!(matches!(
            registry.get_by_address(&offline("x", 2).address()),
            Err(KeybaseError::NotFound(_))
        ));
        assert_eq!(registry.list().unwrap().len(), 1);
    }

    #[test]
    fn test_get_by_address() {
        let (_dir, mut store) = open_temp();
        let mut registry = Registry::new(&mut store);
        let record = offline("alice", 1);
        registry.put(&record).unwrap();

        assert_eq!(registry.get_by_address(&record.address()).unwrap(), record);
    }

    #[test]
    fn test_shared_address_first_claim_wins_and_hands_over_on_delete() {
        let (_dir, mut store) = open_temp();
        let mut registry = Registry::new(&mut store);
        let first = offline("first", 5);
        let second = offline("second", 5);
        registry.put(&first).unwrap();
        registry.put(&second).unwrap();

        let address = first.address();
        assert_eq!(registry.get_by_address(&address).unwrap().name(), "first");

        registry.delete("first").unwrap();
        assert_eq!(registry.get_by_address(&address).unwrap().name(), "second");

        registry.delete("second").unwrap();
        assert!(matches!(
            registry.get_by_address(&address),
            Err(KeybaseError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_removes_index_entry() {
        let (_dir, mut store) = open_temp();
        {
            let mut registry = Registry::new(&mut store);
            registry.put(&offline("alice", 1)).unwrap();
            registry.delete("alice").unwrap();
        }
        assert!(store.iterate(b"").unwrap().is_empty());
    }

    #[test]
    fn test_overwrite_requires_existing_and_moves_index() {
        let (_dir, mut store) = open_temp();
        let mut registry = Registry::new(&mut store);
        assert!(matches!(
            registry.overwrite(&offline("alice", 1)),
            Err(KeybaseError::NotFound(_))
        ));

        registry.put(&offline("alice", 1)).unwrap();
        let replacement = offline("alice", 2);
        registry.overwrite(&replacement).unwrap();

        assert_eq!(registry.get_by_name("alice").unwrap(), replacement);
        assert_eq!(
            registry.get_by_address(&replacement.address()).unwrap(),
            replacement
        );
        assert!(registry
            .get_by_address(&offline("x", 1).address())
            .is_err());
    }
}
