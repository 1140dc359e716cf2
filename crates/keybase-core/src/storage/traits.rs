//! Storage engine trait definition.
//!
//! The `StorageEngine` trait is the contract every key-value backend
//! implements. The registry and facade only ever talk to this trait, so a
//! backend can be swapped without touching key management logic.

use std::path::Path;

use super::types::{StoreMetadata, WriteBatch};
use crate::error::Result;

/// A named, persistent, ordered key-value store.
///
/// All implementations must ensure:
/// - `open` fails fast with `KeybaseError::StorageBusy` when another
///   handle holds the store, instead of blocking
/// - `iterate` returns entries ordered by key
/// - `write_batch` applies all of its operations or none of them
pub trait StorageEngine: Send {
    /// Open (creating if needed) the store `name` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns `KeybaseError::StorageBusy` if the store is locked by
    /// another handle, `KeybaseError::Storage` for any other failure.
    fn open(name: &str, dir: &Path) -> Result<Self>
    where
        Self: Sized;

    /// Close the store and release its lock.
    fn close(self) -> Result<()>
    where
        Self: Sized;

    /// Get store metadata.
    fn metadata(&self) -> Result<StoreMetadata>;

    /// Get the value stored under `key`.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(value))` if found, `Ok(None)` if not found.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Insert or replace a single value.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Remove a single value. Removing a missing key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// All entries whose key starts with `prefix`, ordered by key.
    fn iterate(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Apply a batch of puts and deletes atomically.
    fn write_batch(&mut self, batch: WriteBatch) -> Result<()>;
}
