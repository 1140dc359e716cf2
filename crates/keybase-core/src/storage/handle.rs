//! Scoped storage handles.
//!
//! A [`StorageHandle`] is acquired at the start of one keybase call and
//! released before that call returns. Handles are never cached; if a call
//! unwinds or returns early, `Drop` closes the backend.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::{KeybaseError, Result};
use crate::fs::ensure_dir;
use crate::storage::traits::StorageEngine;

/// An open backend owned by a single operation.
pub struct StorageHandle<S: StorageEngine> {
    name: String,
    engine: Option<S>,
}

impl<S: StorageEngine> StorageHandle<S> {
    /// Create `dir` if needed and open store `name` inside it.
    ///
    /// # Errors
    ///
    /// `StorageBusy` if another handle holds the store, `Storage` if the
    /// directory cannot be created or the backend fails to open.
    pub fn acquire(name: &str, dir: &Path) -> Result<Self> {
        ensure_dir(dir).map_err(|e| {
            KeybaseError::Storage(format!(
                "Cannot create keybase directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let engine = S::open(name, dir)?;
        debug!(store = name, "acquired storage handle");
        Ok(Self {
            name: name.to_string(),
            engine: Some(engine),
        })
    }

    /// Mutable access to the open backend.
    pub fn engine(&mut self) -> Result<&mut S> {
        self.engine
            .as_mut()
            .ok_or_else(|| KeybaseError::Storage("Storage handle already released".to_string()))
    }

    /// Close the backend, reporting any close error.
    pub fn release(mut self) -> Result<()> {
        match self.engine.take() {
            Some(engine) => {
                engine.close()?;
                debug!(store = %self.name, "released storage handle");
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl<S: StorageEngine> Drop for StorageHandle<S> {
    fn drop(&mut self) {
        if let Some(engine) = self.engine.take() {
            if let Err(e) = engine.close() {
                warn!(store = %self.name, error = %e, "failed to close storage handle");
            }
        }
    }
}

/// Run `op` against store `name` in `dir`, releasing the handle on every
/// exit path.
///
/// An error from `op` takes precedence over an error from closing.
pub fn with_store<S, T, F>(name: &str, dir: &Path, op: F) -> Result<T>
where
    S: StorageEngine,
    F: FnOnce(&mut S) -> Result<T>,
{
    let mut handle = StorageHandle::<S>::acquire(name, dir)?;
    let outcome = op(handle.engine()?);
    let released = handle.release();

    let value = outcome?;
    released?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    #[test]
    fn test_acquire_creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("keys");

        let handle = StorageHandle::<SqliteStorage>::acquire("keybase", &dir).unwrap();
        assert!(dir.is_dir());
        handle.release().unwrap();
    }

    #[test]
    fn test_release_allows_reacquire() {
        let root = tempfile::tempdir().unwrap();
        let handle = StorageHandle::<SqliteStorage>::acquire("keybase", root.path()).unwrap();
        assert!(matches!(
            StorageHandle::<SqliteStorage>::acquire("keybase", root.path()),
            Err(KeybaseError::StorageBusy(_))
        ));
        handle.release().unwrap();

        StorageHandle::<SqliteStorage>::acquire("keybase", root.path())
            .unwrap()
            .release()
            .unwrap();
    }

    #[test]
    fn test_drop_releases_handle() {
        let root = tempfile::tempdir().unwrap();
        {
            let _handle =
                StorageHandle::<SqliteStorage>::acquire("keybase", root.path()).unwrap();
        }
        StorageHandle::<SqliteStorage>::acquire("keybase", root.path())
            .unwrap()
            .release()
            .unwrap();
    }

    #[test]
    fn test_with_store_releases_after_error() {
        let root = tempfile::tempdir().unwrap();

        let result: Result<()> = with_store::<SqliteStorage, _, _>("keybase", root.path(), |store| {
            store.put(b"k", b"v")?;
            Err(KeybaseError::NotFound("missing".to_string()))
        });
        assert!(matches!(result, Err(KeybaseError::NotFound(_))));

        let value = with_store::<SqliteStorage, _, _>("keybase", root.path(), |store| store.get(b"k"))
            .unwrap();
        assert_eq!(value, Some(b"v".to_vec()));
    }

    #[test]
    fn test_with_store_releases_after_panic() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().to_path_buf();

        let outcome = std::panic::catch_unwind(|| {
            let _ = with_store::<SqliteStorage, (), _>("keybase", &dir, |_| panic!("boom"));
        });
        assert!(outcome.is_err());

        with_store::<SqliteStorage, _, _>("keybase", root.path(), |_| Ok(())).unwrap();
    }
}
