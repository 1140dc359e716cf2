//! Storage abstraction for the keybase.
//!
//! This module defines the `StorageEngine` trait, the SQLite backend that
//! ships as the default, and the scoped handle every keybase call uses to
//! reach it.
//!
//! ## Architecture
//!
//! The storage layer is backend-agnostic:
//! - `SqliteStorage`: one SQLite file per store, exclusively locked while open
//! - any other ordered key-value engine implementing `StorageEngine`
//!
//! Private keys are encrypted before they reach the backend, so engines
//! only ever see ciphertext and public data.

pub mod handle;
pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use handle::{with_store, StorageHandle};
pub use sqlite::SqliteStorage;
pub use traits::StorageEngine;
pub use types::{BatchOp, StoreMetadata, WriteBatch};
