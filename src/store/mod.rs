//! Snapshot Store
//!
//! Persists finished trees keyed by their root hash, plus named heads that
//! point at a stored snapshot.

pub mod persistence;

pub use persistence::SledTreeStore;

use crate::error::StorageError;
use crate::tree::HashTree;
use crate::types::Hash;

/// Snapshot store interface
pub trait TreeStore {
    /// Store a finished tree. Storing the same tree twice is a no-op.
    fn put(&self, tree: &HashTree) -> Result<Hash, StorageError>;

    fn get(&self, root_hash: &Hash) -> Result<Option<HashTree>, StorageError>;

    fn contains(&self, root_hash: &Hash) -> Result<bool, StorageError>;

    /// Point a named head at a stored snapshot
    fn set_head(&self, name: &str, root_hash: &Hash) -> Result<(), StorageError>;

    fn head(&self, name: &str) -> Result<Option<Hash>, StorageError>;

    /// All heads, sorted by name
    fn heads(&self) -> Result<Vec<(String, Hash)>, StorageError>;
}

/// Load the snapshot a head points at
pub fn checkout(store: &dyn TreeStore, name: &str) -> Result<Option<HashTree>, StorageError> {
    match store.head(name)? {
        Some(hash) => store
            .get(&hash)?
            .map(Some)
            .ok_or(StorageError::SnapshotNotFound(hash)),
        None => Ok(None),
    }
}

/// Store a tree and move a head to it in one call
pub fn commit(store: &dyn TreeStore, name: &str, tree: &HashTree) -> Result<Hash, StorageError> {
    let hash = store.put(tree)?;
    store.set_head(name, &hash)?;
    Ok(hash)
}
