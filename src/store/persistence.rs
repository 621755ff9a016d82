//! Persistence layer for the snapshot store

use crate::error::StorageError;
use crate::store::TreeStore;
use crate::tree::HashTree;
use crate::types::Hash;
use std::path::Path;
use tracing::{debug, warn};

const SNAPSHOTS_TREE: &str = "snapshots";
const HEADS_TREE: &str = "heads";

/// Sled-based implementation of TreeStore
///
/// Snapshots are stored in the wire format under their 32-byte root hash.
/// Heads map a UTF-8 name to a root hash.
pub struct SledTreeStore {
    db: sled::Db,
    snapshots: sled::Tree,
    heads: sled::Tree,
}

impl SledTreeStore {
    /// Open (or create) a store at the given directory
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        let snapshots = db.open_tree(SNAPSHOTS_TREE)?;
        let heads = db.open_tree(HEADS_TREE)?;
        Ok(Self {
            db,
            snapshots,
            heads,
        })
    }

    /// Flush all pending writes to disk
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

fn hash_from_bytes(bytes: &[u8]) -> Result<Hash, StorageError> {
    bytes.try_into().map_err(|_| {
        StorageError::Corrupt(format!("head value has {} bytes, expected 32", bytes.len()))
    })
}

impl TreeStore for SledTreeStore {
    fn put(&self, tree: &HashTree) -> Result<Hash, StorageError> {
        let root_hash = tree.root_hash();
        if self.snapshots.contains_key(root_hash)? {
            debug!(root = %hex::encode(root_hash), "Snapshot already stored");
            return Ok(root_hash);
        }
        let bytes = tree.marshal()?;
        self.snapshots.insert(root_hash, bytes)?;
        debug!(root = %hex::encode(root_hash), "Stored snapshot");
        Ok(root_hash)
    }

    fn get(&self, root_hash: &Hash) -> Result<Option<HashTree>, StorageError> {
        match self.snapshots.get(root_hash)? {
            Some(bytes) => {
                let tree = HashTree::unmarshal(&bytes)?;
                if tree.root_hash() != *root_hash {
                    warn!(key = %hex::encode(root_hash), "Snapshot stored under wrong key");
                    return Err(StorageError::Corrupt(format!(
                        "snapshot {} decodes to root {}",
                        hex::encode(root_hash),
                        hex::encode(tree.root_hash())
                    )));
                }
                Ok(Some(tree))
            }
            None => Ok(None),
        }
    }

    fn contains(&self, root_hash: &Hash) -> Result<bool, StorageError> {
        Ok(self.snapshots.contains_key(root_hash)?)
    }

    fn set_head(&self, name: &str, root_hash: &Hash) -> Result<(), StorageError> {
        if name.is_empty() {
            return Err(StorageError::InvalidHead(name.to_string()));
        }
        if !self.contains(root_hash)? {
            return Err(StorageError::SnapshotNotFound(*root_hash));
        }
        self.heads.insert(name.as_bytes(), root_hash.as_slice())?;
        debug!(head = name, root = %hex::encode(root_hash), "Moved head");
        Ok(())
    }

    fn head(&self, name: &str) -> Result<Option<Hash>, StorageError> {
        match self.heads.get(name.as_bytes())? {
            Some(value) => Ok(Some(hash_from_bytes(&value)?)),
            None => Ok(None),
        }
    }

    fn heads(&self) -> Result<Vec<(String, Hash)>, StorageError> {
        let mut heads = Vec::new();
        for item in self.heads.iter() {
            let (key, value) = item?;
            let name = String::from_utf8(key.to_vec())
                .map_err(|_| StorageError::Corrupt("head name is not UTF-8".to_string()))?;
            heads.push((name, hash_from_bytes(&value)?));
        }
        Ok(heads)
    }
}
