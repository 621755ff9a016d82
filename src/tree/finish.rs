//! Finish: bottom-up re-hash of the dirty work-list

use crate::error::TreeError;
use crate::tree::builder::OpenTree;
use crate::tree::hasher;
use crate::tree::index;
use crate::tree::node::{Node, NodeKind};
use crate::tree::path;
use crate::tree::HashTree;
use std::time::Instant;
use tracing::{debug, error, instrument};

impl OpenTree {
    /// Re-hash every dirty node and seal the result as a finished tree.
    ///
    /// Only paths in the work-list are visited, deepest first, so every
    /// directory sees final hashes for all of its children. Nodes outside the
    /// work-list keep the hash they already carry.
    #[instrument(skip(self), fields(dirty = self.dirty.len()))]
    pub fn finish(mut self) -> Result<HashTree, TreeError> {
        let start = Instant::now();
        let mut work: Vec<String> = std::mem::take(&mut self.dirty).into_iter().collect();
        work.sort_by(|a, b| {
            path::depth(b)
                .cmp(&path::depth(a))
                .then_with(|| a.cmp(b))
        });

        let mut files = 0usize;
        let mut directories = 0usize;
        for dirty_path in &work {
            let node = match index::lookup_mut(&mut self.root, dirty_path) {
                Some(node) => node,
                None => {
                    error!(path = %dirty_path, "Dirty path missing from tree");
                    return Err(TreeError::Internal(format!(
                        "dirty path {} is not in the tree",
                        dirty_path
                    )));
                }
            };
            let is_file = rehash(node).map_err(|e| {
                error!(path = %dirty_path, error = %e, "Re-hash failed");
                e
            })?;
            if is_file {
                files += 1;
            } else {
                directories += 1;
            }
        }

        debug!(
            files,
            directories,
            root_hash = %hex::encode(self.root.hash),
            duration_us = start.elapsed().as_micros() as u64,
            "Finished tree"
        );
        Ok(HashTree::from_root(self.root))
    }
}

/// Recompute hash and size of one node from its content or its children.
///
/// Returns true for files. A size that does not fit in a `u64` is an
/// `Internal` error and leaves the node untouched.
pub(crate) fn rehash(node: &mut Node) -> Result<bool, TreeError> {
    let (hash, size, is_file) = match &node.kind {
        NodeKind::File(file) => (
            hasher::compute_file_hash(&node.name, &file.block_refs),
            hasher::compute_file_size(&file.block_refs),
            true,
        ),
        NodeKind::Directory(dir) => (
            hasher::compute_directory_hash(
                &node.name,
                dir.children.iter().map(|(name, child)| (name.as_str(), &child.hash)),
            ),
            dir.children
                .values()
                .try_fold(0u64, |total, child| total.checked_add(child.size)),
            false,
        ),
    };
    let size = size.ok_or_else(|| {
        TreeError::Internal(format!("size of node {:?} overflows u64", node.name))
    })?;
    node.hash = hash;
    node.size = size;
    Ok(is_file)
}
