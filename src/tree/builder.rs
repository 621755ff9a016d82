//! Open tree: the mutable builder side of a snapshot tree

use crate::error::TreeError;
use crate::tree::index;
use crate::tree::node::{Node, NodeKind, OpenNode};
use crate::tree::path::{self, ROOT};
use crate::types::BlockRef;
use std::collections::btree_map::Entry;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Mutable working copy of a tree.
///
/// Hashes and sizes inside an open tree are stale until `finish`. Every
/// mutation records the changed path and its ancestors in a work-list so
/// that `finish` re-hashes only what changed.
#[derive(Debug, Clone)]
pub struct OpenTree {
    pub(crate) root: Arc<Node>,
    /// Paths whose hash is stale. Always closed under ancestors.
    pub(crate) dirty: BTreeSet<String>,
}

impl Default for OpenTree {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenTree {
    /// Create an empty open tree containing only the root directory
    pub fn new() -> Self {
        let mut dirty = BTreeSet::new();
        dirty.insert(ROOT.to_string());
        OpenTree {
            root: Arc::new(Node::new_dir("")),
            dirty,
        }
    }

    /// Open tree sharing all nodes with a finished root
    pub(crate) fn from_root(root: Arc<Node>) -> Self {
        OpenTree {
            root,
            dirty: BTreeSet::new(),
        }
    }

    /// Whether any mutation is waiting for `finish`
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Number of nodes `finish` will re-hash
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Current structure of the node at `path`
    pub fn get_open(&self, path: &str) -> Result<OpenNode, TreeError> {
        index::get(&self.root, path).map(OpenNode::from)
    }

    /// Append `block_refs` to the file at `path`, creating it and any missing
    /// parent directories.
    pub fn put_file(&mut self, path: &str, block_refs: &[BlockRef]) -> Result<(), TreeError> {
        let clean_path = path::clean(path);
        if clean_path == ROOT {
            return Err(TreeError::conflict(ROOT, "root is a directory"));
        }
        let segments = path::segments(&clean_path);
        let (name, parents) = match segments.split_last() {
            Some(split) => split,
            None => return Err(TreeError::Internal(format!("no segments in {}", clean_path))),
        };

        if let Some(file_path) = index::find_file_on_path(&self.root, parents) {
            warn!(path = %clean_path, conflict = %file_path, "put_file through a file");
            return Err(TreeError::conflict(&file_path, "is a file, not a directory"));
        }
        if let Some(existing) = index::lookup(&self.root, &clean_path) {
            if existing.is_dir() {
                warn!(path = %clean_path, "put_file onto a directory");
                return Err(TreeError::conflict(&clean_path, "is a directory, not a file"));
            }
        }

        let parent = index::ensure_dirs(&mut self.root, parents)?;
        let NodeKind::Directory(dir) = &mut parent.kind else {
            return Err(TreeError::Internal(format!("parent of {} is not a directory", clean_path)));
        };
        match dir.children.entry((*name).to_string()) {
            Entry::Occupied(mut occupied) => match &mut Arc::make_mut(occupied.get_mut()).kind {
                NodeKind::File(file) => file.block_refs.extend_from_slice(block_refs),
                NodeKind::Directory(_) => {
                    return Err(TreeError::Internal(format!(
                        "{} became a directory during put_file",
                        clean_path
                    )))
                }
            },
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(Node::new_file(name, block_refs.to_vec())));
            }
        }

        trace!(path = %clean_path, refs = block_refs.len(), "put_file");
        self.mark_dirty(&clean_path);
        Ok(())
    }

    /// Create a directory and any missing parents. No-op if it already exists.
    pub fn put_dir(&mut self, path: &str) -> Result<(), TreeError> {
        let clean_path = path::clean(path);
        let segments = path::segments(&clean_path);

        if let Some(file_path) = index::find_file_on_path(&self.root, &segments) {
            warn!(path = %clean_path, conflict = %file_path, "put_dir over a file");
            return Err(TreeError::conflict(&file_path, "is a file, not a directory"));
        }
        if index::lookup(&self.root, &clean_path).is_some() {
            return Ok(());
        }

        index::ensure_dirs(&mut self.root, &segments)?;
        trace!(path = %clean_path, "put_dir");
        self.mark_dirty(&clean_path);
        Ok(())
    }

    /// Remove the node at `path` together with everything beneath it.
    ///
    /// Deleting the root leaves an empty tree.
    pub fn delete_file(&mut self, path: &str) -> Result<(), TreeError> {
        let clean_path = path::clean(path);
        if index::lookup(&self.root, &clean_path).is_none() {
            return Err(TreeError::PathNotFound(clean_path));
        }

        if clean_path == ROOT {
            debug!("delete_file on root, resetting tree");
            *self = OpenTree::new();
            return Ok(());
        }

        let parent_path = path::ancestors(&clean_path).next().unwrap_or(ROOT).to_string();
        let name = path::segments(&clean_path).last().copied().unwrap_or_default().to_string();
        let parent = index::lookup_mut(&mut self.root, &parent_path).ok_or_else(|| {
            TreeError::Internal(format!("parent of {} vanished", clean_path))
        })?;
        let removed = match &mut parent.kind {
            NodeKind::Directory(dir) => dir.children.remove(&name),
            NodeKind::File(_) => None,
        };
        if removed.is_none() {
            return Err(TreeError::Internal(format!(
                "{} resolved but could not be removed from {}",
                clean_path, parent_path
            )));
        }

        self.dirty.retain(|p| !path::is_within(p, &clean_path));
        trace!(path = %clean_path, "delete_file");
        self.mark_dirty(&parent_path);
        Ok(())
    }

    /// Record a changed path and every ancestor in the work-list
    pub(crate) fn mark_dirty(&mut self, clean_path: &str) {
        if !self.dirty.insert(clean_path.to_string()) {
            return;
        }
        for ancestor in path::ancestors(clean_path) {
            // The set is ancestor-closed, so an already-dirty ancestor
            // means the rest of the chain is dirty too.
            if !self.dirty.insert(ancestor.to_string()) {
                break;
            }
        }
    }

    /// Whether nothing at or below `clean_path` is waiting for re-hash
    pub(crate) fn is_clean_within(&self, clean_path: &str) -> bool {
        !self.dirty.contains(clean_path)
    }
}
