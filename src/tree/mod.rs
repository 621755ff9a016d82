//! Snapshot Hash Tree
//!
//! Represents a filesystem snapshot as a content-addressed tree where each
//! node (file or directory) carries a deterministic hash of its content and
//! structure. A tree is either finished (`HashTree`, immutable and shareable)
//! or open (`OpenTree`, a single-writer builder). `HashTree::open` and
//! `OpenTree::finish` are the only transitions between the two.

pub mod builder;
pub mod codec;
pub mod finish;
pub mod glob;
pub mod hasher;
pub(crate) mod index;
pub mod merge;
pub mod node;
pub mod path;

pub use builder::OpenTree;
pub use glob::GlobPattern;
pub use node::{DirectoryNode, FileNode, Node, NodeKind, OpenNode, OpenNodeKind};

use crate::error::TreeError;
use crate::types::Hash;
use std::sync::Arc;

/// Finished, immutable snapshot tree.
///
/// Cloning is cheap and clones share all nodes. Reads are safe from any
/// number of threads.
#[derive(Debug, Clone)]
pub struct HashTree {
    root: Arc<Node>,
}

impl HashTree {
    /// Finished tree containing only an empty root directory
    pub fn empty() -> Self {
        let mut root = Node::new_dir("");
        root.hash = hasher::compute_directory_hash("", std::iter::empty());
        HashTree {
            root: Arc::new(root),
        }
    }

    pub(crate) fn from_root(root: Arc<Node>) -> Self {
        HashTree { root }
    }

    /// Open a builder that shares every node with this tree
    pub fn open(&self) -> OpenTree {
        OpenTree::from_root(Arc::clone(&self.root))
    }

    /// Node at `path`
    pub fn get(&self, path: &str) -> Result<&Node, TreeError> {
        index::get(&self.root, path)
    }

    /// Direct children of the directory at `path`, in name order
    pub fn list(&self, path: &str) -> Result<Vec<&Node>, TreeError> {
        index::list(&self.root, path)
    }

    /// Every path matching `pattern`, in lexicographic order
    pub fn glob(&self, pattern: &str) -> Result<Vec<(String, &Node)>, TreeError> {
        let compiled = GlobPattern::new(pattern)?;
        Ok(glob::find_matches(&self.root, &compiled))
    }

    /// Serialize into the versioned wire format
    pub fn marshal(&self) -> Result<Vec<u8>, TreeError> {
        codec::marshal(self)
    }

    /// Decode a tree produced by `marshal`
    pub fn unmarshal(bytes: &[u8]) -> Result<HashTree, TreeError> {
        codec::unmarshal(bytes)
    }

    /// Visit every node at or below `path` in pre-order, siblings by name
    pub fn walk<F>(&self, path: &str, mut visitor: F) -> Result<(), TreeError>
    where
        F: FnMut(&str, &Node),
    {
        let start_path = path::clean(path);
        let start = index::lookup(&self.root, &start_path)
            .ok_or_else(|| TreeError::PathNotFound(start_path.clone()))?;
        let mut stack: Vec<(String, &Node)> = vec![(start_path, start)];
        while let Some((node_path, node)) = stack.pop() {
            visitor(&node_path, node);
            if let NodeKind::Directory(dir) = &node.kind {
                for (name, child) in dir.children.iter().rev() {
                    stack.push((path::join(&node_path, name), child.as_ref()));
                }
            }
        }
        Ok(())
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_hash(&self) -> Hash {
        self.root.hash
    }

    /// Total size of all file content in the tree
    pub fn size(&self) -> u64 {
        self.root.size
    }
}

impl Default for HashTree {
    fn default() -> Self {
        Self::empty()
    }
}

/// Trees are equal when their root hashes are
impl PartialEq for HashTree {
    fn eq(&self, other: &Self) -> bool {
        self.root.hash == other.root.hash
    }
}

impl Eq for HashTree {}
