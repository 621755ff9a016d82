//! Tree node types: the finished view and the open view

use crate::types::{BlockRef, Hash};
use std::collections::BTreeMap;
use std::sync::Arc;

/// File node: an ordered sequence of block references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileNode {
    pub block_refs: Vec<BlockRef>,
}

/// Directory node: children keyed by name
///
/// Children are reference counted so that trees opened from a finished tree
/// share every subtree they do not modify.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryNode {
    pub(crate) children: BTreeMap<String, Arc<Node>>,
}

impl DirectoryNode {
    /// Look up a direct child by name
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name).map(Arc::as_ref)
    }

    /// Child names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// Children in name order
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Node kind: exactly one of file or directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File(FileNode),
    Directory(DirectoryNode),
}

/// Tree node
///
/// `hash` and `size` are authoritative only when read from a finished tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub hash: Hash,
    pub size: u64,
    pub kind: NodeKind,
}

impl Node {
    pub(crate) fn new_file(name: &str, block_refs: Vec<BlockRef>) -> Self {
        Node {
            name: name.to_string(),
            hash: [0u8; 32],
            size: 0,
            kind: NodeKind::File(FileNode { block_refs }),
        }
    }

    pub(crate) fn new_dir(name: &str) -> Self {
        Node {
            name: name.to_string(),
            hash: [0u8; 32],
            size: 0,
            kind: NodeKind::Directory(DirectoryNode::default()),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match &self.kind {
            NodeKind::File(file) => Some(file),
            NodeKind::Directory(_) => None,
        }
    }

    pub fn as_dir(&self) -> Option<&DirectoryNode> {
        match &self.kind {
            NodeKind::Directory(dir) => Some(dir),
            NodeKind::File(_) => None,
        }
    }

    /// Block refs of a file node, empty for directories
    pub fn block_refs(&self) -> &[BlockRef] {
        self.as_file().map(|f| f.block_refs.as_slice()).unwrap_or(&[])
    }

    /// Lowercase hex of the node hash
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Kind of an open node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenNodeKind {
    File(FileNode),
    Directory { children: Vec<String> },
}

/// Node as seen through an open tree: structure only, no hash or size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenNode {
    pub name: String,
    pub kind: OpenNodeKind,
}

impl OpenNode {
    pub fn is_file(&self) -> bool {
        matches!(self.kind, OpenNodeKind::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, OpenNodeKind::Directory { .. })
    }
}

impl From<&Node> for OpenNode {
    fn from(node: &Node) -> Self {
        let kind = match &node.kind {
            NodeKind::File(file) => OpenNodeKind::File(file.clone()),
            NodeKind::Directory(dir) => OpenNodeKind::Directory {
                children: dir.names().map(str::to_string).collect(),
            },
        };
        OpenNode {
            name: node.name.clone(),
            kind,
        }
    }
}
