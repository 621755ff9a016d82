//! Versioned wire format for finished trees
//!
//! Layout: 4-byte little-endian format version, then a bincode payload.
//! The V1 payload is the list of nodes in pre-order. Decoding rebuilds the
//! tree and re-verifies every hash and size, so corrupt input is rejected
//! rather than turned into a tree with wrong hashes.

use crate::error::TreeError;
use crate::tree::finish;
use crate::tree::node::{Node, NodeKind};
use crate::tree::path::{self, ROOT};
use crate::tree::HashTree;
use crate::types::{BlockRef, Hash};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Current wire format version
pub const FORMAT_VERSION_V1: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct TreePayloadV1 {
    nodes: Vec<WireNode>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireNode {
    path: String,
    hash: Hash,
    size: u64,
    kind: WireKind,
}

#[derive(Debug, Serialize, Deserialize)]
enum WireKind {
    File { block_refs: Vec<BlockRef> },
    Directory { children: Vec<String> },
}

/// Encode a finished tree
#[instrument(skip(tree))]
pub fn marshal(tree: &HashTree) -> Result<Vec<u8>, TreeError> {
    let mut nodes = Vec::new();
    tree.walk(ROOT, |node_path, node| {
        let kind = match &node.kind {
            NodeKind::File(file) => WireKind::File {
                block_refs: file.block_refs.clone(),
            },
            NodeKind::Directory(dir) => WireKind::Directory {
                children: dir.names().map(str::to_string).collect(),
            },
        };
        nodes.push(WireNode {
            path: node_path.to_string(),
            hash: node.hash,
            size: node.size,
            kind,
        });
    })?;

    let node_count = nodes.len();
    let payload = bincode::serialize(&TreePayloadV1 { nodes }).map_err(|e| {
        error!("Failed to serialize tree: {}", e);
        TreeError::Internal(format!("Failed to serialize tree: {}", e))
    })?;

    let mut bytes = Vec::with_capacity(4 + payload.len());
    bytes.extend_from_slice(&FORMAT_VERSION_V1.to_le_bytes());
    bytes.extend_from_slice(&payload);
    debug!(nodes = node_count, bytes = bytes.len(), "Marshaled tree");
    Ok(bytes)
}

/// Decode bytes produced by `marshal`
#[instrument(skip(bytes), fields(len = bytes.len()))]
pub fn unmarshal(bytes: &[u8]) -> Result<HashTree, TreeError> {
    if bytes.len() < 4 {
        return Err(TreeError::CannotDeserialize(format!(
            "{} bytes is too short for a version header",
            bytes.len()
        )));
    }
    let version = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if version != FORMAT_VERSION_V1 {
        return Err(TreeError::Unsupported(version));
    }

    let payload: TreePayloadV1 = bincode::deserialize(&bytes[4..])
        .map_err(|e| TreeError::CannotDeserialize(format!("Failed to decode payload: {}", e)))?;

    let node_count = payload.nodes.len();
    let mut by_path: HashMap<String, WireNode> = HashMap::with_capacity(node_count);
    for node in payload.nodes {
        if path::clean(&node.path) != node.path {
            return Err(TreeError::CannotDeserialize(format!(
                "non-canonical path {:?}",
                node.path
            )));
        }
        if let Some(dup) = by_path.insert(node.path.clone(), node) {
            return Err(TreeError::CannotDeserialize(format!(
                "duplicate path {}",
                dup.path
            )));
        }
    }

    let root = rebuild(&mut by_path)?;
    if !root.is_dir() {
        return Err(TreeError::CannotDeserialize("root is not a directory".to_string()));
    }
    if let Some(orphan) = by_path.keys().next() {
        return Err(TreeError::CannotDeserialize(format!(
            "{} is not reachable from the root",
            orphan
        )));
    }

    debug!(nodes = node_count, "Unmarshaled tree");
    Ok(HashTree::from_root(root))
}

/// A node being rebuilt: its children are attached one at a time, then the
/// node is sealed and handed to its parent.
struct Frame {
    path: String,
    hash: Hash,
    size: u64,
    node: Node,
    pending: std::vec::IntoIter<String>,
}

impl Frame {
    fn open(
        node_path: String,
        name: &str,
        by_path: &mut HashMap<String, WireNode>,
    ) -> Result<Self, TreeError> {
        let wire = by_path
            .remove(&node_path)
            .ok_or_else(|| TreeError::CannotDeserialize(format!("missing node {}", node_path)))?;
        let (node, pending) = match wire.kind {
            WireKind::File { block_refs } => (Node::new_file(name, block_refs), Vec::new()),
            WireKind::Directory { children } => (Node::new_dir(name), children),
        };
        Ok(Frame {
            path: node_path,
            hash: wire.hash,
            size: wire.size,
            node,
            pending: pending.into_iter(),
        })
    }

    /// Recompute hash and size and compare them with the stored values
    fn seal(mut self) -> Result<Arc<Node>, TreeError> {
        finish::rehash(&mut self.node).map_err(|e| {
            TreeError::CannotDeserialize(format!("{} at {}", e, self.path))
        })?;
        if self.node.hash != self.hash || self.node.size != self.size {
            return Err(TreeError::CannotDeserialize(format!(
                "hash or size mismatch at {}",
                self.path
            )));
        }
        Ok(Arc::new(self.node))
    }
}

/// Rebuild the tree bottom-up from the root, checking stored hashes against
/// recomputed ones. Uses an explicit stack so depth is bounded by memory,
/// not by the thread's stack.
fn rebuild(by_path: &mut HashMap<String, WireNode>) -> Result<Arc<Node>, TreeError> {
    let mut stack = vec![Frame::open(ROOT.to_string(), "", by_path)?];

    while let Some(top) = stack.last_mut() {
        if let Some(child_name) = top.pending.next() {
            if child_name.is_empty() || child_name.contains('/') {
                return Err(TreeError::CannotDeserialize(format!(
                    "invalid child name {:?} under {}",
                    child_name, top.path
                )));
            }
            let child_path = path::join(&top.path, &child_name);
            let frame = Frame::open(child_path, &child_name, by_path)?;
            stack.push(frame);
            continue;
        }

        let Some(frame) = stack.pop() else { break };
        let child_path = frame.path.clone();
        let sealed = frame.seal()?;
        let Some(parent) = stack.last_mut() else {
            return Ok(sealed);
        };
        if let NodeKind::Directory(entries) = &mut parent.node.kind {
            if entries.children.insert(sealed.name.clone(), sealed).is_some() {
                return Err(TreeError::CannotDeserialize(format!(
                    "duplicate child {}",
                    child_path
                )));
            }
        }
    }

    Err(TreeError::CannotDeserialize("payload has no root".to_string()))
}
