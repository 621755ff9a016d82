//! Path index: resolves cleaned paths to nodes
//!
//! Reads walk shared nodes directly. Writes go through `lookup_mut`, which
//! un-shares every node on the way down, so a mutation copies only the path
//! from the root to the target and never writes through a shared subtree.

use crate::error::TreeError;
use crate::tree::node::{Node, NodeKind};
use crate::tree::path;
use std::sync::Arc;

/// Resolve a cleaned path
pub(crate) fn lookup<'a>(root: &'a Node, clean_path: &str) -> Option<&'a Node> {
    let mut node = root;
    for segment in path::segments(clean_path) {
        node = node.as_dir()?.child(segment)?;
    }
    Some(node)
}

/// Resolve a cleaned path for writing, copying shared nodes along the way
pub(crate) fn lookup_mut<'a>(root: &'a mut Arc<Node>, clean_path: &str) -> Option<&'a mut Node> {
    let mut node = Arc::make_mut(root);
    for segment in path::segments(clean_path) {
        let child = match &mut node.kind {
            NodeKind::Directory(dir) => dir.children.get_mut(segment)?,
            NodeKind::File(_) => return None,
        };
        node = Arc::make_mut(child);
    }
    Some(node)
}

/// Walk (and create) directories for every segment, returning the last one.
///
/// Callers must have checked that no segment is a file; finding one here is
/// an invariant violation.
pub(crate) fn ensure_dirs<'a>(
    root: &'a mut Arc<Node>,
    segments: &[&str],
) -> Result<&'a mut Node, TreeError> {
    let mut node = Arc::make_mut(root);
    let mut walked = String::from(path::ROOT);
    for segment in segments {
        walked = path::join(&walked, segment);
        let child = match &mut node.kind {
            NodeKind::Directory(dir) => dir
                .children
                .entry((*segment).to_string())
                .or_insert_with(|| Arc::new(Node::new_dir(segment))),
            NodeKind::File(_) => {
                return Err(TreeError::Internal(format!(
                    "expected directory while creating parents at {}",
                    walked
                )))
            }
        };
        node = Arc::make_mut(child);
    }
    if node.is_file() {
        return Err(TreeError::Internal(format!(
            "expected directory at {}",
            walked
        )));
    }
    Ok(node)
}

/// First existing prefix of `segments` that is a file, if any.
///
/// Returns the cleaned path of the offending node. Walking stops at the
/// first missing segment, since everything below it will be created.
pub(crate) fn find_file_on_path(root: &Node, segments: &[&str]) -> Option<String> {
    let mut node = root;
    let mut walked = String::from(path::ROOT);
    for segment in segments {
        let dir = node.as_dir()?;
        node = dir.child(segment)?;
        walked = path::join(&walked, segment);
        if node.is_file() {
            return Some(walked);
        }
    }
    None
}

/// Resolve a path or fail with `PathNotFound`
pub(crate) fn get<'a>(root: &'a Node, raw_path: &str) -> Result<&'a Node, TreeError> {
    let clean_path = path::clean(raw_path);
    lookup(root, &clean_path).ok_or(TreeError::PathNotFound(clean_path))
}

/// Children of the directory at a path
pub(crate) fn list<'a>(root: &'a Node, raw_path: &str) -> Result<Vec<&'a Node>, TreeError> {
    let clean_path = path::clean(raw_path);
    let node = lookup(root, &clean_path).ok_or_else(|| TreeError::PathNotFound(clean_path.clone()))?;
    match &node.kind {
        NodeKind::Directory(dir) => Ok(dir.children().collect()),
        NodeKind::File(_) => Err(TreeError::conflict(&clean_path, "is a file, not a directory")),
    }
}
