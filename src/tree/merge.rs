//! Merge: fold the structure of other open trees into this one

use crate::error::TreeError;
use crate::tree::builder::OpenTree;
use crate::tree::node::{Node, NodeKind};
use crate::tree::path::{self, ROOT};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

impl OpenTree {
    /// Merge every source into this tree, in order.
    ///
    /// Files present on both sides get the source's block refs appended.
    /// Directories are unioned recursively. A file meeting a directory at the
    /// same path fails with `PathConflict`, and on any failure this tree is
    /// left exactly as it was before the call.
    #[instrument(skip_all, fields(sources = sources.len()))]
    pub fn merge(&mut self, sources: &[&OpenTree]) -> Result<(), TreeError> {
        // Work on a second handle to the root. Copy-on-write keeps `self.root`
        // untouched until the swap below.
        let mut scratch = Arc::clone(&self.root);
        let mut touched = Vec::new();

        for (index, source) in sources.iter().enumerate() {
            if let Err(e) = merge_node(&mut scratch, &source.root, ROOT, source, &mut touched) {
                warn!(source = index, error = %e, "Merge aborted, tree left unchanged");
                return Err(e);
            }
        }

        self.root = scratch;
        for touched_path in &touched {
            self.mark_dirty(touched_path);
        }
        debug!(touched = touched.len(), "Merge applied");
        Ok(())
    }
}

/// Merge `src` into `dst`; both sit at `node_path`.
fn merge_node(
    dst: &mut Arc<Node>,
    src: &Arc<Node>,
    node_path: &str,
    source: &OpenTree,
    touched: &mut Vec<String>,
) -> Result<(), TreeError> {
    match (&dst.kind, &src.kind) {
        (NodeKind::File(_), NodeKind::File(src_file)) => {
            if src_file.block_refs.is_empty() {
                return Ok(());
            }
            if let NodeKind::File(dst_file) = &mut Arc::make_mut(dst).kind {
                dst_file.block_refs.extend_from_slice(&src_file.block_refs);
            }
            touched.push(node_path.to_string());
            Ok(())
        }
        (NodeKind::Directory(_), NodeKind::Directory(src_dir)) => {
            for (name, src_child) in &src_dir.children {
                let child_path = path::join(node_path, name);
                let NodeKind::Directory(dst_dir) = &mut Arc::make_mut(dst).kind else {
                    return Err(TreeError::Internal(format!(
                        "{} stopped being a directory during merge",
                        node_path
                    )));
                };

                if let Some(dst_child) = dst_dir.children.get_mut(name) {
                    merge_node(dst_child, src_child, &child_path, source, touched)?;
                    continue;
                }

                if source.is_clean_within(&child_path) {
                    // Hashes below are final in the source, share the subtree as is
                    dst_dir.children.insert(name.clone(), Arc::clone(src_child));
                    touched.push(node_path.to_string());
                    continue;
                }

                match &src_child.kind {
                    NodeKind::File(file) => {
                        dst_dir.children.insert(
                            name.clone(),
                            Arc::new(Node::new_file(name, file.block_refs.clone())),
                        );
                        touched.push(child_path);
                    }
                    NodeKind::Directory(_) => {
                        let shell = dst_dir
                            .children
                            .entry(name.clone())
                            .or_insert_with(|| Arc::new(Node::new_dir(name)));
                        touched.push(child_path.clone());
                        merge_node(shell, src_child, &child_path, source, touched)?;
                    }
                }
            }
            Ok(())
        }
        (NodeKind::File(_), NodeKind::Directory(_)) => Err(TreeError::conflict(
            node_path,
            "file in this tree, directory in merge source",
        )),
        (NodeKind::Directory(_), NodeKind::File(_)) => Err(TreeError::conflict(
            node_path,
            "directory in this tree, file in merge source",
        )),
    }
}
