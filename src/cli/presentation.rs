//! CLI presentation: text and json formatters per command.

use crate::error::ApiError;
use crate::tree::{HashTree, Node, NodeKind};
use crate::types::Hash;
use comfy_table::Table;
use serde_json::{json, Value};

fn kind_name(node: &Node) -> &'static str {
    match node.kind {
        NodeKind::File(_) => "file",
        NodeKind::Directory(_) => "directory",
    }
}

fn node_json(path: &str, node: &Node) -> Value {
    match &node.kind {
        NodeKind::File(file) => json!({
            "path": path,
            "kind": "file",
            "size": node.size,
            "hash": node.hash_hex(),
            "block_refs": file.block_refs.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
        }),
        NodeKind::Directory(dir) => json!({
            "path": path,
            "kind": "directory",
            "size": node.size,
            "hash": node.hash_hex(),
            "children": dir.names().collect::<Vec<_>>(),
        }),
    }
}

fn node_table<'a>(rows: impl Iterator<Item = (String, &'a Node)>) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Path", "Kind", "Size", "Hash"]);
    for (path, node) in rows {
        table.add_row(vec![
            path,
            kind_name(node).to_string(),
            node.size.to_string(),
            node.hash_hex()[..12].to_string(),
        ]);
    }
    table
}

pub fn format_node(path: &str, node: &Node, format: &str) -> Result<String, ApiError> {
    if format == "json" {
        return Ok(serde_json::to_string_pretty(&node_json(path, node))?);
    }
    let mut lines = vec![
        format!("Path: {}", path),
        format!("Kind: {}", kind_name(node)),
        format!("Size: {}", node.size),
        format!("Hash: {}", node.hash_hex()),
    ];
    match &node.kind {
        NodeKind::File(file) => {
            for block_ref in &file.block_refs {
                lines.push(format!("  {}", block_ref));
            }
        }
        NodeKind::Directory(dir) => {
            for name in dir.names() {
                lines.push(format!("  {}", name));
            }
        }
    }
    Ok(lines.join("\n"))
}

pub fn format_listing(
    dir_path: &str,
    children: &[&Node],
    format: &str,
) -> Result<String, ApiError> {
    let rows = children
        .iter()
        .map(|child| (crate::tree::path::join(dir_path, &child.name), *child));
    if format == "json" {
        let arr: Vec<Value> = rows.map(|(p, n)| node_json(&p, n)).collect();
        return Ok(serde_json::to_string_pretty(&arr)?);
    }
    if children.is_empty() {
        return Ok(format!("{} is empty", dir_path));
    }
    Ok(node_table(rows).to_string())
}

pub fn format_matches(matches: &[(String, &Node)], format: &str) -> Result<String, ApiError> {
    if format == "json" {
        let arr: Vec<Value> = matches.iter().map(|(p, n)| node_json(p, n)).collect();
        return Ok(serde_json::to_string_pretty(&arr)?);
    }
    if matches.is_empty() {
        return Ok("No matches".to_string());
    }
    Ok(node_table(matches.iter().map(|(p, n)| (p.clone(), *n))).to_string())
}

pub fn format_info(tree: &HashTree, format: &str) -> Result<String, ApiError> {
    let mut files = 0usize;
    let mut dirs = 0usize;
    tree.walk("/", |_, node| {
        if node.is_file() {
            files += 1;
        } else {
            dirs += 1;
        }
    })?;
    let root_hash = hex::encode(tree.root_hash());

    if format == "json" {
        let value = json!({
            "root_hash": root_hash,
            "size": tree.size(),
            "files": files,
            "directories": dirs,
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }
    Ok(format!(
        "Root hash: {}\nSize: {}\nFiles: {}\nDirectories: {}",
        root_hash,
        tree.size(),
        files,
        dirs
    ))
}

pub fn format_heads(heads: &[(String, Hash)], format: &str) -> Result<String, ApiError> {
    if format == "json" {
        let arr: Vec<Value> = heads
            .iter()
            .map(|(name, hash)| json!({ "name": name, "root_hash": hex::encode(hash) }))
            .collect();
        return Ok(serde_json::to_string_pretty(&arr)?);
    }
    if heads.is_empty() {
        return Ok("No heads".to_string());
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Head", "Root hash"]);
    for (name, hash) in heads {
        table.add_row(vec![name.clone(), hex::encode(hash)]);
    }
    Ok(table.to_string())
}
