//! Integration tests for tree structure and the mutation surface

use snaptree::{BlockRef, ErrorCode, HashTree, OpenTree};

fn refs(ids: &[&str]) -> Vec<BlockRef> {
    ids.iter().map(|id| BlockRef::new(*id, 0, 8)).collect()
}

/// Test that a put file can be read back with its exact references
#[test]
fn test_put_file_then_get() {
    let mut open = OpenTree::new();
    let r = refs(&["b1", "b2"]);
    open.put_file("/a/b/c", &r).unwrap();
    let tree = open.finish().unwrap();

    let node = tree.get("/a/b/c").unwrap();
    assert!(node.is_file());
    assert_eq!(node.block_refs(), r.as_slice());
    assert_eq!(node.size, 16);

    let names: Vec<&str> = tree.list("/a").unwrap().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["b"]);
}

/// Test that intermediate directories are created on demand
#[test]
fn test_put_file_creates_parents() {
    let mut open = OpenTree::new();
    open.put_file("/x/y/z/file", &refs(&["b"])).unwrap();
    let tree = open.finish().unwrap();

    for dir in ["/x", "/x/y", "/x/y/z"] {
        assert!(tree.get(dir).unwrap().is_dir(), "{} should be a directory", dir);
    }
    assert_eq!(tree.get("/x").unwrap().size, 8);
    assert_eq!(tree.size(), 8);
}

/// Test that paths are cleaned before lookup
#[test]
fn test_paths_are_normalized() {
    let mut open = OpenTree::new();
    open.put_file("a//b/./c", &refs(&["b"])).unwrap();
    let tree = open.finish().unwrap();

    assert!(tree.get("/a/b/c").is_ok());
    assert!(tree.get("/a/b/c/").is_ok());
    assert!(tree.get("/a/x/../b/c").is_ok());
}

/// Test that put_dir twice equals put_dir once
#[test]
fn test_put_dir_idempotent() {
    let mut once = OpenTree::new();
    once.put_dir("/p/q").unwrap();
    let once = once.finish().unwrap();

    let mut twice = OpenTree::new();
    twice.put_dir("/p/q").unwrap();
    twice.put_dir("/p/q").unwrap();
    let twice = twice.finish().unwrap();

    assert_eq!(once.root_hash(), twice.root_hash());
}

/// Test that a deleted path is gone
#[test]
fn test_delete_then_get_not_found() {
    let mut open = OpenTree::new();
    open.put_file("/d/f1", &refs(&["b1"])).unwrap();
    open.put_file("/d/f2", &refs(&["b2"])).unwrap();
    open.delete_file("/d/f1").unwrap();
    let tree = open.finish().unwrap();

    assert_eq!(tree.get("/d/f1").unwrap_err().code(), ErrorCode::PathNotFound);
    assert!(tree.get("/d/f2").is_ok());
    assert_eq!(tree.get("/d").unwrap().size, 8);
}

/// Test that deleting a directory removes its subtree
#[test]
fn test_delete_directory_recursive() {
    let mut open = OpenTree::new();
    open.put_file("/d/sub/f", &refs(&["b"])).unwrap();
    open.put_file("/keep", &refs(&["k"])).unwrap();
    open.delete_file("/d").unwrap();
    let tree = open.finish().unwrap();

    assert_eq!(tree.get("/d/sub/f").unwrap_err().code(), ErrorCode::PathNotFound);
    assert_eq!(tree.list("/").unwrap().len(), 1);
}

/// Test that deleting the root yields an empty tree
#[test]
fn test_delete_root() {
    let mut open = OpenTree::new();
    open.put_file("/a", &refs(&["b"])).unwrap();
    open.delete_file("/").unwrap();
    let tree = open.finish().unwrap();

    assert_eq!(tree.root_hash(), HashTree::empty().root_hash());
    assert!(tree.list("/").unwrap().is_empty());
}

/// Test that deleting a missing path fails
#[test]
fn test_delete_missing() {
    let mut open = OpenTree::new();
    assert_eq!(open.delete_file("/nope").unwrap_err().code(), ErrorCode::PathNotFound);
}

/// Test that put_dir over a file conflicts and leaves the builder unchanged
#[test]
fn test_put_dir_over_file_conflicts() {
    let mut open = OpenTree::new();
    open.put_file("/a", &refs(&["b1"])).unwrap();
    let before = open.clone();

    let err = open.put_dir("/a").unwrap_err();
    assert_eq!(err.code(), ErrorCode::PathConflict);
    assert_eq!(open.get_open("/a").unwrap(), before.get_open("/a").unwrap());
    assert_eq!(open.dirty_count(), before.dirty_count());
    assert_eq!(open.finish().unwrap(), before.finish().unwrap());
}

/// Test that files cannot be created under or onto the wrong kind of node
#[test]
fn test_put_file_conflicts() {
    let mut open = OpenTree::new();
    open.put_file("/f", &refs(&["b"])).unwrap();
    open.put_dir("/d").unwrap();

    assert_eq!(
        open.put_file("/f/child", &refs(&["c"])).unwrap_err().code(),
        ErrorCode::PathConflict
    );
    assert_eq!(open.put_file("/d", &refs(&["c"])).unwrap_err().code(), ErrorCode::PathConflict);
    assert_eq!(open.put_file("/", &refs(&["c"])).unwrap_err().code(), ErrorCode::PathConflict);
    assert!(open.get_open("/f/child").is_err());
}

/// Test that put_file on an existing file appends
#[test]
fn test_put_file_appends() {
    let mut open = OpenTree::new();
    open.put_file("/f", &refs(&["b1"])).unwrap();
    open.put_file("/f", &refs(&["b2", "b3"])).unwrap();
    let tree = open.finish().unwrap();

    assert_eq!(tree.get("/f").unwrap().block_refs(), refs(&["b1", "b2", "b3"]).as_slice());
}

/// Test list error classification
#[test]
fn test_list_errors() {
    let mut open = OpenTree::new();
    open.put_file("/f", &refs(&["b"])).unwrap();
    let tree = open.finish().unwrap();

    assert_eq!(tree.list("/f").unwrap_err().code(), ErrorCode::PathConflict);
    assert_eq!(tree.list("/missing").unwrap_err().code(), ErrorCode::PathNotFound);
}

/// Test that the root resolves to an unnamed directory
#[test]
fn test_get_root() {
    let tree = HashTree::empty();
    let root = tree.get("/").unwrap();
    assert!(root.is_dir());
    assert_eq!(root.name, "");
}

/// Test that opening a finished tree leaves the original untouched
#[test]
fn test_open_does_not_affect_source() {
    let mut open = OpenTree::new();
    open.put_file("/a", &refs(&["b"])).unwrap();
    let original = open.finish().unwrap();
    let original_hash = original.root_hash();

    let mut edited = original.open();
    edited.put_file("/a", &refs(&["c"])).unwrap();
    edited.delete_file("/a").unwrap();
    let edited = edited.finish().unwrap();

    assert_eq!(original.root_hash(), original_hash);
    assert!(original.get("/a").is_ok());
    assert!(edited.get("/a").is_err());
}

/// Test that get_open reflects pending changes before finish
#[test]
fn test_get_open_sees_pending_structure() {
    let mut open = OpenTree::new();
    open.put_file("/dir/f", &refs(&["b"])).unwrap();
    let view = open.get_open("/dir").unwrap();
    assert!(view.is_dir());
    assert_eq!(open.get_open("/nope").unwrap_err().code(), ErrorCode::PathNotFound);
}

/// Test that finished trees can be read from several threads
#[test]
fn test_concurrent_reads() {
    let mut open = OpenTree::new();
    for i in 0..50 {
        open.put_file(&format!("/d/f{}", i), &refs(&["b"])).unwrap();
    }
    let tree = open.finish().unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert_eq!(tree.list("/d").unwrap().len(), 50);
                assert_eq!(tree.glob("/d/f1*").unwrap().len(), 11);
            });
        }
    });
}
