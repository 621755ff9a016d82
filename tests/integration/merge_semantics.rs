//! Integration tests for merging builders

use snaptree::{BlockRef, ErrorCode, OpenTree};

fn r(id: &str) -> BlockRef {
    BlockRef::new(id, 0, 4)
}

fn builder_with(files: &[(&str, &str)]) -> OpenTree {
    let mut open = OpenTree::new();
    for (path, block) in files {
        open.put_file(path, &[r(block)]).unwrap();
    }
    open
}

/// Test that merging disjoint builders is order independent
#[test]
fn test_disjoint_merge_commutes() {
    let t1 = builder_with(&[("/x/1", "b1")]);
    let t2 = builder_with(&[("/y/2", "b2")]);

    let mut forward = OpenTree::new();
    forward.merge(&[&t1, &t2]).unwrap();
    let mut backward = OpenTree::new();
    backward.merge(&[&t2, &t1]).unwrap();

    let forward = forward.finish().unwrap();
    let backward = backward.finish().unwrap();
    assert_eq!(forward.root_hash(), backward.root_hash());
    assert!(forward.get("/x/1").is_ok());
    assert!(forward.get("/y/2").is_ok());
}

/// Test that files present in several sources accumulate references in order
#[test]
fn test_same_file_appends_in_source_order() {
    let t1 = builder_with(&[("/a", "b1")]);
    let t2 = builder_with(&[("/a", "b2")]);

    let mut receiver = OpenTree::new();
    receiver.merge(&[&t1, &t2]).unwrap();
    let tree = receiver.finish().unwrap();

    assert_eq!(tree.get("/a").unwrap().block_refs(), &[r("b1"), r("b2")]);
    assert_eq!(tree.get("/a").unwrap().size, 8);
}

/// Test that the receiver's own references come first
#[test]
fn test_receiver_refs_precede_source_refs() {
    let mut receiver = builder_with(&[("/a", "mine")]);
    let source = builder_with(&[("/a", "theirs")]);
    receiver.merge(&[&source]).unwrap();
    let tree = receiver.finish().unwrap();

    assert_eq!(tree.get("/a").unwrap().block_refs(), &[r("mine"), r("theirs")]);
}

/// Test that a kind mismatch fails and leaves the receiver unchanged
#[test]
fn test_conflict_is_atomic() {
    let mut receiver = builder_with(&[("/keep", "k")]);
    let before = receiver.clone();

    let ok_source = builder_with(&[("/new/file", "n")]);
    let mut dir_source = OpenTree::new();
    dir_source.put_dir("/a/inner").unwrap();
    let file_source = builder_with(&[("/a", "f")]);

    let err = receiver.merge(&[&ok_source, &dir_source, &file_source]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::PathConflict);

    assert_eq!(receiver.get_open("/new/file").unwrap_err().code(), ErrorCode::PathNotFound);
    assert_eq!(receiver.get_open("/a").unwrap_err().code(), ErrorCode::PathNotFound);
    assert_eq!(receiver.dirty_count(), before.dirty_count());
    assert_eq!(receiver.finish().unwrap(), before.finish().unwrap());
}

/// Test the reverse mismatch: directory in the source, file in the receiver
#[test]
fn test_directory_onto_file_conflicts() {
    let mut receiver = builder_with(&[("/a", "f")]);
    let mut source = OpenTree::new();
    source.put_file("/a/child", &[r("c")]).unwrap();

    let err = receiver.merge(&[&source]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::PathConflict);
    assert!(receiver.get_open("/a").unwrap().is_file());
}

/// Test that merged trees hash like trees built directly
#[test]
fn test_merge_equals_direct_build() {
    let t1 = builder_with(&[("/src/main.rs", "m"), ("/docs/a.md", "a")]);
    let t2 = builder_with(&[("/src/lib.rs", "l"), ("/docs/a.md", "a2")]);

    let mut merged = OpenTree::new();
    merged.merge(&[&t1, &t2]).unwrap();
    let merged = merged.finish().unwrap();

    let mut direct = OpenTree::new();
    direct.put_file("/src/main.rs", &[r("m")]).unwrap();
    direct.put_file("/docs/a.md", &[r("a")]).unwrap();
    direct.put_file("/src/lib.rs", &[r("l")]).unwrap();
    direct.put_file("/docs/a.md", &[r("a2")]).unwrap();
    let direct = direct.finish().unwrap();

    assert_eq!(merged.root_hash(), direct.root_hash());
}

/// Test merging finished trees reopened as builders
#[test]
fn test_merge_of_reopened_trees() {
    let left = builder_with(&[("/l/f", "l")]).finish().unwrap();
    let right = builder_with(&[("/r/f", "r")]).finish().unwrap();

    let mut receiver = left.open();
    receiver.merge(&[&right.open()]).unwrap();
    let tree = receiver.finish().unwrap();

    assert_eq!(tree.get("/l").unwrap().hash, left.get("/l").unwrap().hash);
    assert_eq!(tree.get("/r").unwrap().hash, right.get("/r").unwrap().hash);
    assert_eq!(tree.size(), 8);
}

/// Test that empty directories survive a merge
#[test]
fn test_merge_copies_empty_directories() {
    let mut source = OpenTree::new();
    source.put_dir("/empty/deeper").unwrap();

    let mut receiver = OpenTree::new();
    receiver.merge(&[&source]).unwrap();
    let tree = receiver.finish().unwrap();
    assert!(tree.get("/empty/deeper").unwrap().is_dir());
}

/// Test that sources are not modified by a merge
#[test]
fn test_sources_untouched() {
    let source = builder_with(&[("/a", "s")]);
    let snapshot = source.clone();
    let mut receiver = builder_with(&[("/a", "r")]);
    receiver.merge(&[&source]).unwrap();

    assert_eq!(source.get_open("/a").unwrap(), snapshot.get_open("/a").unwrap());
}
