//! Property-based tests for determinism guarantees

use proptest::prelude::*;
use snaptree::{BlockRef, HashTree, OpenTree};

/// Relative file paths of one to three segments over a small alphabet, so
/// that generated trees share directories.
fn file_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-d]{1,2}", 1..=3).prop_map(|segments| segments.join("/"))
}

fn block_ref() -> impl Strategy<Value = BlockRef> {
    ("[a-z0-9]{1,6}", 0u64..1000, 0u64..1000)
        .prop_map(|(block, a, b)| BlockRef::new(block, a.min(b), a.max(b)))
}

fn entries() -> impl Strategy<Value = Vec<(String, Vec<BlockRef>)>> {
    prop::collection::vec((file_path(), prop::collection::vec(block_ref(), 0..3)), 0..24)
}

/// Apply entries, skipping ones that conflict with earlier entries
fn build(entries: &[(String, Vec<BlockRef>)]) -> OpenTree {
    let mut open = OpenTree::new();
    for (path, refs) in entries {
        let _ = open.put_file(&format!("/{}", path), refs);
    }
    open
}

/// Keep the first entry per path and drop entries that would conflict
fn conflict_free(entries: Vec<(String, Vec<BlockRef>)>) -> Vec<(String, Vec<BlockRef>)> {
    let mut kept: Vec<(String, Vec<BlockRef>)> = Vec::new();
    for (path, refs) in entries {
        let clashes = kept.iter().any(|(other, _)| {
            other == &path
                || other.starts_with(&format!("{}/", path))
                || path.starts_with(&format!("{}/", other))
        });
        if !clashes {
            kept.push((path, refs));
        }
    }
    kept
}

proptest! {
    /// The finished tree does not depend on the order files were added
    #[test]
    fn prop_insertion_order_independent(raw in entries()) {
        let entries = conflict_free(raw);
        let forward = build(&entries).finish().unwrap();

        let mut reversed = entries.clone();
        reversed.reverse();
        let backward = build(&reversed).finish().unwrap();

        prop_assert_eq!(forward.root_hash(), backward.root_hash());
    }

    /// Decoding an encoded tree gives back an equal tree with the same answers
    #[test]
    fn prop_marshal_roundtrip(raw in entries()) {
        let tree = build(&raw).finish().unwrap();
        let decoded = HashTree::unmarshal(&tree.marshal().unwrap()).unwrap();

        prop_assert_eq!(decoded.root_hash(), tree.root_hash());
        prop_assert_eq!(decoded.size(), tree.size());
        prop_assert_eq!(decoded.glob("/**").unwrap(), tree.glob("/**").unwrap());
    }

    /// Root size is the sum of every file's reference lengths
    #[test]
    fn prop_size_is_sum_of_refs(raw in entries()) {
        let tree = build(&raw).finish().unwrap();
        let mut total = 0u64;
        tree.walk("/", |_, node| {
            if node.is_file() {
                total += node.block_refs().iter().map(BlockRef::len).sum::<u64>();
            }
        })
        .unwrap();
        prop_assert_eq!(tree.size(), total);
    }

    /// Incremental finish agrees with building the same content from scratch
    #[test]
    fn prop_incremental_equals_scratch(base in entries(), extra in entries()) {
        let base = conflict_free(base);
        let first = build(&base).finish().unwrap();

        let mut reopened = first.open();
        for (path, refs) in &extra {
            let _ = reopened.put_file(&format!("/{}", path), refs);
        }
        let incremental = reopened.finish().unwrap();

        let mut all = base.clone();
        all.extend(extra.iter().cloned());
        let scratch = build(&all).finish().unwrap();

        prop_assert_eq!(incremental.root_hash(), scratch.root_hash());
    }

    /// Merging disjoint builders commutes
    #[test]
    fn prop_disjoint_merge_commutes(left in entries(), right in entries()) {
        let left: Vec<_> = left.into_iter().map(|(p, r)| (format!("l/{}", p), r)).collect();
        let right: Vec<_> = right.into_iter().map(|(p, r)| (format!("r/{}", p), r)).collect();
        let (l, r) = (build(&left), build(&right));

        let mut ab = OpenTree::new();
        ab.merge(&[&l, &r]).unwrap();
        let mut ba = OpenTree::new();
        ba.merge(&[&r, &l]).unwrap();

        prop_assert_eq!(ab.finish().unwrap().root_hash(), ba.finish().unwrap().root_hash());
    }
}
