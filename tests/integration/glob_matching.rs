//! Integration tests for glob matching over finished trees

use snaptree::{BlockRef, ErrorCode, HashTree, OpenTree};

fn sample() -> HashTree {
    let mut open = OpenTree::new();
    for path in [
        "/a/f.txt",
        "/a/g.rs",
        "/a/b/f.txt",
        "/a/b/c/deep.txt",
        "/other/f.txt",
        "/readme",
    ] {
        open.put_file(path, &[BlockRef::new("b", 0, 1)]).unwrap();
    }
    open.put_dir("/a/empty").unwrap();
    open.finish().unwrap()
}

fn paths(tree: &HashTree, pattern: &str) -> Vec<String> {
    tree.glob(pattern).unwrap().into_iter().map(|(p, _)| p).collect()
}

/// Test that `*` stays within one segment
#[test]
fn test_star_single_segment() {
    assert_eq!(paths(&sample(), "/a/*.txt"), vec!["/a/f.txt"]);
}

/// Test that `**` spans zero or more segments
#[test]
fn test_globstar_spans_segments() {
    assert_eq!(
        paths(&sample(), "/a/**/*.txt"),
        vec!["/a/b/c/deep.txt", "/a/b/f.txt", "/a/f.txt"]
    );
}

/// Test that matches include directories
#[test]
fn test_matches_directories() {
    assert_eq!(paths(&sample(), "/a/*"), vec!["/a/b", "/a/empty", "/a/f.txt", "/a/g.rs"]);
}

/// Test that a trailing globstar matches the whole subtree, including its root
#[test]
fn test_trailing_globstar() {
    assert_eq!(
        paths(&sample(), "/a/b/**"),
        vec!["/a/b", "/a/b/c", "/a/b/c/deep.txt", "/a/b/f.txt"]
    );
}

/// Test that results are sorted and deduplicated
#[test]
fn test_results_sorted_and_unique() {
    let found = paths(&sample(), "/**/**/f.txt");
    assert_eq!(found, vec!["/a/b/f.txt", "/a/f.txt", "/other/f.txt"]);
}

/// Test that literal patterns behave like lookups
#[test]
fn test_literal_pattern() {
    assert_eq!(paths(&sample(), "/readme"), vec!["/readme"]);
    assert!(paths(&sample(), "/nope").is_empty());
    assert_eq!(paths(&sample(), "/"), vec!["/"]);
}

/// Test character classes and single-character wildcards
#[test]
fn test_classes_and_question_mark() {
    assert_eq!(paths(&sample(), "/a/[fg].*"), vec!["/a/f.txt", "/a/g.rs"]);
    assert_eq!(paths(&sample(), "/a/?.rs"), vec!["/a/g.rs"]);
    assert_eq!(paths(&sample(), "/a/[!f]*"), vec!["/a/b", "/a/empty", "/a/g.rs"]);
}

/// Test malformed patterns
#[test]
fn test_malformed_patterns() {
    let tree = sample();
    for pattern in ["[", "", "/a/[b", "/a/f\\"] {
        let err = tree.glob(pattern).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedGlob, "pattern {:?}", pattern);
    }
}

/// Test that `..` in a pattern resolves against the preceding segment
#[test]
fn test_dot_dot_in_pattern() {
    let tree = sample();
    assert_eq!(paths(&tree, "/x/../a/*.txt"), paths(&tree, "/a/*.txt"));
    assert_eq!(paths(&tree, "/a/b/../*.rs"), vec!["/a/g.rs"]);
    assert_eq!(paths(&tree, "/../readme"), vec!["/readme"]);
}
