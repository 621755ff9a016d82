//! Path-aware glob matching against a tree.
//!
//! Patterns are split into `/`-separated segments:
//!
//! - `*` matches any run of characters inside one segment
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]`, `[!a-z]` / `[^a-z]` match one character from a class
//! - `\x` matches `x` literally
//! - `**` as a whole segment matches zero or more segments
//!
//! `/a/**/*.txt` matches `/a/f.txt` and `/a/b/c/f.txt`.

use crate::error::TreeError;
use crate::tree::node::{Node, NodeKind};
use crate::tree::path;
use std::collections::{BTreeMap, HashSet};
use tracing::trace;

/// One element of a segment pattern
#[derive(Debug, Clone, PartialEq)]
enum Item {
    Char(char),
    AnyChar,
    Star,
    Class { negated: bool, ranges: Vec<(char, char)> },
}

impl Item {
    fn matches(&self, c: char) -> bool {
        match self {
            Item::Char(expected) => *expected == c,
            Item::AnyChar => true,
            Item::Star => false,
            Item::Class { negated, ranges } => {
                let hit = ranges.iter().any(|(lo, hi)| *lo <= c && c <= *hi);
                hit != *negated
            }
        }
    }
}

/// A segment of a path pattern
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Plain name, compared for equality
    Literal(String),
    /// Name with wildcards
    Pattern(Vec<Item>),
    /// Zero or more whole segments
    Globstar,
}

/// Compiled glob pattern
#[derive(Debug, Clone)]
pub struct GlobPattern {
    segments: Vec<Segment>,
}

impl GlobPattern {
    /// Compile a pattern, failing with `MalformedGlob` on bad syntax
    pub fn new(pattern: &str) -> Result<Self, TreeError> {
        if pattern.is_empty() {
            return Err(TreeError::malformed_glob(pattern, "empty pattern"));
        }

        // `.` and `..` resolve lexically, the same way paths are cleaned
        let cleaned = path::clean(pattern);
        let mut segments = Vec::new();
        for part in cleaned.split('/') {
            if part.is_empty() {
                continue;
            }
            if part == "**" {
                // Consecutive globstars collapse to one
                if !matches!(segments.last(), Some(Segment::Globstar)) {
                    segments.push(Segment::Globstar);
                }
                continue;
            }
            let items = parse_segment(pattern, part)?;
            if items.iter().all(|item| matches!(item, Item::Char(_))) {
                let literal = items
                    .iter()
                    .filter_map(|item| match item {
                        Item::Char(c) => Some(*c),
                        _ => None,
                    })
                    .collect();
                segments.push(Segment::Literal(literal));
            } else {
                segments.push(Segment::Pattern(items));
            }
        }

        Ok(GlobPattern { segments })
    }

    /// Whether a cleaned path matches this pattern
    pub fn matches_path(&self, path: &str) -> bool {
        let cleaned = path::clean(path);
        let components = path::segments(&cleaned);
        match_components(&self.segments, &components)
    }
}

fn parse_segment(pattern: &str, part: &str) -> Result<Vec<Item>, TreeError> {
    let mut items = Vec::new();
    let mut chars = part.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if items.last() != Some(&Item::Star) {
                    items.push(Item::Star);
                }
            }
            '?' => items.push(Item::AnyChar),
            '\\' => match chars.next() {
                Some(escaped) => items.push(Item::Char(escaped)),
                None => return Err(TreeError::malformed_glob(pattern, "dangling escape")),
            },
            '[' => {
                let negated = matches!(chars.peek(), Some('!') | Some('^'));
                if negated {
                    chars.next();
                }
                let mut ranges = Vec::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    let lo = match c {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '\\' => chars.next().ok_or_else(|| {
                            TreeError::malformed_glob(pattern, "dangling escape in class")
                        })?,
                        other => other,
                    };
                    let mut hi = lo;
                    if chars.peek() == Some(&'-') {
                        chars.next();
                        hi = match chars.next() {
                            Some('\\') => chars.next().ok_or_else(|| {
                                TreeError::malformed_glob(pattern, "dangling escape in class")
                            })?,
                            Some(']') | None => {
                                return Err(TreeError::malformed_glob(pattern, "unterminated range"))
                            }
                            Some(other) => other,
                        };
                        if hi < lo {
                            return Err(TreeError::malformed_glob(pattern, "inverted range"));
                        }
                    }
                    ranges.push((lo, hi));
                }
                if !closed {
                    return Err(TreeError::malformed_glob(pattern, "unterminated character class"));
                }
                if ranges.is_empty() {
                    return Err(TreeError::malformed_glob(pattern, "empty character class"));
                }
                items.push(Item::Class { negated, ranges });
            }
            other => items.push(Item::Char(other)),
        }
    }
    Ok(items)
}

/// Match one path segment against a segment pattern.
///
/// Greedy with single-star backtracking, so the cost stays linear in
/// practice even for patterns like `*a*a*a*`.
fn match_name(items: &[Item], name: &str) -> bool {
    let chars: Vec<char> = name.chars().collect();
    let (mut p, mut n) = (0usize, 0usize);
    let mut backtrack: Option<(usize, usize)> = None;

    while n < chars.len() {
        if p < items.len() {
            if items[p] == Item::Star {
                backtrack = Some((p, n));
                p += 1;
                continue;
            }
            if items[p].matches(chars[n]) {
                p += 1;
                n += 1;
                continue;
            }
        }
        match backtrack {
            Some((star_p, star_n)) => {
                p = star_p + 1;
                n = star_n + 1;
                backtrack = Some((star_p, star_n + 1));
            }
            None => return false,
        }
    }
    items[p..].iter().all(|item| *item == Item::Star)
}

fn match_segment(segment: &Segment, name: &str) -> bool {
    match segment {
        Segment::Literal(literal) => literal == name,
        Segment::Pattern(items) => match_name(items, name),
        Segment::Globstar => true,
    }
}

fn match_components(segments: &[Segment], components: &[&str]) -> bool {
    match segments.split_first() {
        None => components.is_empty(),
        Some((Segment::Globstar, rest)) => {
            (0..=components.len()).any(|skip| match_components(rest, &components[skip..]))
        }
        Some((segment, rest)) => match components.split_first() {
            Some((first, tail)) => match_segment(segment, first) && match_components(rest, tail),
            None => false,
        },
    }
}

/// Walk the tree from the root and collect every node the pattern matches
pub(crate) fn find_matches<'a>(root: &'a Node, pattern: &GlobPattern) -> Vec<(String, &'a Node)> {
    let mut matches = BTreeMap::new();
    let mut visited = HashSet::new();
    walk(
        root,
        path::ROOT.to_string(),
        &pattern.segments,
        &mut matches,
        &mut visited,
    );
    trace!(matches = matches.len(), "Glob walk finished");
    matches.into_iter().collect()
}

fn walk<'a>(
    node: &'a Node,
    node_path: String,
    segments: &[Segment],
    matches: &mut BTreeMap<String, &'a Node>,
    visited: &mut HashSet<(*const Node, usize)>,
) {
    // A globstar can reach the same (node, remaining pattern) pair along
    // several routes; each pair only needs exploring once. A node allocation
    // sits at exactly one path within a tree, so its address names the path.
    if !visited.insert((node as *const Node, segments.len())) {
        return;
    }

    let Some((segment, rest)) = segments.split_first() else {
        matches.insert(node_path, node);
        return;
    };

    let NodeKind::Directory(dir) = &node.kind else {
        // A file can only satisfy a trailing globstar by consuming nothing
        if *segment == Segment::Globstar {
            walk(node, node_path, rest, matches, visited);
        }
        return;
    };

    match segment {
        Segment::Globstar => {
            walk(node, node_path.clone(), rest, matches, visited);
            for (name, child) in &dir.children {
                walk(child, path::join(&node_path, name), segments, matches, visited);
            }
        }
        Segment::Literal(name) => {
            if let Some(child) = dir.children.get(name) {
                walk(child, path::join(&node_path, name), rest, matches, visited);
            }
        }
        Segment::Pattern(items) => {
            for (name, child) in &dir.children {
                if match_name(items, name) {
                    walk(child, path::join(&node_path, name), rest, matches, visited);
                }
            }
        }
    }
}
