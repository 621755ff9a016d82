//! Path cleaning and segment utilities
//!
//! Every path handed to the tree is cleaned into a canonical form before it
//! touches the index: a single leading `/`, no trailing `/` (except the root),
//! no empty or `.` segments, `..` resolved lexically, Unicode in NFC.

use unicode_normalization::UnicodeNormalization;

/// Canonical path of the root directory
pub const ROOT: &str = "/";

/// Clean a path into its canonical form
pub fn clean(path: &str) -> String {
    let normalized: String = path.nfc().collect();
    let mut segments: Vec<&str> = Vec::new();
    for part in normalized.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return ROOT.to_string();
    }
    let mut result = String::with_capacity(normalized.len() + 1);
    for segment in segments {
        result.push('/');
        result.push_str(segment);
    }
    result
}

/// Split a cleaned path into its segments. The root has none.
pub fn segments(clean_path: &str) -> Vec<&str> {
    clean_path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Join a cleaned parent path and a child name
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Every proper ancestor of a cleaned path, nearest first, ending with the root
pub fn ancestors(clean_path: &str) -> impl Iterator<Item = &str> {
    let mut current = Some(clean_path);
    std::iter::from_fn(move || {
        let path = current?;
        if path == ROOT {
            current = None;
            return None;
        }
        let parent = match path.rfind('/') {
            Some(0) | None => ROOT,
            Some(idx) => &path[..idx],
        };
        current = Some(parent);
        Some(parent)
    })
}

/// Number of segments in a cleaned path
pub fn depth(clean_path: &str) -> usize {
    if clean_path == ROOT {
        0
    } else {
        clean_path.matches('/').count()
    }
}

/// Whether `path` equals `prefix` or lies beneath it
pub fn is_within(path: &str, prefix: &str) -> bool {
    if prefix == ROOT {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
