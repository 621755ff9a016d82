//! Hash computation for tree nodes using BLAKE3

use crate::types::{BlockRef, Hash};
use blake3::Hasher;

/// Compute the hash of a file node
///
/// Hash = hash("file" || name_len || name || ref_count || refs)
///
/// Each ref contributes `block_len || block || lower || upper`, so the hash
/// depends on the order of the refs.
pub fn compute_file_hash(name: &str, block_refs: &[BlockRef]) -> Hash {
    let mut hasher = Hasher::new();

    // Hash type discriminator
    hasher.update(b"file");

    // Hash name length (8 bytes, big-endian for determinism)
    hasher.update(&(name.len() as u64).to_be_bytes());
    hasher.update(name.as_bytes());

    hasher.update(&(block_refs.len() as u64).to_be_bytes());
    for block_ref in block_refs {
        let block = block_ref.block.as_str().as_bytes();
        hasher.update(&(block.len() as u64).to_be_bytes());
        hasher.update(block);
        hasher.update(&block_ref.range.lower.to_be_bytes());
        hasher.update(&block_ref.range.upper.to_be_bytes());
    }

    *hasher.finalize().as_bytes()
}

/// Compute the hash of a directory node
///
/// Hash = hash("directory" || name_len || name || children_count || children)
///
/// Children must be sorted by name for determinism.
pub fn compute_directory_hash<'a, I>(name: &str, children: I) -> Hash
where
    I: ExactSizeIterator<Item = (&'a str, &'a Hash)>,
{
    let mut hasher = Hasher::new();

    hasher.update(b"directory");

    hasher.update(&(name.len() as u64).to_be_bytes());
    hasher.update(name.as_bytes());

    // Hash children count (8 bytes, big-endian)
    hasher.update(&(children.len() as u64).to_be_bytes());

    for (child_name, child_hash) in children {
        hasher.update(&(child_name.len() as u64).to_be_bytes());
        hasher.update(child_name.as_bytes());
        hasher.update(child_hash);
    }

    *hasher.finalize().as_bytes()
}

/// Total content length covered by a sequence of block refs, or `None` if
/// it does not fit in a `u64`
pub fn compute_file_size(block_refs: &[BlockRef]) -> Option<u64> {
    block_refs
        .iter()
        .try_fold(0u64, |total, block_ref| total.checked_add(block_ref.len()))
}
