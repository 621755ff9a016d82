//! Core types for the snapshot tree.

use crate::error::TreeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hash: BLAKE3 digest of a node
pub type Hash = [u8; 32];

/// Opaque identifier of a content block, owned by the block storage layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        BlockId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Half-open byte range `[lower, upper)` within a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    pub lower: u64,
    pub upper: u64,
}

/// Reference to a byte range of a stored block.
///
/// The tree never reads block contents. It stores, concatenates, compares and
/// hashes references only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRef {
    pub block: BlockId,
    pub range: ByteRange,
}

impl BlockRef {
    pub fn new(block: impl Into<String>, lower: u64, upper: u64) -> Self {
        BlockRef {
            block: BlockId::new(block),
            range: ByteRange { lower, upper },
        }
    }

    /// Number of content bytes this reference covers
    pub fn len(&self) -> u64 {
        self.range.upper.saturating_sub(self.range.lower)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.block, self.range.lower, self.range.upper)
    }
}

/// Parses `<block>:<lower>-<upper>` or `<block>:<len>`.
impl FromStr for BlockRef {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TreeError::InvalidBlockRef {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (block, range) = s
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected <block>:<range>"))?;
        if block.is_empty() {
            return Err(invalid("empty block id"));
        }

        let (lower, upper) = match range.split_once('-') {
            Some((lo, hi)) => (
                lo.parse::<u64>().map_err(|_| invalid("bad lower bound"))?,
                hi.parse::<u64>().map_err(|_| invalid("bad upper bound"))?,
            ),
            None => (0, range.parse::<u64>().map_err(|_| invalid("bad length"))?),
        };
        if upper < lower {
            return Err(invalid("upper bound below lower bound"));
        }

        Ok(BlockRef::new(block, lower, upper))
    }
}
