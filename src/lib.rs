//! Snaptree: Content-Addressed Snapshot Trees
//!
//! A hierarchical, content-addressed tree of files and directories. Trees are
//! built through an open (mutable) builder, hashed once on `finish`, and then
//! read concurrently, merged, searched with glob patterns and persisted in a
//! versioned wire format.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod store;
pub mod tree;
pub mod types;

pub use error::{ErrorCode, TreeError};
pub use tree::{HashTree, Node, NodeKind, OpenNode, OpenTree};
pub use types::{BlockId, BlockRef, ByteRange, Hash};
