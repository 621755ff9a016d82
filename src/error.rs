//! Error types for the snapshot tree.

use crate::types::Hash;
use std::error::Error as StdError;
use thiserror::Error;

/// Classification of every failure the tree can report.
///
/// Callers branch on this rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// No error
    Ok,
    /// The error did not originate in the tree
    Unknown,
    /// A structural invariant was violated
    Internal,
    /// Serialized bytes could not be decoded
    CannotDeserialize,
    /// Serialized format version is not supported
    Unsupported,
    /// No node exists at the requested path
    PathNotFound,
    /// Glob pattern could not be tokenized
    MalformedGlob,
    /// A path is a file where a directory was expected, or the reverse
    PathConflict,
}

impl ErrorCode {
    /// Classify an arbitrary error by walking its source chain.
    ///
    /// Returns the code of the first `TreeError` found, or `Unknown`.
    pub fn of(err: &(dyn StdError + 'static)) -> ErrorCode {
        let mut current = Some(err);
        while let Some(e) = current {
            if let Some(tree_err) = e.downcast_ref::<TreeError>() {
                return tree_err.code();
            }
            current = e.source();
        }
        ErrorCode::Unknown
    }

    /// Classify a result; `Ok(_)` maps to `ErrorCode::Ok`.
    pub fn of_result<T, E>(result: &Result<T, E>) -> ErrorCode
    where
        E: StdError + 'static,
    {
        match result {
            Ok(_) => ErrorCode::Ok,
            Err(e) => ErrorCode::of(e),
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::Ok => "ok",
            ErrorCode::Unknown => "unknown",
            ErrorCode::Internal => "internal",
            ErrorCode::CannotDeserialize => "cannot_deserialize",
            ErrorCode::Unsupported => "unsupported",
            ErrorCode::PathNotFound => "path_not_found",
            ErrorCode::MalformedGlob => "malformed_glob",
            ErrorCode::PathConflict => "path_conflict",
        };
        f.write_str(name)
    }
}

/// Errors returned by tree operations
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Path conflict at {path}: {reason}")]
    PathConflict { path: String, reason: String },

    #[error("Malformed glob pattern {pattern:?}: {reason}")]
    MalformedGlob { pattern: String, reason: String },

    #[error("Cannot deserialize tree: {0}")]
    CannotDeserialize(String),

    #[error("Unsupported tree format version: {0}")]
    Unsupported(u32),

    #[error("Internal tree error: {0}")]
    Internal(String),

    #[error("Invalid block reference {input:?}: {reason}")]
    InvalidBlockRef { input: String, reason: String },
}

impl TreeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TreeError::PathNotFound(_) => ErrorCode::PathNotFound,
            TreeError::PathConflict { .. } => ErrorCode::PathConflict,
            TreeError::MalformedGlob { .. } => ErrorCode::MalformedGlob,
            TreeError::CannotDeserialize(_) => ErrorCode::CannotDeserialize,
            TreeError::Unsupported(_) => ErrorCode::Unsupported,
            TreeError::Internal(_) => ErrorCode::Internal,
            TreeError::InvalidBlockRef { .. } => ErrorCode::Unknown,
        }
    }

    pub(crate) fn conflict(path: &str, reason: impl Into<String>) -> Self {
        TreeError::PathConflict {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_glob(pattern: &str, reason: impl Into<String>) -> Self {
        TreeError::MalformedGlob {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Snapshot store errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Snapshot not found: {}", hex::encode(.0))]
    SnapshotNotFound(Hash),

    #[error("Invalid head name: {0:?}")]
    InvalidHead(String),

    #[error("Corrupt store entry: {0}")]
    Corrupt(String),

    #[error("Store backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Tree(#[from] TreeError),
}

/// Errors surfaced by configuration, logging and the command-line layer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Head not found: {0}")]
    HeadNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
