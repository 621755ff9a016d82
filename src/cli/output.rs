//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, ErrorCode};

/// Map domain/service errors to a string for CLI output, prefixed with the
/// error classification.
pub fn map_error(e: &ApiError) -> String {
    format!("error[{}]: {}", ErrorCode::of(e), e)
}
