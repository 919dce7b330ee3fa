//! Error types for warplist.
//!
//! This crate provides:
//! - [`ListError`] - Top-level error enum for listing operations
//! - NotFound classification for callers that tolerate missing buckets/keys
//! - A [`Result`] alias used across the workspace

use thiserror::Error;

/// Top-level error type for listing operations.
#[derive(Error, Debug)]
pub enum ListError {
    /// A key contains a character outside the 64-symbol listing alphabet.
    ///
    /// Speculative start points can only be computed for keys whose every
    /// character lies inside the alphabet; anything else aborts the prefetch
    /// cycle before a request is made.
    #[error("key {key:?} contains unsupported character {ch:?}")]
    UnsupportedKeyChar { key: String, ch: char },

    /// Non-success response from the listing endpoint.
    #[error(
        "could not list objects in bucket {bucket:?} with prefix {prefix:?}: \
         {code} ({name}): {message}"
    )]
    Endpoint {
        bucket: String,
        prefix: String,
        /// Service error code, e.g. "AccessDenied" or "NoSuchBucket".
        code: String,
        /// Transport-level failure kind, e.g. "ServiceError" or "TimeoutError".
        name: String,
        message: String,
    },

    /// Internal precondition violation. Not recoverable.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

impl ListError {
    /// Whether this is a NotFound-class endpoint response.
    ///
    /// Callers that treat an absent bucket or key as an empty listing use
    /// this to distinguish "nothing there" from a real failure.
    pub fn is_not_found(&self) -> bool {
        match self {
            ListError::Endpoint { code, .. } => {
                matches!(code.as_str(), "NoSuchBucket" | "NoSuchKey" | "NotFound")
            }
            _ => false,
        }
    }
}

/// Result type alias using ListError.
pub type Result<T> = std::result::Result<T, ListError>;
