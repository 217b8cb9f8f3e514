//! Error types for the bucketkey core.

use std::path::PathBuf;

/// Core error type for bucketkey.
#[derive(Debug, thiserror::Error)]
pub enum BucketKeyError {
    /// A bucket or identity name violates the provider's naming rules.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Which rule was violated.
        reason: String,
    },

    /// The policy template could not be read from disk.
    #[error("failed to read policy file {}: {source}", .path.display())]
    PolicyRead {
        /// Path of the policy file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The policy template is not valid JSON.
    #[error("failed to parse policy file {}: {source}", .path.display())]
    PolicyParse {
        /// Path of the policy file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The policy document does not have the shape resource injection needs.
    #[error("malformed policy document: {0}")]
    MalformedPolicy(String),

    /// Writing the state file failed.
    #[error("failed to write state file {}: {source}", .path.display())]
    StateWrite {
        /// Path of the state file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// Convenience result type for bucketkey operations.
pub type BucketKeyResult<T> = Result<T, BucketKeyError>;
