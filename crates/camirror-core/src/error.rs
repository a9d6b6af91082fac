//! Error types for the mirror.

use std::path::PathBuf;

/// Mirror errors. Every variant is fatal: the run aborts on the first one.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// Transport-level failure or non-success HTTP status.
    #[error("network error: {message}")]
    Network { message: String },

    /// Fetched or cached bytes have the wrong length.
    #[error("size mismatch for {url}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        url: String,
        expected: u64,
        actual: u64,
    },

    /// Fetched or cached bytes fail the digest check.
    #[error("digest mismatch for {url}: expected {expected}, got {actual}")]
    DigestMismatch {
        url: String,
        expected: String,
        actual: String,
    },

    /// Record list JSON is malformed or missing expected fields.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// Cache or bundle filesystem operation failed.
    #[error("filesystem error at {path}: {message}")]
    Filesystem { path: PathBuf, message: String },

    /// Configuration error (bad URL, missing destination directory).
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl MirrorError {
    /// Exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 1,
            Self::Schema { .. } => 2,

            // Integrity failures (higher priority for diagnostics)
            Self::SizeMismatch { .. } => 4,
            Self::DigestMismatch { .. } => 4,

            // Network/transient
            Self::Network { .. } => 5,

            Self::Filesystem { .. } => 6,
        }
    }
}

impl From<reqwest::Error> for MirrorError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for mirror operations.
pub type MirrorResult<T> = Result<T, MirrorError>;
