//! Error types for limbo-common.

use std::path::PathBuf;

use thiserror::Error;

/// Common error type for LIMBO operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid glob pattern for name lists.
    #[error("invalid list pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A name list could not be read.
    #[error("failed to read name list {path}: {source}")]
    NameList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
