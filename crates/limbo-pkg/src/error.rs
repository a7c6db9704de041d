//! Error types for the package crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with package files.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] limbo_common::Error),

    /// The index table does not fit in the stream.
    #[error("invalid package index: {count} entries need {needed} bytes but only {available} available")]
    Format {
        count: u32,
        needed: u64,
        available: u64,
    },

    /// The index has more entries than the count field can hold.
    #[error("too many entries for a package index: {0}")]
    TooManyEntries(usize),

    /// Payloads no longer fit 32-bit offsets.
    #[error("package payload region too large: {0} bytes")]
    PayloadTooLarge(u64),

    /// An entry's data window lies outside the source.
    #[error("entry data out of bounds: {size} bytes at {offset} exceeds source length {length}")]
    EntryOutOfBounds { offset: u64, size: u64, length: u64 },

    /// Writing an extracted file failed.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-entry decompression failure.
///
/// Never fatal for a run: the extractor falls back to writing the raw
/// payload under its original name.
#[derive(Debug, Error)]
pub enum DecompressError {
    /// The payload is not a valid zlib stream.
    #[error("corrupt compressed stream: {0}")]
    Corrupt(#[from] std::io::Error),

    /// The decoder produced an empty chunk without signalling the end.
    #[error("decoder returned an empty chunk before end of stream")]
    EmptyChunk,
}

/// Result type for package operations.
pub type Result<T> = std::result::Result<T, Error>;
