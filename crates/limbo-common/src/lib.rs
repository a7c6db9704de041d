//! Common utilities for LIMBO tools.
//!
//! This crate provides foundational types used across the LIMBO crates:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`crc`] - The CRC32 path hash used by package files
//! - [`HashList`] - Hash to path dictionary built from name lists
//! - [`ProjectManager`] - Locates the active project and its name lists

mod error;
mod hashlist;
mod project;
mod reader;

pub mod crc;

pub use error::{Error, Result};
pub use hashlist::HashList;
pub use project::{Project, ProjectManager};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
