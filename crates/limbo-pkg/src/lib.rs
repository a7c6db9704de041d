//! Package file reader for LIMBO game files.
//!
//! A package is a flat index of `(name_hash, offset, size)` records
//! followed by the member payloads. Member names are only stored as CRC32
//! hashes, so extraction resolves them through a [`HashList`] loaded from
//! name lists. Members whose name ends in `.d` are zlib containers and are
//! inflated on the way out.
//!
//! # Example
//!
//! ```no_run
//! use limbo_common::ProjectManager;
//! use limbo_pkg::{ExtractOptions, Extractor, MmapSource, ProjectContext};
//!
//! let manager = ProjectManager::load("projects")?;
//! let context = ProjectContext::load(&manager, "*.filelist")?;
//!
//! let source = MmapSource::open("game.pkg")?;
//! let extractor = Extractor::new(&source, &context)?;
//! let report = extractor.extract("game_unpack".as_ref(), &ExtractOptions::default())?;
//!
//! println!("{} files written", report.written);
//! # Ok::<(), limbo_pkg::Error>(())
//! ```
//!
//! [`HashList`]: limbo_common::HashList

mod builder;
mod entry;
mod error;
mod extract;
mod package;
mod source;

pub mod decompress;
pub mod resolve;

pub use builder::PackageBuilder;
pub use entry::{Entry, RawEntry};
pub use error::{DecompressError, Error, Result};
pub use extract::{EntryOutcome, ExtractOptions, ExtractReport, Extractor, Progress, WriteMode};
pub use package::{PackageFile, COUNT_SIZE, ENTRY_SIZE};
pub use resolve::ProjectContext;
pub use source::{ByteSource, MmapSource};
