//! LIMBO game file extraction library.
//!
//! This crate provides a unified interface to the LIMBO crates.
//!
//! # Crates
//!
//! - [`limbo_common`] - Common utilities (binary reading, CRC32 path hash, name lists)
//! - [`limbo_pkg`] - Package file index codec and extraction
//!
//! # Example
//!
//! ```no_run
//! use limbo::prelude::*;
//!
//! let manager = ProjectManager::load("projects")?;
//! let context = ProjectContext::load(&manager, "*.filelist")?;
//!
//! let source = MmapSource::open("game.pkg")?;
//! let extractor = Extractor::new(&source, &context)?;
//!
//! for entry in extractor.package() {
//!     match context.resolve(entry.name_hash) {
//!         Some(name) => println!("{}", name),
//!         None => println!("{:08X}", entry.name_hash),
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use limbo_common as common;
pub use limbo_pkg as pkg;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use limbo_common::{crc, HashList, Project, ProjectManager};
    pub use limbo_pkg::{
        ByteSource, Entry, EntryOutcome, ExtractOptions, ExtractReport, Extractor, MmapSource,
        PackageBuilder, PackageFile, ProjectContext, Progress, WriteMode,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
