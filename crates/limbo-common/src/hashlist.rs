//! Hash to path dictionary.
//!
//! Package files only store the CRC32 of each member's path. A [`HashList`]
//! is built from plain-text name lists (one candidate path per line) so the
//! hashes can be turned back into readable names.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::crc;
use crate::{Error, Result};

/// Lookup table from path hash to normalized path.
#[derive(Debug, Clone, Default)]
pub struct HashList {
    names: FxHashMap<u32, String>,
}

impl HashList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `path`, hash it and record it.
    ///
    /// Returns the hash. If another path already owns that hash the
    /// existing name is kept.
    pub fn insert(&mut self, path: &str) -> u32 {
        let normalized = crc::normalize_path(path);
        let hash = crc::hash_str(&normalized);
        self.names.entry(hash).or_insert(normalized);
        hash
    }

    /// Look up the path for a hash.
    #[inline]
    pub fn get(&self, hash: u32) -> Option<&str> {
        self.names.get(&hash).map(String::as_str)
    }

    /// Check whether a hash is known.
    #[inline]
    pub fn contains(&self, hash: u32) -> bool {
        self.names.contains_key(&hash)
    }

    /// Number of distinct hashes.
    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Merge another list into this one. Existing names win.
    pub fn extend(&mut self, other: HashList) {
        for (hash, name) in other.names {
            self.names.entry(hash).or_insert(name);
        }
    }

    /// Add every name from a line-oriented reader.
    ///
    /// Blank lines and lines starting with `;` or `#` are ignored.
    pub fn load_reader<R: BufRead>(&mut self, reader: R) -> std::io::Result<usize> {
        let mut added = 0;
        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            self.insert(line);
            added += 1;
        }
        Ok(added)
    }

    /// Add every name from a list file.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::NameList {
            path: path.to_path_buf(),
            source,
        })?;

        let added = self
            .load_reader(BufReader::new(file))
            .map_err(|source| Error::NameList {
                path: path.to_path_buf(),
                source,
            })?;

        log::debug!("loaded {} names from {}", added, path.display());
        Ok(added)
    }
}

impl<'a> FromIterator<&'a str> for HashList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut list = Self::new();
        for name in iter {
            list.insert(name);
        }
        list
    }
}
