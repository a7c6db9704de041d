//! Random-access byte sources.
//!
//! The extractor asks for explicit `(offset, size)` windows instead of
//! moving a shared stream cursor around.

use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::{Error, Result};

/// Random-access, read-only bytes.
pub trait ByteSource {
    /// Total length in bytes.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read exactly `size` bytes starting at `offset`.
    ///
    /// Fails with [`Error::EntryOutOfBounds`] if the window runs past the end.
    fn read_at(&self, offset: u64, size: u64) -> Result<Cow<'_, [u8]>>;
}

/// Validate a window against a source length and convert it to a slice range.
fn window(length: u64, offset: u64, size: u64) -> Result<std::ops::Range<usize>> {
    let out_of_bounds = || Error::EntryOutOfBounds {
        offset,
        size,
        length,
    };

    let end = offset.checked_add(size).ok_or_else(out_of_bounds)?;
    if end > length {
        return Err(out_of_bounds());
    }

    let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
    let end = usize::try_from(end).map_err(|_| out_of_bounds())?;
    Ok(start..end)
}

impl ByteSource for [u8] {
    #[inline]
    fn len(&self) -> u64 {
        <[u8]>::len(self) as u64
    }

    fn read_at(&self, offset: u64, size: u64) -> Result<Cow<'_, [u8]>> {
        let range = window(ByteSource::len(self), offset, size)?;
        Ok(Cow::Borrowed(&self[range]))
    }
}

impl ByteSource for Vec<u8> {
    #[inline]
    fn len(&self) -> u64 {
        ByteSource::len(self.as_slice())
    }

    fn read_at(&self, offset: u64, size: u64) -> Result<Cow<'_, [u8]>> {
        self.as_slice().read_at(offset, size)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    #[inline]
    fn len(&self) -> u64 {
        (**self).len()
    }

    fn read_at(&self, offset: u64, size: u64) -> Result<Cow<'_, [u8]>> {
        (**self).read_at(offset, size)
    }
}

/// A memory-mapped package file.
pub struct MmapSource {
    mmap: Mmap,
    name: String,
}

impl MmapSource {
    /// Map a file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        // SAFETY: the map is read-only; package files are not modified while open.
        let mmap = unsafe { Mmap::map(&file)? };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self { mmap, name })
    }

    /// File name of the mapped package.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The mapped bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.mmap
    }
}

impl ByteSource for MmapSource {
    #[inline]
    fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    fn read_at(&self, offset: u64, size: u64) -> Result<Cow<'_, [u8]>> {
        self.as_bytes().read_at(offset, size)
    }
}
