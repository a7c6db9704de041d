//! Package file writer.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use limbo_common::crc;

use crate::entry::Entry;
use crate::package::PackageFile;
use crate::resolve::CONTAINER_SUFFIX;
use crate::{Error, Result};

/// Builds a new package file from in-memory payloads.
///
/// Payloads are laid out contiguously after the index, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PackageBuilder {
    members: Vec<(u32, Vec<u8>)>,
}

impl PackageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a payload under a raw name hash.
    pub fn add(&mut self, name_hash: u32, data: Vec<u8>) -> &mut Self {
        self.members.push((name_hash, data));
        self
    }

    /// Add a payload stored as-is under `path`.
    pub fn add_named(&mut self, path: &str, data: Vec<u8>) -> &mut Self {
        self.add(crc::hash_path(path), data)
    }

    /// Add a payload as a zlib container named `path` + `.d`.
    pub fn add_compressed(&mut self, path: &str, data: &[u8]) -> Result<&mut Self> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;

        let name = format!("{}{}", path, CONTAINER_SUFFIX);
        Ok(self.add_named(&name, compressed))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Build the index describing the current members.
    pub fn index(&self) -> Result<PackageFile> {
        let mut offset = 0u64;
        let mut entries = Vec::with_capacity(self.members.len());

        for (name_hash, data) in &self.members {
            let start = u32::try_from(offset).map_err(|_| Error::PayloadTooLarge(offset))?;
            let size = u32::try_from(data.len())
                .map_err(|_| Error::PayloadTooLarge(data.len() as u64))?;

            entries.push(Entry::new(*name_hash, start, size));
            offset += data.len() as u64;
        }

        Ok(PackageFile::new(entries))
    }

    /// Write the index followed by every payload.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.index()?.write_to(writer)?;
        for (_, data) in &self.members {
            writer.write_all(data)?;
        }
        Ok(())
    }

    /// Build the whole package in memory.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }
}
