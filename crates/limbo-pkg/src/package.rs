//! Package index codec.
//!
//! A package file starts with a flat index table and is followed directly
//! by the payload region:
//!
//! ```text
//! offset 0:  u32 count             (written as i32)
//! offset 4:  count x { u32 name_hash, u32 offset, u32 size }
//! offset 4 + 12 * count: payload region (the base offset)
//! ```
//!
//! There is no magic, version or checksum.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use limbo_common::BinaryReader;
use zerocopy::IntoBytes;

use crate::entry::{Entry, RawEntry};
use crate::source::ByteSource;
use crate::{Error, Result};

/// Size of the entry count field.
pub const COUNT_SIZE: usize = 4;

/// Size of one index record.
pub const ENTRY_SIZE: usize = RawEntry::SIZE;

/// The index of a package file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFile {
    entries: Vec<Entry>,
}

impl PackageFile {
    /// Create an index from a list of entries.
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Entries in index order.
    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Consume the index, returning its entries.
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// Position right after the index table; entry offsets are relative to it.
    #[inline]
    pub fn base_offset(&self) -> u64 {
        table_end(self.entries.len() as u64)
    }

    /// Parse the index from the start of a byte slice.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let available = data.len() as u64;
        if available < COUNT_SIZE as u64 {
            return Err(Error::Format {
                count: 0,
                needed: COUNT_SIZE as u64,
                available,
            });
        }

        let mut reader = BinaryReader::new(data);
        let count = reader.read_u32()?;
        check_table(count, available)?;

        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let raw: RawEntry = reader.read_struct()?;
            entries.push(Entry::from(raw));
        }

        Ok(Self { entries })
    }

    /// Parse the index from a random-access source.
    ///
    /// Only the table itself is read; payloads stay in the source.
    pub fn parse_source<S: ByteSource + ?Sized>(source: &S) -> Result<Self> {
        let available = source.len();
        if available < COUNT_SIZE as u64 {
            return Err(Error::Format {
                count: 0,
                needed: COUNT_SIZE as u64,
                available,
            });
        }

        let header = source.read_at(0, COUNT_SIZE as u64)?;
        let count = BinaryReader::new(&header).read_u32()?;
        let needed = check_table(count, available)?;

        let table = source.read_at(0, needed)?;
        Self::parse(&table)
    }

    /// Read the index from a stream positioned at the start of the package.
    ///
    /// On success the stream is left at the base offset.
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let start = reader.stream_position()?;
        let length = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;

        let available = length.saturating_sub(start);
        if available < COUNT_SIZE as u64 {
            return Err(Error::Format {
                count: 0,
                needed: COUNT_SIZE as u64,
                available,
            });
        }

        let count = reader.read_u32::<LittleEndian>()?;
        let needed = check_table(count, available)?;

        let mut table = vec![0u8; (needed - COUNT_SIZE as u64) as usize];
        reader.read_exact(&mut table)?;

        let mut records = BinaryReader::new(&table);
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let raw: RawEntry = records.read_struct()?;
            entries.push(Entry::from(raw));
        }

        Ok(Self { entries })
    }

    /// Write the index table.
    ///
    /// The count goes out as a signed 32-bit value with the same bit
    /// pattern the reader interprets as unsigned.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let count = u32::try_from(self.entries.len())
            .map_err(|_| Error::TooManyEntries(self.entries.len()))?;

        writer.write_i32::<LittleEndian>(count as i32)?;
        for entry in &self.entries {
            writer.write_all(RawEntry::from(entry).as_bytes())?;
        }

        Ok(())
    }

    /// Serialize the index table into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.base_offset() as usize);
        self.write_to(&mut out)?;
        Ok(out)
    }
}

impl<'a> IntoIterator for &'a PackageFile {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[inline]
fn table_end(count: u64) -> u64 {
    COUNT_SIZE as u64 + count * ENTRY_SIZE as u64
}

/// Check that a table of `count` records fits in `available` bytes.
///
/// Returns the table size including the count field.
fn check_table(count: u32, available: u64) -> Result<u64> {
    let needed = table_end(count as u64);
    if needed > available {
        return Err(Error::Format {
            count,
            needed,
            available,
        });
    }
    Ok(needed)
}
