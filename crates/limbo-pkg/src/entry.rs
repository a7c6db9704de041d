//! Package index entries.

use zerocopy::byteorder::little_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// One member of a package file.
///
/// `offset` is relative to the end of the index table, not to the start
/// of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry {
    /// CRC32 of the member's normalized path.
    pub name_hash: u32,
    /// Payload offset from the base offset.
    pub offset: u32,
    /// Stored payload size in bytes.
    pub size: u32,
}

impl Entry {
    /// Create a new entry.
    #[inline]
    pub const fn new(name_hash: u32, offset: u32, size: u32) -> Self {
        Self {
            name_hash,
            offset,
            size,
        }
    }

    /// Exclusive end of the payload, relative to the base offset.
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset as u64 + self.size as u64
    }
}

/// On-disk index record.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawEntry {
    pub name_hash: U32,
    pub offset: U32,
    pub size: U32,
}

impl RawEntry {
    /// Record size in bytes.
    pub const SIZE: usize = 12;
}

const _: () = assert!(std::mem::size_of::<RawEntry>() == RawEntry::SIZE);

impl From<RawEntry> for Entry {
    fn from(raw: RawEntry) -> Self {
        Self::new(raw.name_hash.get(), raw.offset.get(), raw.size.get())
    }
}

impl From<&Entry> for RawEntry {
    fn from(entry: &Entry) -> Self {
        Self {
            name_hash: U32::new(entry.name_hash),
            offset: U32::new(entry.offset),
            size: U32::new(entry.size),
        }
    }
}
