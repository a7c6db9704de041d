//! Path hashing for package files.
//!
//! Package entries are identified by the CRC32 (IEEE) of their normalized
//! path: lowercase, with forward slashes as separators.

/// Compute the CRC32 hash of a byte slice.
#[inline]
pub fn hash_bytes(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// Compute the CRC32 hash of a string.
///
/// The string is hashed as-is; see [`hash_path`] for path names.
#[inline]
pub fn hash_str(s: &str) -> u32 {
    hash_bytes(s.as_bytes())
}

/// Normalize a path the way package names are hashed.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

/// Hash a path after normalizing it.
#[inline]
pub fn hash_path(path: &str) -> u32 {
    hash_str(&normalize_path(path))
}
