//! Directory entry records and value indirection.
//!
//! # Entry Structure (12 bytes)
//! ```text
//! Bytes 0-1:  Tag
//! Bytes 2-3:  Field type code
//! Bytes 4-7:  Count (number of values, not bytes)
//! Bytes 8-11: Value, or offset to the value when it does not fit
//! ```
//!
//! Whether bytes 8-11 hold the value or an offset is decided by
//! [`DirectoryEntry::location`], the only place that rule lives.

use std::fmt;

use super::byte_order::ByteOrder;
use super::types::FieldType;
use crate::error::{IoError, TiffError};

/// Size of one entry record in bytes.
pub const ENTRY_SIZE: usize = 12;

// =============================================================================
// DirectoryReference
// =============================================================================

/// Offset of a directory (or other offset-addressed data) from the start of
/// the stream.
///
/// Zero is reserved: in the header and in next-directory fields it means
/// "no directory".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirectoryReference(pub u32);

impl DirectoryReference {
    /// Interpret a raw offset where 0 terminates a chain.
    #[inline]
    pub fn non_null(offset: u32) -> Option<Self> {
        (offset != 0).then_some(DirectoryReference(offset))
    }

    /// Byte offset from the start of the stream.
    #[inline]
    pub const fn offset(self) -> u64 {
        self.0 as u64
    }
}

impl fmt::Display for DirectoryReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

// =============================================================================
// ValueLocation
// =============================================================================

/// Where the data of an entry lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueLocation {
    /// The first `len` bytes of the entry's value field (`len <= 4`)
    Inline { bytes: [u8; 4], len: usize },

    /// `len` bytes starting at `offset` in the stream
    Indirect { offset: u32, len: u64 },
}

impl ValueLocation {
    /// Number of data bytes at this location.
    pub fn len(&self) -> u64 {
        match self {
            ValueLocation::Inline { len, .. } => *len as u64,
            ValueLocation::Indirect { len, .. } => *len,
        }
    }

    /// Whether there is no data at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// DirectoryEntry
// =============================================================================

/// A single 12-byte directory entry as stored on disk.
///
/// `raw_value` is kept verbatim; its meaning depends on `field_type` and
/// `count` (see [`DirectoryEntry::location`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Tag identifying the field
    pub tag: u16,

    /// Field type from the type code
    pub field_type: FieldType,

    /// Number of values, as the signed 32-bit count read from disk
    pub count: i32,

    /// The value field exactly as stored
    pub raw_value: [u8; 4],
}

impl DirectoryEntry {
    /// Parse the entry record starting at `offset` in `bytes`.
    pub fn parse(bytes: &[u8], offset: usize, byte_order: ByteOrder) -> Result<Self, TiffError> {
        let tag = byte_order.read_u16(bytes, offset)?;
        let type_code = byte_order.read_u16(bytes, offset + 2)?;
        let count = byte_order.read_i32(bytes, offset + 4)?;

        let value_start = offset + 8;
        let value = bytes
            .get(value_start..value_start + 4)
            .ok_or(IoError::RangeOutOfBounds {
                offset: value_start as u64,
                requested: 4,
                size: bytes.len() as u64,
            })?;
        let mut raw_value = [0u8; 4];
        raw_value.copy_from_slice(value);

        Ok(DirectoryEntry {
            tag,
            field_type: FieldType::from_u16(type_code),
            count,
            raw_value,
        })
    }

    /// Count as an unsigned element count.
    ///
    /// # Errors
    /// `InvalidCount` if the stored count is negative.
    pub fn element_count(&self) -> Result<u32, TiffError> {
        u32::try_from(self.count).map_err(|_| TiffError::InvalidCount(self.count))
    }

    /// Total size of the entry's data in bytes.
    pub fn value_byte_size(&self) -> Result<u64, TiffError> {
        Ok(self.field_type.total_size(self.element_count()?))
    }

    /// Decide whether the data is inline or at an offset.
    ///
    /// Data of at most 4 bytes is the prefix of `raw_value`; anything larger
    /// lives at the offset stored in `raw_value`.
    pub fn location(&self, byte_order: ByteOrder) -> Result<ValueLocation, TiffError> {
        let size = self.value_byte_size()?;

        if size <= FieldType::INLINE_THRESHOLD as u64 {
            Ok(ValueLocation::Inline {
                bytes: self.raw_value,
                len: size as usize,
            })
        } else {
            Ok(ValueLocation::Indirect {
                offset: byte_order.read_u32(&self.raw_value, 0)?,
                len: size,
            })
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
