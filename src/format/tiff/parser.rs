//! TIFF header and directory parsing.
//!
//! # TIFF Header Structure (8 bytes)
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Magic number (42 = 0x002A)
//! Bytes 4-7: Offset to first IFD (4 bytes)
//! ```
//!
//! # IFD Structure
//! ```text
//! Bytes 0-1:       Entry count N
//! Bytes 2..2+12N:  N entries of 12 bytes each
//! Next 4 bytes:    Offset to next IFD (0 = end of chain)
//! ```

use std::collections::HashSet;

use tracing::debug;

use super::byte_order::ByteOrder;
use super::entry::{DirectoryEntry, DirectoryReference, ENTRY_SIZE};
use crate::error::TiffError;
use crate::io::RangeReader;

// =============================================================================
// Constants
// =============================================================================

/// Magic number identifying a classic TIFF file
pub const TIFF_MAGIC: u16 = 42;

/// Size of the TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of the entry count field at the start of an IFD
const IFD_COUNT_SIZE: usize = 2;

/// Size of the next IFD offset field at the end of an IFD
const IFD_NEXT_OFFSET_SIZE: usize = 4;

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF file header.
///
/// Contains the essential information needed to begin parsing IFDs:
/// the byte order for every subsequent value and the first IFD location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the file
    pub byte_order: ByteOrder,

    /// Offset of the first IFD; `DirectoryReference(0)` means the file has none
    pub first_directory: DirectoryReference,
}

impl TiffHeader {
    /// Parse a TIFF header from raw bytes.
    ///
    /// # Errors
    /// - `InvalidByteOrder` if bytes 0-1 are not II or MM
    /// - `UnexpectedMagic` if bytes 2-3 are not 42
    /// - `Io(RangeOutOfBounds)` if fewer than 8 bytes are given
    pub fn parse(bytes: &[u8]) -> Result<Self, TiffError> {
        // II and MM are palindromes, so the marker reads the same in any order
        let marker = ByteOrder::LittleEndian.read_u16(bytes, 0)?;
        let byte_order = ByteOrder::from_marker(marker.to_le_bytes())?;

        let magic = byte_order.read_u16(bytes, 2)?;
        if magic != TIFF_MAGIC {
            return Err(TiffError::UnexpectedMagic(magic));
        }

        let first_directory = DirectoryReference(byte_order.read_u32(bytes, 4)?);

        Ok(TiffHeader {
            byte_order,
            first_directory,
        })
    }

    /// The magic number this header carries (always 42 once parsed).
    #[inline]
    pub const fn magic(&self) -> u16 {
        TIFF_MAGIC
    }
}

/// Read and validate the header at the start of a TIFF stream.
pub async fn read_header<R: RangeReader + ?Sized>(reader: &R) -> Result<TiffHeader, TiffError> {
    let bytes = reader.read_exact_at(0, TIFF_HEADER_SIZE).await?;
    let header = TiffHeader::parse(&bytes)?;

    debug!(
        source = reader.identifier(),
        byte_order = ?header.byte_order,
        first_directory = header.first_directory.0,
        "Parsed TIFF header"
    );
    Ok(header)
}

// =============================================================================
// Directory
// =============================================================================

/// A parsed Image File Directory.
///
/// Entries keep their on-disk order. Duplicate tags are kept as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    /// Where this directory was read from
    pub offset: DirectoryReference,

    /// Entries in on-disk order
    pub entries: Vec<DirectoryEntry>,

    /// The following directory in the chain, if any
    pub next: Option<DirectoryReference>,
}

impl Directory {
    /// Total on-disk size of a directory with `entry_count` entries.
    #[inline]
    pub const fn calculate_size(entry_count: usize) -> usize {
        IFD_COUNT_SIZE + entry_count * ENTRY_SIZE + IFD_NEXT_OFFSET_SIZE
    }

    /// First entry carrying `tag`.
    pub fn entry(&self, tag: u16) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.tag == tag)
    }

    /// Iterate over entries in on-disk order.
    pub fn iter(&self) -> std::slice::Iter<'_, DirectoryEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Directory {
    type Item = &'a DirectoryEntry;
    type IntoIter = std::slice::Iter<'a, DirectoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Read one directory at `offset`.
///
/// The entry count is read first, then the entries and the trailing next
/// offset are fetched in a single range read. A directory with zero entries
/// still has its next offset read.
pub async fn read_directory<R: RangeReader + ?Sized>(
    reader: &R,
    byte_order: ByteOrder,
    offset: DirectoryReference,
) -> Result<Directory, TiffError> {
    let count_bytes = reader.read_exact_at(offset.offset(), IFD_COUNT_SIZE).await?;
    let entry_count = byte_order.read_u16(&count_bytes, 0)? as usize;

    let body_len = entry_count * ENTRY_SIZE + IFD_NEXT_OFFSET_SIZE;
    let body = reader
        .read_exact_at(offset.offset() + IFD_COUNT_SIZE as u64, body_len)
        .await?;

    let mut entries = Vec::with_capacity(entry_count);
    for i in 0..entry_count {
        entries.push(DirectoryEntry::parse(&body, i * ENTRY_SIZE, byte_order)?);
    }

    let next_raw = byte_order.read_u32(&body, entry_count * ENTRY_SIZE)?;
    let next = DirectoryReference::non_null(next_raw);

    debug!(
        source = reader.identifier(),
        offset = offset.0,
        entries = entry_count,
        next = next_raw,
        "Read directory"
    );

    Ok(Directory {
        offset,
        entries,
        next,
    })
}

// =============================================================================
// DirectoryChain
// =============================================================================

/// Lazy walk over a singly-linked chain of directories.
///
/// Each step only needs an offset, so a chain can start anywhere: at the
/// header's first directory, or at a sub-directory reference taken from an
/// entry value. After the first error the chain is exhausted.
pub struct DirectoryChain<'a, R: RangeReader + ?Sized> {
    reader: &'a R,
    byte_order: ByteOrder,
    next: Option<DirectoryReference>,
    visited: HashSet<u32>,
}

impl<'a, R: RangeReader + ?Sized> DirectoryChain<'a, R> {
    /// Start a chain at `start`.
    pub fn new(reader: &'a R, byte_order: ByteOrder, start: DirectoryReference) -> Self {
        Self {
            reader,
            byte_order,
            next: DirectoryReference::non_null(start.0),
            visited: HashSet::new(),
        }
    }

    /// Start at the first directory named by the header.
    pub fn from_header(reader: &'a R, header: &TiffHeader) -> Self {
        Self::new(reader, header.byte_order, header.first_directory)
    }

    /// Read the next directory.
    ///
    /// Returns `None` once the chain has ended or failed.
    pub async fn next_directory(&mut self) -> Option<Result<Directory, TiffError>> {
        let offset = self.next.take()?;

        if !self.visited.insert(offset.0) {
            return Some(Err(TiffError::DirectoryLoop(offset.0)));
        }

        match read_directory(self.reader, self.byte_order, offset).await {
            Ok(directory) => {
                self.next = directory.next;
                Some(Ok(directory))
            }
            Err(e) => Some(Err(e)),
        }
    }

    /// Read all remaining directories, stopping at the first error.
    pub async fn collect_all(mut self) -> Result<Vec<Directory>, TiffError> {
        let mut directories = Vec::new();
        while let Some(directory) = self.next_directory().await {
            directories.push(directory?);
        }
        Ok(directories)
    }
}

// =============================================================================
// Tests
// =============================================================================
