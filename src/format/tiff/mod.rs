//! TIFF structure parser.
//!
//! This module reads the container layer shared by TIFF, DNG and EXIF data:
//! the header, the chain of directories and the typed values their entries
//! point to.
//!
//! # Key Concepts
//!
//! - **Byte order**: TIFF files declare their endianness (II = little-endian, MM = big-endian)
//!   in the header. All multi-byte values must be read respecting this order.
//!
//! - **Directory (IFD)**: A list of 12-byte entries plus the offset of the next
//!   directory. Directories form a chain that ends at offset 0. Sub-directories
//!   (SubIFDs, EXIF, GPS) are reached through entry values, not the chain.
//!
//! - **Inline vs offset values**: Data of 4 bytes or less is stored in the entry
//!   itself, larger data is stored at an offset pointed to by the entry.
//!
//! Nothing is cached: each operation performs its own range reads.

mod byte_order;
mod entry;
mod parser;
mod rational;
mod types;
mod values;

pub use byte_order::{ByteOrder, BYTE_ORDER_BIG_ENDIAN, BYTE_ORDER_LITTLE_ENDIAN};
pub use entry::{DirectoryEntry, DirectoryReference, ValueLocation, ENTRY_SIZE};
pub use parser::{
    read_directory, read_header, Directory, DirectoryChain, TiffHeader, TIFF_HEADER_SIZE,
    TIFF_MAGIC,
};
pub use rational::{Rational, SignedRational};
pub use types::FieldType;
pub use values::{Value, ValueReader};
