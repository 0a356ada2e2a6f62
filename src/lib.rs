//! # TIFF Stream
//!
//! A streaming reader for the TIFF container format, as used by TIFF images,
//! DNG raw files and EXIF metadata blocks.
//!
//! Files are never loaded whole. Every structure is fetched with positional
//! range reads from a [`RangeReader`], so the same code works on an in-memory
//! buffer, a local file or any other seekable byte source.
//!
//! ## Features
//!
//! - **Header and directory chains**: byte order detection, lazy IFD walking with loop detection
//! - **Typed values**: every TIFF 6.0 field type, with inline/offset resolution in one place
//! - **Strip decompression**: uncompressed and PackBits data; other schemes are reported by name
//!
//! ## Architecture
//!
//! - [`io`] - Byte sources (`RangeReader`, in-memory and seekable stream readers)
//! - [`mod@format`] - TIFF structures, value decoding and compression
//! - [`config`] - CLI configuration for the `tiff-stream` binary
//! - [`error`] - Error types
//!
//! Tag names and per-tag default values are left to the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tiff_stream::{read_header, DirectoryChain, MemoryReader, ValueReader};
//!
//! # async fn run(bytes: Vec<u8>) -> Result<(), tiff_stream::TiffError> {
//! let reader = MemoryReader::new(bytes);
//! let header = read_header(&reader).await?;
//! let values = ValueReader::from_header(&reader, &header);
//!
//! let mut chain = DirectoryChain::from_header(&reader, &header);
//! while let Some(directory) = chain.next_directory().await {
//!     let directory = directory?;
//!     if let Some(width) = directory.entry(256) {
//!         println!("width: {}", values.read_unsigned(width).await?);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod io;

// Re-export commonly used types
pub use config::Config;
pub use error::{ErrorKind, IoError, TiffError};
pub use format::tiff::{
    read_directory, read_header, ByteOrder, Directory, DirectoryChain, DirectoryEntry,
    DirectoryReference, FieldType, Rational, SignedRational, TiffHeader, Value, ValueLocation,
    ValueReader, ENTRY_SIZE, TIFF_HEADER_SIZE, TIFF_MAGIC,
};
pub use format::{
    compression_name, decompress, is_decompression_supported, read_strip, Compression,
};
pub use io::{MemoryReader, RangeReader, StreamReader};
