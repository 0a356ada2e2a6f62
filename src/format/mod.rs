//! Format layer: TIFF structure parsing and strip decompression.
//!
//! - [`tiff`] reads headers, directory chains and typed entry values
//! - [`compression`] maps compression identifiers and decodes strips
//! - [`packbits`] is the PackBits run-length codec

pub mod compression;
pub mod packbits;
pub mod tiff;

pub use compression::{
    compression_name, decompress, is_decompression_supported, read_strip, Compression,
};
