//! Compression identifiers and strip decompression.
//!
//! Only uncompressed and PackBits data are decoded. Every other scheme is
//! recognised by name and rejected with [`TiffError::UnsupportedCompression`],
//! so a caller can report what the file uses instead of getting garbage.

use bytes::Bytes;
use tracing::debug;

use super::packbits;
use crate::error::TiffError;
use crate::io::RangeReader;

// =============================================================================
// Compression
// =============================================================================

/// Compression schemes that appear in the Compression tag of TIFF and DNG
/// files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Compression {
    /// No compression
    None = 1,

    /// CCITT modified Huffman RLE (not supported)
    CcittRle = 2,

    /// CCITT Group 3 fax (not supported)
    CcittFax3 = 3,

    /// CCITT Group 4 fax (not supported)
    CcittFax4 = 4,

    /// LZW compression (not supported)
    Lzw = 5,

    /// "Old-style" JPEG (not supported)
    OldJpeg = 6,

    /// JPEG compression (not supported)
    Jpeg = 7,

    /// Adobe Deflate (not supported)
    AdobeDeflate = 8,

    /// JBIG black and white (not supported)
    JbigBw = 9,

    /// JBIG color (not supported)
    JbigColor = 10,

    /// Macintosh PackBits run-length encoding (supported)
    PackBits = 32773,

    /// PKZIP-style Deflate (not supported)
    Deflate = 32946,

    /// DNG lossy JPEG (not supported)
    LossyJpeg = 34892,
}

impl Compression {
    /// Create a Compression from its numeric value.
    ///
    /// Returns `None` for unrecognized compression values.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(Compression::None),
            2 => Some(Compression::CcittRle),
            3 => Some(Compression::CcittFax3),
            4 => Some(Compression::CcittFax4),
            5 => Some(Compression::Lzw),
            6 => Some(Compression::OldJpeg),
            7 => Some(Compression::Jpeg),
            8 => Some(Compression::AdobeDeflate),
            9 => Some(Compression::JbigBw),
            10 => Some(Compression::JbigColor),
            32773 => Some(Compression::PackBits),
            32946 => Some(Compression::Deflate),
            34892 => Some(Compression::LossyJpeg),
            _ => None,
        }
    }

    /// Get the numeric value of this compression scheme.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Check if this compression scheme can be decompressed.
    #[inline]
    pub const fn is_supported(self) -> bool {
        matches!(self, Compression::None | Compression::PackBits)
    }

    /// Get a human-readable name for the compression scheme.
    pub const fn name(self) -> &'static str {
        match self {
            Compression::None => "None",
            Compression::CcittRle => "CCITT RLE",
            Compression::CcittFax3 => "CCITT Group 3 Fax",
            Compression::CcittFax4 => "CCITT Group 4 Fax",
            Compression::Lzw => "LZW",
            Compression::OldJpeg => "Old JPEG",
            Compression::Jpeg => "JPEG",
            Compression::AdobeDeflate => "Adobe Deflate",
            Compression::JbigBw => "JBIG B&W",
            Compression::JbigColor => "JBIG Color",
            Compression::PackBits => "PackBits",
            Compression::Deflate => "Deflate",
            Compression::LossyJpeg => "Lossy JPEG",
        }
    }
}

/// Name of a compression identifier, including ones outside the catalog.
pub fn compression_name(id: u16) -> String {
    match Compression::from_u16(id) {
        Some(c) => c.name().to_string(),
        None => format!("Unknown compression {}", id),
    }
}

/// Whether strips with compression identifier `id` can be decompressed.
pub fn is_decompression_supported(id: u16) -> bool {
    Compression::from_u16(id).is_some_and(Compression::is_supported)
}

fn unsupported(id: u16) -> TiffError {
    TiffError::UnsupportedCompression {
        id,
        name: compression_name(id),
    }
}

// =============================================================================
// Decompression
// =============================================================================

/// Decompress one strip of raster data.
///
/// Uncompressed data is returned unchanged. PackBits data is decoded into
/// exactly `uncompressed_len` bytes.
///
/// # Errors
/// - `UnsupportedCompression` for any scheme other than None or PackBits
/// - PackBits decoding errors
pub fn decompress(id: u16, compressed: Bytes, uncompressed_len: usize) -> Result<Bytes, TiffError> {
    match Compression::from_u16(id) {
        Some(Compression::None) => Ok(compressed),
        Some(Compression::PackBits) => {
            let decoded = packbits::decompress(&compressed, uncompressed_len)?;
            debug!(
                compressed = compressed.len(),
                decompressed = decoded.len(),
                "Decoded PackBits strip"
            );
            Ok(Bytes::from(decoded))
        }
        _ => Err(unsupported(id)),
    }
}

/// Read a strip from `reader` and decompress it.
///
/// The compression identifier is checked before any bytes are read, so an
/// unsupported strip costs no I/O.
pub async fn read_strip<R: RangeReader + ?Sized>(
    reader: &R,
    id: u16,
    offset: u64,
    length: usize,
    uncompressed_len: usize,
) -> Result<Bytes, TiffError> {
    if !is_decompression_supported(id) {
        return Err(unsupported(id));
    }

    debug!(
        compression = id,
        offset = offset,
        length = length,
        "Reading strip"
    );

    let compressed = reader.read_exact_at(offset, length).await?;
    decompress(id, compressed, uncompressed_len)
}

// =============================================================================
// Tests
// =============================================================================
