use thiserror::Error;

use crate::format::tiff::FieldType;

/// I/O errors raised by a [`RangeReader`](crate::io::RangeReader) or by the
/// primitive codec when a buffer is too short.
#[derive(Debug, Clone, Error)]
pub enum IoError {
    /// Requested range exceeds resource bounds
    #[error("Range out of bounds: requested {requested} bytes at offset {offset}, size is {size}")]
    RangeOutOfBounds {
        offset: u64,
        requested: u64,
        size: u64,
    },

    /// Error reported by the underlying stream (seek or read failure)
    #[error("Stream error: {0}")]
    Stream(String),
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        IoError::Stream(err.to_string())
    }
}

/// Broad category of a [`TiffError`].
///
/// Callers that want to skip an unreadable entry but abort on a broken file
/// can branch on this instead of matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structural problem in the file itself
    Format,
    /// Entry type does not support the requested conversion
    TypeConversion,
    /// Scalar accessor used on an entry whose count is not 1
    Arity,
    /// ASCII value without its NUL terminator
    Encoding,
    /// Feature deliberately not implemented (compression schemes)
    Unsupported,
    /// Compressed payload is malformed
    CorruptData,
    /// Short read or stream failure
    Io,
}

/// Errors that can occur when reading TIFF structures and values
#[derive(Debug, Clone, Error)]
pub enum TiffError {
    /// I/O error while reading the file
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Bytes 0-1 are neither II nor MM
    #[error("Invalid byte order marker: expected 0x4949 (II) or 0x4D4D (MM), got 0x{0:04X}")]
    InvalidByteOrder(u16),

    /// Bytes 2-3 do not decode to 42
    #[error("Unexpected magic number: expected 42, got {0}")]
    UnexpectedMagic(u16),

    /// A next-directory offset points back into the chain
    #[error("Directory chain loops back to offset {0}")]
    DirectoryLoop(u32),

    /// Entry count is negative
    #[error("Invalid entry count: {0}")]
    InvalidCount(i32),

    /// Entry type code is outside the catalog, so its data cannot be sized
    #[error("Unknown field type: {0}")]
    UnknownFieldType(u16),

    /// Entry type does not support the requested conversion
    #[error("Cannot read {actual:?} entry as {target}")]
    TypeMismatch {
        actual: FieldType,
        target: &'static str,
    },

    /// Scalar accessor applied to an entry whose count is not 1
    #[error("Expected a single {target} value, entry has count {count}")]
    CountMismatch { target: &'static str, count: i32 },

    /// ASCII data whose last byte is not NUL
    #[error("ASCII value is not null terminated")]
    NotNullTerminated,

    /// Compression scheme outside the supported set
    #[error("Unsupported compression: {name} ({id})")]
    UnsupportedCompression { id: u16, name: String },

    /// A PackBits run would write past the declared uncompressed size
    #[error("PackBits output overrun: run needs {needed} bytes, buffer holds {capacity}")]
    PackBitsOverrun { needed: usize, capacity: usize },

    /// A PackBits run header at `offset` is missing its operand bytes
    #[error("PackBits data truncated at offset {offset}")]
    PackBitsTruncated { offset: usize },
}

impl TiffError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TiffError::Io(_) => ErrorKind::Io,
            TiffError::InvalidByteOrder(_)
            | TiffError::UnexpectedMagic(_)
            | TiffError::DirectoryLoop(_)
            | TiffError::InvalidCount(_)
            | TiffError::UnknownFieldType(_) => ErrorKind::Format,
            TiffError::TypeMismatch { .. } => ErrorKind::TypeConversion,
            TiffError::CountMismatch { .. } => ErrorKind::Arity,
            TiffError::NotNullTerminated => ErrorKind::Encoding,
            TiffError::UnsupportedCompression { .. } => ErrorKind::Unsupported,
            TiffError::PackBitsOverrun { .. } | TiffError::PackBitsTruncated { .. } => {
                ErrorKind::CorruptData
            }
        }
    }
}
