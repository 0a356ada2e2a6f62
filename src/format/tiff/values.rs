//! Typed decoding of directory entry values.
//!
//! Scalar accessors check the entry's count first, then its field type;
//! array accessors check the type alone. Neither touches data before the
//! checks pass. Data is located once per call through
//! [`DirectoryEntry::location`]: inline bytes are sliced out of the entry,
//! indirect data is fetched with one range read regardless of how many
//! elements it holds.

use bytes::Bytes;

use super::byte_order::ByteOrder;
use super::entry::{DirectoryEntry, DirectoryReference, ValueLocation};
use super::parser::TiffHeader;
use super::rational::{Rational, SignedRational};
use super::types::FieldType;
use crate::error::{IoError, TiffError};
use crate::io::RangeReader;

const UNSIGNED_TYPES: &[FieldType] = &[FieldType::Byte, FieldType::Short, FieldType::Long];
const SIGNED_TYPES: &[FieldType] = &[FieldType::SByte, FieldType::SShort, FieldType::SLong];
const REFERENCE_TYPES: &[FieldType] = &[FieldType::Long, FieldType::DirectoryReference];

// =============================================================================
// Value
// =============================================================================

/// A fully decoded entry value, shaped by the entry's field type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// BYTE, SHORT or LONG values widened to u32
    Unsigned(Vec<u32>),

    /// SBYTE, SSHORT or SLONG values widened to i32
    Signed(Vec<i32>),

    /// ASCII text without its final NUL
    Ascii(String),

    /// RATIONAL pairs, unreduced
    Rational(Vec<Rational>),

    /// SRATIONAL pairs, unreduced
    SignedRational(Vec<SignedRational>),

    /// FLOAT values
    Float(Vec<f32>),

    /// DOUBLE values
    Double(Vec<f64>),

    /// Offsets of sub-directories from an IFD entry
    DirectoryReferences(Vec<DirectoryReference>),

    /// UNDEFINED payload as raw bytes
    Undefined(Bytes),
}

// =============================================================================
// ValueReader
// =============================================================================

/// Reads typed entry values from a TIFF source.
///
/// Combines a [`RangeReader`] with the file's byte order. The reader holds
/// no cursor, so one `ValueReader` can decode entries in any order.
pub struct ValueReader<'a, R: RangeReader + ?Sized> {
    reader: &'a R,
    byte_order: ByteOrder,
}

impl<'a, R: RangeReader + ?Sized> ValueReader<'a, R> {
    /// Create a new ValueReader.
    pub fn new(reader: &'a R, byte_order: ByteOrder) -> Self {
        Self { reader, byte_order }
    }

    /// Create a ValueReader using the byte order from a parsed header.
    pub fn from_header(reader: &'a R, header: &TiffHeader) -> Self {
        Self::new(reader, header.byte_order)
    }

    /// Get the byte order values are decoded with.
    #[inline]
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    // -------------------------------------------------------------------------
    // Raw data
    // -------------------------------------------------------------------------

    /// Fetch the data bytes of an entry, wherever they live.
    async fn fetch(&self, entry: &DirectoryEntry) -> Result<Bytes, TiffError> {
        match entry.location(self.byte_order)? {
            ValueLocation::Inline { bytes, len } => Ok(Bytes::copy_from_slice(&bytes[..len])),
            ValueLocation::Indirect { offset, len } => {
                let len = usize::try_from(len).map_err(|_| IoError::RangeOutOfBounds {
                    offset: offset as u64,
                    requested: len,
                    size: self.reader.size(),
                })?;
                Ok(self.reader.read_exact_at(offset as u64, len).await?)
            }
        }
    }

    /// Read the raw value bytes of an entry of any catalog type.
    ///
    /// Used for UNDEFINED payloads (EXIF MakerNote, DNG private data) and
    /// other opaque data.
    pub async fn read_bytes(&self, entry: &DirectoryEntry) -> Result<Bytes, TiffError> {
        if let FieldType::Unknown(code) = entry.field_type {
            return Err(TiffError::UnknownFieldType(code));
        }
        self.fetch(entry).await
    }

    /// Decode every element of an entry with `decode`, after checking that
    /// its type is one of `accepted`.
    async fn read_elements<T>(
        &self,
        entry: &DirectoryEntry,
        accepted: &[FieldType],
        target: &'static str,
        decode: impl Fn(FieldType, &[u8], usize) -> Result<T, TiffError>,
    ) -> Result<Vec<T>, TiffError> {
        expect_type(entry, accepted, target)?;

        let count = entry.element_count()? as usize;
        let width = entry.field_type.size_in_bytes();
        let bytes = self.fetch(entry).await?;

        (0..count)
            .map(|i| decode(entry.field_type, &bytes[..], i * width))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Integers
    // -------------------------------------------------------------------------

    /// Read a single unsigned value from a Byte, Short or Long entry.
    pub async fn read_unsigned(&self, entry: &DirectoryEntry) -> Result<u32, TiffError> {
        require_single(entry, UNSIGNED_TYPES, "unsigned integer")?;
        first(self.read_unsigned_array(entry).await?, entry, "unsigned integer")
    }

    /// Read all values of a Byte, Short or Long entry, widened to u32.
    pub async fn read_unsigned_array(&self, entry: &DirectoryEntry) -> Result<Vec<u32>, TiffError> {
        let bo = self.byte_order;
        self.read_elements(entry, UNSIGNED_TYPES, "unsigned integer", |ft, b, o| {
            unsigned_at(bo, ft, b, o)
        })
        .await
    }

    /// Read a single signed value from an SByte, SShort or SLong entry.
    pub async fn read_signed(&self, entry: &DirectoryEntry) -> Result<i32, TiffError> {
        require_single(entry, SIGNED_TYPES, "signed integer")?;
        first(self.read_signed_array(entry).await?, entry, "signed integer")
    }

    /// Read all values of an SByte, SShort or SLong entry, widened to i32.
    pub async fn read_signed_array(&self, entry: &DirectoryEntry) -> Result<Vec<i32>, TiffError> {
        let bo = self.byte_order;
        self.read_elements(entry, SIGNED_TYPES, "signed integer", |ft, b, o| {
            signed_at(bo, ft, b, o)
        })
        .await
    }

    // -------------------------------------------------------------------------
    // Directory references
    // -------------------------------------------------------------------------

    /// Read a single sub-directory reference from a Long or IFD entry.
    pub async fn read_directory_reference(
        &self,
        entry: &DirectoryEntry,
    ) -> Result<DirectoryReference, TiffError> {
        require_single(entry, REFERENCE_TYPES, "directory reference")?;
        first(
            self.read_directory_reference_array(entry).await?,
            entry,
            "directory reference",
        )
    }

    /// Read all sub-directory references from a Long or IFD entry
    /// (SubIFDs, EXIF and GPS pointers).
    pub async fn read_directory_reference_array(
        &self,
        entry: &DirectoryEntry,
    ) -> Result<Vec<DirectoryReference>, TiffError> {
        let bo = self.byte_order;
        self.read_elements(entry, REFERENCE_TYPES, "directory reference", |_, b, o| {
            Ok(DirectoryReference(bo.read_u32(b, o)?))
        })
        .await
    }

    // -------------------------------------------------------------------------
    // Strings
    // -------------------------------------------------------------------------

    /// Read an ASCII entry as text.
    ///
    /// The data must end with a NUL byte, which is stripped. NULs before the
    /// last byte separate multiple strings and are kept.
    pub async fn read_string(&self, entry: &DirectoryEntry) -> Result<String, TiffError> {
        expect_type(entry, &[FieldType::Ascii], "string")?;

        let bytes = self.fetch(entry).await?;
        match bytes.split_last() {
            Some((0, text)) => Ok(String::from_utf8_lossy(text).into_owned()),
            _ => Err(TiffError::NotNullTerminated),
        }
    }

    // -------------------------------------------------------------------------
    // Rationals
    // -------------------------------------------------------------------------

    /// Read a single RATIONAL value.
    pub async fn read_rational(&self, entry: &DirectoryEntry) -> Result<Rational, TiffError> {
        require_single(entry, &[FieldType::Rational], "rational")?;
        first(self.read_rational_array(entry).await?, entry, "rational")
    }

    /// Read all values of a RATIONAL entry.
    pub async fn read_rational_array(
        &self,
        entry: &DirectoryEntry,
    ) -> Result<Vec<Rational>, TiffError> {
        let bo = self.byte_order;
        self.read_elements(entry, &[FieldType::Rational], "rational", |_, b, o| {
            Ok(Rational::new(bo.read_u32(b, o)?, bo.read_u32(b, o + 4)?))
        })
        .await
    }

    /// Read a single SRATIONAL value.
    pub async fn read_signed_rational(
        &self,
        entry: &DirectoryEntry,
    ) -> Result<SignedRational, TiffError> {
        require_single(entry, &[FieldType::SRational], "signed rational")?;
        first(
            self.read_signed_rational_array(entry).await?,
            entry,
            "signed rational",
        )
    }

    /// Read all values of an SRATIONAL entry.
    pub async fn read_signed_rational_array(
        &self,
        entry: &DirectoryEntry,
    ) -> Result<Vec<SignedRational>, TiffError> {
        let bo = self.byte_order;
        self.read_elements(
            entry,
            &[FieldType::SRational],
            "signed rational",
            |_, b, o| Ok(SignedRational::new(bo.read_i32(b, o)?, bo.read_i32(b, o + 4)?)),
        )
        .await
    }

    // -------------------------------------------------------------------------
    // Floating point
    // -------------------------------------------------------------------------

    /// Read a single FLOAT value.
    pub async fn read_float(&self, entry: &DirectoryEntry) -> Result<f32, TiffError> {
        require_single(entry, &[FieldType::Float], "float")?;
        first(self.read_float_array(entry).await?, entry, "float")
    }

    /// Read all values of a FLOAT entry.
    pub async fn read_float_array(&self, entry: &DirectoryEntry) -> Result<Vec<f32>, TiffError> {
        let bo = self.byte_order;
        self.read_elements(entry, &[FieldType::Float], "float", |_, b, o| {
            bo.read_f32(b, o)
        })
        .await
    }

    /// Read a single DOUBLE value.
    pub async fn read_double(&self, entry: &DirectoryEntry) -> Result<f64, TiffError> {
        require_single(entry, &[FieldType::Double], "double")?;
        first(self.read_double_array(entry).await?, entry, "double")
    }

    /// Read all values of a DOUBLE entry.
    pub async fn read_double_array(&self, entry: &DirectoryEntry) -> Result<Vec<f64>, TiffError> {
        let bo = self.byte_order;
        self.read_elements(entry, &[FieldType::Double], "double", |_, b, o| {
            bo.read_f64(b, o)
        })
        .await
    }

    // -------------------------------------------------------------------------
    // Generic decoding
    // -------------------------------------------------------------------------

    /// Decode an entry according to its own field type.
    ///
    /// # Errors
    /// `UnknownFieldType` for type codes outside the catalog, plus whatever
    /// the matching typed accessor reports.
    pub async fn read_value(&self, entry: &DirectoryEntry) -> Result<Value, TiffError> {
        match entry.field_type {
            FieldType::Byte | FieldType::Short | FieldType::Long => {
                Ok(Value::Unsigned(self.read_unsigned_array(entry).await?))
            }
            FieldType::SByte | FieldType::SShort | FieldType::SLong => {
                Ok(Value::Signed(self.read_signed_array(entry).await?))
            }
            FieldType::Ascii => Ok(Value::Ascii(self.read_string(entry).await?)),
            FieldType::Rational => Ok(Value::Rational(self.read_rational_array(entry).await?)),
            FieldType::SRational => Ok(Value::SignedRational(
                self.read_signed_rational_array(entry).await?,
            )),
            FieldType::Float => Ok(Value::Float(self.read_float_array(entry).await?)),
            FieldType::Double => Ok(Value::Double(self.read_double_array(entry).await?)),
            FieldType::DirectoryReference => Ok(Value::DirectoryReferences(
                self.read_directory_reference_array(entry).await?,
            )),
            FieldType::Undefined => Ok(Value::Undefined(self.read_bytes(entry).await?)),
            FieldType::Unknown(code) => Err(TiffError::UnknownFieldType(code)),
        }
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn expect_type(
    entry: &DirectoryEntry,
    accepted: &[FieldType],
    target: &'static str,
) -> Result<(), TiffError> {
    if accepted.contains(&entry.field_type) {
        Ok(())
    } else {
        Err(TiffError::TypeMismatch {
            actual: entry.field_type,
            target,
        })
    }
}

/// Check that the entry holds exactly one element, then its type.
///
/// A scalar read of a multi-element entry is an arity error whatever the
/// entry's type.
fn require_single(
    entry: &DirectoryEntry,
    accepted: &[FieldType],
    target: &'static str,
) -> Result<(), TiffError> {
    if entry.count != 1 {
        return Err(TiffError::CountMismatch {
            target,
            count: entry.count,
        });
    }
    expect_type(entry, accepted, target)
}

fn first<T>(values: Vec<T>, entry: &DirectoryEntry, target: &'static str) -> Result<T, TiffError> {
    values.into_iter().next().ok_or(TiffError::CountMismatch {
        target,
        count: entry.count,
    })
}

fn unsigned_at(
    byte_order: ByteOrder,
    field_type: FieldType,
    bytes: &[u8],
    offset: usize,
) -> Result<u32, TiffError> {
    match field_type {
        FieldType::Byte => Ok(byte_order.read_u8(bytes, offset)? as u32),
        FieldType::Short => Ok(byte_order.read_u16(bytes, offset)? as u32),
        FieldType::Long => byte_order.read_u32(bytes, offset),
        actual => Err(TiffError::TypeMismatch {
            actual,
            target: "unsigned integer",
        }),
    }
}

fn signed_at(
    byte_order: ByteOrder,
    field_type: FieldType,
    bytes: &[u8],
    offset: usize,
) -> Result<i32, TiffError> {
    match field_type {
        FieldType::SByte => Ok(byte_order.read_i8(bytes, offset)? as i32),
        FieldType::SShort => Ok(byte_order.read_i16(bytes, offset)? as i32),
        FieldType::SLong => byte_order.read_i32(bytes, offset),
        actual => Err(TiffError::TypeMismatch {
            actual,
            target: "signed integer",
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================
