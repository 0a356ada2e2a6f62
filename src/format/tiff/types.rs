//! TIFF field type catalog.
//!
//! The field type code of a directory entry decides how wide each element is
//! and therefore whether the entry's data fits inline in its 4-byte slot.

// =============================================================================
// TIFF Field Types
// =============================================================================

/// On-disk field types of a directory entry.
///
/// The twelve TIFF 6.0 types plus the IFD type (13) used by EXIF and DNG for
/// sub-directory pointers. Codes outside the catalog are preserved as
/// `Unknown` so a directory containing them can still be walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Unsigned 8-bit integer
    Byte,

    /// 8-bit byte holding a 7-bit ASCII code; values are NUL terminated
    Ascii,

    /// Unsigned 16-bit integer
    Short,

    /// Unsigned 32-bit integer
    Long,

    /// Two Longs: numerator, denominator
    Rational,

    /// Signed 8-bit integer
    SByte,

    /// Opaque byte data
    Undefined,

    /// Signed 16-bit integer
    SShort,

    /// Signed 32-bit integer
    SLong,

    /// Two SLongs: numerator, denominator
    SRational,

    /// IEEE single-precision float
    Float,

    /// IEEE double-precision float
    Double,

    /// 32-bit offset of a sub-directory
    DirectoryReference,

    /// Type code outside the catalog
    Unknown(u16),
}

impl FieldType {
    /// Maximum bytes that fit inline in the value field of a classic TIFF entry.
    pub const INLINE_THRESHOLD: usize = 4;

    /// Create a FieldType from its numeric code.
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => FieldType::Byte,
            2 => FieldType::Ascii,
            3 => FieldType::Short,
            4 => FieldType::Long,
            5 => FieldType::Rational,
            6 => FieldType::SByte,
            7 => FieldType::Undefined,
            8 => FieldType::SShort,
            9 => FieldType::SLong,
            10 => FieldType::SRational,
            11 => FieldType::Float,
            12 => FieldType::Double,
            13 => FieldType::DirectoryReference,
            other => FieldType::Unknown(other),
        }
    }

    /// The numeric code as stored on disk.
    pub const fn as_u16(self) -> u16 {
        match self {
            FieldType::Byte => 1,
            FieldType::Ascii => 2,
            FieldType::Short => 3,
            FieldType::Long => 4,
            FieldType::Rational => 5,
            FieldType::SByte => 6,
            FieldType::Undefined => 7,
            FieldType::SShort => 8,
            FieldType::SLong => 9,
            FieldType::SRational => 10,
            FieldType::Float => 11,
            FieldType::Double => 12,
            FieldType::DirectoryReference => 13,
            FieldType::Unknown(code) => code,
        }
    }

    /// Size of a single value of this type in bytes.
    ///
    /// `Unknown` types report 0: their data cannot be sized.
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            FieldType::Byte | FieldType::Ascii | FieldType::SByte | FieldType::Undefined => 1,
            FieldType::Short | FieldType::SShort => 2,
            FieldType::Long
            | FieldType::SLong
            | FieldType::Float
            | FieldType::DirectoryReference => 4,
            FieldType::Rational | FieldType::SRational | FieldType::Double => 8,
            FieldType::Unknown(_) => 0,
        }
    }

    /// Whether the type code is part of the catalog.
    #[inline]
    pub const fn is_known(self) -> bool {
        !matches!(self, FieldType::Unknown(_))
    }

    /// Total byte size of `count` values of this type.
    #[inline]
    pub const fn total_size(self, count: u32) -> u64 {
        self.size_in_bytes() as u64 * count as u64
    }

    /// Check if `count` values of this type fit inline in an entry.
    #[inline]
    pub const fn fits_inline(self, count: u32) -> bool {
        self.total_size(count) <= Self::INLINE_THRESHOLD as u64
    }
}

// =============================================================================
// Tests
// =============================================================================
