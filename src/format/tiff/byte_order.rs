//! Endian-aware primitive decoding.
//!
//! Every multi-byte value in a TIFF file is read through [`ByteOrder`]. The
//! readers take a slice plus an offset and fail instead of panicking when the
//! slice is too short.

use crate::error::{IoError, TiffError};

// =============================================================================
// Constants
// =============================================================================

/// Marker bytes indicating little-endian byte order ("II" for Intel)
pub const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Marker bytes indicating big-endian byte order ("MM" for Motorola)
pub const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF file.
///
/// TIFF files declare their byte order in the first two bytes of the header.
/// All multi-byte values in the file must be read respecting this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Select a byte order from the two marker bytes at the start of a file.
    ///
    /// The marker is symmetric ("II" / "MM"), so it is read the same way
    /// regardless of the host.
    pub fn from_marker(marker: [u8; 2]) -> Result<Self, TiffError> {
        match u16::from_le_bytes(marker) {
            BYTE_ORDER_LITTLE_ENDIAN => Ok(ByteOrder::LittleEndian),
            BYTE_ORDER_BIG_ENDIAN => Ok(ByteOrder::BigEndian),
            other => Err(TiffError::InvalidByteOrder(other)),
        }
    }

    /// The two marker bytes for this byte order.
    pub const fn marker(self) -> [u8; 2] {
        match self {
            ByteOrder::LittleEndian => *b"II",
            ByteOrder::BigEndian => *b"MM",
        }
    }

    /// Read a u8 at `offset`. Single bytes have no order; this exists so every
    /// element read goes through the same bounds check.
    #[inline]
    pub fn read_u8(self, bytes: &[u8], offset: usize) -> Result<u8, TiffError> {
        Ok(take::<1>(bytes, offset)?[0])
    }

    /// Read an i8 at `offset`.
    #[inline]
    pub fn read_i8(self, bytes: &[u8], offset: usize) -> Result<i8, TiffError> {
        Ok(self.read_u8(bytes, offset)? as i8)
    }

    /// Read a u16 at `offset`.
    #[inline]
    pub fn read_u16(self, bytes: &[u8], offset: usize) -> Result<u16, TiffError> {
        let raw = take::<2>(bytes, offset)?;
        Ok(match self {
            ByteOrder::LittleEndian => u16::from_le_bytes(raw),
            ByteOrder::BigEndian => u16::from_be_bytes(raw),
        })
    }

    /// Read an i16 at `offset`.
    #[inline]
    pub fn read_i16(self, bytes: &[u8], offset: usize) -> Result<i16, TiffError> {
        Ok(self.read_u16(bytes, offset)? as i16)
    }

    /// Read a u32 at `offset`.
    #[inline]
    pub fn read_u32(self, bytes: &[u8], offset: usize) -> Result<u32, TiffError> {
        let raw = take::<4>(bytes, offset)?;
        Ok(match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(raw),
            ByteOrder::BigEndian => u32::from_be_bytes(raw),
        })
    }

    /// Read an i32 at `offset`.
    #[inline]
    pub fn read_i32(self, bytes: &[u8], offset: usize) -> Result<i32, TiffError> {
        Ok(self.read_u32(bytes, offset)? as i32)
    }

    /// Read an IEEE 754 single-precision float at `offset`.
    #[inline]
    pub fn read_f32(self, bytes: &[u8], offset: usize) -> Result<f32, TiffError> {
        Ok(f32::from_bits(self.read_u32(bytes, offset)?))
    }

    /// Read an IEEE 754 double-precision float at `offset`.
    #[inline]
    pub fn read_f64(self, bytes: &[u8], offset: usize) -> Result<f64, TiffError> {
        let raw = take::<8>(bytes, offset)?;
        let bits = match self {
            ByteOrder::LittleEndian => u64::from_le_bytes(raw),
            ByteOrder::BigEndian => u64::from_be_bytes(raw),
        };
        Ok(f64::from_bits(bits))
    }
}

/// Copy `N` bytes at `offset` out of `bytes`, failing on underflow.
fn take<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N], TiffError> {
    offset
        .checked_add(N)
        .and_then(|end| bytes.get(offset..end))
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| {
            IoError::RangeOutOfBounds {
                offset: offset as u64,
                requested: N as u64,
                size: bytes.len() as u64,
            }
            .into()
        })
}

// =============================================================================
// Tests
// =============================================================================
