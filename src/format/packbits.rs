//! PackBits run-length decoding (TIFF compression 32773).
//!
//! Each run starts with a header byte `h`, read as signed:
//!
//! ```text
//! 0..=127     copy the next h + 1 bytes literally
//! -127..=-1   repeat the next byte 1 - h times
//! -128        no-op
//! ```
//!
//! Output is sized by the caller from image metadata. A run that would write
//! past that size is an error; a stream that ends early leaves the remaining
//! output zeroed.

use tracing::warn;

use crate::error::TiffError;

/// Header byte that encodes nothing.
const NO_OP: u8 = 0x80;

/// Decode a PackBits stream into exactly `uncompressed_len` bytes.
///
/// # Errors
/// - `PackBitsOverrun` if a run would write past `uncompressed_len`
/// - `PackBitsTruncated` if a run header is missing its operand bytes
pub fn decompress(input: &[u8], uncompressed_len: usize) -> Result<Vec<u8>, TiffError> {
    let mut output = Vec::with_capacity(uncompressed_len);
    let mut pos = 0;

    while pos < input.len() {
        let header = input[pos];

        match header {
            0..=0x7F => {
                let run = header as usize + 1;
                let start = pos + 1;
                let literal = input
                    .get(start..start + run)
                    .ok_or(TiffError::PackBitsTruncated { offset: pos })?;
                ensure_capacity(output.len() + run, uncompressed_len)?;
                output.extend_from_slice(literal);
                pos = start + run;
            }
            NO_OP => {
                pos += 1;
            }
            _ => {
                let run = 257 - header as usize;
                let value = *input
                    .get(pos + 1)
                    .ok_or(TiffError::PackBitsTruncated { offset: pos })?;
                ensure_capacity(output.len() + run, uncompressed_len)?;
                output.resize(output.len() + run, value);
                pos += 2;
            }
        }
    }

    if output.len() < uncompressed_len {
        warn!(
            decoded = output.len(),
            expected = uncompressed_len,
            "PackBits stream ended early, zero-filling remainder"
        );
        output.resize(uncompressed_len, 0);
    }

    Ok(output)
}

#[inline]
fn ensure_capacity(needed: usize, capacity: usize) -> Result<(), TiffError> {
    if needed > capacity {
        Err(TiffError::PackBitsOverrun { needed, capacity })
    } else {
        Ok(())
    }
}
