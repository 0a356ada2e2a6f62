use async_trait::async_trait;
use bytes::Bytes;

use super::range_reader::check_range;
use super::RangeReader;
use crate::error::IoError;

/// RangeReader over an immutable in-memory buffer.
///
/// Reads are zero-copy slices of the shared [`Bytes`], so clones are cheap
/// and can be handed to concurrent decoders freely.
#[derive(Debug, Clone)]
pub struct MemoryReader {
    data: Bytes,
    identifier: String,
}

impl MemoryReader {
    /// Wrap a buffer, using `memory://` as the identifier.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::with_identifier(data, "memory://")
    }

    /// Wrap a buffer with a custom identifier for logs.
    pub fn with_identifier(data: impl Into<Bytes>, identifier: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            identifier: identifier.into(),
        }
    }

    /// The whole underlying buffer.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

#[async_trait]
impl RangeReader for MemoryReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        check_range(offset, len, self.size())?;
        let start = offset as usize;
        Ok(self.data.slice(start..start + len))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
