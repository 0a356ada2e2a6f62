use std::io::SeekFrom;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use tokio::sync::Mutex;
use tracing::trace;

use super::range_reader::check_range;
use super::RangeReader;
use crate::error::IoError;

/// RangeReader over a seekable async stream (a `tokio::fs::File`, a cursor, ...).
///
/// The stream cursor is shared mutable state, so it lives behind a mutex and
/// every `read_exact_at` holds the lock across its seek and its read. Two
/// decoders using the same `StreamReader` are serialized; decoders that need
/// to run in parallel should each own a separate handle.
pub struct StreamReader<S> {
    stream: Mutex<S>,
    size: u64,
    identifier: String,
}

impl<S> StreamReader<S>
where
    S: AsyncRead + AsyncSeek + Unpin + Send,
{
    /// Wrap a stream, measuring its length by seeking to the end.
    pub async fn new(mut stream: S, identifier: impl Into<String>) -> Result<Self, IoError> {
        let size = stream.seek(SeekFrom::End(0)).await?;
        stream.seek(SeekFrom::Start(0)).await?;

        Ok(Self {
            stream: Mutex::new(stream),
            size,
            identifier: identifier.into(),
        })
    }

    /// Give back the wrapped stream.
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }
}

#[async_trait]
impl<S> RangeReader for StreamReader<S>
where
    S: AsyncRead + AsyncSeek + Unpin + Send,
{
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        check_range(offset, len, self.size)?;

        let mut buf = vec![0u8; len];
        {
            let mut stream = self.stream.lock().await;
            stream.seek(SeekFrom::Start(offset)).await?;
            stream.read_exact(&mut buf).await?;
        }

        trace!(
            source = %self.identifier,
            offset,
            len,
            "Read byte range"
        );
        Ok(Bytes::from(buf))
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
