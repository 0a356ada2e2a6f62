//! I/O layer for positional reads from byte sources.
//!
//! Decoders never hold a cursor: every read names its offset. Two sources
//! are provided, an in-memory buffer and a mutex-serialized seekable stream.

mod memory_reader;
mod range_reader;
mod stream_reader;

pub use memory_reader::MemoryReader;
pub use range_reader::RangeReader;
pub use stream_reader::StreamReader;
