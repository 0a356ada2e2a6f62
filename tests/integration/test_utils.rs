//! Test utilities for integration tests.
//!
//! This module provides a request-tracking reader and a builder for test
//! TIFF files in either byte order.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use tiff_stream::error::IoError;
use tiff_stream::io::RangeReader;

// =============================================================================
// Mock Range Reader with Request Tracking
// =============================================================================

/// A mock range reader that tracks all read requests.
///
/// This is useful for verifying that operations stay lazy and read only the
/// ranges they need.
pub struct TrackingMockReader {
    data: Bytes,
    identifier: String,
    request_count: Arc<AtomicUsize>,
    requests: Arc<RwLock<Vec<(u64, usize)>>>,
}

impl TrackingMockReader {
    pub fn new(data: Vec<u8>, identifier: impl Into<String>) -> Self {
        Self {
            data: Bytes::from(data),
            identifier: identifier.into(),
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub async fn get_requests(&self) -> Vec<(u64, usize)> {
        self.requests.read().await.clone()
    }

    pub async fn reset_tracking(&self) {
        self.request_count.store(0, Ordering::SeqCst);
        self.requests.write().await.clear();
    }
}

impl Clone for TrackingMockReader {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            identifier: self.identifier.clone(),
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl RangeReader for TrackingMockReader {
    async fn read_exact_at(&self, offset: u64, len: usize) -> Result<Bytes, IoError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.write().await.push((offset, len));

        let start = offset as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(IoError::RangeOutOfBounds {
                offset,
                requested: len as u64,
                size: self.data.len() as u64,
            });
        }
        Ok(self.data.slice(start..end))
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

// =============================================================================
// TIFF File Builders
// =============================================================================

#[derive(Clone, Copy, Debug)]
pub enum ByteOrderType {
    LittleEndian,
    BigEndian,
}

pub const BOTH_BYTE_ORDERS: [ByteOrderType; 2] =
    [ByteOrderType::LittleEndian, ByteOrderType::BigEndian];

/// Value data of one entry, encoded at build time in the file's byte order.
enum Payload {
    Bytes(Vec<u8>),
    Shorts(Vec<u16>),
    Longs(Vec<u32>),
    SShorts(Vec<i16>),
    SLongs(Vec<i32>),
    Rationals(Vec<(u32, u32)>),
    SRationals(Vec<(i32, i32)>),
    Floats(Vec<f32>),
    Doubles(Vec<f64>),
    /// Offsets of other directories, by builder index
    Ifds(Vec<usize>),
    /// Offsets of blobs, by builder index
    Blobs(Vec<usize>),
    /// Value field written verbatim, never treated as an offset
    Raw([u8; 4]),
}

impl Payload {
    fn len(&self) -> usize {
        match self {
            Payload::Bytes(v) => v.len(),
            Payload::Shorts(v) => v.len() * 2,
            Payload::SShorts(v) => v.len() * 2,
            Payload::Longs(v) => v.len() * 4,
            Payload::SLongs(v) => v.len() * 4,
            Payload::Floats(v) => v.len() * 4,
            Payload::Ifds(v) => v.len() * 4,
            Payload::Blobs(v) => v.len() * 4,
            Payload::Rationals(v) => v.len() * 8,
            Payload::SRationals(v) => v.len() * 8,
            Payload::Doubles(v) => v.len() * 8,
            Payload::Raw(_) => 4,
        }
    }

    fn encode(&self, order: ByteOrderType, ifd_offsets: &[u32], blob_offsets: &[u32]) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        match self {
            Payload::Bytes(v) => out.extend_from_slice(v),
            Payload::Shorts(v) => v.iter().for_each(|x| write_u16(&mut out, order, *x)),
            Payload::SShorts(v) => v.iter().for_each(|x| write_u16(&mut out, order, *x as u16)),
            Payload::Longs(v) => v.iter().for_each(|x| write_u32(&mut out, order, *x)),
            Payload::SLongs(v) => v.iter().for_each(|x| write_u32(&mut out, order, *x as u32)),
            Payload::Floats(v) => v.iter().for_each(|x| write_u32(&mut out, order, x.to_bits())),
            Payload::Doubles(v) => v.iter().for_each(|x| write_u64(&mut out, order, x.to_bits())),
            Payload::Rationals(v) => v.iter().for_each(|(n, d)| {
                write_u32(&mut out, order, *n);
                write_u32(&mut out, order, *d);
            }),
            Payload::SRationals(v) => v.iter().for_each(|(n, d)| {
                write_u32(&mut out, order, *n as u32);
                write_u32(&mut out, order, *d as u32);
            }),
            Payload::Ifds(v) => v
                .iter()
                .for_each(|i| write_u32(&mut out, order, ifd_offsets[*i])),
            Payload::Blobs(v) => v
                .iter()
                .for_each(|i| write_u32(&mut out, order, blob_offsets[*i])),
            Payload::Raw(raw) => out.extend_from_slice(raw),
        }
        out
    }

    fn is_indirect(&self) -> bool {
        !matches!(self, Payload::Raw(_)) && self.len() > 4
    }
}

struct EntryBuilder {
    tag: u16,
    field_type: u16,
    count: i32,
    payload: Payload,
}

/// Builder for one directory. Entries are written in the order they are added.
#[derive(Default)]
pub struct IfdBuilder {
    entries: Vec<EntryBuilder>,
}

impl IfdBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, tag: u16, field_type: u16, count: usize, payload: Payload) -> Self {
        self.entries.push(EntryBuilder {
            tag,
            field_type,
            count: count as i32,
            payload,
        });
        self
    }

    pub fn bytes(self, tag: u16, values: &[u8]) -> Self {
        self.push(tag, 1, values.len(), Payload::Bytes(values.to_vec()))
    }

    /// ASCII entry; the NUL terminator is appended.
    pub fn ascii(self, tag: u16, text: &str) -> Self {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        self.ascii_raw(tag, &data)
    }

    /// ASCII entry with the data exactly as given.
    pub fn ascii_raw(self, tag: u16, data: &[u8]) -> Self {
        self.push(tag, 2, data.len(), Payload::Bytes(data.to_vec()))
    }

    pub fn short(self, tag: u16, value: u16) -> Self {
        self.shorts(tag, &[value])
    }

    pub fn shorts(self, tag: u16, values: &[u16]) -> Self {
        self.push(tag, 3, values.len(), Payload::Shorts(values.to_vec()))
    }

    pub fn long(self, tag: u16, value: u32) -> Self {
        self.longs(tag, &[value])
    }

    pub fn longs(self, tag: u16, values: &[u32]) -> Self {
        self.push(tag, 4, values.len(), Payload::Longs(values.to_vec()))
    }

    pub fn rationals(self, tag: u16, values: &[(u32, u32)]) -> Self {
        self.push(tag, 5, values.len(), Payload::Rationals(values.to_vec()))
    }

    pub fn sbytes(self, tag: u16, values: &[i8]) -> Self {
        let data = values.iter().map(|v| *v as u8).collect();
        self.push(tag, 6, values.len(), Payload::Bytes(data))
    }

    pub fn undefined(self, tag: u16, data: &[u8]) -> Self {
        self.push(tag, 7, data.len(), Payload::Bytes(data.to_vec()))
    }

    pub fn sshorts(self, tag: u16, values: &[i16]) -> Self {
        self.push(tag, 8, values.len(), Payload::SShorts(values.to_vec()))
    }

    pub fn slongs(self, tag: u16, values: &[i32]) -> Self {
        self.push(tag, 9, values.len(), Payload::SLongs(values.to_vec()))
    }

    pub fn srationals(self, tag: u16, values: &[(i32, i32)]) -> Self {
        self.push(tag, 10, values.len(), Payload::SRationals(values.to_vec()))
    }

    pub fn floats(self, tag: u16, values: &[f32]) -> Self {
        self.push(tag, 11, values.len(), Payload::Floats(values.to_vec()))
    }

    pub fn doubles(self, tag: u16, values: &[f64]) -> Self {
        self.push(tag, 12, values.len(), Payload::Doubles(values.to_vec()))
    }

    /// Entry whose values are the offsets of other directories in the
    /// builder. `field_type` is 4 (LONG) or 13 (IFD).
    pub fn sub_ifds(self, tag: u16, field_type: u16, ifds: &[usize]) -> Self {
        self.push(tag, field_type, ifds.len(), Payload::Ifds(ifds.to_vec()))
    }

    /// LONG entry holding the offsets of blobs added to the builder.
    pub fn blob_offsets(self, tag: u16, blobs: &[usize]) -> Self {
        self.push(tag, 4, blobs.len(), Payload::Blobs(blobs.to_vec()))
    }

    /// Entry with an arbitrary type code and count, value field verbatim.
    pub fn raw(mut self, tag: u16, field_type: u16, count: i32, value: [u8; 4]) -> Self {
        self.entries.push(EntryBuilder {
            tag,
            field_type,
            count,
            payload: Payload::Raw(value),
        });
        self
    }
}

/// Where the builder put each directory and blob.
#[derive(Debug, Clone)]
pub struct Layout {
    pub ifd_offsets: Vec<u32>,
    pub blob_offsets: Vec<u32>,
}

/// Builder for creating test TIFF files.
///
/// Layout: header, then each directory followed by its out-of-line values,
/// then all blobs. Out-of-line values start on even offsets.
pub struct TiffBuilder {
    byte_order: ByteOrderType,
    magic: u16,
    ifds: Vec<IfdBuilder>,
    next: Vec<Option<usize>>,
    first: Option<usize>,
    blobs: Vec<Vec<u8>>,
}

impl TiffBuilder {
    pub fn new(byte_order: ByteOrderType) -> Self {
        Self {
            byte_order,
            magic: 42,
            ifds: Vec::new(),
            next: Vec::new(),
            first: None,
            blobs: Vec::new(),
        }
    }

    pub fn with_magic(mut self, magic: u16) -> Self {
        self.magic = magic;
        self
    }

    /// Add a directory, returning its index. It is not linked anywhere yet.
    pub fn add_ifd(&mut self, ifd: IfdBuilder) -> usize {
        self.ifds.push(ifd);
        self.next.push(None);
        self.ifds.len() - 1
    }

    /// Add raw data stored after all directories, returning its index.
    pub fn add_blob(&mut self, data: Vec<u8>) -> usize {
        self.blobs.push(data);
        self.blobs.len() - 1
    }

    /// Make `ifds` the main chain: the header points at the first one and
    /// each links to the following one.
    pub fn chain(&mut self, ifds: &[usize]) -> &mut Self {
        self.first = ifds.first().copied();
        for pair in ifds.windows(2) {
            self.next[pair[0]] = Some(pair[1]);
        }
        self
    }

    /// Set the next-directory link of `from`.
    pub fn link(&mut self, from: usize, to: usize) -> &mut Self {
        self.next[from] = Some(to);
        self
    }

    fn layout(&self) -> (Layout, Vec<Vec<Option<u32>>>) {
        let mut pos = 8u32;
        let mut ifd_offsets = Vec::with_capacity(self.ifds.len());
        let mut value_offsets = Vec::with_capacity(self.ifds.len());

        for ifd in &self.ifds {
            ifd_offsets.push(pos);
            pos += 2 + 12 * ifd.entries.len() as u32 + 4;

            let mut offsets = Vec::with_capacity(ifd.entries.len());
            for entry in &ifd.entries {
                if entry.payload.is_indirect() {
                    pos += pos % 2;
                    offsets.push(Some(pos));
                    pos += entry.payload.len() as u32;
                } else {
                    offsets.push(None);
                }
            }
            pos += pos % 2;
            value_offsets.push(offsets);
        }

        let mut blob_offsets = Vec::with_capacity(self.blobs.len());
        for blob in &self.blobs {
            blob_offsets.push(pos);
            pos += blob.len() as u32;
        }

        (
            Layout {
                ifd_offsets,
                blob_offsets,
            },
            value_offsets,
        )
    }

    /// Build the file, also returning where everything was placed.
    pub fn build_with_layout(&self) -> (Vec<u8>, Layout) {
        let order = self.byte_order;
        let (layout, value_offsets) = self.layout();
        let mut data = Vec::new();

        match order {
            ByteOrderType::LittleEndian => data.extend_from_slice(b"II"),
            ByteOrderType::BigEndian => data.extend_from_slice(b"MM"),
        }
        write_u16(&mut data, order, self.magic);
        write_u32(
            &mut data,
            order,
            self.first.map(|i| layout.ifd_offsets[i]).unwrap_or(0),
        );

        for (idx, ifd) in self.ifds.iter().enumerate() {
            assert_eq!(data.len() as u32, layout.ifd_offsets[idx]);

            write_u16(&mut data, order, ifd.entries.len() as u16);
            for (entry, offset) in ifd.entries.iter().zip(&value_offsets[idx]) {
                write_u16(&mut data, order, entry.tag);
                write_u16(&mut data, order, entry.field_type);
                write_u32(&mut data, order, entry.count as u32);
                match offset {
                    Some(offset) => write_u32(&mut data, order, *offset),
                    None => {
                        let mut value =
                            entry
                                .payload
                                .encode(order, &layout.ifd_offsets, &layout.blob_offsets);
                        value.resize(4, 0);
                        data.extend_from_slice(&value);
                    }
                }
            }
            let next = self.next[idx]
                .map(|i| layout.ifd_offsets[i])
                .unwrap_or(0);
            write_u32(&mut data, order, next);

            for (entry, offset) in ifd.entries.iter().zip(&value_offsets[idx]) {
                if let Some(offset) = offset {
                    data.resize(*offset as usize, 0);
                    data.extend(entry.payload.encode(
                        order,
                        &layout.ifd_offsets,
                        &layout.blob_offsets,
                    ));
                }
            }
            if data.len() % 2 == 1 {
                data.push(0);
            }
        }

        for (blob, offset) in self.blobs.iter().zip(&layout.blob_offsets) {
            assert_eq!(data.len() as u32, *offset);
            data.extend_from_slice(blob);
        }

        (data, layout)
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_with_layout().0
    }
}

fn write_u16(data: &mut Vec<u8>, order: ByteOrderType, value: u16) {
    match order {
        ByteOrderType::LittleEndian => data.extend(&value.to_le_bytes()),
        ByteOrderType::BigEndian => data.extend(&value.to_be_bytes()),
    }
}

fn write_u32(data: &mut Vec<u8>, order: ByteOrderType, value: u32) {
    match order {
        ByteOrderType::LittleEndian => data.extend(&value.to_le_bytes()),
        ByteOrderType::BigEndian => data.extend(&value.to_be_bytes()),
    }
}

fn write_u64(data: &mut Vec<u8>, order: ByteOrderType, value: u64) {
    match order {
        ByteOrderType::LittleEndian => data.extend(&value.to_le_bytes()),
        ByteOrderType::BigEndian => data.extend(&value.to_be_bytes()),
    }
}

// =============================================================================
// Sample Files
// =============================================================================

/// Tags used by the sample files.
pub mod tags {
    pub const IMAGE_WIDTH: u16 = 256;
    pub const IMAGE_LENGTH: u16 = 257;
    pub const BITS_PER_SAMPLE: u16 = 258;
    pub const COMPRESSION: u16 = 259;
    pub const MAKE: u16 = 271;
    pub const STRIP_OFFSETS: u16 = 273;
    pub const STRIP_BYTE_COUNTS: u16 = 279;
    pub const X_RESOLUTION: u16 = 282;
    pub const SUB_IFDS: u16 = 330;
    pub const EXPOSURE_BIAS: u16 = 37380;
    pub const MAKER_NOTE: u16 = 37500;
    pub const EXIF_IFD: u16 = 34665;
}

/// A DNG-shaped file: IFD0 with an 8-bit PackBits preview strip, a SubIFD
/// for the raw image, an EXIF directory, and a second top-level directory.
///
/// Returns the file and the uncompressed preview.
pub fn create_dng_like(order: ByteOrderType) -> (Vec<u8>, Vec<u8>) {
    let preview: Vec<u8> = [vec![0x11; 6], vec![1, 2, 3], vec![0x22; 7]].concat();
    // 0xFB: repeat 6; 0x02: 3 literals; 0xFA: repeat 7
    let packed = vec![0xFB, 0x11, 0x02, 1, 2, 3, 0xFA, 0x22];

    let mut tiff = TiffBuilder::new(order);
    let strip = tiff.add_blob(packed.clone());

    let raw = tiff.add_ifd(
        IfdBuilder::new()
            .long(tags::IMAGE_WIDTH, 4000)
            .long(tags::IMAGE_LENGTH, 3000)
            .shorts(tags::BITS_PER_SAMPLE, &[16])
            .short(tags::COMPRESSION, 7),
    );
    let exif = tiff.add_ifd(
        IfdBuilder::new()
            .srationals(tags::EXPOSURE_BIAS, &[(-1, 3)])
            .undefined(tags::MAKER_NOTE, b"Nikon\0\x02\x10\0\0"),
    );
    let ifd0 = tiff.add_ifd(
        IfdBuilder::new()
            .long(tags::IMAGE_WIDTH, 4)
            .long(tags::IMAGE_LENGTH, 4)
            .shorts(tags::BITS_PER_SAMPLE, &[8])
            .short(tags::COMPRESSION, 32773)
            .ascii(tags::MAKE, "NIKON CORPORATION")
            .blob_offsets(tags::STRIP_OFFSETS, &[strip])
            .long(tags::STRIP_BYTE_COUNTS, packed.len() as u32)
            .rationals(tags::X_RESOLUTION, &[(300, 1)])
            .sub_ifds(tags::SUB_IFDS, 13, &[raw])
            .sub_ifds(tags::EXIF_IFD, 4, &[exif]),
    );
    let thumbnail = tiff.add_ifd(
        IfdBuilder::new()
            .long(tags::IMAGE_WIDTH, 160)
            .long(tags::IMAGE_LENGTH, 120)
            .short(tags::COMPRESSION, 1),
    );
    tiff.chain(&[ifd0, thumbnail]);

    (tiff.build(), preview)
}

pub fn is_tiff_magic(data: &[u8]) -> bool {
    data.len() >= 4
        && ((data[0..2] == *b"II" && data[2..4] == [42, 0])
            || (data[0..2] == *b"MM" && data[2..4] == [0, 42]))
}
