// Wavechunk -- A RIFF/RF64 WAVE chunk parser in Rust
// Copyright 2026 The Wavechunk Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io;
use std::io::{Seek, Write};

use tracing::{debug, warn};

use super::chunk::{padded_len, size_field, write_chunk, Chunk, ChunkBody, ChunkHeader, ChunkId,
                   HEADER_LEN, SENTINEL_SIZE};
use super::cursor::ByteCursor;
use super::ds64::{Size64Table, FIXED_LEN as DS64_FIXED_LEN};
use super::riff::{RootContainer, RootKind, ROOT_HEADER_LEN};
use super::{Error, Result, WaveFile};

/// Extends the functionality of `io::Write` with additional methods.
///
/// The methods may be used on any type that implements `io::Write`.
pub trait WriteExt: io::Write {
    /// Writes an unsigned 32-bit integer in little endian format.
    fn write_le_u32(&mut self, x: u32) -> io::Result<()>;

    /// Writes a signed 64-bit integer in little endian format.
    fn write_le_i64(&mut self, x: i64) -> io::Result<()>;
}

impl<W> WriteExt for W where W: io::Write {
    fn write_le_u32(&mut self, x: u32) -> io::Result<()> {
        self.write_all(&x.to_le_bytes())
    }

    fn write_le_i64(&mut self, x: i64) -> io::Result<()> {
        self.write_all(&x.to_le_bytes())
    }
}

/// Converts a length to the signed representation used by `ds64`.
fn size64(len: u64, offset: u64) -> Result<i64> {
    i64::try_from(len).map_err(|_| Error::ChunkTooLarge { offset: offset, len: len })
}

/// Encodes a complete file into memory.
///
/// For RIFF, every size field is derived from the payload lengths. For RF64,
/// the first chunk must be `ds64`; its root and data sizes are replaced by the
/// actual ones, and the root and first `data` chunk get the sentinel size.
/// Other table entries are written as they are.
pub fn encode(file: &WaveFile) -> Result<Vec<u8>> {
    let mut payloads = Vec::with_capacity(file.chunks.len());
    let mut total = ROOT_HEADER_LEN;
    for chunk in &file.chunks {
        chunk.check_body(total)?;
        let payload = chunk.encode_payload()?;
        total += HEADER_LEN + padded_len(payload.len() as u64);
        payloads.push(payload);
    }
    let riff_size = total - HEADER_LEN;

    let root = match file.kind {
        RootKind::Riff => match size_field(riff_size) {
            Some(size) => RootContainer { kind: RootKind::Riff, declared_size: size },
            None => return Err(Error::ChunkTooLarge { offset: 0, len: riff_size }),
        },
        RootKind::Rf64 => {
            let mut table = match file.chunks.first() {
                Some(&Chunk { body: ChunkBody::Size64(ref table), .. }) => table.clone(),
                _ => return Err(Error::MissingSize64Table { offset: ROOT_HEADER_LEN }),
            };
            let data_len = file.chunks.iter()
                .position(|chunk| chunk.id == ChunkId::DATA)
                .map_or(0, |i| payloads[i].len() as u64);
            table.riff_size = size64(riff_size, 0)?;
            table.data_size = size64(data_len, 0)?;
            payloads[0] = table.encode()?;
            RootContainer::rf64()
        }
    };

    let len = match usize::try_from(total) {
        Ok(len) => len,
        Err(..) => return Err(Error::ChunkTooLarge { offset: 0, len: riff_size }),
    };
    let mut cursor = ByteCursor::new(vec![0u8; len]);
    cursor.write_bytes(&root.to_bytes())?;

    let mut wrote_sentinel_data = false;
    for (chunk, payload) in file.chunks.iter().zip(&payloads) {
        if root.kind == RootKind::Rf64 && chunk.id == ChunkId::DATA && !wrote_sentinel_data {
            ChunkHeader { id: ChunkId::DATA, size: SENTINEL_SIZE }.write(&mut cursor)?;
            cursor.write_bytes(payload)?;
            cursor.write_pad()?;
            wrote_sentinel_data = true;
        } else {
            write_chunk(&mut cursor, chunk.id, payload)?;
        }
    }

    debug!(kind = ?root.kind, len = total, chunks = file.chunks.len(), "encoded wave file");
    Ok(cursor.into_inner())
}

/// A `data` chunk whose size field is not known until it is closed.
#[derive(Clone, Copy, Debug)]
struct DataChunk {
    /// Offset of the chunk header.
    offset: u64,
    /// Payload bytes written so far.
    len: u64,
}

/// A writer that emits chunks one by one to a seekable stream.
///
/// The root header is written on construction, and for RF64 a `ds64` chunk
/// follows immediately. Chunks with a known payload are written with
/// `write_chunk`; sample data can be streamed with `write_data`, and its size
/// fields are filled in when the writer is finalized.
///
/// After all chunks have been written, the file must be finalized. This can
/// be done by calling `finalize`. If `finalize` is not called, the file will
/// be finalized upon drop. However, finalization involves IO that may fail,
/// and without calling `finalize`, such a failure cannot be observed.
pub struct ChunkWriter<W> where W: io::Write + io::Seek {
    kind: RootKind,

    /// The writer that will be written to.
    writer: io::BufWriter<W>,

    /// The number of bytes written so far, including the root header.
    written: u64,

    /// The sample count to store in `ds64`.
    sample_count: i64,

    /// The `data` chunk currently being written, if any.
    open_data: Option<DataChunk>,

    /// All `data` chunks that have been closed, in file order.
    data_chunks: Vec<DataChunk>,

    /// Whether `finalize_internal` has been called.
    finalized: bool,
}

impl<W> ChunkWriter<W> where W: io::Write + io::Seek {
    /// Creates a writer and writes the root header to the underlying writer.
    ///
    /// The underlying writer is assumed to be at offset 0. `ChunkWriter`
    /// employs buffering internally to avoid too many `write` calls to the
    /// underlying writer.
    pub fn new(writer: W, kind: RootKind) -> Result<ChunkWriter<W>> {
        let mut writer = ChunkWriter {
            kind: kind,
            writer: io::BufWriter::new(writer),
            written: 0,
            sample_count: 0,
            open_data: None,
            data_chunks: Vec::new(),
            finalized: false,
        };

        // The sizes are not known yet; they are filled in by `finalize`.
        let root = match kind {
            RootKind::Riff => RootContainer { kind: kind, declared_size: 0 },
            RootKind::Rf64 => RootContainer::rf64(),
        };
        writer.put(&root.to_bytes())?;
        if kind == RootKind::Rf64 {
            let header = ChunkHeader { id: ChunkId::DS64, size: DS64_FIXED_LEN as u32 };
            writer.put(&header.to_bytes())?;
            writer.put(&Size64Table::default().encode()?)?;
        }

        Ok(writer)
    }

    /// Sets the sample count stored in the `ds64` chunk of an RF64 file.
    pub fn set_sample_count(&mut self, sample_count: i64) {
        self.sample_count = sample_count;
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.written += bytes.len() as u64;
        Ok(())
    }

    /// Writes a chunk with a complete payload.
    ///
    /// This closes the `data` chunk that is being written, if any. For RF64
    /// the writer maintains its own `ds64` chunk, so a `ds64` chunk passed
    /// here is skipped.
    pub fn write_chunk(&mut self, chunk: &Chunk) -> Result<()> {
        chunk.check_body(self.written)?;
        let payload = chunk.encode_payload()?;
        self.write_raw(chunk.id, &payload)
    }

    /// Writes a chunk with the given id and payload bytes.
    ///
    /// Payloads of `fmt `, `ds64` and `bext` chunks are decoded first, so that
    /// the file can be read back. As with `write_chunk`, a `ds64` chunk is
    /// skipped for RF64.
    pub fn write_raw(&mut self, id: ChunkId, payload: &[u8]) -> Result<()> {
        if self.kind == RootKind::Rf64 && id == ChunkId::DS64 {
            warn!("skipping ds64 chunk, the writer maintains its own");
            return Ok(());
        }
        if id == ChunkId::FMT || id == ChunkId::DS64 || id == ChunkId::BEXT {
            Chunk::decode(id, payload.to_vec(), self.written + HEADER_LEN)?;
        }
        self.close_data()?;
        let size = match size_field(payload.len() as u64) {
            Some(size) => size,
            None => {
                return Err(Error::ChunkTooLarge {
                    offset: self.written,
                    len: payload.len() as u64,
                })
            }
        };
        self.put(&ChunkHeader { id: id, size: size }.to_bytes())?;
        self.put(payload)?;
        if payload.len() % 2 == 1 {
            self.put(&[0])?;
        }
        Ok(())
    }

    /// Starts a new `data` chunk, closing the current one if there is one.
    pub fn begin_data(&mut self) -> Result<()> {
        self.close_data()?;
        let offset = self.written;
        // The first data chunk of an RF64 file takes its size from ds64.
        let size = if self.kind == RootKind::Rf64 && self.data_chunks.is_empty() {
            SENTINEL_SIZE
        } else {
            0
        };
        self.put(&ChunkHeader { id: ChunkId::DATA, size: size }.to_bytes())?;
        self.open_data = Some(DataChunk { offset: offset, len: 0 });
        Ok(())
    }

    /// Appends bytes to the current `data` chunk, starting one if needed.
    pub fn write_data(&mut self, bytes: &[u8]) -> Result<()> {
        if self.open_data.is_none() {
            self.begin_data()?;
        }
        self.put(bytes)?;
        if let Some(ref mut data) = self.open_data {
            data.len += bytes.len() as u64;
        }
        Ok(())
    }

    fn close_data(&mut self) -> Result<()> {
        if let Some(data) = self.open_data.take() {
            if data.len % 2 == 1 {
                self.put(&[0])?;
            }
            self.data_chunks.push(data);
        }
        Ok(())
    }

    /// Performs finalization. After calling this, the writer should be destructed.
    fn finalize_internal(&mut self) -> Result<()> {
        self.finalized = true;
        self.close_data()?;

        // Flush remaining bytes via the BufWriter.
        self.writer.flush()?;

        let riff_size = self.written - HEADER_LEN;
        let end = self.written;
        let kind = self.kind;
        let sample_count = self.sample_count;
        let data_chunks = &self.data_chunks;

        // Extract the underlying writer and rewind it, to update the size
        // fields of which we now know the value.
        let writer = self.writer.get_mut();

        // Every size is written before any error is reported, so that no data
        // is lost, even though the file is then ill-formed.
        let mut result = Ok(());
        let mut patch = |writer: &mut W, offset: u64, len: u64| -> Result<()> {
            let size = match size_field(len) {
                Some(size) => size,
                None => {
                    if result.is_ok() {
                        result = Err(Error::ChunkTooLarge { offset: offset, len: len });
                    }
                    SENTINEL_SIZE
                }
            };
            writer.seek(io::SeekFrom::Start(offset + 4))?;
            writer.write_le_u32(size)?;
            Ok(())
        };

        let sized_data = match kind {
            RootKind::Riff => {
                patch(&mut *writer, 0, riff_size)?;
                &data_chunks[..]
            }
            RootKind::Rf64 => {
                let data_size = data_chunks.first().map_or(0, |data| data.len);
                // riffSize, dataSize and sampleCount start right after the
                // ds64 chunk header.
                writer.seek(io::SeekFrom::Start(ROOT_HEADER_LEN + HEADER_LEN))?;
                writer.write_le_i64(size64(riff_size, 0)?)?;
                writer.write_le_i64(size64(data_size, 0)?)?;
                writer.write_le_i64(sample_count)?;
                if data_chunks.is_empty() { &data_chunks[..] } else { &data_chunks[1..] }
            }
        };
        for data in sized_data {
            patch(&mut *writer, data.offset, data.len)?;
        }
        writer.seek(io::SeekFrom::Start(end))?;

        debug!(kind = ?kind, len = end, data_chunks = data_chunks.len(), "finalized wave file");
        result
    }

    /// Writes the size fields and flushes the underlying writer.
    ///
    /// Note that the size fields are written automatically when the writer is
    /// dropped, but errors in destructors are ignored. Use `finalize` to check
    /// for errors.
    pub fn finalize(mut self) -> Result<()> {
        self.finalize_internal()
    }
}

impl<W> Drop for ChunkWriter<W> where W: io::Write + io::Seek {
    fn drop(&mut self) {
        // `finalize_internal` must be called only once. If that is done via
        // `finalize`, then this method is a no-op. If the user did not
        // finalize explicitly, then we should do it now. This can fail, but
        // drop should not panic, so a failure is ignored silently here.
        if !self.finalized {
            let _r = self.finalize_internal();
        }
    }
}

#[cfg(test)]
use super::format::{FormatBase, FormatDescriptor};

#[cfg(test)]
fn pcm_format() -> FormatDescriptor {
    FormatDescriptor::Base(FormatBase {
        format_tag: 1,
        channel_count: 1,
        sample_rate: 8000,
        bytes_per_second: 16000,
        block_alignment: 2,
        bits_per_sample: 16,
    })
}

#[test]
fn encode_riff_derives_sizes() {
    let mut file = WaveFile::new(RootKind::Riff);
    file.push(pcm_format());
    file.push(Chunk::decode(ChunkId::DATA, vec![1, 2, 3], 0).unwrap());
    let bytes = encode(&file).unwrap();

    // 12 root, 8 + 16 fmt, 8 + 3 + 1 data.
    assert_eq!(bytes.len(), 48);
    assert_eq!(&bytes[0..8], b"RIFF\x28\x00\x00\x00");
    assert_eq!(&bytes[36..44], b"data\x03\x00\x00\x00");
    assert_eq!(bytes[47], 0);
}

#[test]
fn encode_rf64_requires_leading_ds64() {
    let mut file = WaveFile::new(RootKind::Rf64);
    file.push(pcm_format());
    match encode(&file) {
        Err(Error::MissingSize64Table { offset }) => assert_eq!(offset, 12),
        other => panic!("expected MissingSize64Table, got {:?}", other),
    }
}

#[test]
fn encode_rf64_fills_in_ds64() {
    let mut file = WaveFile::new(RootKind::Rf64);
    file.push(Size64Table::default());
    file.push(pcm_format());
    file.push(Chunk::decode(ChunkId::DATA, vec![0; 10], 0).unwrap());
    let bytes = encode(&file).unwrap();

    assert_eq!(&bytes[0..12], b"RF64\xff\xff\xff\xffWAVE");
    let riff_size = i64::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23],
                                        bytes[24], bytes[25], bytes[26], bytes[27]]);
    assert_eq!(riff_size as usize, bytes.len() - 8);
    assert_eq!(bytes[28], 10);
    assert_eq!(&bytes[72..80], b"data\xff\xff\xff\xff");
}

#[test]
fn chunk_writer_patches_riff_sizes() {
    let mut buffer = io::Cursor::new(Vec::new());
    {
        let mut writer = ChunkWriter::new(&mut buffer, RootKind::Riff).unwrap();
        writer.write_chunk(&pcm_format().into()).unwrap();
        writer.write_data(&[1, 2]).unwrap();
        writer.write_data(&[3]).unwrap();
        writer.write_raw(ChunkId(*b"LIST"), b"INFO").unwrap();
        writer.finalize().unwrap();
    }
    let bytes = buffer.into_inner();
    assert_eq!(bytes.len(), 12 + 24 + 12 + 12);
    assert_eq!(&bytes[4..8], &(bytes.len() as u32 - 8).to_le_bytes());
    assert_eq!(&bytes[36..44], b"data\x03\x00\x00\x00");
    assert_eq!(&bytes[48..52], b"LIST");
}

#[test]
fn chunk_writer_finalizes_on_drop() {
    let mut buffer = io::Cursor::new(Vec::new());
    {
        let mut writer = ChunkWriter::new(&mut buffer, RootKind::Rf64).unwrap();
        writer.set_sample_count(2);
        writer.write_data(&[0; 4]).unwrap();
    }
    let bytes = buffer.into_inner();
    assert_eq!(bytes.len(), 12 + 36 + 12);
    assert_eq!(&bytes[0..8], b"RF64\xff\xff\xff\xff");
    assert_eq!(bytes[20], 52);
    assert_eq!(bytes[28], 4);
    assert_eq!(bytes[36], 2);
    assert_eq!(&bytes[48..56], b"data\xff\xff\xff\xff");
}

#[test]
fn chunk_writer_keeps_a_single_ds64() {
    let mut buffer = io::Cursor::new(Vec::new());
    {
        let table = Size64Table::default();
        let mut writer = ChunkWriter::new(&mut buffer, RootKind::Rf64).unwrap();
        writer.write_raw(ChunkId::DS64, &table.encode().unwrap()).unwrap();
        writer.write_chunk(&table.into()).unwrap();
        writer.write_data(&[0; 4]).unwrap();
        writer.finalize().unwrap();
    }
    let bytes = buffer.into_inner();
    assert_eq!(bytes.len(), 12 + 36 + 12);
    let file = WaveFile::read(&bytes).unwrap();
    assert_eq!(file.chunks.iter().filter(|chunk| chunk.id == ChunkId::DS64).count(), 1);
    assert_eq!(file.data(), Some(&[0u8; 4][..]));
}

#[test]
fn chunk_writer_rejects_payloads_it_could_not_read_back() {
    let mut buffer = io::Cursor::new(Vec::new());
    let mut writer = ChunkWriter::new(&mut buffer, RootKind::Riff).unwrap();
    match writer.write_raw(ChunkId::BEXT, &[0; 10]) {
        Err(Error::TooShort { offset, size }) => {
            assert_eq!(offset, 20);
            assert_eq!(size, 10);
        }
        other => panic!("expected TooShort, got {:?}", other),
    }
    let chunk = Chunk { id: ChunkId::DATA, body: ChunkBody::Unknown(vec![1, 2]) };
    match writer.write_chunk(&chunk) {
        Err(Error::MismatchedBody { offset, .. }) => assert_eq!(offset, 12),
        other => panic!("expected MismatchedBody, got {:?}", other),
    }
    writer.finalize().unwrap();
}
