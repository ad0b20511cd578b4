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

//! Wavechunk, a chunk-level reader and writer for WAVE files.
//!
//! Wavechunk walks the top-level chunk list of RIFF and RF64 WAVE files. It
//! decodes the chunks that describe the file (`fmt `, `ds64` and `bext`), and
//! keeps every other chunk as opaque bytes, so a file can be read, inspected,
//! and written back without losing anything. It does not decode samples.
//!
//! Sizes that do not fit in 32 bits are resolved through the `ds64` chunk of
//! RF64 files, including the `0xffffffff` sentinel in the root and `data`
//! headers.
//!
//! # Examples
//!
//! The following example walks a file chunk by chunk:
//!
//! ```
//! use wavechunk::{ByteCursor, ChunkBody, ChunkWalker};
//!
//! let bytes = b"RIFF\x24\x00\x00\x00WAVE\
//!               fmt \x10\x00\x00\x00\x01\x00\x02\x00\x44\xac\x00\x00\x10\xb1\x02\x00\x04\x00\x10\x00\
//!               data\x00\x00\x00\x00";
//! let walker = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap();
//! for record in walker {
//!     let record = record.unwrap();
//!     if let ChunkBody::Format(ref format) = record.chunk.body {
//!         assert_eq!(format.base().sample_rate, 44100);
//!     }
//! }
//! ```
//!
//! The following example reads a whole file, edits it, and writes it back:
//!
//! ```
//! use wavechunk::{ChunkId, Chunk, WaveFile};
//!
//! # let bytes = b"RIFF\x24\x00\x00\x00WAVE\
//! #               fmt \x10\x00\x00\x00\x01\x00\x02\x00\x44\xac\x00\x00\x10\xb1\x02\x00\x04\x00\x10\x00\
//! #               data\x00\x00\x00\x00";
//! let mut file = WaveFile::read(&bytes[..]).unwrap();
//! file.push(Chunk::raw(ChunkId(*b"LIST"), b"INFO".to_vec()).unwrap());
//! let edited = file.to_bytes().unwrap();
//! assert_eq!(WaveFile::read(&edited).unwrap(), file);
//! ```

use std::io;

use thiserror::Error;

pub mod bext;
pub mod chunk;
pub mod cursor;
pub mod ds64;
pub mod format;
mod read;
pub mod riff;
mod write;

pub use bext::BroadcastExtension;
pub use chunk::{padded_len, Chunk, ChunkBody, ChunkHeader, ChunkId, SENTINEL_SIZE};
pub use cursor::{ByteCursor, ByteSource, StreamSource};
pub use ds64::{Size64Entry, Size64Table};
pub use format::{FormatBase, FormatDescriptor, FormatExtensible, FormatTag, Guid, SpeakerMask};
pub use read::{ChunkRecord, ChunkWalker, WalkOptions, WalkState};
pub use riff::{RootContainer, RootKind};
pub use write::{ChunkWriter, WriteExt};

/// The error type for parsing and writing WAVE files.
///
/// Every variant other than `Io` carries the absolute byte offset in the file
/// at which the problem was detected.
#[derive(Debug, Error)]
pub enum Error {
    /// An IO error occured in the underlying reader or writer.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A read or write of `len` bytes at `offset` would cross the end of the buffer.
    #[error("{len} bytes at offset {offset} are out of bounds")]
    OutOfBounds { offset: u64, len: u64 },

    /// The root header is not `RIFF`/`RF64` followed by `WAVE`.
    #[error("not a WAVE file at offset {offset}: {reason}")]
    NotAWaveFile { offset: u64, reason: &'static str },

    /// A `ds64` chunk is too short for its fixed fields or its table.
    #[error("truncated ds64 table at offset {offset}")]
    TruncatedTable { offset: u64 },

    /// A `ds64` chunk contains a negative size.
    #[error("negative size in ds64 table at offset {offset}")]
    InvalidSize64 { offset: u64 },

    /// A `fmt ` chunk has a length other than 16, 18 or 40.
    #[error("unsupported fmt chunk size {size} at offset {offset}")]
    UnsupportedFormatChunkSize { offset: u64, size: u64 },

    /// A `fmt ` chunk has a length that is supported, but inconsistent fields.
    #[error("invalid fmt chunk at offset {offset}: {reason}")]
    InvalidFormat { offset: u64, reason: &'static str },

    /// A chunk is shorter than its fixed fields, such as a `bext` under 602 bytes.
    #[error("chunk of {size} bytes at offset {offset} is too short")]
    TooShort { offset: u64, size: u64 },

    /// Fewer than eight bytes remain after the last chunk.
    #[error("{remaining} trailing bytes at offset {offset}")]
    TrailingGarbage { offset: u64, remaining: u64 },

    /// An RF64 file lacks the `ds64` chunk needed to resolve its sizes.
    #[error("missing ds64 chunk at offset {offset}")]
    MissingSize64Table { offset: u64 },

    /// The root size does not match the bytes walked, with strict checking enabled.
    #[error("root size at offset {offset} is {declared}, but {actual} bytes follow")]
    RootSizeMismatch { offset: u64, declared: u64, actual: u64 },

    /// A chunk to be written has a body of another type than its id calls for.
    #[error("chunk {id} at offset {offset} has a body that does not match its id")]
    MismatchedBody { offset: u64, id: ChunkId },

    /// A chunk of `len` bytes does not fit in a 32-bit size field.
    #[error("chunk of {len} bytes at offset {offset} does not fit a 32-bit size")]
    ChunkTooLarge { offset: u64, len: u64 },
}

impl Error {
    /// Returns the offset at which the error was detected, if known.
    pub fn offset(&self) -> Option<u64> {
        match *self {
            Error::Io(..) => None,
            Error::OutOfBounds { offset, .. }
            | Error::NotAWaveFile { offset, .. }
            | Error::TruncatedTable { offset }
            | Error::InvalidSize64 { offset }
            | Error::UnsupportedFormatChunkSize { offset, .. }
            | Error::InvalidFormat { offset, .. }
            | Error::TooShort { offset, .. }
            | Error::TrailingGarbage { offset, .. }
            | Error::MissingSize64Table { offset }
            | Error::RootSizeMismatch { offset, .. }
            | Error::MismatchedBody { offset, .. }
            | Error::ChunkTooLarge { offset, .. } => Some(offset),
        }
    }
}

/// A type for results generated by Wavechunk where the error type is hard-wired.
pub type Result<T> = std::result::Result<T, Error>;

/// A whole WAVE file as a list of chunks.
///
/// Reading collects every chunk the walker yields, in file order. Writing
/// derives all size fields from the chunk payloads, so editing a chunk does
/// not require touching any size by hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveFile {
    /// The root tag.
    pub kind: RootKind,
    /// The top-level chunks, in file order.
    pub chunks: Vec<Chunk>,
}

impl WaveFile {
    /// Creates a file without chunks.
    pub fn new(kind: RootKind) -> WaveFile {
        WaveFile {
            kind: kind,
            chunks: Vec::new(),
        }
    }

    /// Reads a file from memory.
    pub fn read(bytes: &[u8]) -> Result<WaveFile> {
        WaveFile::read_with_options(bytes, WalkOptions::default())
    }

    /// Reads a file from memory, with explicit walk options.
    pub fn read_with_options(bytes: &[u8], options: WalkOptions) -> Result<WaveFile> {
        WaveFile::read_source(ByteCursor::new(bytes), options)
    }

    /// Reads a file of `len` bytes from a stream.
    pub fn read_from<R: io::Read>(reader: R, len: u64) -> Result<WaveFile> {
        WaveFile::read_source(StreamSource::new(reader, len), WalkOptions::default())
    }

    /// Reads a file from any byte source.
    pub fn read_source<S: ByteSource>(source: S, options: WalkOptions) -> Result<WaveFile> {
        let walker = ChunkWalker::with_options(source, options)?;
        let kind = walker.root().kind;
        let chunks = walker.map(|record| record.map(|r| r.chunk)).collect::<Result<Vec<_>>>()?;
        Ok(WaveFile {
            kind: kind,
            chunks: chunks,
        })
    }

    /// Appends a chunk.
    pub fn push<C: Into<Chunk>>(&mut self, chunk: C) {
        self.chunks.push(chunk.into());
    }

    /// Returns the first chunk with the given id.
    pub fn find(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.id == id)
    }

    /// Returns the decoded `fmt ` chunk.
    pub fn format(&self) -> Option<&FormatDescriptor> {
        self.chunks.iter().filter_map(|chunk| match chunk.body {
            ChunkBody::Format(ref format) => Some(format),
            _ => None,
        }).next()
    }

    /// Returns the decoded `ds64` chunk.
    pub fn size64(&self) -> Option<&Size64Table> {
        self.chunks.iter().filter_map(|chunk| match chunk.body {
            ChunkBody::Size64(ref table) => Some(table),
            _ => None,
        }).next()
    }

    /// Returns the decoded `bext` chunk.
    pub fn broadcast(&self) -> Option<&BroadcastExtension> {
        self.chunks.iter().filter_map(|chunk| match chunk.body {
            ChunkBody::Broadcast(ref bext) => Some(bext),
            _ => None,
        }).next()
    }

    /// Returns the payload of the first `data` chunk.
    pub fn data(&self) -> Option<&[u8]> {
        self.chunks.iter().filter_map(|chunk| match chunk.body {
            ChunkBody::Data(ref bytes) => Some(&bytes[..]),
            _ => None,
        }).next()
    }

    /// Returns the length of the encoded file in bytes.
    pub fn encoded_len(&self) -> u64 {
        let chunks: u64 = self.chunks.iter()
            .map(|chunk| chunk::HEADER_LEN + padded_len(chunk.body.encoded_len()))
            .sum();
        riff::ROOT_HEADER_LEN + chunks
    }

    /// Encodes the file, deriving every size field from the chunks.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        write::encode(self)
    }

    /// Encodes the file and writes it to `writer`.
    pub fn write_to<W: io::Write>(&self, mut writer: W) -> Result<()> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}

#[test]
fn error_reports_offset() {
    assert_eq!(Error::TrailingGarbage { offset: 44, remaining: 3 }.offset(), Some(44));
    let io_err = Error::from(io::Error::new(io::ErrorKind::Other, "disk on fire"));
    assert_eq!(io_err.offset(), None);
}

#[test]
fn encoded_len_matches_to_bytes() {
    let mut file = WaveFile::new(RootKind::Riff);
    file.push(Chunk::raw(ChunkId::JUNK, vec![0; 7]).unwrap());
    file.push(BroadcastExtension::default());
    let bytes = file.to_bytes().unwrap();
    assert_eq!(file.encoded_len(), bytes.len() as u64);
    assert_eq!(bytes.len(), 12 + 16 + 610);
}

#[test]
fn accessors_find_typed_chunks() {
    let mut file = WaveFile::new(RootKind::Riff);
    let mut bext = BroadcastExtension::default();
    bext.set_originator("Wavechunk");
    file.push(bext);
    file.push(Chunk::decode(ChunkId::DATA, vec![9, 8, 7, 6], 0).unwrap());

    let read = WaveFile::read(&file.to_bytes().unwrap()).unwrap();
    assert_eq!(read.broadcast().unwrap().originator_str(), "Wavechunk");
    assert_eq!(read.data(), Some(&[9u8, 8, 7, 6][..]));
    assert!(read.format().is_none());
    assert!(read.size64().is_none());
    assert!(read.find(ChunkId::DATA).is_some());
}
