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

use std::iter::FusedIterator;

use tracing::{debug, trace, warn};

use super::chunk::{Chunk, ChunkBody, ChunkHeader, ChunkId, HEADER_LEN, SENTINEL_SIZE};
use super::cursor::ByteSource;
use super::ds64::Size64Table;
use super::riff::{RootContainer, RootKind, ROOT_HEADER_LEN};
use super::{Error, Result};

/// Settings that control how strictly a file is walked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkOptions {
    /// Fail with `RootSizeMismatch` if the root size does not match the
    /// number of bytes walked.
    ///
    /// Off by default: many writers get the root size wrong, and the chunk
    /// list can be walked regardless.
    pub strict_root_size: bool,

    /// Accept a file whose last chunk has an odd length but no pad byte.
    ///
    /// On by default, because such files are common in the wild.
    pub allow_missing_final_pad: bool,
}

impl Default for WalkOptions {
    fn default() -> WalkOptions {
        WalkOptions {
            strict_root_size: false,
            allow_missing_final_pad: true,
        }
    }
}

impl WalkOptions {
    pub fn with_strict_root_size(mut self, strict: bool) -> WalkOptions {
        self.strict_root_size = strict;
        self
    }

    pub fn with_allow_missing_final_pad(mut self, allow: bool) -> WalkOptions {
        self.allow_missing_final_pad = allow;
        self
    }
}

/// A chunk as found by the walker, with its position in the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkRecord {
    /// The absolute offset of the chunk header.
    pub offset: u64,
    /// The 32-bit size field as stored, possibly the sentinel.
    pub size_field: u32,
    /// The payload size after resolving the sentinel, excluding padding.
    pub size: u64,
    pub chunk: Chunk,
}

/// Where the walker is in the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalkState {
    /// The root has been read; the next step reads a chunk header.
    DispatchChunk,
    /// All chunks have been read and the file was consistent.
    End,
    /// An error was returned; the walker will not yield anything else.
    Failed,
}

/// Walks the top-level chunk list of a WAVE file.
///
/// The root header is read on construction. After that the walker is an
/// iterator that reads one chunk per step, on demand: it reads no more than
/// strictly necessary, and stopping early has no side effects. The walk
/// cannot be restarted without a new source.
///
/// Known chunks are decoded (`fmt `, `ds64`, `bext`); all other chunks are
/// yielded with their payload as bytes. An error is yielded once, after which
/// the iterator ends.
pub struct ChunkWalker<S> {
    source: S,
    options: WalkOptions,

    /// The offset of the root header.
    start: u64,

    root: RootContainer,

    /// The table that resolves sentinel sizes, only ever set for RF64 files.
    size64: Option<Size64Table>,

    state: WalkState,
}

impl<S> ChunkWalker<S>
    where S: ByteSource
{
    /// Reads the root header and returns a walker positioned at the first chunk.
    pub fn new(source: S) -> Result<ChunkWalker<S>> {
        ChunkWalker::with_options(source, WalkOptions::default())
    }

    /// Like `new`, with explicit options.
    pub fn with_options(mut source: S, options: WalkOptions) -> Result<ChunkWalker<S>> {
        let start = source.position();
        if source.remaining() < ROOT_HEADER_LEN {
            return Err(Error::NotAWaveFile {
                offset: start,
                reason: "too short to hold a RIFF header",
            });
        }

        let mut bytes = [0u8; 12];
        source.read_into(&mut bytes)?;
        let root = match RootContainer::from_bytes(bytes) {
            Ok(root) => root,
            Err(Error::NotAWaveFile { offset, reason }) => {
                return Err(Error::NotAWaveFile { offset: start + offset, reason: reason })
            }
            Err(err) => return Err(err),
        };

        if root.kind == RootKind::Rf64 && !root.is_sentinel() {
            if options.strict_root_size {
                return Err(Error::NotAWaveFile {
                    offset: start + 4,
                    reason: "RF64 root size must be 0xffffffff",
                });
            }
            // The size is taken from ds64 regardless.
            warn!(declared_size = root.declared_size, "RF64 root without sentinel size");
        }
        debug!(kind = ?root.kind, declared_size = root.declared_size, "read root header");

        Ok(ChunkWalker {
            source: source,
            options: options,
            start: start,
            root: root,
            size64: None,
            state: WalkState::DispatchChunk,
        })
    }

    /// Returns the root header.
    pub fn root(&self) -> RootContainer {
        self.root
    }

    /// Returns the `ds64` table, once the walker has passed it.
    pub fn size64(&self) -> Option<&Size64Table> {
        self.size64.as_ref()
    }

    /// Returns the size of the root chunk, with the `ds64` override applied.
    ///
    /// For RF64 this is `None` until the `ds64` chunk has been read. For a
    /// RIFF stream of unknown length (size field `0xffffffff`) it is `None`.
    pub fn effective_root_size(&self) -> Option<u64> {
        match self.root.kind {
            RootKind::Riff if self.root.is_sentinel() => None,
            RootKind::Riff => Some(self.root.declared_size as u64),
            RootKind::Rf64 => self.size64.as_ref().map(|t| t.effective_riff_size() as u64),
        }
    }

    pub fn options(&self) -> &WalkOptions {
        &self.options
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Returns the number of bytes not yet walked.
    pub fn remaining(&self) -> u64 {
        self.source.remaining()
    }

    /// Destroys the walker and returns the underlying source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Determines the payload size of a chunk from its header.
    ///
    /// Must be called right after the header was read.
    fn resolve_size(&self, header: &ChunkHeader, offset: u64) -> Result<u64> {
        if !header.is_sentinel() {
            return Ok(header.size as u64);
        }

        match self.root.kind {
            RootKind::Rf64 => {
                let table = match self.size64 {
                    Some(ref table) => table,
                    None => return Err(Error::MissingSize64Table { offset: offset }),
                };
                let size = if header.id == ChunkId::DATA {
                    Some(table.effective_data_size())
                } else {
                    table.resolve(header.id)
                };
                match size {
                    Some(size) => {
                        debug!(id = %header.id, size, "resolved sentinel size through ds64");
                        Ok(size as u64)
                    }
                    None => {
                        debug!(id = %header.id, "no ds64 entry for sentinel size, taking it literally");
                        Ok(SENTINEL_SIZE as u64)
                    }
                }
            }
            RootKind::Riff if header.id == ChunkId::DATA => {
                // When ffmpeg encodes wave to stdout the riff and data chunk
                // lengths are 2^32 - 1 since the size can't be known ahead of
                // time. The data then runs until the end of the stream.
                let size = self.source.remaining();
                debug!(size, "data chunk of unknown length extends to the end");
                Ok(size)
            }
            RootKind::Riff => Ok(SENTINEL_SIZE as u64),
        }
    }

    /// Reads the next chunk, or returns `None` at the end of the source.
    fn next_chunk(&mut self) -> Result<Option<ChunkRecord>> {
        let offset = self.source.position();
        let remaining = self.source.remaining();
        if remaining == 0 {
            return Ok(None);
        }
        if remaining < HEADER_LEN {
            return Err(Error::TrailingGarbage {
                offset: offset,
                remaining: remaining,
            });
        }

        let mut bytes = [0u8; 8];
        self.source.read_into(&mut bytes)?;
        let header = ChunkHeader::from_bytes(bytes);
        trace!(id = %header.id, size = header.size, offset, "read chunk header");

        let size = self.resolve_size(&header, offset)?;
        let payload_offset = offset + HEADER_LEN;

        // The size is untrusted input, so check it against what is left before
        // allocating anything.
        if size > self.source.remaining() {
            return Err(Error::OutOfBounds {
                offset: payload_offset,
                len: size,
            });
        }
        let len = match usize::try_from(size) {
            Ok(len) => len,
            Err(..) => return Err(Error::OutOfBounds { offset: payload_offset, len: size }),
        };
        let mut payload = vec![0u8; len];
        self.source.read_into(&mut payload)?;

        if size % 2 == 1 {
            if self.source.remaining() > 0 {
                self.source.skip(1)?;
            } else if self.options.allow_missing_final_pad {
                warn!(id = %header.id, "last chunk is missing its pad byte");
            } else {
                return Err(Error::OutOfBounds {
                    offset: self.source.position(),
                    len: 1,
                });
            }
        }

        let chunk = Chunk::decode(header.id, payload, payload_offset)?;
        match chunk.body {
            ChunkBody::Size64(ref table) => self.install_size64(table, offset),
            ChunkBody::Unknown(..) => debug!(id = %header.id, offset, size, "preserving unknown chunk"),
            _ => {}
        }

        Ok(Some(ChunkRecord {
            offset: offset,
            size_field: header.size,
            size: size,
            chunk: chunk,
        }))
    }

    fn install_size64(&mut self, table: &Size64Table, offset: u64) {
        match self.root.kind {
            RootKind::Rf64 if self.size64.is_none() => {
                debug!(riff_size = table.riff_size, data_size = table.data_size,
                       entries = table.entries.len(), "installed ds64 table");
                self.size64 = Some(table.clone());
            }
            RootKind::Rf64 => warn!(offset, "ignoring additional ds64 chunk"),
            RootKind::Riff => warn!(offset, "ignoring ds64 chunk in a RIFF file"),
        }
    }

    /// Checks the file as a whole once the last chunk has been read.
    fn finish(&self) -> Result<()> {
        let end = self.source.position();
        if self.root.kind == RootKind::Rf64 && self.size64.is_none() {
            return Err(Error::MissingSize64Table { offset: end });
        }
        if self.options.strict_root_size {
            if let Some(declared) = self.effective_root_size() {
                let actual = end - self.start - HEADER_LEN;
                if declared != actual {
                    return Err(Error::RootSizeMismatch {
                        offset: self.start + 4,
                        declared: declared,
                        actual: actual,
                    });
                }
            }
        }
        trace!(end, "reached end of chunk list");
        Ok(())
    }
}

impl<S> Iterator for ChunkWalker<S>
    where S: ByteSource
{
    type Item = Result<ChunkRecord>;

    fn next(&mut self) -> Option<Result<ChunkRecord>> {
        if self.state != WalkState::DispatchChunk {
            return None;
        }
        let result = match self.next_chunk() {
            Ok(Some(record)) => return Some(Ok(record)),
            Ok(None) => self.finish(),
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => {
                self.state = WalkState::End;
                None
            }
            Err(err) => {
                self.state = WalkState::Failed;
                Some(Err(err))
            }
        }
    }
}

impl<S> FusedIterator for ChunkWalker<S> where S: ByteSource {}

#[cfg(test)]
use super::cursor::ByteCursor;

#[cfg(test)]
fn pcm_stereo_file() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF\x24\x00\x00\x00WAVE");
    bytes.extend_from_slice(b"fmt \x10\x00\x00\x00");
    bytes.extend_from_slice(&[0x01, 0x00, 0x02, 0x00, 0x44, 0xac, 0x00, 0x00,
                              0x10, 0xb1, 0x02, 0x00, 0x04, 0x00, 0x10, 0x00]);
    bytes.extend_from_slice(b"data\x00\x00\x00\x00");
    bytes
}

#[test]
fn walk_minimal_pcm_file() {
    let bytes = pcm_stereo_file();
    let options = WalkOptions::default().with_strict_root_size(true);
    let mut walker = ChunkWalker::with_options(ByteCursor::new(&bytes[..]), options).unwrap();
    assert_eq!(walker.root().kind, RootKind::Riff);
    assert_eq!(walker.effective_root_size(), Some(36));

    let fmt = walker.next().unwrap().unwrap();
    assert_eq!(fmt.offset, 12);
    assert_eq!(fmt.chunk.id, ChunkId::FMT);
    match fmt.chunk.body {
        ChunkBody::Format(ref format) => assert_eq!(format.base().sample_rate, 44100),
        ref other => panic!("expected fmt body, got {:?}", other),
    }

    let data = walker.next().unwrap().unwrap();
    assert_eq!(data.offset, 36);
    assert_eq!(data.chunk.body, ChunkBody::Data(Vec::new()));

    assert!(walker.next().is_none());
    assert_eq!(walker.state(), WalkState::End);
    assert_eq!(walker.remaining(), 0);
    // The walker is fused.
    assert!(walker.next().is_none());
}

#[test]
fn odd_payload_consumes_pad_byte() {
    let mut bytes = b"RIFF\x00\x00\x00\x00WAVE".to_vec();
    bytes.extend_from_slice(b"abcd\x05\x00\x00\x00hello\x00");
    bytes.extend_from_slice(b"efgh\x02\x00\x00\x00hi");
    let mut walker = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap();

    let first = walker.next().unwrap().unwrap();
    assert_eq!(first.size, 5);
    assert_eq!(first.chunk.body, ChunkBody::Unknown(b"hello".to_vec()));

    let second = walker.next().unwrap().unwrap();
    // 12 bytes of root, 8 of header, 5 of payload and 1 pad byte.
    assert_eq!(second.offset, 26);
    assert_eq!(second.chunk.id, ChunkId(*b"efgh"));
    assert!(walker.next().is_none());
}

#[test]
fn trailing_bytes_shorter_than_a_header_are_garbage() {
    let mut bytes = pcm_stereo_file();
    bytes.extend_from_slice(&[0, 0, 0]);
    let walker = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap();
    let results: Vec<_> = walker.collect();
    assert_eq!(results.len(), 3);
    match results[2] {
        Err(Error::TrailingGarbage { offset, remaining }) => {
            assert_eq!(offset, 44);
            assert_eq!(remaining, 3);
        }
        ref other => panic!("expected TrailingGarbage, got {:?}", other),
    }
}

#[test]
fn missing_final_pad_is_tolerated_unless_disabled() {
    let mut bytes = b"RIFF\x00\x00\x00\x00WAVE".to_vec();
    bytes.extend_from_slice(b"JUNK\x03\x00\x00\x00abc");

    let walker = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap();
    assert!(walker.collect::<Result<Vec<_>>>().is_ok());

    let options = WalkOptions::default().with_allow_missing_final_pad(false);
    let mut walker = ChunkWalker::with_options(ByteCursor::new(&bytes[..]), options).unwrap();
    assert!(walker.next().unwrap().is_err());
    assert_eq!(walker.state(), WalkState::Failed);
    assert!(walker.next().is_none());
}

#[test]
fn chunk_larger_than_the_file_is_out_of_bounds() {
    let mut bytes = b"RIFF\x00\x00\x00\x00WAVE".to_vec();
    bytes.extend_from_slice(b"data\x00\x10\x00\x00\x01\x02");
    let mut walker = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap();
    match walker.next() {
        Some(Err(Error::OutOfBounds { offset, len })) => {
            assert_eq!(offset, 20);
            assert_eq!(len, 0x1000);
        }
        other => panic!("expected OutOfBounds, got {:?}", other),
    }
}

#[test]
fn strict_root_size_catches_wrong_size() {
    let mut bytes = pcm_stereo_file();
    bytes[4] = 40;
    let options = WalkOptions::default().with_strict_root_size(true);
    let walker = ChunkWalker::with_options(ByteCursor::new(&bytes[..]), options).unwrap();
    match walker.collect::<Result<Vec<_>>>() {
        Err(Error::RootSizeMismatch { declared, actual, .. }) => {
            assert_eq!(declared, 40);
            assert_eq!(actual, 36);
        }
        other => panic!("expected RootSizeMismatch, got {:?}", other),
    }

    // Without the option the same file walks fine.
    let walker = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap();
    assert_eq!(walker.count(), 2);
}

#[test]
fn strict_root_size_requires_rf64_sentinel() {
    let mut bytes = pcm_stereo_file();
    bytes[0..4].copy_from_slice(b"RF64");
    let options = WalkOptions::default().with_strict_root_size(true);
    match ChunkWalker::with_options(ByteCursor::new(&bytes[..]), options) {
        Err(Error::NotAWaveFile { offset, .. }) => assert_eq!(offset, 4),
        Err(err) => panic!("expected NotAWaveFile, got {:?}", err),
        Ok(..) => panic!("expected NotAWaveFile, got a walker"),
    }

    // Without the option the root is accepted and the size comes from ds64.
    assert!(ChunkWalker::new(ByteCursor::new(&bytes[..])).is_ok());
}

#[test]
fn riff_stream_of_unknown_length_runs_to_the_end() {
    let mut bytes = b"RIFF\xff\xff\xff\xffWAVE".to_vec();
    bytes.extend_from_slice(b"data\xff\xff\xff\xff\x01\x02\x03\x04");
    let mut walker = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap();
    assert_eq!(walker.effective_root_size(), None);
    let data = walker.next().unwrap().unwrap();
    assert_eq!(data.size_field, SENTINEL_SIZE);
    assert_eq!(data.size, 4);
    assert!(walker.next().is_none());
}

#[test]
fn ds64_in_riff_file_is_not_consulted() {
    let mut bytes = b"RIFF\x00\x00\x00\x00WAVE".to_vec();
    bytes.extend_from_slice(b"ds64\x1c\x00\x00\x00");
    bytes.extend_from_slice(&[0u8; 28]);
    let mut walker = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap();
    let record = walker.next().unwrap().unwrap();
    assert_eq!(record.chunk.id, ChunkId::DS64);
    assert!(walker.size64().is_none());
}
