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

use std::fmt;

use super::bext::BroadcastExtension;
use super::cursor::ByteCursor;
use super::ds64::Size64Table;
use super::format::FormatDescriptor;
use super::{Error, Result};

/// The size field value that defers the real size to the `ds64` table.
pub const SENTINEL_SIZE: u32 = 0xffff_ffff;

/// The length of a chunk header: a 4-byte id and a 4-byte size.
pub const HEADER_LEN: u64 = 8;

/// A four-character chunk identifier.
///
/// Identifiers are compared byte for byte, in file order. They are never
/// byte-swapped.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    pub const RIFF: ChunkId = ChunkId(*b"RIFF");
    pub const RF64: ChunkId = ChunkId(*b"RF64");
    pub const WAVE: ChunkId = ChunkId(*b"WAVE");
    pub const FMT: ChunkId = ChunkId(*b"fmt ");
    pub const DATA: ChunkId = ChunkId(*b"data");
    pub const DS64: ChunkId = ChunkId(*b"ds64");
    pub const BEXT: ChunkId = ChunkId(*b"bext");
    pub const JUNK: ChunkId = ChunkId(*b"JUNK");
    pub const FACT: ChunkId = ChunkId(*b"fact");

    /// Returns the identifier as it appears in the file.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<[u8; 4]> for ChunkId {
    fn from(bytes: [u8; 4]) -> ChunkId {
        ChunkId(bytes)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ChunkId(\"{}\")", self)
    }
}

/// Returns the number of bytes a payload of `size` bytes occupies in the file.
///
/// Payloads are padded to an even length; the pad byte is not counted in the
/// size field.
#[inline(always)]
pub fn padded_len(size: u64) -> u64 {
    size + (size % 2)
}

/// The 8-byte header that precedes every chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: ChunkId,
    /// The raw 32-bit size field, which may be [`SENTINEL_SIZE`].
    pub size: u32,
}

impl ChunkHeader {
    /// Reads a header from the cursor.
    pub fn read<B: AsRef<[u8]>>(cursor: &mut ByteCursor<B>) -> Result<ChunkHeader> {
        let id = ChunkId(cursor.read_4_bytes()?);
        let size = cursor.read_le_u32()?;
        Ok(ChunkHeader { id: id, size: size })
    }

    /// Parses a header from its in-file representation.
    #[inline(always)]
    pub fn from_bytes(bytes: [u8; 8]) -> ChunkHeader {
        ChunkHeader {
            id: ChunkId([bytes[0], bytes[1], bytes[2], bytes[3]]),
            size: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    /// Serialize the header for writing to a file.
    #[inline(always)]
    pub fn to_bytes(self) -> [u8; 8] {
        let mut result = [0u8; 8];
        result[..4].copy_from_slice(&self.id.0);
        result[4..].copy_from_slice(&self.size.to_le_bytes());
        result
    }

    /// Writes the header to the cursor.
    pub fn write<B: AsRef<[u8]> + AsMut<[u8]>>(self, cursor: &mut ByteCursor<B>) -> Result<()> {
        cursor.write_bytes(&self.to_bytes())
    }

    /// Returns whether the size field defers to the `ds64` table.
    pub fn is_sentinel(&self) -> bool {
        self.size == SENTINEL_SIZE
    }
}

/// Returns the 32-bit size field for a payload of `len` bytes, if it fits.
///
/// A length equal to the sentinel does not fit either, because it would be
/// mistaken for one.
pub fn size_field(len: u64) -> Option<u32> {
    u32::try_from(len).ok().filter(|&size| size != SENTINEL_SIZE)
}

/// Writes a complete chunk: header, payload, and a zero pad byte for odd lengths.
///
/// The size field is derived from the payload length.
pub fn write_chunk<B>(cursor: &mut ByteCursor<B>, id: ChunkId, payload: &[u8]) -> Result<()>
    where B: AsRef<[u8]> + AsMut<[u8]>
{
    let size = match size_field(payload.len() as u64) {
        Some(size) => size,
        None => {
            return Err(Error::ChunkTooLarge {
                offset: cursor.offset(),
                len: payload.len() as u64,
            })
        }
    };
    ChunkHeader { id: id, size: size }.write(cursor)?;
    cursor.write_bytes(payload)?;
    cursor.write_pad()
}

/// Returns whether chunks with this id are decoded into a body other than `Unknown`.
fn is_typed(id: ChunkId) -> bool {
    match id {
        ChunkId::FMT | ChunkId::DS64 | ChunkId::BEXT
        | ChunkId::DATA | ChunkId::JUNK | ChunkId::FACT => true,
        _ => false,
    }
}

/// The contents of a chunk, decoded according to its id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkBody {
    /// A `fmt ` chunk.
    Format(FormatDescriptor),
    /// A `ds64` chunk.
    Size64(Size64Table),
    /// A `bext` chunk.
    Broadcast(BroadcastExtension),
    /// The raw sample bytes of a `data` chunk.
    Data(Vec<u8>),
    /// Filler. The content is meaningless but preserved.
    Junk(Vec<u8>),
    /// A `fact` chunk, passed through as is.
    Fact(Vec<u8>),
    /// Any chunk with an id not listed above, preserved as opaque bytes.
    Unknown(Vec<u8>),
}

impl ChunkBody {
    /// Returns the sample count stored in a `fact` chunk.
    ///
    /// All (compressed) non-PCM formats must have a fact chunk, and its first
    /// field is the number of samples per channel. Returns `None` for other
    /// chunks or if the fact chunk is shorter than four bytes.
    pub fn fact_sample_count(&self) -> Option<u32> {
        match *self {
            ChunkBody::Fact(ref bytes) if bytes.len() >= 4 => {
                Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            _ => None,
        }
    }

    /// Returns the payload length in bytes, as it would be written.
    pub fn encoded_len(&self) -> u64 {
        match *self {
            ChunkBody::Format(ref format) => format.encoded_len() as u64,
            ChunkBody::Size64(ref table) => table.encoded_len() as u64,
            ChunkBody::Broadcast(ref bext) => bext.encoded_len() as u64,
            ChunkBody::Data(ref bytes)
            | ChunkBody::Junk(ref bytes)
            | ChunkBody::Fact(ref bytes)
            | ChunkBody::Unknown(ref bytes) => bytes.len() as u64,
        }
    }
}

/// A chunk from the top-level chunk list of a WAVE file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub id: ChunkId,
    pub body: ChunkBody,
}

impl Chunk {
    /// Builds a chunk from its id and undecoded payload.
    ///
    /// `offset` is the absolute offset of the payload in the file; it is only
    /// used to report errors. Payloads of the known typed chunks are decoded,
    /// all others are kept as bytes.
    pub fn decode(id: ChunkId, payload: Vec<u8>, offset: u64) -> Result<Chunk> {
        let body = match id {
            ChunkId::FMT => ChunkBody::Format(FormatDescriptor::decode_at(&payload, offset)?),
            ChunkId::DS64 => {
                let mut cursor = ByteCursor::with_base(&payload[..], offset);
                ChunkBody::Size64(Size64Table::decode(&mut cursor, payload.len() as u64)?)
            }
            ChunkId::BEXT => ChunkBody::Broadcast(BroadcastExtension::decode_at(&payload, offset)?),
            ChunkId::DATA => ChunkBody::Data(payload),
            ChunkId::JUNK => ChunkBody::Junk(payload),
            ChunkId::FACT => ChunkBody::Fact(payload),
            _ => ChunkBody::Unknown(payload),
        };
        Ok(Chunk { id: id, body: body })
    }

    /// Creates a chunk from its id and payload bytes.
    ///
    /// This is `decode` for chunks built in memory, so a `data` payload becomes
    /// a `Data` body and a `bext` payload must be a valid broadcast extension.
    /// Only ids without a typed body get an `Unknown` body.
    pub fn raw(id: ChunkId, payload: Vec<u8>) -> Result<Chunk> {
        Chunk::decode(id, payload, 0)
    }

    /// Checks that the body is the one `decode` produces for the id.
    ///
    /// `offset` is the offset of the chunk header in the file being written.
    pub fn check_body(&self, offset: u64) -> Result<()> {
        let matches = match self.body {
            ChunkBody::Format(..) => self.id == ChunkId::FMT,
            ChunkBody::Size64(..) => self.id == ChunkId::DS64,
            ChunkBody::Broadcast(..) => self.id == ChunkId::BEXT,
            ChunkBody::Data(..) => self.id == ChunkId::DATA,
            ChunkBody::Junk(..) => self.id == ChunkId::JUNK,
            ChunkBody::Fact(..) => self.id == ChunkId::FACT,
            ChunkBody::Unknown(..) => !is_typed(self.id),
        };
        if matches {
            Ok(())
        } else {
            Err(Error::MismatchedBody { offset: offset, id: self.id })
        }
    }

    /// Encodes the payload, without header or padding.
    pub fn encode_payload(&self) -> Result<Vec<u8>> {
        match self.body {
            ChunkBody::Format(ref format) => format.encode(),
            ChunkBody::Size64(ref table) => table.encode(),
            ChunkBody::Broadcast(ref bext) => bext.encode(),
            ChunkBody::Data(ref bytes)
            | ChunkBody::Junk(ref bytes)
            | ChunkBody::Fact(ref bytes)
            | ChunkBody::Unknown(ref bytes) => Ok(bytes.clone()),
        }
    }
}

impl From<FormatDescriptor> for Chunk {
    fn from(format: FormatDescriptor) -> Chunk {
        Chunk { id: ChunkId::FMT, body: ChunkBody::Format(format) }
    }
}

impl From<Size64Table> for Chunk {
    fn from(table: Size64Table) -> Chunk {
        Chunk { id: ChunkId::DS64, body: ChunkBody::Size64(table) }
    }
}

impl From<BroadcastExtension> for Chunk {
    fn from(bext: BroadcastExtension) -> Chunk {
        Chunk { id: ChunkId::BEXT, body: ChunkBody::Broadcast(bext) }
    }
}

#[test]
fn chunk_ids_compare_in_file_order() {
    let mut cursor = ByteCursor::new(&b"fmt \x10\x00\x00\x00"[..]);
    let header = ChunkHeader::read(&mut cursor).unwrap();
    assert_eq!(header.id, ChunkId::FMT);
    assert_eq!(header.size, 16);
    assert!(!header.is_sentinel());
}

#[test]
fn header_bytes_round_trip() {
    let header = ChunkHeader { id: ChunkId::DATA, size: SENTINEL_SIZE };
    let bytes = header.to_bytes();
    assert_eq!(&bytes, b"data\xff\xff\xff\xff");
    assert_eq!(ChunkHeader::from_bytes(bytes), header);
    assert!(header.is_sentinel());
}

#[test]
fn padded_len_rounds_up_to_even() {
    assert_eq!(padded_len(0), 0);
    assert_eq!(padded_len(5), 6);
    assert_eq!(padded_len(6), 6);
    assert_eq!(padded_len(0xffff_ffff), 0x1_0000_0000);
}

#[test]
fn write_chunk_pads_odd_payloads() {
    let mut buf = [0xaau8; 14];
    {
        let mut cursor = ByteCursor::new(&mut buf[..]);
        write_chunk(&mut cursor, ChunkId::JUNK, &[1, 2, 3, 4, 5]).unwrap();
        assert_eq!(cursor.position(), 14);
    }
    assert_eq!(&buf, b"JUNK\x05\x00\x00\x00\x01\x02\x03\x04\x05\x00");
}

#[test]
fn size_field_rejects_the_sentinel() {
    assert_eq!(size_field(16), Some(16));
    assert_eq!(size_field(0xffff_fffe), Some(0xffff_fffe));
    assert_eq!(size_field(0xffff_ffff), None);
    assert_eq!(size_field(0x1_0000_0000), None);
}

#[test]
fn chunk_ids_display_escaped() {
    assert_eq!(ChunkId::FMT.to_string(), "fmt ");
    assert_eq!(ChunkId([b'a', 0, b'b', 0xff]).to_string(), "a\\x00b\\xff");
}

#[test]
fn raw_chunks_get_the_body_of_their_id() {
    let data = Chunk::raw(ChunkId::DATA, vec![1, 2]).unwrap();
    assert_eq!(data.body, ChunkBody::Data(vec![1, 2]));
    assert!(data.check_body(12).is_ok());

    let list = Chunk::raw(ChunkId(*b"LIST"), b"INFO".to_vec()).unwrap();
    assert_eq!(list.body, ChunkBody::Unknown(b"INFO".to_vec()));

    match Chunk::raw(ChunkId::BEXT, vec![0; 10]) {
        Err(Error::TooShort { size, .. }) => assert_eq!(size, 10),
        other => panic!("expected TooShort, got {:?}", other),
    }
}

#[test]
fn check_body_rejects_a_body_of_another_id() {
    let chunk = Chunk { id: ChunkId::DATA, body: ChunkBody::Unknown(vec![1, 2]) };
    match chunk.check_body(36) {
        Err(Error::MismatchedBody { offset, id }) => {
            assert_eq!(offset, 36);
            assert_eq!(id, ChunkId::DATA);
        }
        other => panic!("expected MismatchedBody, got {:?}", other),
    }
    let chunk = Chunk { id: ChunkId(*b"LIST"), body: ChunkBody::Junk(vec![]) };
    assert!(chunk.check_body(0).is_err());
}

#[test]
fn fact_sample_count_reads_first_field() {
    let fact = ChunkBody::Fact(vec![0x10, 0x27, 0, 0, 9]);
    assert_eq!(fact.fact_sample_count(), Some(10_000));
    assert_eq!(ChunkBody::Fact(vec![1, 2]).fact_sample_count(), None);
    assert_eq!(ChunkBody::Junk(vec![0; 4]).fact_sample_count(), None);
}
