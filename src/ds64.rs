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

//! The `ds64` chunk of RF64 files.
//!
//! An RF64 file is a RIFF file with the root tag `RF64` instead of `RIFF`. Any
//! 32-bit size field that cannot hold the real size is set to `0xffffffff`,
//! and the real size is stored in the `ds64` chunk, which must come first:
//!
//! ```text
//! typedef struct {
//!     int64  riffSize;      // size of the RF64 block
//!     int64  dataSize;      // size of the data chunk
//!     int64  sampleCount;   // sample count of the fact chunk
//!     int32  tableLength;   // number of entries in table
//!     struct {
//!         char   id[4];
//!         int64  size;
//!     } table[];
//! } DataSize64Chunk;
//! ```

use super::chunk::ChunkId;
use super::cursor::ByteCursor;
use super::{Error, Result};

/// The length of the fixed part of the `ds64` payload.
pub const FIXED_LEN: u64 = 28;

/// The length of a table entry: a 4-byte id and a 64-bit size.
pub const ENTRY_LEN: u64 = 12;

/// A 64-bit size for a chunk other than the root and `data`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size64Entry {
    pub id: ChunkId,
    pub size: i64,
}

/// The contents of a `ds64` chunk.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Size64Table {
    /// The size of the root chunk, replacing the sentinel in the `RF64` header.
    pub riff_size: i64,
    /// The size of the `data` chunk payload.
    pub data_size: i64,
    /// The number of samples per channel, replacing the one in `fact`.
    pub sample_count: i64,
    /// Sizes for other chunks, in table order.
    pub entries: Vec<Size64Entry>,
}

impl Size64Table {
    /// Decodes the table from a `ds64` payload of `chunk_size` bytes.
    ///
    /// The cursor must be positioned at the start of the payload.
    pub fn decode<B: AsRef<[u8]>>(cursor: &mut ByteCursor<B>, chunk_size: u64) -> Result<Size64Table> {
        let start = cursor.offset();
        if chunk_size < FIXED_LEN {
            return Err(Error::TruncatedTable { offset: start });
        }

        let riff_size = cursor.read_le_i64()?;
        let data_size = cursor.read_le_i64()?;
        let sample_count = cursor.read_le_i64()?;
        let table_length = cursor.read_le_i32()?;

        // A negative count cannot be satisfied by any chunk size.
        let table_length = match u64::try_from(table_length) {
            Ok(n) => n,
            Err(..) => return Err(Error::TruncatedTable { offset: start }),
        };
        if chunk_size < FIXED_LEN + ENTRY_LEN * table_length {
            return Err(Error::TruncatedTable { offset: start });
        }

        if riff_size < 0 || data_size < 0 || sample_count < 0 {
            return Err(Error::InvalidSize64 { offset: start });
        }

        // The count was checked against the chunk size, so this allocation is
        // bounded by the payload that is already in memory.
        let mut entries = Vec::with_capacity(table_length as usize);
        for _ in 0..table_length {
            let entry_offset = cursor.offset();
            let id = ChunkId(cursor.read_4_bytes()?);
            let size = cursor.read_le_i64()?;
            if size < 0 {
                return Err(Error::InvalidSize64 { offset: entry_offset });
            }
            entries.push(Size64Entry { id: id, size: size });
        }

        // Writers may reserve room for more entries than they use; anything
        // after the table is not ours to interpret.
        Ok(Size64Table {
            riff_size: riff_size,
            data_size: data_size,
            sample_count: sample_count,
            entries: entries,
        })
    }

    /// Returns the size of the first table entry for `id`.
    ///
    /// This applies to chunks other than the root and `data`, whose sizes are
    /// stored in dedicated fields.
    pub fn resolve(&self, id: ChunkId) -> Option<i64> {
        self.entries.iter().find(|entry| entry.id == id).map(|entry| entry.size)
    }

    /// Returns the size of the root chunk.
    pub fn effective_riff_size(&self) -> i64 {
        self.riff_size
    }

    /// Returns the size of the `data` chunk payload.
    pub fn effective_data_size(&self) -> i64 {
        self.data_size
    }

    /// Returns the payload length of the encoded table.
    pub fn encoded_len(&self) -> usize {
        (FIXED_LEN + ENTRY_LEN * self.entries.len() as u64) as usize
    }

    /// Writes the table to the cursor.
    pub fn encode_into<B: AsRef<[u8]> + AsMut<[u8]>>(&self, cursor: &mut ByteCursor<B>) -> Result<()> {
        let table_length = match i32::try_from(self.entries.len()) {
            Ok(n) => n,
            Err(..) => return Err(Error::TruncatedTable { offset: cursor.offset() }),
        };
        cursor.write_le_i64(self.riff_size)?;
        cursor.write_le_i64(self.data_size)?;
        cursor.write_le_i64(self.sample_count)?;
        cursor.write_le_i32(table_length)?;
        for entry in &self.entries {
            cursor.write_bytes(&entry.id.0)?;
            cursor.write_le_i64(entry.size)?;
        }
        Ok(())
    }

    /// Encodes the table as a `ds64` payload.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut cursor = ByteCursor::new(vec![0u8; self.encoded_len()]);
        self.encode_into(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
fn table_bytes(riff: i64, data: i64, samples: i64, entries: &[(&[u8; 4], i64)]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&riff.to_le_bytes());
    bytes.extend_from_slice(&data.to_le_bytes());
    bytes.extend_from_slice(&samples.to_le_bytes());
    bytes.extend_from_slice(&(entries.len() as i32).to_le_bytes());
    for &(id, size) in entries {
        bytes.extend_from_slice(id);
        bytes.extend_from_slice(&size.to_le_bytes());
    }
    bytes
}

#[test]
fn decode_reads_fixed_fields_and_table() {
    let bytes = table_bytes(123_456, 5_000_000_000, 1_250_000_000,
                            &[(b"LIST", 7), (b"LIST", 9)]);
    let mut cursor = ByteCursor::new(&bytes[..]);
    let table = Size64Table::decode(&mut cursor, bytes.len() as u64).unwrap();

    assert_eq!(table.effective_riff_size(), 123_456);
    assert_eq!(table.effective_data_size(), 5_000_000_000);
    assert_eq!(table.sample_count, 1_250_000_000);
    // The first matching entry wins.
    assert_eq!(table.resolve(ChunkId(*b"LIST")), Some(7));
    assert_eq!(table.resolve(ChunkId::JUNK), None);
}

#[test]
fn decode_rejects_short_chunks() {
    let bytes = table_bytes(36, 0, 0, &[]);
    let mut cursor = ByteCursor::with_base(&bytes[..], 20);
    match Size64Table::decode(&mut cursor, 27) {
        Err(Error::TruncatedTable { offset }) => assert_eq!(offset, 20),
        other => panic!("expected TruncatedTable, got {:?}", other),
    }
}

#[test]
fn decode_rejects_tables_longer_than_the_chunk() {
    let mut bytes = table_bytes(36, 0, 0, &[(b"LIST", 7)]);
    // Claim two entries while only one is present.
    bytes[24] = 2;
    let mut cursor = ByteCursor::new(&bytes[..]);
    match Size64Table::decode(&mut cursor, bytes.len() as u64) {
        Err(Error::TruncatedTable { .. }) => {}
        other => panic!("expected TruncatedTable, got {:?}", other),
    }
}

#[test]
fn decode_rejects_negative_table_length() {
    let mut bytes = table_bytes(36, 0, 0, &[]);
    bytes[24..28].copy_from_slice(&(-1i32).to_le_bytes());
    let mut cursor = ByteCursor::new(&bytes[..]);
    assert!(Size64Table::decode(&mut cursor, bytes.len() as u64).is_err());
}

#[test]
fn decode_rejects_negative_sizes() {
    let bytes = table_bytes(-1, 0, 0, &[]);
    let mut cursor = ByteCursor::new(&bytes[..]);
    match Size64Table::decode(&mut cursor, bytes.len() as u64) {
        Err(Error::InvalidSize64 { .. }) => {}
        other => panic!("expected InvalidSize64, got {:?}", other),
    }
}

#[test]
fn decode_ignores_reserved_space_after_the_table() {
    let mut bytes = table_bytes(100, 50, 25, &[]);
    bytes.extend_from_slice(&[0u8; 12]);
    let mut cursor = ByteCursor::new(&bytes[..]);
    let table = Size64Table::decode(&mut cursor, bytes.len() as u64).unwrap();
    assert!(table.entries.is_empty());
    assert_eq!(table.effective_data_size(), 50);
}

#[test]
fn encode_matches_the_decoded_layout() {
    let bytes = table_bytes(1, 2, 3, &[(b"axml", 4)]);
    let mut cursor = ByteCursor::new(&bytes[..]);
    let table = Size64Table::decode(&mut cursor, bytes.len() as u64).unwrap();
    assert_eq!(table.encoded_len(), 40);
    assert_eq!(table.encode().unwrap(), bytes);
}
