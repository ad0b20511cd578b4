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

use super::chunk::{ChunkId, SENTINEL_SIZE};
use super::{Error, Result};

/// The length of the root header: tag, size and the `WAVE` form type.
pub const ROOT_HEADER_LEN: u64 = 12;

/// Which of the two root tags a file starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RootKind {
    /// A classic RIFF file, limited to 4 GiB.
    Riff,
    /// An RF64 file, whose sizes live in the `ds64` chunk.
    Rf64,
}

impl RootKind {
    /// Returns the tag the file starts with.
    pub fn id(self) -> ChunkId {
        match self {
            RootKind::Riff => ChunkId::RIFF,
            RootKind::Rf64 => ChunkId::RF64,
        }
    }
}

/// The outermost header of a wav file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootContainer {
    pub kind: RootKind,
    /// The size field of the root chunk.
    ///
    /// For RIFF this is the length of the data that follows the 8-byte header,
    /// including the 4-byte WAVE tag, so the file is 8 bytes longer. For RF64
    /// it is `0xffffffff`, and the real size is in the `ds64` chunk.
    ///
    /// A RIFF file with `0xffffffff` here is in some cases a stream of unknown
    /// length rather than a file with a specific duration. This meaning is
    /// non-standard, but nonetheless occurs in the wild.
    pub declared_size: u32,
}

impl RootContainer {
    /// Parse the root header.
    ///
    /// Aside from returning the declared size, this can be used to test the
    /// magic bytes to see if a file might be a wav file at all.
    pub fn from_bytes(bytes: [u8; 12]) -> Result<RootContainer> {
        let kind = match &bytes[..4] {
            b"RIFF" => RootKind::Riff,
            b"RF64" => RootKind::Rf64,
            _ => return Err(Error::NotAWaveFile { offset: 0, reason: "expected RIFF or RF64 tag" }),
        };
        if &bytes[8..] != b"WAVE" {
            return Err(Error::NotAWaveFile { offset: 8, reason: "expected WAVE tag" });
        }
        Ok(RootContainer {
            kind: kind,
            declared_size: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// Serialize the header for writing to a file.
    pub fn to_bytes(self) -> [u8; 12] {
        let mut result: [u8; 12] = *b"RIFF\0\0\0\0WAVE";
        result[..4].copy_from_slice(&self.kind.id().0);
        result[4..8].copy_from_slice(&self.declared_size.to_le_bytes());
        result
    }

    /// Construct an RF64 header, which always carries the sentinel size.
    pub fn rf64() -> RootContainer {
        RootContainer {
            kind: RootKind::Rf64,
            declared_size: SENTINEL_SIZE,
        }
    }

    /// Returns whether the size field defers to the `ds64` table or the end of the stream.
    pub fn is_sentinel(&self) -> bool {
        self.declared_size == SENTINEL_SIZE
    }
}

#[test]
fn root_header_round_trips() {
    let header = RootContainer::from_bytes(*b"RIFF\x24\x00\x00\x00WAVE").unwrap();
    assert_eq!(header.kind, RootKind::Riff);
    assert_eq!(header.declared_size, 36);
    assert_eq!(&header.to_bytes(), b"RIFF\x24\x00\x00\x00WAVE");

    let header = RootContainer::from_bytes(*b"RF64\xff\xff\xff\xffWAVE").unwrap();
    assert_eq!(header, RootContainer::rf64());
    assert!(header.is_sentinel());
}

#[test]
fn wrong_tags_are_not_wave_files() {
    match RootContainer::from_bytes(*b"RIFX\x24\x00\x00\x00WAVE") {
        Err(Error::NotAWaveFile { offset, .. }) => assert_eq!(offset, 0),
        other => panic!("expected NotAWaveFile, got {:?}", other),
    }
    match RootContainer::from_bytes(*b"RIFF\x24\x00\x00\x00AVI ") {
        Err(Error::NotAWaveFile { offset, .. }) => assert_eq!(offset, 8),
        other => panic!("expected NotAWaveFile, got {:?}", other),
    }
}
