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

//! Property-based tests for reading and writing chunk lists.

extern crate proptest;
extern crate wavechunk;

use proptest::prelude::*;
use wavechunk::{ByteCursor, Chunk, ChunkId, ChunkWalker, Error, FormatBase, FormatDescriptor,
                RootKind, Size64Table, WaveFile};

/// Ids that are decoded into typed bodies, which an opaque chunk must avoid.
const TYPED: [ChunkId; 6] = [ChunkId::FMT, ChunkId::DS64, ChunkId::BEXT,
                             ChunkId::DATA, ChunkId::JUNK, ChunkId::FACT];

fn opaque_chunk() -> impl Strategy<Value = Chunk> {
    let id = prop::array::uniform4(b'a'..=b'z')
        .prop_map(ChunkId)
        .prop_filter("typed chunk id", |id| !TYPED.contains(id));
    (id, prop::collection::vec(any::<u8>(), 0..64))
        .prop_map(|(id, payload)| Chunk::raw(id, payload).unwrap())
}

fn byte_chunk() -> impl Strategy<Value = Chunk> {
    let id = prop_oneof![Just(ChunkId::DATA), Just(ChunkId::JUNK), Just(ChunkId::FACT)];
    (id, prop::collection::vec(any::<u8>(), 0..64))
        .prop_map(|(id, payload)| Chunk::decode(id, payload, 0).unwrap())
}

fn format_chunk() -> impl Strategy<Value = Chunk> {
    (any::<u16>(), 1u16..8, any::<u32>(), any::<bool>()).prop_map(|(tag, channels, rate, plus)| {
        let base = FormatBase {
            format_tag: tag,
            channel_count: channels,
            sample_rate: rate,
            bytes_per_second: rate.wrapping_mul(2),
            block_alignment: channels * 2,
            bits_per_sample: 16,
        };
        let format = if plus { FormatDescriptor::Plus(base) } else { FormatDescriptor::Base(base) };
        Chunk::from(format)
    })
}

fn any_chunk() -> impl Strategy<Value = Chunk> {
    prop_oneof![opaque_chunk(), byte_chunk(), format_chunk()]
}

proptest! {
    #[test]
    fn riff_files_survive_a_round_trip(chunks in prop::collection::vec(any_chunk(), 0..8)) {
        let mut file = WaveFile::new(RootKind::Riff);
        file.chunks = chunks;
        let bytes = file.to_bytes().unwrap();
        prop_assert_eq!(bytes.len() % 2, 0);
        prop_assert_eq!(bytes.len() as u64, file.encoded_len());
        prop_assert_eq!(WaveFile::read(&bytes).unwrap(), file);
    }

    #[test]
    fn rf64_files_survive_a_round_trip(chunks in prop::collection::vec(any_chunk(), 0..8)) {
        let mut file = WaveFile::new(RootKind::Rf64);
        file.push(Size64Table::default());
        file.chunks.extend(chunks);
        let bytes = file.to_bytes().unwrap();
        let reread = WaveFile::read(&bytes).unwrap();
        prop_assert_eq!(&reread.chunks[1..], &file.chunks[1..]);
        prop_assert_eq!(reread.size64().unwrap().riff_size as usize, bytes.len() - 8);
    }

    #[test]
    fn fmt_payload_length_decides_the_variant(payload in prop::collection::vec(any::<u8>(), 0..64)) {
        match FormatDescriptor::decode(&payload) {
            Ok(format) => prop_assert_eq!(format.encoded_len(), payload.len()),
            Err(Error::UnsupportedFormatChunkSize { size, .. }) => {
                prop_assert!(![16, 18, 40].contains(&payload.len()));
                prop_assert_eq!(size, payload.len() as u64);
            }
            Err(Error::InvalidFormat { .. }) => prop_assert!([18, 40].contains(&payload.len())),
            Err(err) => prop_assert!(false, "unexpected error {:?}", err),
        }
    }

    #[test]
    fn walking_arbitrary_bytes_never_panics(tail in prop::collection::vec(any::<u8>(), 0..256),
                                            rf64 in any::<bool>()) {
        let mut bytes = if rf64 { b"RF64\xff\xff\xff\xffWAVE".to_vec() } else { b"RIFF\0\0\0\0WAVE".to_vec() };
        bytes.extend_from_slice(&tail);
        let walker = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap();
        // Every step consumes at least a header, so the walk is finite.
        prop_assert!(walker.count() <= bytes.len() / 8 + 1);
    }
}
