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

extern crate wavechunk;

use std::io;

use wavechunk::{ByteCursor, ChunkBody, ChunkId, ChunkWalker, Error, FormatDescriptor,
                FormatTag, RootKind, SpeakerMask, StreamSource, WalkState, WaveFile,
                SENTINEL_SIZE};

fn chunk(id: &[u8; 4], size: u32, payload: &[u8]) -> Vec<u8> {
    let mut bytes = id.to_vec();
    bytes.extend_from_slice(&size.to_le_bytes());
    bytes.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        bytes.push(0);
    }
    bytes
}

fn pcm_stereo_cd() -> Vec<u8> {
    let mut fmt = Vec::new();
    fmt.extend_from_slice(&1u16.to_le_bytes());
    fmt.extend_from_slice(&2u16.to_le_bytes());
    fmt.extend_from_slice(&44100u32.to_le_bytes());
    fmt.extend_from_slice(&176400u32.to_le_bytes());
    fmt.extend_from_slice(&4u16.to_le_bytes());
    fmt.extend_from_slice(&16u16.to_le_bytes());
    fmt
}

fn ds64(riff_size: i64, data_size: i64, entries: &[(&[u8; 4], i64)]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&riff_size.to_le_bytes());
    bytes.extend_from_slice(&data_size.to_le_bytes());
    bytes.extend_from_slice(&0i64.to_le_bytes());
    bytes.extend_from_slice(&(entries.len() as i32).to_le_bytes());
    for &(id, size) in entries {
        bytes.extend_from_slice(id);
        bytes.extend_from_slice(&size.to_le_bytes());
    }
    bytes
}

fn wave(root: &[u8; 4], size: u32, chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = root.to_vec();
    bytes.extend_from_slice(&size.to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    for c in chunks {
        bytes.extend_from_slice(c);
    }
    bytes
}

#[test]
fn read_minimal_pcm_file() {
    let bytes = wave(b"RIFF", 36, &[chunk(b"fmt ", 16, &pcm_stereo_cd()), chunk(b"data", 0, &[])]);
    assert_eq!(bytes.len(), 44);

    let mut walker = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap();
    let records: Vec<_> = walker.by_ref().map(|r| r.unwrap()).collect();
    assert_eq!(walker.state(), WalkState::End);
    assert_eq!(walker.remaining(), 0);
    assert_eq!(records.len(), 2);

    match records[0].chunk.body {
        ChunkBody::Format(FormatDescriptor::Base(ref base)) => {
            assert_eq!(base.format_tag, 1);
            assert_eq!(base.channel_count, 2);
            assert_eq!(base.sample_rate, 44100);
            assert_eq!(base.bytes_per_second, 176400);
            assert_eq!(base.block_alignment, 4);
            assert_eq!(base.bits_per_sample, 16);
        }
        ref other => panic!("expected a base fmt chunk, got {:?}", other),
    }
    assert_eq!(records[1].chunk.body, ChunkBody::Data(Vec::new()));
}

#[test]
fn wrong_root_tag_is_not_a_wave_file() {
    let mut bytes = wave(b"RIFF", 36, &[chunk(b"fmt ", 16, &pcm_stereo_cd()), chunk(b"data", 0, &[])]);
    bytes[3] = b'X';
    match ChunkWalker::new(ByteCursor::new(&bytes[..])) {
        Err(Error::NotAWaveFile { offset, .. }) => assert_eq!(offset, 0),
        Err(err) => panic!("expected NotAWaveFile, got {:?}", err),
        Ok(..) => panic!("expected NotAWaveFile"),
    }
}

#[test]
fn input_shorter_than_root_is_not_a_wave_file() {
    match WaveFile::read(b"RIFF") {
        Err(Error::NotAWaveFile { offset, .. }) => assert_eq!(offset, 0),
        other => panic!("expected NotAWaveFile, got {:?}", other),
    }
}

#[test]
fn rf64_root_size_comes_from_ds64() {
    let bytes = wave(b"RF64", SENTINEL_SIZE, &[chunk(b"ds64", 28, &ds64(123456, 0, &[])),
                                                chunk(b"data", SENTINEL_SIZE, &[])]);
    let mut walker = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap();
    assert_eq!(walker.root().kind, RootKind::Rf64);
    assert_eq!(walker.effective_root_size(), None);

    let first = walker.next().unwrap().unwrap();
    assert_eq!(first.chunk.id, ChunkId::DS64);
    assert_eq!(walker.effective_root_size(), Some(123456));

    let data = walker.next().unwrap().unwrap();
    assert_eq!(data.size_field, SENTINEL_SIZE);
    assert_eq!(data.size, 0);
    assert!(walker.next().is_none());
    assert_eq!(walker.state(), WalkState::End);
}

#[test]
fn rf64_sentinel_data_size_resolves_through_ds64() {
    let samples = [1u8, 2, 3, 4, 5, 6];
    let bytes = wave(b"RF64", SENTINEL_SIZE, &[chunk(b"ds64", 28, &ds64(50, 6, &[])),
                                                chunk(b"data", SENTINEL_SIZE, &samples)]);
    let file = WaveFile::read(&bytes).unwrap();
    assert_eq!(file.kind, RootKind::Rf64);
    assert_eq!(file.data(), Some(&samples[..]));
    assert_eq!(file.size64().unwrap().riff_size, 50);
}

#[test]
fn rf64_sentinel_resolves_other_chunks_through_table() {
    let bytes = wave(b"RF64", SENTINEL_SIZE, &[chunk(b"ds64", 40, &ds64(0, 0, &[(b"LIST", 3)])),
                                                chunk(b"LIST", SENTINEL_SIZE, b"abc"),
                                                chunk(b"data", SENTINEL_SIZE, &[])]);
    let records: Vec<_> = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1].size, 3);
    assert_eq!(records[1].chunk.body, ChunkBody::Unknown(b"abc".to_vec()));
    assert_eq!(records[2].offset, 12 + 48 + 12);
}

#[test]
fn rf64_sentinel_before_ds64_fails() {
    let bytes = wave(b"RF64", SENTINEL_SIZE, &[chunk(b"data", SENTINEL_SIZE, &[])]);
    let mut walker = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap();
    match walker.next() {
        Some(Err(Error::MissingSize64Table { offset })) => assert_eq!(offset, 12),
        other => panic!("expected MissingSize64Table, got {:?}", other),
    }
}

#[test]
fn rf64_without_ds64_fails_at_the_end() {
    let bytes = wave(b"RF64", SENTINEL_SIZE, &[chunk(b"data", 2, &[0, 0])]);
    match WaveFile::read(&bytes) {
        Err(Error::MissingSize64Table { offset }) => assert_eq!(offset, 22),
        other => panic!("expected MissingSize64Table, got {:?}", other),
    }
}

#[test]
fn truncated_ds64_is_reported_at_its_payload() {
    let mut table = ds64(0, 0, &[(b"LIST", 3)]);
    table.truncate(30);
    let bytes = wave(b"RF64", SENTINEL_SIZE, &[chunk(b"ds64", 30, &table)]);
    match WaveFile::read(&bytes) {
        Err(Error::TruncatedTable { offset }) => assert_eq!(offset, 20),
        other => panic!("expected TruncatedTable, got {:?}", other),
    }
}

#[test]
fn odd_payload_is_followed_by_one_pad_byte() {
    let bytes = wave(b"RIFF", 0, &[chunk(b"abcd", 5, b"hello"), chunk(b"JUNK", 2, &[0, 0])]);
    let records: Vec<_> = ChunkWalker::new(ByteCursor::new(&bytes[..])).unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(records[0].size, 5);
    assert_eq!(records[1].offset, records[0].offset + 8 + 6);
    assert_eq!(records[1].chunk.body, ChunkBody::Junk(vec![0, 0]));
}

#[test]
fn bext_of_601_bytes_is_too_short() {
    let bytes = wave(b"RIFF", 0, &[chunk(b"bext", 601, &[0u8; 601])]);
    match WaveFile::read(&bytes) {
        Err(Error::TooShort { offset, size }) => {
            assert_eq!(offset, 20);
            assert_eq!(size, 601);
        }
        other => panic!("expected TooShort, got {:?}", other),
    }
}

#[test]
fn unsupported_fmt_size_is_reported() {
    let bytes = wave(b"RIFF", 0, &[chunk(b"fmt ", 14, &[0u8; 14])]);
    match WaveFile::read(&bytes) {
        Err(Error::UnsupportedFormatChunkSize { offset, size }) => {
            assert_eq!(offset, 20);
            assert_eq!(size, 14);
        }
        other => panic!("expected UnsupportedFormatChunkSize, got {:?}", other),
    }
}

#[test]
fn extensible_float_format_is_decoded() {
    let mut fmt = Vec::new();
    fmt.extend_from_slice(&0xfffeu16.to_le_bytes());
    fmt.extend_from_slice(&2u16.to_le_bytes());
    fmt.extend_from_slice(&48000u32.to_le_bytes());
    fmt.extend_from_slice(&384000u32.to_le_bytes());
    fmt.extend_from_slice(&8u16.to_le_bytes());
    fmt.extend_from_slice(&32u16.to_le_bytes());
    fmt.extend_from_slice(&22u16.to_le_bytes());
    fmt.extend_from_slice(&32u16.to_le_bytes());
    fmt.extend_from_slice(&3u32.to_le_bytes());
    // KSDATAFORMAT_SUBTYPE_IEEE_FLOAT
    fmt.extend_from_slice(&[0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00,
                            0x80, 0x00, 0x00, 0xaa, 0x00, 0x38, 0x9b, 0x71]);
    let bytes = wave(b"RIFF", 0, &[chunk(b"fmt ", 40, &fmt)]);

    let file = WaveFile::read(&bytes).unwrap();
    let format = file.format().unwrap();
    assert_eq!(format.format_tag(), FormatTag::Extensible);
    assert_eq!(format.effective_format_tag(), FormatTag::IeeeFloat);
    match *format {
        FormatDescriptor::Extensible(ref ext) => {
            assert_eq!(ext.channel_mask, SpeakerMask::FRONT_LEFT | SpeakerMask::FRONT_RIGHT);
            assert_eq!(ext.valid_bits_per_sample, 32);
        }
        ref other => panic!("expected an extensible fmt chunk, got {:?}", other),
    }
}

#[test]
fn unknown_chunks_are_preserved_in_order() {
    let bytes = wave(b"RIFF", 0, &[chunk(b"LIST", 4, b"INFO"),
                                   chunk(b"fmt ", 16, &pcm_stereo_cd()),
                                   chunk(b"iXML", 3, b"<a>"),
                                   chunk(b"data", 0, &[])]);
    let file = WaveFile::read(&bytes).unwrap();
    let ids: Vec<ChunkId> = file.chunks.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![ChunkId(*b"LIST"), ChunkId::FMT, ChunkId(*b"iXML"), ChunkId::DATA]);
    assert_eq!(file.find(ChunkId(*b"iXML")).unwrap().body, ChunkBody::Unknown(b"<a>".to_vec()));
}

#[test]
fn stream_source_reads_the_same_as_memory() {
    let bytes = wave(b"RIFF", 0, &[chunk(b"fmt ", 16, &pcm_stereo_cd()),
                                   chunk(b"fact", 4, &[4, 0, 0, 0]),
                                   chunk(b"data", 3, &[7, 8, 9])]);
    let from_memory = WaveFile::read(&bytes).unwrap();
    let from_stream = WaveFile::read_from(io::Cursor::new(&bytes), bytes.len() as u64).unwrap();
    assert_eq!(from_memory, from_stream);
    assert_eq!(from_stream.find(ChunkId::FACT).unwrap().body.fact_sample_count(), Some(4));
}

#[test]
fn stream_shorter_than_its_length_is_out_of_bounds() {
    let bytes = wave(b"RIFF", 0, &[chunk(b"data", 4, &[1, 2, 3, 4])]);
    let source = StreamSource::new(io::Cursor::new(&bytes[..18]), bytes.len() as u64);
    let mut walker = ChunkWalker::new(source).unwrap();
    match walker.next() {
        Some(Err(Error::OutOfBounds { .. })) => {}
        other => panic!("expected OutOfBounds, got {:?}", other),
    }
    assert!(walker.next().is_none());
}
