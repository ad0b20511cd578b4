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

use std::env;
use std::fs;

use wavechunk::{BroadcastExtension, Chunk, ChunkBody, ChunkId, ChunkWriter, Error,
                FormatBase, FormatDescriptor, RootKind, Size64Entry, Size64Table, WalkOptions,
                WaveFile};

fn mono_16_bit() -> FormatDescriptor {
    FormatDescriptor::Plus(FormatBase {
        format_tag: 1,
        channel_count: 1,
        sample_rate: 22050,
        bytes_per_second: 44100,
        block_alignment: 2,
        bits_per_sample: 16,
    })
}

#[test]
fn chunk_writer_works_on_files_not_just_in_memory() {
    let path = env::temp_dir().join("wavechunk_chunk_writer.wav");
    {
        let file = fs::File::create(&path).unwrap();
        let mut writer = ChunkWriter::new(file, RootKind::Riff).unwrap();
        writer.write_chunk(&mono_16_bit().into()).unwrap();
        writer.write_data(&[11, 0, 13, 0]).unwrap();
        writer.write_data(&[17, 0]).unwrap();
        writer.write_raw(ChunkId(*b"cue "), &[0; 4]).unwrap();
        writer.finalize().unwrap();
    }

    let len = fs::metadata(&path).unwrap().len();
    let reader = fs::File::open(&path).unwrap();
    let options = WalkOptions::default().with_strict_root_size(true);
    let wave = WaveFile::read_source(wavechunk::StreamSource::new(reader, len), options).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(wave.kind, RootKind::Riff);
    assert_eq!(wave.format(), Some(&mono_16_bit()));
    assert_eq!(wave.data(), Some(&[11u8, 0, 13, 0, 17, 0][..]));
    assert_eq!(wave.chunks.last().unwrap().id, ChunkId(*b"cue "));
    assert_eq!(len, wave.encoded_len());
}

#[test]
fn rf64_written_by_chunk_writer_walks_with_strict_checks() {
    let mut buffer = std::io::Cursor::new(Vec::new());
    {
        let mut writer = ChunkWriter::new(&mut buffer, RootKind::Rf64).unwrap();
        writer.write_chunk(&mono_16_bit().into()).unwrap();
        writer.set_sample_count(3);
        writer.write_data(&[1, 2, 3, 4, 5]).unwrap();
        writer.finalize().unwrap();
    }
    let bytes = buffer.into_inner();

    let options = WalkOptions::default()
        .with_strict_root_size(true)
        .with_allow_missing_final_pad(false);
    let wave = WaveFile::read_with_options(&bytes, options).unwrap();
    let table = wave.size64().unwrap();
    assert_eq!(table.riff_size as usize, bytes.len() - 8);
    assert_eq!(table.data_size, 5);
    assert_eq!(table.sample_count, 3);
    assert_eq!(wave.data(), Some(&[1u8, 2, 3, 4, 5][..]));
}

#[test]
fn read_write_read_preserves_every_chunk() {
    let mut bext = BroadcastExtension::default();
    bext.set_description("Take 4");
    bext.set_origination_date("2026:10:17");
    bext.coding_history = b"A=PCM,F=22050,W=16,M=mono\r\n".to_vec();

    let mut wave = WaveFile::new(RootKind::Riff);
    wave.push(mono_16_bit());
    wave.push(bext);
    wave.push(Chunk::decode(ChunkId::JUNK, vec![0; 3], 0).unwrap());
    wave.push(Chunk::raw(ChunkId(*b"LIST"), b"INFOISFT".to_vec()).unwrap());
    wave.push(Chunk::decode(ChunkId::DATA, vec![1, 2, 3, 4, 5, 6, 7], 0).unwrap());

    let bytes = wave.to_bytes().unwrap();
    let reread = WaveFile::read(&bytes).unwrap();
    assert_eq!(reread, wave);

    let mut again = Vec::new();
    reread.write_to(&mut again).unwrap();
    assert_eq!(again, bytes);
}

#[test]
fn chunks_built_from_bytes_survive_a_round_trip() {
    let mut wave = WaveFile::new(RootKind::Riff);
    wave.push(mono_16_bit());
    wave.push(Chunk::raw(ChunkId::DATA, vec![1, 2]).unwrap());
    assert_eq!(wave.data(), Some(&[1u8, 2][..]));

    let reread = WaveFile::read(&wave.to_bytes().unwrap()).unwrap();
    assert_eq!(reread, wave);

    match Chunk::raw(ChunkId::BEXT, vec![0; 10]) {
        Err(Error::TooShort { size, .. }) => assert_eq!(size, 10),
        other => panic!("expected TooShort, got {:?}", other),
    }
}

#[test]
fn encoding_rejects_a_body_that_does_not_match_its_id() {
    let mut wave = WaveFile::new(RootKind::Riff);
    wave.push(mono_16_bit());
    wave.push(Chunk { id: ChunkId::BEXT, body: ChunkBody::Unknown(vec![0; 10]) });
    match wave.to_bytes() {
        Err(Error::MismatchedBody { offset, id }) => {
            assert_eq!(offset, 12 + 8 + 18);
            assert_eq!(id, ChunkId::BEXT);
        }
        other => panic!("expected MismatchedBody, got {:?}", other),
    }
}

#[test]
fn rf64_encoding_keeps_table_entries() {
    let mut table = Size64Table::default();
    table.sample_count = 2;
    table.entries.push(Size64Entry { id: ChunkId(*b"axml"), size: 9 });

    let mut wave = WaveFile::new(RootKind::Rf64);
    wave.push(table);
    wave.push(mono_16_bit());
    wave.push(Chunk::decode(ChunkId::DATA, vec![0; 4], 0).unwrap());

    let bytes = wave.to_bytes().unwrap();
    let reread = WaveFile::read(&bytes).unwrap();
    let table = reread.size64().unwrap();
    assert_eq!(table.riff_size as usize, bytes.len() - 8);
    assert_eq!(table.data_size, 4);
    assert_eq!(table.sample_count, 2);
    assert_eq!(table.resolve(ChunkId(*b"axml")), Some(9));
    assert_eq!(reread.chunks[1..], wave.chunks[1..]);
}

#[test]
fn rf64_encoding_without_ds64_fails() {
    let mut wave = WaveFile::new(RootKind::Rf64);
    wave.push(mono_16_bit());
    match wave.to_bytes() {
        Err(Error::MissingSize64Table { .. }) => {}
        other => panic!("expected MissingSize64Table, got {:?}", other),
    }
}
