// Wavechunk -- A RIFF/RF64 WAVE chunk parser in Rust
// Copyright 2026 The Wavechunk Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wavechunk::{ByteCursor, ChunkWalker, StreamSource};

fuzz_target!(|data: &[u8]| {
    let walker = match ChunkWalker::new(ByteCursor::new(data)) {
        Ok(w) => w,
        Err(..) => return,
    };
    let from_memory: Vec<_> = walker.map(|r| r.ok()).collect();

    // Claim one byte more than there is, to exercise the short-reader path.
    let source = StreamSource::new(data, data.len() as u64 + 1);
    if let Ok(walker) = ChunkWalker::new(source) {
        for (i, record) in walker.enumerate() {
            match record {
                Ok(record) => assert_eq!(from_memory.get(i), Some(&Some(record))),
                Err(..) => return,
            }
        }
    }
});
