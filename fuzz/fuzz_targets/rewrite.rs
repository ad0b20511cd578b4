// Wavechunk -- A RIFF/RF64 WAVE chunk parser in Rust
// Copyright 2026 The Wavechunk Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// A copy of the License has been included in the root of the repository.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wavechunk::{Error, WaveFile};

fuzz_target!(|data: &[u8]| {
    // We are only concerned with rewriting files that read successfully.
    let file = match WaveFile::read(data) {
        Ok(f) => f,
        Err(..) => return,
    };

    let bytes = match file.to_bytes() {
        Ok(b) => b,
        // RF64 files may have ds64 somewhere other than first.
        Err(Error::MissingSize64Table { .. }) => return,
        Err(err) => panic!("{:?}", err),
    };

    let reread = WaveFile::read(&bytes).expect("Reading failed after rewrite.");
    assert_eq!(reread.kind, file.kind);
    assert_eq!(reread.chunks.len(), file.chunks.len());
    assert_eq!(reread.to_bytes().unwrap(), bytes);
});
