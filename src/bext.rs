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

//! The Broadcast Wave Format `bext` chunk.

use std::borrow::Cow;

use super::cursor::ByteCursor;
use super::{Error, Result};

/// The length of the fixed part of the `bext` payload.
pub const FIXED_LEN: usize = 602;

/// The contents of a `bext` chunk.
///
/// Text fields are fixed-size ASCII, padded with NUL when the text is shorter
/// than the field. They are stored as they appear in the file so that
/// re-encoding reproduces the original bytes; the `*_str` accessors decode
/// them for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BroadcastExtension {
    /// Description of the sound sequence.
    pub description: [u8; 256],
    /// Name of the originator.
    pub originator: [u8; 32],
    /// Reference of the originator.
    pub originator_reference: [u8; 32],
    /// `yyyy:mm:dd`
    pub origination_date: [u8; 10],
    /// `hh:mm:ss`
    pub origination_time: [u8; 8],
    /// First sample count since midnight.
    pub time_reference: i64,
    /// Version of the BWF.
    pub version: i16,
    /// Binary SMPTE UMID.
    pub umid: [u8; 64],
    /// Integrated loudness in LUFS, times 100.
    pub loudness_value: i16,
    /// Loudness range in LU, times 100.
    pub loudness_range: i16,
    /// Maximum true peak level in dBTP, times 100.
    pub max_true_peak_level: i16,
    /// Highest momentary loudness in LUFS, times 100.
    pub max_momentary_loudness: i16,
    /// Highest short-term loudness in LUFS, times 100.
    pub max_short_term_loudness: i16,
    /// Reserved for future use, normally zero.
    pub reserved: [u8; 180],
    /// Free-form ASCII coding history, everything after the fixed fields.
    pub coding_history: Vec<u8>,
}

impl Default for BroadcastExtension {
    fn default() -> BroadcastExtension {
        BroadcastExtension {
            description: [0; 256],
            originator: [0; 32],
            originator_reference: [0; 32],
            origination_date: [0; 10],
            origination_time: [0; 8],
            time_reference: 0,
            version: 0,
            umid: [0; 64],
            loudness_value: 0,
            loudness_range: 0,
            max_true_peak_level: 0,
            max_momentary_loudness: 0,
            max_short_term_loudness: 0,
            reserved: [0; 180],
            coding_history: Vec::new(),
        }
    }
}

/// Decodes a fixed-size text field up to the first NUL.
fn field_str(field: &[u8]) -> Cow<str> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end])
}

/// Stores `text` in a fixed-size field, truncated or NUL padded to fit.
fn set_field(field: &mut [u8], text: &str) {
    let bytes = text.as_bytes();
    let n = bytes.len().min(field.len());
    field[..n].copy_from_slice(&bytes[..n]);
    for b in &mut field[n..] {
        *b = 0;
    }
}

impl BroadcastExtension {
    /// Decodes a `bext` payload.
    pub fn decode(payload: &[u8]) -> Result<BroadcastExtension> {
        BroadcastExtension::decode_at(payload, 0)
    }

    /// Decodes a `bext` payload that starts at `offset` in the file.
    pub fn decode_at(payload: &[u8], offset: u64) -> Result<BroadcastExtension> {
        if payload.len() < FIXED_LEN {
            return Err(Error::TooShort {
                offset: offset,
                size: payload.len() as u64,
            });
        }

        let mut cursor = ByteCursor::with_base(payload, offset);
        Ok(BroadcastExtension {
            description: cursor.read_array()?,
            originator: cursor.read_array()?,
            originator_reference: cursor.read_array()?,
            origination_date: cursor.read_array()?,
            origination_time: cursor.read_array()?,
            time_reference: cursor.read_le_i64()?,
            version: cursor.read_le_i16()?,
            umid: cursor.read_array()?,
            loudness_value: cursor.read_le_i16()?,
            loudness_range: cursor.read_le_i16()?,
            max_true_peak_level: cursor.read_le_i16()?,
            max_momentary_loudness: cursor.read_le_i16()?,
            max_short_term_loudness: cursor.read_le_i16()?,
            reserved: cursor.read_array()?,
            coding_history: payload[FIXED_LEN..].to_vec(),
        })
    }

    /// Returns the payload length of the encoded chunk.
    pub fn encoded_len(&self) -> usize {
        FIXED_LEN + self.coding_history.len()
    }

    /// Writes the chunk payload to the cursor.
    pub fn encode_into<B: AsRef<[u8]> + AsMut<[u8]>>(&self, cursor: &mut ByteCursor<B>) -> Result<()> {
        cursor.write_bytes(&self.description)?;
        cursor.write_bytes(&self.originator)?;
        cursor.write_bytes(&self.originator_reference)?;
        cursor.write_bytes(&self.origination_date)?;
        cursor.write_bytes(&self.origination_time)?;
        cursor.write_le_i64(self.time_reference)?;
        cursor.write_le_i16(self.version)?;
        cursor.write_bytes(&self.umid)?;
        cursor.write_le_i16(self.loudness_value)?;
        cursor.write_le_i16(self.loudness_range)?;
        cursor.write_le_i16(self.max_true_peak_level)?;
        cursor.write_le_i16(self.max_momentary_loudness)?;
        cursor.write_le_i16(self.max_short_term_loudness)?;
        cursor.write_bytes(&self.reserved)?;
        cursor.write_bytes(&self.coding_history)
    }

    /// Encodes the chunk payload.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut cursor = ByteCursor::new(vec![0u8; self.encoded_len()]);
        self.encode_into(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    pub fn description_str(&self) -> Cow<str> {
        field_str(&self.description)
    }

    pub fn originator_str(&self) -> Cow<str> {
        field_str(&self.originator)
    }

    pub fn originator_reference_str(&self) -> Cow<str> {
        field_str(&self.originator_reference)
    }

    pub fn origination_date_str(&self) -> Cow<str> {
        field_str(&self.origination_date)
    }

    pub fn origination_time_str(&self) -> Cow<str> {
        field_str(&self.origination_time)
    }

    /// Returns the coding history, which may be NUL terminated.
    pub fn coding_history_str(&self) -> Cow<str> {
        field_str(&self.coding_history)
    }

    pub fn set_description(&mut self, text: &str) {
        set_field(&mut self.description, text);
    }

    pub fn set_originator(&mut self, text: &str) {
        set_field(&mut self.originator, text);
    }

    pub fn set_originator_reference(&mut self, text: &str) {
        set_field(&mut self.originator_reference, text);
    }

    pub fn set_origination_date(&mut self, text: &str) {
        set_field(&mut self.origination_date, text);
    }

    pub fn set_origination_time(&mut self, text: &str) {
        set_field(&mut self.origination_time, text);
    }
}

#[test]
fn decode_rejects_short_payload() {
    let payload = vec![0u8; 601];
    match BroadcastExtension::decode_at(&payload, 36) {
        Err(Error::TooShort { offset, size }) => {
            assert_eq!(offset, 36);
            assert_eq!(size, 601);
        }
        other => panic!("expected TooShort, got {:?}", other),
    }
}

#[test]
fn decode_reads_fields_at_their_offsets() {
    let mut payload = vec![0u8; FIXED_LEN];
    payload[..5].copy_from_slice(b"Scene");
    payload[256..262].copy_from_slice(b"Studio");
    payload[320..330].copy_from_slice(b"2024:05:17");
    payload[330..338].copy_from_slice(b"13:37:00");
    payload[338..346].copy_from_slice(&48_000i64.to_le_bytes());
    payload[346..348].copy_from_slice(&2i16.to_le_bytes());
    payload[348] = 0x06;
    payload[412..414].copy_from_slice(&(-2300i16).to_le_bytes());
    payload[420..422].copy_from_slice(&(-1800i16).to_le_bytes());
    payload.extend_from_slice(b"A=PCM,F=48000,W=24,M=stereo\r\n");

    let bext = BroadcastExtension::decode(&payload).unwrap();
    assert_eq!(bext.description_str(), "Scene");
    assert_eq!(bext.originator_str(), "Studio");
    assert_eq!(bext.originator_reference_str(), "");
    assert_eq!(bext.origination_date_str(), "2024:05:17");
    assert_eq!(bext.origination_time_str(), "13:37:00");
    assert_eq!(bext.time_reference, 48_000);
    assert_eq!(bext.version, 2);
    assert_eq!(bext.umid[0], 0x06);
    assert_eq!(bext.loudness_value, -2300);
    assert_eq!(bext.max_short_term_loudness, -1800);
    assert_eq!(bext.coding_history_str(), "A=PCM,F=48000,W=24,M=stereo\r\n");
    assert_eq!(bext.encode().unwrap(), payload);
}

#[test]
fn exactly_602_bytes_has_empty_history() {
    let bext = BroadcastExtension::decode(&[0u8; FIXED_LEN]).unwrap();
    assert!(bext.coding_history.is_empty());
    assert_eq!(bext, BroadcastExtension::default());
}

#[test]
fn setters_truncate_and_clear() {
    let mut bext = BroadcastExtension::default();
    bext.set_origination_date("2024:05:17 and more");
    assert_eq!(&bext.origination_date, b"2024:05:17");
    bext.set_originator("long name");
    bext.set_originator("short");
    assert_eq!(bext.originator_str(), "short");
    assert_eq!(&bext.originator[5..], &[0u8; 27][..]);
}
