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

//! The `fmt ` chunk.
//!
//! The chunk holds one of three structs, and which one it is can only be told
//! from the length of the chunk. The WAVEFORMAT struct with the bits per
//! sample field (PCMWAVEFORMAT) is 16 bytes:
//!
//! ```text
//! typedef struct {
//!     WORD  wFormatTag;
//!     WORD  nChannels;
//!     DWORD nSamplesPerSec;
//!     DWORD nAvgBytesPerSec;
//!     WORD  nBlockAlign;
//!     WORD  wBitsPerSample;
//! } PCMWAVEFORMAT;
//! ```
//!
//! WAVEFORMATEX adds `WORD cbSize` for 18 bytes, and WAVEFORMATEXTENSIBLE adds
//! 22 more bytes after that, for 40 bytes in total:
//!
//! ```text
//! typedef struct {
//!     WAVEFORMATEX Format;
//!     WORD         wValidBitsPerSample;
//!     DWORD        dwChannelMask;
//!     GUID         SubFormat;
//! } WAVEFORMATEXTENSIBLE;
//! ```

use std::fmt;
use std::ops;

use super::cursor::ByteCursor;
use super::{Error, Result};

/// The length of a PCMWAVEFORMAT payload.
pub const BASE_LEN: usize = 16;

/// The length of a WAVEFORMATEX payload.
pub const PLUS_LEN: usize = 18;

/// The length of a WAVEFORMATEXTENSIBLE payload.
pub const EXTENSIBLE_LEN: usize = 40;

/// The `cbSize` value of a WAVEFORMATEXTENSIBLE struct.
const EXTENSIBLE_CB_SIZE: u16 = 22;

/// Well-known values of the format tag.
///
/// The different format tag definitions can be found in mmreg.h that is part
/// of the Windows SDK. The vast majority are esoteric vendor-specific formats;
/// those are kept as `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormatTag {
    /// `WAVE_FORMAT_PCM`, integer samples.
    Pcm,
    /// `WAVE_FORMAT_ADPCM`, Microsoft ADPCM.
    Adpcm,
    /// `WAVE_FORMAT_IEEE_FLOAT`, floating point samples.
    IeeeFloat,
    /// `WAVE_FORMAT_ALAW`.
    ALaw,
    /// `WAVE_FORMAT_MULAW`.
    MuLaw,
    /// `WAVE_FORMAT_EXTENSIBLE`, the real format is in the sub-format GUID.
    Extensible,
    /// Any tag without a variant of its own.
    ///
    /// Values that do have a named variant are not canonical here, so
    /// `Other(1)` reads back as `Pcm`. Build tags with `from_u16` to get the
    /// canonical form.
    Other(u16),
}

impl FormatTag {
    /// Maps a raw tag to its named variant, or to `Other` if it has none.
    pub fn from_u16(tag: u16) -> FormatTag {
        match tag {
            0x0001 => FormatTag::Pcm,
            0x0002 => FormatTag::Adpcm,
            0x0003 => FormatTag::IeeeFloat,
            0x0006 => FormatTag::ALaw,
            0x0007 => FormatTag::MuLaw,
            0xfffe => FormatTag::Extensible,
            other => FormatTag::Other(other),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            FormatTag::Pcm => 0x0001,
            FormatTag::Adpcm => 0x0002,
            FormatTag::IeeeFloat => 0x0003,
            FormatTag::ALaw => 0x0006,
            FormatTag::MuLaw => 0x0007,
            FormatTag::Extensible => 0xfffe,
            FormatTag::Other(tag) => tag,
        }
    }
}

/// A sub-format identifier, in the field layout the `fmt ` chunk is declared with.
///
/// The layout is `u32, u16, u16, u32, u32`, every field big-endian, so the
/// fields read the 16 bytes in file order. This is not the Windows in-memory
/// form, where the first three fields are little-endian; [`Guid::to_bytes`]
/// and `Display` work from the file bytes, so well-known GUIDs still print in
/// their usual registry form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: u32,
    pub data5: u32,
}

/// The last 14 file bytes shared by every sub-format derived from a format tag.
const TAG_TEMPLATE_TAIL: [u8; 14] = [0x00, 0x00, 0x00, 0x00, 0x10, 0x00,
                                     0x80, 0x00, 0x00, 0xaa, 0x00, 0x38, 0x9b, 0x71];

impl Guid {
    /// `KSDATAFORMAT_SUBTYPE_PCM`, 00000001-0000-0010-8000-00aa00389b71.
    pub const PCM: Guid = Guid::from_bytes([0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00,
                                            0x80, 0x00, 0x00, 0xaa, 0x00, 0x38, 0x9b, 0x71]);

    /// `KSDATAFORMAT_SUBTYPE_IEEE_FLOAT`, 00000003-0000-0010-8000-00aa00389b71.
    pub const IEEE_FLOAT: Guid = Guid::from_bytes([0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00,
                                                   0x80, 0x00, 0x00, 0xaa, 0x00, 0x38, 0x9b, 0x71]);

    /// Interprets 16 bytes in file order.
    pub const fn from_bytes(b: [u8; 16]) -> Guid {
        Guid {
            data1: u32::from_be_bytes([b[0], b[1], b[2], b[3]]),
            data2: u16::from_be_bytes([b[4], b[5]]),
            data3: u16::from_be_bytes([b[6], b[7]]),
            data4: u32::from_be_bytes([b[8], b[9], b[10], b[11]]),
            data5: u32::from_be_bytes([b[12], b[13], b[14], b[15]]),
        }
    }

    /// Returns the 16 bytes in file order.
    pub fn to_bytes(&self) -> [u8; 16] {
        let mut result = [0u8; 16];
        result[0..4].copy_from_slice(&self.data1.to_be_bytes());
        result[4..6].copy_from_slice(&self.data2.to_be_bytes());
        result[6..8].copy_from_slice(&self.data3.to_be_bytes());
        result[8..12].copy_from_slice(&self.data4.to_be_bytes());
        result[12..16].copy_from_slice(&self.data5.to_be_bytes());
        result
    }

    /// Returns the format tag this GUID stands for, if it is one of the
    /// `XXXXXXXX-0000-0010-8000-00aa00389b71` sub-formats derived from a tag.
    ///
    /// The tag is stored little-endian in the first two file bytes, which are
    /// the high half of `data1`.
    pub fn format_tag(&self) -> Option<FormatTag> {
        let b = self.to_bytes();
        if b[2..] == TAG_TEMPLATE_TAIL {
            Some(FormatTag::from_u16(u16::from_le_bytes([b[0], b[1]])))
        } else {
            None
        }
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let b = self.to_bytes();
        write!(f, "{:08x}-{:04x}-{:04x}-",
               u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
               u16::from_le_bytes([b[4], b[5]]),
               u16::from_le_bytes([b[6], b[7]]))?;
        write!(f, "{:02x}{:02x}-", b[8], b[9])?;
        for x in &b[10..] {
            write!(f, "{:02x}", x)?;
        }
        Ok(())
    }
}

/// Speaker positions of the channels in a WAVEFORMATEXTENSIBLE stream.
///
/// The channels in the stream are assigned to the set bits, from the least
/// significant bit upwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SpeakerMask(pub u32);

impl SpeakerMask {
    pub const FRONT_LEFT: SpeakerMask = SpeakerMask(0x0000_0001);
    pub const FRONT_RIGHT: SpeakerMask = SpeakerMask(0x0000_0002);
    pub const FRONT_CENTER: SpeakerMask = SpeakerMask(0x0000_0004);
    pub const LOW_FREQUENCY: SpeakerMask = SpeakerMask(0x0000_0008);
    pub const BACK_LEFT: SpeakerMask = SpeakerMask(0x0000_0010);
    pub const BACK_RIGHT: SpeakerMask = SpeakerMask(0x0000_0020);
    pub const FRONT_LEFT_OF_CENTER: SpeakerMask = SpeakerMask(0x0000_0040);
    pub const FRONT_RIGHT_OF_CENTER: SpeakerMask = SpeakerMask(0x0000_0080);
    pub const BACK_CENTER: SpeakerMask = SpeakerMask(0x0000_0100);
    pub const SIDE_LEFT: SpeakerMask = SpeakerMask(0x0000_0200);
    pub const SIDE_RIGHT: SpeakerMask = SpeakerMask(0x0000_0400);
    pub const TOP_CENTER: SpeakerMask = SpeakerMask(0x0000_0800);
    pub const TOP_FRONT_LEFT: SpeakerMask = SpeakerMask(0x0000_1000);
    pub const TOP_FRONT_CENTER: SpeakerMask = SpeakerMask(0x0000_2000);
    pub const TOP_FRONT_RIGHT: SpeakerMask = SpeakerMask(0x0000_4000);
    pub const TOP_BACK_LEFT: SpeakerMask = SpeakerMask(0x0000_8000);
    pub const TOP_BACK_CENTER: SpeakerMask = SpeakerMask(0x0001_0000);
    pub const TOP_BACK_RIGHT: SpeakerMask = SpeakerMask(0x0002_0000);
    pub const BITSTREAM_1_LEFT: SpeakerMask = SpeakerMask(0x0080_0000);
    pub const BITSTREAM_1_RIGHT: SpeakerMask = SpeakerMask(0x0100_0000);
    pub const BITSTREAM_2_LEFT: SpeakerMask = SpeakerMask(0x0200_0000);
    pub const BITSTREAM_2_RIGHT: SpeakerMask = SpeakerMask(0x0400_0000);
    pub const CONTROLSAMPLE_1: SpeakerMask = SpeakerMask(0x0800_0000);
    pub const CONTROLSAMPLE_2: SpeakerMask = SpeakerMask(0x1000_0000);
    pub const STEREO_LEFT: SpeakerMask = SpeakerMask(0x2000_0000);
    pub const STEREO_RIGHT: SpeakerMask = SpeakerMask(0x4000_0000);
    pub const ALL: SpeakerMask = SpeakerMask(0x8000_0000);

    /// Returns the raw bitmask.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Returns whether all positions in `other` are set.
    pub fn contains(self, other: SpeakerMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the number of positions set.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl ops::BitOr for SpeakerMask {
    type Output = SpeakerMask;

    fn bitor(self, rhs: SpeakerMask) -> SpeakerMask {
        SpeakerMask(self.0 | rhs.0)
    }
}

/// The fields every `fmt ` chunk starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatBase {
    /// The format tag, `WAVE_FORMAT_PCM = 0x0001`, etc.
    pub format_tag: u16,
    /// 1 = mono, 2 = stereo, etc.
    pub channel_count: u16,
    /// 32000, 44100, 48000, etc.
    pub sample_rate: u32,
    /// Average bytes per second, only important for compressed formats.
    pub bytes_per_second: u32,
    /// The size in bytes of one sample for every channel.
    pub block_alignment: u16,
    /// The number of bits used to store a sample.
    pub bits_per_sample: u16,
}

impl FormatBase {
    fn read<B: AsRef<[u8]>>(cursor: &mut ByteCursor<B>) -> Result<FormatBase> {
        Ok(FormatBase {
            format_tag: cursor.read_le_u16()?,
            channel_count: cursor.read_le_u16()?,
            sample_rate: cursor.read_le_u32()?,
            bytes_per_second: cursor.read_le_u32()?,
            block_alignment: cursor.read_le_u16()?,
            bits_per_sample: cursor.read_le_u16()?,
        })
    }

    fn write<B: AsRef<[u8]> + AsMut<[u8]>>(&self, cursor: &mut ByteCursor<B>) -> Result<()> {
        cursor.write_le_u16(self.format_tag)?;
        cursor.write_le_u16(self.channel_count)?;
        cursor.write_le_u32(self.sample_rate)?;
        cursor.write_le_u32(self.bytes_per_second)?;
        cursor.write_le_u16(self.block_alignment)?;
        cursor.write_le_u16(self.bits_per_sample)
    }
}

/// The WAVEFORMATEXTENSIBLE fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatExtensible {
    pub base: FormatBase,
    /// The number of bits of precision in a sample, at most `bits_per_sample`.
    pub valid_bits_per_sample: u16,
    pub channel_mask: SpeakerMask,
    pub sub_format: Guid,
}

/// The contents of a `fmt ` chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatDescriptor {
    /// PCMWAVEFORMAT, 16 bytes.
    Base(FormatBase),
    /// WAVEFORMATEX without extra data, 18 bytes. `cbSize` is always 0.
    Plus(FormatBase),
    /// WAVEFORMATEXTENSIBLE, 40 bytes, with `cbSize` 22.
    Extensible(FormatExtensible),
}

impl FormatDescriptor {
    /// Decodes a `fmt ` payload.
    pub fn decode(payload: &[u8]) -> Result<FormatDescriptor> {
        FormatDescriptor::decode_at(payload, 0)
    }

    /// Decodes a `fmt ` payload that starts at `offset` in the file.
    pub fn decode_at(payload: &[u8], offset: u64) -> Result<FormatDescriptor> {
        let mut cursor = ByteCursor::with_base(payload, offset);
        match payload.len() {
            BASE_LEN => Ok(FormatDescriptor::Base(FormatBase::read(&mut cursor)?)),
            PLUS_LEN => {
                let base = FormatBase::read(&mut cursor)?;
                let cb_offset = cursor.offset();
                // There are no bytes after `cbSize` to describe.
                if cursor.read_le_u16()? != 0 {
                    return Err(Error::InvalidFormat {
                        offset: cb_offset,
                        reason: "WAVEFORMATEX has extra data but no room for it",
                    });
                }
                Ok(FormatDescriptor::Plus(base))
            }
            EXTENSIBLE_LEN => {
                let base = FormatBase::read(&mut cursor)?;
                let cb_offset = cursor.offset();
                if cursor.read_le_u16()? != EXTENSIBLE_CB_SIZE {
                    return Err(Error::InvalidFormat {
                        offset: cb_offset,
                        reason: "unexpected WAVEFORMATEXTENSIBLE size",
                    });
                }
                let valid_bits_per_sample = cursor.read_le_u16()?;
                let channel_mask = SpeakerMask(cursor.read_le_u32()?);
                let sub_format = Guid {
                    data1: cursor.read_be_u32()?,
                    data2: cursor.read_be_u16()?,
                    data3: cursor.read_be_u16()?,
                    data4: cursor.read_be_u32()?,
                    data5: cursor.read_be_u32()?,
                };
                Ok(FormatDescriptor::Extensible(FormatExtensible {
                    base: base,
                    valid_bits_per_sample: valid_bits_per_sample,
                    channel_mask: channel_mask,
                    sub_format: sub_format,
                }))
            }
            size => Err(Error::UnsupportedFormatChunkSize {
                offset: offset,
                size: size as u64,
            }),
        }
    }

    /// Returns the fields shared by all variants.
    pub fn base(&self) -> &FormatBase {
        match *self {
            FormatDescriptor::Base(ref base) => base,
            FormatDescriptor::Plus(ref base) => base,
            FormatDescriptor::Extensible(ref ext) => &ext.base,
        }
    }

    /// Returns the format tag as stored.
    pub fn format_tag(&self) -> FormatTag {
        FormatTag::from_u16(self.base().format_tag)
    }

    /// Returns the format tag, looking through `WAVE_FORMAT_EXTENSIBLE`.
    ///
    /// For an extensible descriptor whose sub-format GUID is derived from a
    /// format tag, that tag is returned. Otherwise this is `format_tag()`.
    pub fn effective_format_tag(&self) -> FormatTag {
        match *self {
            FormatDescriptor::Extensible(ref ext) if self.format_tag() == FormatTag::Extensible => {
                ext.sub_format.format_tag().unwrap_or(FormatTag::Extensible)
            }
            _ => self.format_tag(),
        }
    }

    /// Returns the payload length of the encoded descriptor.
    pub fn encoded_len(&self) -> usize {
        match *self {
            FormatDescriptor::Base(..) => BASE_LEN,
            FormatDescriptor::Plus(..) => PLUS_LEN,
            FormatDescriptor::Extensible(..) => EXTENSIBLE_LEN,
        }
    }

    /// Writes the descriptor to the cursor.
    pub fn encode_into<B: AsRef<[u8]> + AsMut<[u8]>>(&self, cursor: &mut ByteCursor<B>) -> Result<()> {
        match *self {
            FormatDescriptor::Base(ref base) => base.write(cursor),
            FormatDescriptor::Plus(ref base) => {
                base.write(cursor)?;
                cursor.write_le_u16(0)
            }
            FormatDescriptor::Extensible(ref ext) => {
                ext.base.write(cursor)?;
                cursor.write_le_u16(EXTENSIBLE_CB_SIZE)?;
                cursor.write_le_u16(ext.valid_bits_per_sample)?;
                cursor.write_le_u32(ext.channel_mask.bits())?;
                cursor.write_be_u32(ext.sub_format.data1)?;
                cursor.write_be_u16(ext.sub_format.data2)?;
                cursor.write_be_u16(ext.sub_format.data3)?;
                cursor.write_be_u32(ext.sub_format.data4)?;
                cursor.write_be_u32(ext.sub_format.data5)
            }
        }
    }

    /// Encodes the descriptor as a `fmt ` payload.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut cursor = ByteCursor::new(vec![0u8; self.encoded_len()]);
        self.encode_into(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
fn stereo_cd() -> FormatBase {
    FormatBase {
        format_tag: 1,
        channel_count: 2,
        sample_rate: 44100,
        bytes_per_second: 176400,
        block_alignment: 4,
        bits_per_sample: 16,
    }
}

#[test]
fn decode_pcm_wave_format() {
    let payload = [0x01, 0x00, 0x02, 0x00, 0x44, 0xac, 0x00, 0x00,
                   0x10, 0xb1, 0x02, 0x00, 0x04, 0x00, 0x10, 0x00];
    let format = FormatDescriptor::decode(&payload).unwrap();
    assert_eq!(format, FormatDescriptor::Base(stereo_cd()));
    assert_eq!(format.format_tag(), FormatTag::Pcm);
}

#[test]
fn decode_wave_format_ex_requires_zero_cb_size() {
    let mut payload = FormatDescriptor::Plus(stereo_cd()).encode().unwrap();
    assert_eq!(payload.len(), 18);
    assert_eq!(FormatDescriptor::decode(&payload).unwrap(), FormatDescriptor::Plus(stereo_cd()));

    payload[16] = 2;
    match FormatDescriptor::decode_at(&payload, 20) {
        Err(Error::InvalidFormat { offset, .. }) => assert_eq!(offset, 36),
        other => panic!("expected InvalidFormat, got {:?}", other),
    }
}

#[test]
fn decode_wave_format_extensible() {
    // 24-bit stereo at 48 kHz, front left and right.
    let payload = [0xfe, 0xff, 0x02, 0x00, 0x80, 0xbb, 0x00, 0x00,
                   0x00, 0xee, 0x02, 0x00, 0x06, 0x00, 0x18, 0x00,
                   0x16, 0x00, 0x18, 0x00, 0x03, 0x00, 0x00, 0x00,
                   0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00,
                   0x80, 0x00, 0x00, 0xaa, 0x00, 0x38, 0x9b, 0x71];
    let format = FormatDescriptor::decode(&payload).unwrap();
    match format {
        FormatDescriptor::Extensible(ext) => {
            assert_eq!(ext.base.channel_count, 2);
            assert_eq!(ext.base.sample_rate, 48000);
            assert_eq!(ext.valid_bits_per_sample, 24);
            assert_eq!(ext.channel_mask, SpeakerMask::FRONT_LEFT | SpeakerMask::FRONT_RIGHT);
            assert_eq!(ext.sub_format, Guid::PCM);
            assert_eq!(ext.sub_format.data1, 0x0100_0000);
            assert_eq!(ext.sub_format.data3, 0x1000);
        }
        other => panic!("expected Extensible, got {:?}", other),
    }
    assert_eq!(format.format_tag(), FormatTag::Extensible);
    assert_eq!(format.effective_format_tag(), FormatTag::Pcm);
    assert_eq!(&format.encode().unwrap()[..], &payload[..]);
}

#[test]
fn decode_wave_format_extensible_requires_cb_size_22() {
    let mut payload = [0u8; 40];
    payload[16] = 20;
    match FormatDescriptor::decode(&payload) {
        Err(Error::InvalidFormat { offset, .. }) => assert_eq!(offset, 16),
        other => panic!("expected InvalidFormat, got {:?}", other),
    }
}

#[test]
fn decode_rejects_other_sizes() {
    for &size in &[0usize, 14, 17, 20, 39, 41, 50] {
        let payload = vec![0u8; size];
        match FormatDescriptor::decode(&payload) {
            Err(Error::UnsupportedFormatChunkSize { size: s, .. }) => assert_eq!(s, size as u64),
            other => panic!("expected UnsupportedFormatChunkSize for {}, got {:?}", size, other),
        }
    }
}

#[test]
fn format_tag_other_normalizes_to_named_variant() {
    assert_eq!(FormatTag::from_u16(FormatTag::Other(1).to_u16()), FormatTag::Pcm);
    assert_eq!(FormatTag::from_u16(FormatTag::Other(0xfffe).to_u16()), FormatTag::Extensible);
    assert_eq!(FormatTag::from_u16(0x0055), FormatTag::Other(0x0055));
}

#[test]
fn guid_displays_in_registry_form() {
    assert_eq!(Guid::PCM.to_string(), "00000001-0000-0010-8000-00aa00389b71");
    assert_eq!(Guid::IEEE_FLOAT.format_tag(), Some(FormatTag::IeeeFloat));
    assert_eq!(Guid::default().format_tag(), None);
}

#[test]
fn guid_fields_are_big_endian_in_file_order() {
    let mut payload = FormatDescriptor::Extensible(FormatExtensible {
        base: stereo_cd(),
        valid_bits_per_sample: 16,
        channel_mask: SpeakerMask::FRONT_LEFT | SpeakerMask::FRONT_RIGHT,
        sub_format: Guid::default(),
    }).encode().unwrap();
    payload[0] = 0xfe;
    payload[1] = 0xff;
    for (i, b) in payload[24..].iter_mut().enumerate() {
        *b = i as u8 + 1;
    }

    let format = FormatDescriptor::decode(&payload).unwrap();
    match format {
        FormatDescriptor::Extensible(ref ext) => {
            assert_eq!(ext.sub_format.data1, 0x0102_0304);
            assert_eq!(ext.sub_format.data2, 0x0506);
            assert_eq!(ext.sub_format.data3, 0x0708);
            assert_eq!(ext.sub_format.data4, 0x090a_0b0c);
            assert_eq!(ext.sub_format.data5, 0x0d0e_0f10);
            assert_eq!(&ext.sub_format.to_bytes()[..], &payload[24..]);
            assert_eq!(ext.sub_format.format_tag(), None);
        }
        ref other => panic!("expected Extensible, got {:?}", other),
    }
    assert_eq!(format.effective_format_tag(), FormatTag::Extensible);
    assert_eq!(format.encode().unwrap(), payload);
}

#[test]
fn speaker_mask_contains_its_parts() {
    let surround = SpeakerMask::FRONT_LEFT | SpeakerMask::FRONT_RIGHT | SpeakerMask::FRONT_CENTER
        | SpeakerMask::LOW_FREQUENCY | SpeakerMask::BACK_LEFT | SpeakerMask::BACK_RIGHT;
    assert_eq!(surround.bits(), 0x3f);
    assert_eq!(surround.count(), 6);
    assert!(surround.contains(SpeakerMask::LOW_FREQUENCY));
    assert!(!surround.contains(SpeakerMask::SIDE_LEFT));
    assert_eq!(SpeakerMask::ALL.bits(), 1 << 31);
}

#[test]
fn format_tags_round_trip() {
    for tag in 0..=u16::MAX {
        assert_eq!(FormatTag::from_u16(tag).to_u16(), tag);
    }
}
