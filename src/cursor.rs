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

//! Bounds-checked access to bytes.
//!
//! [`ByteCursor`] reads and writes fixed-width little-endian (and the odd
//! big-endian) fields in a buffer that is fully in memory. [`StreamSource`]
//! offers the subset of that functionality the chunk walker needs on top of
//! any `io::Read` whose length is known up front. Both implement
//! [`ByteSource`], the seam the walker is generic over.

use std::cmp;
use std::io;

use super::{Error, Result};

/// A bounds-checked cursor over a byte buffer.
///
/// Every read or write either consumes exactly the requested number of bytes
/// or fails with [`Error::OutOfBounds`] and leaves the cursor where it was.
///
/// The cursor keeps a _base offset_, the absolute position of the start of the
/// buffer in the file. Decoders that work on a single chunk payload use this
/// so that errors report file offsets, not payload offsets.
#[derive(Clone, Debug)]
pub struct ByteCursor<B> {
    buf: B,
    pos: usize,
    base: u64,
}

impl<B> ByteCursor<B>
    where B: AsRef<[u8]>
{
    /// Creates a cursor at the start of `buf`, with base offset 0.
    pub fn new(buf: B) -> ByteCursor<B> {
        ByteCursor::with_base(buf, 0)
    }

    /// Creates a cursor at the start of `buf`, which lives at `base` in the file.
    pub fn with_base(buf: B, base: u64) -> ByteCursor<B> {
        ByteCursor {
            buf: buf,
            pos: 0,
            base: base,
        }
    }

    /// Returns the position relative to the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the absolute offset of the cursor, base offset included.
    pub fn offset(&self) -> u64 {
        self.base + self.pos as u64
    }

    /// Returns the total length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.buf.as_ref().len()
    }

    /// Returns whether the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of bytes between the cursor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.len() - self.pos
    }

    /// Skips a pad byte if the absolute offset is odd.
    ///
    /// Nothing is read. At the end of the buffer the cursor does not move, and
    /// `false` is returned even if the offset is odd.
    pub fn align2(&mut self) -> bool {
        if self.offset() % 2 == 1 && self.remaining() > 0 {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Destroys the cursor and returns the underlying buffer.
    pub fn into_inner(self) -> B {
        self.buf
    }

    fn out_of_bounds(&self, len: usize) -> Error {
        Error::OutOfBounds {
            offset: self.offset(),
            len: len as u64,
        }
    }

    /// Advances past `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(self.out_of_bounds(n));
        }
        self.pos += n;
        Ok(())
    }

    /// Reads `n` bytes and returns them as a slice of the underlying buffer.
    pub fn read_bytes(&mut self, n: usize) -> Result<&[u8]> {
        if n > self.remaining() {
            return Err(self.out_of_bounds(n));
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf.as_ref()[start..start + n])
    }

    /// Reads `N` bytes into an array.
    #[inline(always)]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut result = [0u8; N];
        result.copy_from_slice(self.read_bytes(N)?);
        Ok(result)
    }

    /// Reads 4 bytes and returns them in an array.
    #[inline(always)]
    pub fn read_4_bytes(&mut self) -> Result<[u8; 4]> {
        self.read_array::<4>()
    }

    /// Reads two bytes and interprets them as a big-endian 16-bit unsigned integer.
    #[inline(always)]
    pub fn read_be_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    /// Reads four bytes and interprets them as a big-endian 32-bit unsigned integer.
    #[inline(always)]
    pub fn read_be_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// Reads two bytes and interprets them as a little-endian 16-bit unsigned integer.
    #[inline(always)]
    pub fn read_le_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Reads two bytes and interprets them as a little-endian 16-bit signed integer.
    #[inline(always)]
    pub fn read_le_i16(&mut self) -> Result<i16> {
        self.read_array().map(i16::from_le_bytes)
    }

    /// Reads four bytes and interprets them as a little-endian 32-bit unsigned integer.
    #[inline(always)]
    pub fn read_le_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Reads four bytes and interprets them as a little-endian 32-bit signed integer.
    #[inline(always)]
    pub fn read_le_i32(&mut self) -> Result<i32> {
        self.read_array().map(i32::from_le_bytes)
    }

    /// Reads eight bytes and interprets them as a little-endian 64-bit signed integer.
    #[inline(always)]
    pub fn read_le_i64(&mut self) -> Result<i64> {
        self.read_array().map(i64::from_le_bytes)
    }
}

impl<B> ByteCursor<B>
    where B: AsRef<[u8]> + AsMut<[u8]>
{
    /// Writes all of `bytes`, or nothing if they do not fit.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.remaining() {
            return Err(self.out_of_bounds(bytes.len()));
        }
        let start = self.pos;
        self.buf.as_mut()[start..start + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Writes a zero pad byte if the absolute offset is odd.
    pub fn write_pad(&mut self) -> Result<()> {
        if self.offset() % 2 == 1 {
            self.write_bytes(&[0])?;
        }
        Ok(())
    }

    /// Writes an unsigned 16-bit integer in big endian format.
    pub fn write_be_u16(&mut self, x: u16) -> Result<()> {
        self.write_bytes(&x.to_be_bytes())
    }

    /// Writes an unsigned 32-bit integer in big endian format.
    pub fn write_be_u32(&mut self, x: u32) -> Result<()> {
        self.write_bytes(&x.to_be_bytes())
    }

    /// Writes an unsigned 16-bit integer in little endian format.
    pub fn write_le_u16(&mut self, x: u16) -> Result<()> {
        self.write_bytes(&x.to_le_bytes())
    }

    /// Writes a signed 16-bit integer in little endian format.
    pub fn write_le_i16(&mut self, x: i16) -> Result<()> {
        self.write_bytes(&x.to_le_bytes())
    }

    /// Writes an unsigned 32-bit integer in little endian format.
    pub fn write_le_u32(&mut self, x: u32) -> Result<()> {
        self.write_bytes(&x.to_le_bytes())
    }

    /// Writes a signed 32-bit integer in little endian format.
    pub fn write_le_i32(&mut self, x: i32) -> Result<()> {
        self.write_bytes(&x.to_le_bytes())
    }

    /// Writes a signed 64-bit integer in little endian format.
    pub fn write_le_i64(&mut self, x: i64) -> Result<()> {
        self.write_bytes(&x.to_le_bytes())
    }
}

/// A source of bytes with a known number of bytes left.
///
/// This is what the chunk walker reads from. Reads are blocking; a source
/// backed by I/O can stall for as long as its reader does.
pub trait ByteSource {
    /// Returns the absolute offset of the next byte to be read.
    fn position(&self) -> u64;

    /// Returns the number of bytes left in the source.
    fn remaining(&self) -> u64;

    /// Fills `buf` entirely, or fails with `OutOfBounds` if the source holds
    /// fewer bytes.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Skips over `n` bytes.
    fn skip(&mut self, n: u64) -> Result<()>;
}

impl<B> ByteSource for ByteCursor<B>
    where B: AsRef<[u8]>
{
    fn position(&self) -> u64 {
        self.offset()
    }

    fn remaining(&self) -> u64 {
        ByteCursor::remaining(self) as u64
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        buf.copy_from_slice(self.read_bytes(buf.len())?);
        Ok(())
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        match usize::try_from(n) {
            Ok(n) => ByteCursor::skip(self, n),
            Err(..) => Err(self.out_of_bounds(usize::MAX)),
        }
    }
}

/// Reads from an `io::Read` that is known to hold `len` more bytes.
///
/// No internal buffering is performed on the underlying reader, but this can
/// easily be added by wrapping the reader in an `io::BufReader`.
pub struct StreamSource<R> {
    reader: R,
    len: u64,
    pos: u64,
}

impl<R> StreamSource<R>
    where R: io::Read
{
    /// Wraps `reader`, which must hold at least `len` bytes.
    ///
    /// For a file, `len` is usually the length from its metadata.
    pub fn new(reader: R, len: u64) -> StreamSource<R> {
        StreamSource {
            reader: reader,
            len: len,
            pos: 0,
        }
    }

    /// Destroys the source and returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn check(&self, n: u64) -> Result<()> {
        if n > self.len - self.pos {
            Err(Error::OutOfBounds { offset: self.pos, len: n })
        } else {
            Ok(())
        }
    }
}

impl<R> ByteSource for StreamSource<R>
    where R: io::Read
{
    fn position(&self) -> u64 {
        self.pos
    }

    fn remaining(&self) -> u64 {
        self.len - self.pos
    }

    fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        self.check(buf.len() as u64)?;
        let mut n = 0;
        while n < buf.len() {
            match self.reader.read(&mut buf[n..]) {
                Ok(0) => {
                    // The reader ran dry before the length it was said to
                    // have, which is no different from a short buffer.
                    return Err(Error::OutOfBounds {
                        offset: self.pos + n as u64,
                        len: (buf.len() - n) as u64,
                    });
                }
                Ok(progress) => n += progress,
                Err(ref err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(Error::Io(err)),
            }
        }
        self.pos += n as u64;
        Ok(())
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        self.check(n)?;
        // Read from the input in chunks of 1024 bytes at a time, and discard
        // the result.
        let mut buf = [0u8; 1024];
        let mut left = n;
        while left > 0 {
            let end = cmp::min(left, buf.len() as u64) as usize;
            self.read_into(&mut buf[..end])?;
            left -= end as u64;
        }
        Ok(())
    }
}

#[test]
fn reads_advance_by_their_width() {
    let bytes = [0x52, 0x49, 0x46, 0x46, 0x24, 0x00, 0x00, 0x00, 0xff, 0xfe];
    let mut cursor = ByteCursor::new(&bytes[..]);
    assert_eq!(cursor.read_4_bytes().unwrap(), *b"RIFF");
    assert_eq!(cursor.read_le_u32().unwrap(), 36);
    assert_eq!(cursor.read_le_i16().unwrap(), -257);
    assert_eq!(cursor.remaining(), 0);
}

#[test]
fn big_endian_read_does_not_swap() {
    let mut cursor = ByteCursor::new(&b"WAVE"[..]);
    assert_eq!(cursor.read_be_u32().unwrap(), 0x5741_5645);

    let mut cursor = ByteCursor::new(vec![0u8; 4]);
    cursor.write_be_u16(0x0102).unwrap();
    cursor.write_le_u16(0x0102).unwrap();
    assert_eq!(cursor.into_inner(), vec![1, 2, 2, 1]);
    let bytes = [1u8, 2];
    assert_eq!(ByteCursor::new(&bytes[..]).read_be_u16().unwrap(), 0x0102);
}

#[test]
fn short_read_fails_without_moving() {
    let bytes = [1u8, 2, 3];
    let mut cursor = ByteCursor::with_base(&bytes[..], 100);
    cursor.skip(1).unwrap();
    match cursor.read_le_u32() {
        Err(Error::OutOfBounds { offset, len }) => {
            assert_eq!(offset, 101);
            assert_eq!(len, 4);
        }
        other => panic!("expected OutOfBounds, got {:?}", other),
    }
    assert_eq!(cursor.position(), 1);
    assert_eq!(cursor.read_le_u16().unwrap(), 0x0302);
}

#[test]
fn align2_skips_only_at_odd_offsets() {
    let bytes = [0u8; 4];
    let mut cursor = ByteCursor::new(&bytes[..]);
    assert!(!cursor.align2());
    cursor.skip(1).unwrap();
    assert!(cursor.align2());
    assert_eq!(cursor.position(), 2);

    // At the very end there is nothing left to skip.
    let mut cursor = ByteCursor::new(&bytes[..3]);
    cursor.skip(3).unwrap();
    assert!(!cursor.align2());
    assert_eq!(cursor.position(), 3);
}

#[test]
fn writes_are_bounds_checked() {
    let mut buf = [0u8; 6];
    {
        let mut cursor = ByteCursor::new(&mut buf[..]);
        cursor.write_le_u16(0xfffe).unwrap();
        cursor.write_le_u32(44100).unwrap();
        assert!(cursor.write_bytes(&[1]).is_err());
    }
    assert_eq!(buf, [0xfe, 0xff, 0x44, 0xac, 0x00, 0x00]);
}

#[test]
fn stream_source_reports_premature_end() {
    // The reader claims 8 bytes but only has 6.
    let data = [0u8; 6];
    let mut source = StreamSource::new(&data[..], 8);
    let mut buf = [0u8; 4];
    source.read_into(&mut buf).unwrap();
    match source.read_into(&mut buf) {
        Err(Error::OutOfBounds { offset, .. }) => assert_eq!(offset, 6),
        other => panic!("expected OutOfBounds, got {:?}", other),
    }
}

#[test]
fn stream_source_skips_across_buffer_boundaries() {
    let data: Vec<u8> = (0..3000).map(|x| x as u8).collect();
    let mut source = StreamSource::new(&data[..], data.len() as u64);
    source.skip(2500).unwrap();
    assert_eq!(source.position(), 2500);
    let mut buf = [0u8; 1];
    source.read_into(&mut buf).unwrap();
    assert_eq!(buf[0], (2500 % 256) as u8);
    assert!(source.skip(500).is_err());
}
