//! Stream-oriented binary reader consumed by message decoders.
//!
//! A [`BufferReader`] is a forward-only cursor over an IPC body. Reads past
//! the end return zero-filled values and latch a sticky `truncated` flag so
//! a decoder can finish its fixed read sequence and the caller can decide
//! whether to keep or discard the record. Numeric reads never allocate.

use serde::Serialize;

/// Soft cap on NUL-terminated string reads, in bytes.
pub const MAX_STRING_LEN: usize = 256;

/// A point in world space, three little-endian `f32`s on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Forward-only cursor over a byte slice.
pub struct BufferReader<'a> {
    data: &'a [u8],
    offset: usize,
    truncated: bool,
}

impl<'a> BufferReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            truncated: false,
        }
    }

    /// Current cursor position.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left before the end of the slice.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    /// Whether any read has run past the end of the slice.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Read `N` bytes, zero-filling past the end.
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        let available = self.remaining().min(N);
        if available < N {
            self.truncated = true;
        }
        out[..available].copy_from_slice(&self.data[self.offset..self.offset + available]);
        self.offset += N;
        out
    }

    pub fn read_u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    pub fn read_u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    pub fn read_u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    pub fn read_u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }

    pub fn read_i8(&mut self) -> i8 {
        self.take::<1>()[0] as i8
    }

    pub fn read_i16(&mut self) -> i16 {
        i16::from_le_bytes(self.take())
    }

    pub fn read_i32(&mut self) -> i32 {
        i32::from_le_bytes(self.take())
    }

    pub fn read_i64(&mut self) -> i64 {
        i64::from_le_bytes(self.take())
    }

    pub fn read_f32(&mut self) -> f32 {
        f32::from_le_bytes(self.take())
    }

    /// Three little-endian `f32`s.
    pub fn read_position3(&mut self) -> Position3 {
        Position3 {
            x: self.read_f32(),
            y: self.read_f32(),
            z: self.read_f32(),
        }
    }

    /// Read `n` bytes into an owned buffer, zero-filled past the end.
    pub fn read_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut out = vec![0u8; n];
        let available = self.remaining().min(n);
        if available < n {
            self.truncated = true;
        }
        out[..available].copy_from_slice(&self.data[self.offset..self.offset + available]);
        self.offset += n;
        out
    }

    /// Read a NUL-terminated UTF-8 string, up to [`MAX_STRING_LEN`] bytes.
    ///
    /// The cursor advances past the terminator. If no terminator is found
    /// within the cap, the capped bytes are taken and the cursor stops after
    /// them. Invalid UTF-8 is replaced lossily.
    pub fn read_string(&mut self) -> String {
        let window_end = self.data.len().min(self.offset + MAX_STRING_LEN);
        let window = &self.data[self.offset.min(self.data.len())..window_end];
        match window.iter().position(|&b| b == 0) {
            Some(nul) => {
                let s = String::from_utf8_lossy(&window[..nul]).into_owned();
                self.offset += nul + 1;
                s
            }
            None => {
                let s = String::from_utf8_lossy(window).into_owned();
                self.offset += window.len();
                if window.len() < MAX_STRING_LEN {
                    // Ran off the end of the slice without a terminator.
                    self.truncated = true;
                }
                s
            }
        }
    }

    /// Advance the cursor by `n` bytes without reading.
    pub fn skip(&mut self, n: usize) {
        if self.remaining() < n {
            self.truncated = true;
        }
        self.offset += n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads_roundtrip() {
        let mut data = Vec::new();
        data.extend_from_slice(&0xABu8.to_le_bytes());
        data.extend_from_slice(&0x1234u16.to_le_bytes());
        data.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        data.extend_from_slice(&0x0102_0304_0506_0708u64.to_le_bytes());
        data.extend_from_slice(&(-5i32).to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());

        let mut reader = BufferReader::new(&data);
        assert_eq!(reader.read_u8(), 0xAB);
        assert_eq!(reader.read_u16(), 0x1234);
        assert_eq!(reader.read_u32(), 0xDEAD_BEEF);
        assert_eq!(reader.read_u64(), 0x0102_0304_0506_0708);
        assert_eq!(reader.read_i32(), -5);
        assert_eq!(reader.read_f32(), 1.5);
        assert!(!reader.is_truncated());
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_reads_independent_of_alignment() {
        // A u32 starting at an odd offset decodes the same value.
        let mut data = vec![0xFFu8];
        data.extend_from_slice(&0x0A0B_0C0Du32.to_le_bytes());
        let mut reader = BufferReader::new(&data);
        reader.read_u8();
        assert_eq!(reader.read_u32(), 0x0A0B_0C0D);
    }

    #[test]
    fn test_past_end_reads_zero_fill_and_mark_truncated() {
        let data = [0x01u8, 0x02];
        let mut reader = BufferReader::new(&data);
        // Four bytes requested, two available: low bytes real, rest zero.
        assert_eq!(reader.read_u32(), 0x0000_0201);
        assert!(reader.is_truncated());
        // Subsequent reads keep returning zeroes.
        assert_eq!(reader.read_u64(), 0);
        assert_eq!(reader.read_f32(), 0.0);
    }

    #[test]
    fn test_truncated_flag_is_sticky() {
        let mut reader = BufferReader::new(&[0u8; 2]);
        reader.read_u32();
        assert!(reader.is_truncated());
        // A read that would have fit does not clear the flag.
        let mut fresh = BufferReader::new(&[0u8; 8]);
        fresh.read_u32();
        assert!(!fresh.is_truncated());
    }

    #[test]
    fn test_position3() {
        let mut data = Vec::new();
        for v in [1.0f32, -2.0, 3.5] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut reader = BufferReader::new(&data);
        let pos = reader.read_position3();
        assert_eq!(pos, Position3 { x: 1.0, y: -2.0, z: 3.5 });
    }

    #[test]
    fn test_string_nul_terminated() {
        let data = b"Striking Dummy\0trailing";
        let mut reader = BufferReader::new(data);
        assert_eq!(reader.read_string(), "Striking Dummy");
        // Cursor advanced past the terminator.
        assert_eq!(reader.read_u8(), b't');
        assert!(!reader.is_truncated());
    }

    #[test]
    fn test_string_missing_terminator_marks_truncated() {
        let data = b"no terminator";
        let mut reader = BufferReader::new(data);
        assert_eq!(reader.read_string(), "no terminator");
        assert!(reader.is_truncated());
    }

    #[test]
    fn test_read_bytes_zero_fill() {
        let mut reader = BufferReader::new(&[0xAA, 0xBB]);
        assert_eq!(reader.read_bytes(4), vec![0xAA, 0xBB, 0x00, 0x00]);
        assert!(reader.is_truncated());
    }

    #[test]
    fn test_skip() {
        let mut reader = BufferReader::new(&[1, 2, 3, 4]);
        reader.skip(2);
        assert_eq!(reader.read_u8(), 3);
        reader.skip(5);
        assert!(reader.is_truncated());
    }
}
