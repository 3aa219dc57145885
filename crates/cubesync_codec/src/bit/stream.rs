//! LSB-first bit writer and reader over `std::io` byte sinks and sources.

use std::io::{Read, Write};

use crate::error::BitError;

/// Widest value accepted by a single [`BitWriter::write_bits`] call.
pub const MAX_WRITE_WIDTH: u32 = 16;

/// Widest value accepted by a single [`BitReader::read_bits`] call.
pub const MAX_READ_WIDTH: u32 = 31;

/// Accumulator fill level above which complete bytes are flushed.
const FLUSH_THRESHOLD: u32 = 16;

/// Packs bits LSB-first into a byte sink.
///
/// Bits collect in a 64-bit accumulator and leave it a byte at a time once
/// more than 16 are buffered. The first I/O failure is sticky.
///
/// [`align`](Self::align) must run once at the end of the stream, otherwise
/// up to 7 trailing bits never reach the sink.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    inner: W,
    /// Pending bits, oldest in the lowest position.
    bits: u64,
    /// Number of valid bits in `bits`.
    nbits: u32,
    error: Option<BitError>,
}

impl<W: Write> BitWriter<W> {
    /// Creates a writer over `inner`.
    #[must_use]
    pub const fn new(inner: W) -> Self {
        Self {
            inner,
            bits: 0,
            nbits: 0,
            error: None,
        }
    }

    /// Writes the low `width` bits of `value`.
    ///
    /// # Errors
    ///
    /// Returns the sticky error once the sink has failed.
    pub fn write_bits(&mut self, value: u32, width: u32) -> Result<(), BitError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        debug_assert!(width <= MAX_WRITE_WIDTH, "write width {width} > {MAX_WRITE_WIDTH}");

        let mask = (1u64 << width) - 1;
        self.bits |= (u64::from(value) & mask) << self.nbits;
        self.nbits += width;
        if self.nbits > FLUSH_THRESHOLD {
            self.flush_bytes();
        }
        self.status()
    }

    /// Writes the lowest bit of `bit`.
    ///
    /// # Errors
    ///
    /// Returns the sticky error once the sink has failed.
    #[inline]
    pub fn write_bit(&mut self, bit: u32) -> Result<(), BitError> {
        self.write_bits(bit & 1, 1)
    }

    /// Flushes everything, zero-padding the final partial byte.
    ///
    /// Calling it again without new writes is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the sticky error once the sink has failed.
    pub fn align(&mut self) -> Result<(), BitError> {
        if self.error.is_some() {
            return self.status();
        }
        self.flush_bytes();
        if self.error.is_none() && self.nbits > 0 {
            let last = [(self.bits & 0xFF) as u8];
            self.bits = 0;
            self.nbits = 0;
            if let Err(err) = self.inner.write_all(&last) {
                self.fail(err.into());
            }
        }
        self.status()
    }

    /// Ends the stream. Same as [`align`](Self::align).
    ///
    /// # Errors
    ///
    /// Returns the sticky error once the sink has failed.
    #[inline]
    pub fn close(&mut self) -> Result<(), BitError> {
        self.align()
    }

    /// Returns the sticky error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&BitError> {
        self.error.as_ref()
    }

    /// Returns a reference to the sink.
    #[must_use]
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwraps the sink. Bits not yet aligned are dropped.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Moves every complete byte from the accumulator to the sink.
    fn flush_bytes(&mut self) {
        let mut buf = [0u8; 8];
        let mut n = 0;
        while self.nbits >= 8 {
            buf[n] = (self.bits & 0xFF) as u8;
            self.bits >>= 8;
            self.nbits -= 8;
            n += 1;
        }
        if n > 0 {
            if let Err(err) = self.inner.write_all(&buf[..n]) {
                self.fail(err.into());
            }
        }
    }

    fn fail(&mut self, err: BitError) {
        self.error = Some(err);
        self.bits = 0;
        self.nbits = 0;
    }

    fn status(&self) -> Result<(), BitError> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Unpacks bits LSB-first from a byte source.
///
/// Holds one byte of look-ahead. The first failure, end of source included,
/// is sticky and no partial value is ever returned.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    inner: R,
    /// Current byte.
    byte: u32,
    /// Bits of `byte` already consumed (8 = exhausted).
    used: u32,
    error: Option<BitError>,
}

impl<R: Read> BitReader<R> {
    /// Creates a reader over `inner`.
    #[must_use]
    pub const fn new(inner: R) -> Self {
        Self {
            inner,
            byte: 0,
            used: 8,
            error: None,
        }
    }

    /// Reads `width` bits (`width <= 31`).
    ///
    /// # Errors
    ///
    /// Returns [`BitError::UnexpectedEof`] when the source runs dry, or the
    /// sticky error from an earlier failure.
    pub fn read_bits(&mut self, width: u32) -> Result<u32, BitError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        debug_assert!(width <= MAX_READ_WIDTH, "read width {width} > {MAX_READ_WIDTH}");

        let mut value = 0u32;
        let mut filled = 0;
        while filled < width {
            if self.used == 8 {
                self.fetch()?;
            }
            let take = (8 - self.used).min(width - filled);
            let chunk = (self.byte >> self.used) & ((1 << take) - 1);
            value |= chunk << filled;
            filled += take;
            self.used += take;
        }
        Ok(value)
    }

    /// Reads a single bit.
    ///
    /// # Errors
    ///
    /// Same as [`read_bits`](Self::read_bits).
    #[inline]
    pub fn read_bit(&mut self) -> Result<u32, BitError> {
        self.read_bits(1)
    }

    /// Drops the unread bits of the current byte, mirroring a writer `align`.
    #[inline]
    pub fn align(&mut self) {
        self.used = 8;
    }

    /// Returns the sticky error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&BitError> {
        self.error.as_ref()
    }

    fn fetch(&mut self) -> Result<(), BitError> {
        let mut buf = [0u8; 1];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => {
                self.byte = u32::from(buf[0]);
                self.used = 0;
                Ok(())
            }
            Err(err) => {
                let err = BitError::from(err);
                self.error = Some(err.clone());
                self.used = 8;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Sink that rejects every write.
    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn written(f: impl FnOnce(&mut BitWriter<Vec<u8>>)) -> Vec<u8> {
        let mut writer = BitWriter::new(Vec::new());
        f(&mut writer);
        writer.close().unwrap();
        writer.into_inner()
    }

    #[test]
    fn test_lsb_first_packing() {
        let bytes = written(|w| {
            w.write_bits(0b101, 3).unwrap();
            w.write_bits(0b11, 2).unwrap();
        });
        assert_eq!(bytes, vec![0b0001_1101]);
    }

    #[test]
    fn test_little_endian_flush() {
        let bytes = written(|w| {
            w.write_bits(0xBEEF, 16).unwrap();
            w.write_bits(0x1, 1).unwrap();
        });
        assert_eq!(bytes, vec![0xEF, 0xBE, 0x01]);
    }

    #[test]
    fn test_sink_sees_only_flushed_bytes() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0xBEEF, 16).unwrap();
        assert!(writer.get_ref().is_empty());
        writer.write_bits(0x1, 1).unwrap();
        assert_eq!(writer.get_ref(), &vec![0xEF, 0xBE]);
        writer.close().unwrap();
        assert_eq!(writer.get_ref(), &vec![0xEF, 0xBE, 0x01]);
    }

    #[test]
    fn test_write_bit_masks_input() {
        let bytes = written(|w| {
            w.write_bit(3).unwrap();
            w.write_bit(2).unwrap();
            w.write_bit(1).unwrap();
        });
        assert_eq!(bytes, vec![0b101]);
    }

    #[test]
    fn test_align_idempotent() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0b1, 1).unwrap();
        writer.align().unwrap();
        writer.align().unwrap();
        writer.close().unwrap();
        assert_eq!(writer.into_inner(), vec![0x01]);
    }

    #[test]
    fn test_align_starts_fresh_byte() {
        let bytes = written(|w| {
            w.write_bits(0b11, 2).unwrap();
            w.align().unwrap();
            w.write_bits(0b1, 1).unwrap();
        });
        assert_eq!(bytes, vec![0b11, 0b1]);

        let mut reader = BitReader::new(bytes.as_slice());
        assert_eq!(reader.read_bits(2).unwrap(), 0b11);
        reader.align();
        assert_eq!(reader.read_bit().unwrap(), 1);
    }

    #[test]
    fn test_byte_count_is_ceiling() {
        for total in 0..40u32 {
            let bytes = written(|w| {
                for _ in 0..total {
                    w.write_bit(1).unwrap();
                }
            });
            assert_eq!(bytes.len(), total.div_ceil(8) as usize, "{total} bits");
        }
    }

    #[test]
    fn test_read_crosses_byte_boundaries() {
        let bytes = written(|w| {
            w.write_bits(0b1, 1).unwrap();
            w.write_bits(0x7FFF, 15).unwrap();
            w.write_bits(0x1234, 16).unwrap();
            w.write_bits(0x5, 3).unwrap();
        });
        let mut reader = BitReader::new(bytes.as_slice());
        assert_eq!(reader.read_bits(1).unwrap(), 0b1);
        assert_eq!(reader.read_bits(15).unwrap(), 0x7FFF);
        assert_eq!(reader.read_bits(16).unwrap(), 0x1234);
        assert_eq!(reader.read_bits(3).unwrap(), 0x5);
    }

    #[test]
    fn test_wide_read_spans_writes() {
        let bytes = written(|w| {
            w.write_bits(0xABCD, 16).unwrap();
            w.write_bits(0x12, 8).unwrap();
        });
        let mut reader = BitReader::new(bytes.as_slice());
        assert_eq!(reader.read_bits(24).unwrap(), 0x12_ABCD);
    }

    #[test]
    fn test_zero_width() {
        let bytes = written(|w| w.write_bits(0xFFFF, 0).unwrap());
        assert!(bytes.is_empty());

        let mut reader = BitReader::new(&[0xFFu8][..]);
        assert_eq!(reader.read_bits(0).unwrap(), 0);
        assert_eq!(reader.read_bits(8).unwrap(), 0xFF);
    }

    #[test]
    fn test_read_past_end_is_sticky() {
        let mut reader = BitReader::new(&[0xABu8][..]);
        assert_eq!(reader.read_bits(8).unwrap(), 0xAB);
        assert_eq!(reader.read_bit(), Err(BitError::UnexpectedEof));
        assert_eq!(reader.read_bits(0), Err(BitError::UnexpectedEof));
        assert_eq!(reader.error(), Some(&BitError::UnexpectedEof));
    }

    #[test]
    fn test_partial_read_returns_no_value() {
        let mut reader = BitReader::new(&[0xFFu8][..]);
        assert_eq!(reader.read_bits(12), Err(BitError::UnexpectedEof));
    }

    #[test]
    fn test_write_error_is_sticky() {
        let mut writer = BitWriter::new(BrokenSink);
        // 16 bits stay buffered, nothing reaches the sink yet
        assert!(writer.write_bits(0xFFFF, 16).is_ok());
        let first = writer.write_bits(0x1, 1).unwrap_err();
        assert!(matches!(
            first,
            BitError::Io {
                kind: io::ErrorKind::BrokenPipe,
                ..
            }
        ));
        assert_eq!(writer.write_bit(1).unwrap_err(), first);
        assert_eq!(writer.align().unwrap_err(), first);
        assert_eq!(writer.error(), Some(&first));
    }
}
