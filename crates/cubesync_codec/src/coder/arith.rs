//! Binary arithmetic coder with carry-free pending-bit renormalization.
//!
//! The coder keeps a 32-bit `[low, high]` interval. Every renormalization
//! step produces exactly one output bit on the encoder (immediately or as a
//! pending bit) and consumes exactly one input bit on the decoder. `finish`
//! writes all 32 bits of `low`, which is exactly what the decoder primed
//! itself with, so both sides touch the same number of stream bits.

use std::io::{Read, Write};

use super::model::{Model, PROB_BITS, PROB_ONE};
use crate::bit::{BitReader, BitWriter};
use crate::error::BitError;

const PRECISION: u32 = 32;
const WHOLE: u64 = 1 << PRECISION;
const MASK: u64 = WHOLE - 1;
const HALF: u64 = WHOLE >> 1;
const QUARTER: u64 = WHOLE >> 2;

/// Last value of the zero sub-interval `[low, split]`.
///
/// Renormalization keeps `high - low >= QUARTER`, so both sub-intervals are
/// non-empty for every `p1` in `1..PROB_ONE`.
#[inline]
fn split_point(low: u64, high: u64, p1: u32) -> u64 {
    let range = high - low + 1;
    let p0 = u64::from(PROB_ONE - p1);
    low + ((range * p0) >> PROB_BITS) - 1
}

/// Arithmetic encoder writing into a [`BitWriter`].
#[derive(Debug)]
pub struct ArithEncoder<W: Write> {
    out: BitWriter<W>,
    low: u64,
    high: u64,
    /// Straddle steps whose output bit is not known yet.
    pending: u32,
}

impl<W: Write> ArithEncoder<W> {
    /// Creates an encoder over `inner`.
    #[must_use]
    pub const fn new(inner: W) -> Self {
        Self {
            out: BitWriter::new(inner),
            low: 0,
            high: MASK,
            pending: 0,
        }
    }

    /// Codes one bit with `model` and adapts the model.
    ///
    /// # Errors
    ///
    /// Returns the sticky bit stream error once the sink has failed.
    pub fn encode<M: Model + ?Sized>(&mut self, model: &mut M, bit: bool) -> Result<(), BitError> {
        let split = split_point(self.low, self.high, model.p1());
        if bit {
            self.low = split + 1;
        } else {
            self.high = split;
        }
        model.update(bit);
        self.renormalize()
    }

    /// Codes the low `width` bits of `value`, LSB first, all with `model`.
    ///
    /// # Errors
    ///
    /// Returns the sticky bit stream error once the sink has failed.
    pub fn encode_bits<M: Model + ?Sized>(
        &mut self,
        model: &mut M,
        value: u32,
        width: u32,
    ) -> Result<(), BitError> {
        for i in 0..width {
            self.encode(model, (value >> i) & 1 == 1)?;
        }
        Ok(())
    }

    /// Flushes the interval, closes the bit stream and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns the sticky bit stream error once the sink has failed.
    pub fn finish(mut self) -> Result<W, BitError> {
        let top = ((self.low >> (PRECISION - 1)) & 1) as u32;
        self.emit(top)?;
        for shift in (0..PRECISION - 1).rev() {
            self.out.write_bit(((self.low >> shift) & 1) as u32)?;
        }
        self.out.close()?;
        Ok(self.out.into_inner())
    }

    fn renormalize(&mut self) -> Result<(), BitError> {
        loop {
            if self.high < HALF {
                self.emit(0)?;
            } else if self.low >= HALF {
                self.emit(1)?;
                self.low -= HALF;
                self.high -= HALF;
            } else if self.low >= QUARTER && self.high < HALF + QUARTER {
                self.pending += 1;
                self.low -= QUARTER;
                self.high -= QUARTER;
            } else {
                return Ok(());
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
        }
    }

    /// Writes `bit` followed by the pending bits it resolves.
    fn emit(&mut self, bit: u32) -> Result<(), BitError> {
        self.out.write_bit(bit)?;
        while self.pending > 0 {
            self.out.write_bit(bit ^ 1)?;
            self.pending -= 1;
        }
        Ok(())
    }
}

/// Arithmetic decoder reading from a [`BitReader`].
///
/// Decoding never fails: bits missing from the source read as zero and the
/// first stream error is kept for the caller to inspect.
#[derive(Debug)]
pub struct ArithDecoder<R: Read> {
    input: BitReader<R>,
    low: u64,
    high: u64,
    value: u64,
    error: Option<BitError>,
}

impl<R: Read> ArithDecoder<R> {
    /// Creates a decoder over `inner` and primes it with the first 32 bits.
    #[must_use]
    pub fn new(inner: R) -> Self {
        let mut decoder = Self {
            input: BitReader::new(inner),
            low: 0,
            high: MASK,
            value: 0,
            error: None,
        };
        for _ in 0..PRECISION {
            decoder.value = (decoder.value << 1) | decoder.next_bit();
        }
        decoder
    }

    /// Decodes one bit with `model` and adapts the model.
    pub fn decode<M: Model + ?Sized>(&mut self, model: &mut M) -> bool {
        let split = split_point(self.low, self.high, model.p1());
        let bit = self.value > split;
        if bit {
            self.low = split + 1;
        } else {
            self.high = split;
        }
        model.update(bit);
        self.renormalize();
        bit
    }

    /// Decodes `width` bits, LSB first, all with `model`.
    pub fn decode_bits<M: Model + ?Sized>(&mut self, model: &mut M, width: u32) -> u32 {
        let mut value = 0;
        for i in 0..width {
            value |= u32::from(self.decode(model)) << i;
        }
        value
    }

    /// First error hit by the underlying bit stream, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&BitError> {
        self.error.as_ref()
    }

    fn renormalize(&mut self) {
        loop {
            if self.high < HALF {
                // nothing to subtract
            } else if self.low >= HALF {
                self.low -= HALF;
                self.high -= HALF;
                self.value = self.value.wrapping_sub(HALF) & MASK;
            } else if self.low >= QUARTER && self.high < HALF + QUARTER {
                self.low -= QUARTER;
                self.high -= QUARTER;
                self.value = self.value.wrapping_sub(QUARTER) & MASK;
            } else {
                return;
            }
            self.low <<= 1;
            self.high = (self.high << 1) | 1;
            self.value = ((self.value << 1) | self.next_bit()) & MASK;
        }
    }

    fn next_bit(&mut self) -> u64 {
        match self.input.read_bit() {
            Ok(bit) => u64::from(bit),
            Err(err) => {
                if self.error.is_none() {
                    self.error = Some(err);
                }
                0
            }
        }
    }
}
