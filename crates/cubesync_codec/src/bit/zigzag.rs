//! Zigzag mapping and bit-width helpers.
//!
//! ```text
//! signed:    0  -1   1  -2   2  -3 ...
//! zigzag:    0   1   2   3   4   5 ...
//! ```

/// Maps a signed value onto an unsigned one, keeping small magnitudes small.
#[inline]
#[must_use]
pub const fn zigzag_encode(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Exact inverse of [`zigzag_encode`].
#[inline]
#[must_use]
pub const fn zigzag_decode(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Minimal number of bits needed to represent `value` (0 for 0).
#[inline]
#[must_use]
pub const fn bit_width(value: u32) -> u32 {
    u32::BITS - value.leading_zeros()
}

/// Width needed for the largest zigzag-encoded magnitude among `values`.
///
/// Used to size one shared width for a group of fields sent together.
#[must_use]
pub fn max_bit_width<I>(values: I) -> u32
where
    I: IntoIterator<Item = i32>,
{
    values
        .into_iter()
        .map(|v| bit_width(zigzag_encode(v)))
        .max()
        .unwrap_or(0)
}
