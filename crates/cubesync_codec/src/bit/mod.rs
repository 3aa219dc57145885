//! # Bit Stream and Integer Helpers
//!
//! Raw bit packing underneath the entropy coder.
//!
//! ## Layout
//!
//! ```text
//! write_bits(0b101, 3); write_bits(0b11, 2)
//!
//! accumulator:  ...0 0 0 1 1 1 0 1
//!                        └┬┘ └─┬─┘
//!                        0b11  0b101     (LSB first)
//! ```
//!
//! Complete bytes leave the accumulator little-endian once more than 16 bits
//! are buffered. `align` pads the last partial byte with zeros.

mod stream;
pub mod zigzag;

pub use stream::{BitReader, BitWriter, MAX_READ_WIDTH, MAX_WRITE_WIDTH};
pub use zigzag::{bit_width, max_bit_width, zigzag_decode, zigzag_encode};
