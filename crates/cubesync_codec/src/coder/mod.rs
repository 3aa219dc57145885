//! # Entropy Coder
//!
//! Adaptive binary arithmetic coding on top of the bit stream.
//!
//! ## Contract
//!
//! ```text
//! encoder:  encode(m0, b0) encode(m1, b1) ... finish()
//! decoder:  decode(m0)     decode(m1)     ...
//! ```
//!
//! Model state is a pure function of the bits it has seen, so the decoder
//! only stays in step when it replays exactly the same sequence of model
//! and bit calls the encoder made.

mod arith;
mod model;

pub use arith::{ArithDecoder, ArithEncoder};
pub use model::{Fixed, Model, Shift, Shift2, PROB_BITS, PROB_ONE};
