//! Probability models for one snapshot, one per coding context.
//!
//! Built fresh for every encode and every decode from the same
//! [`ModelConfig`], so both sides start from identical state. All tables are
//! inline; building them does not touch the heap.

use crate::bit::bit_width;
use crate::coder::{Fixed, Shift2};
use crate::config::ModelConfig;

/// Unary width positions (a width is at most 32).
const WIDTH_STEPS: usize = 33;

/// Expected-change buckets: `bit_width(expected)` in `0..=32`.
const EXPECTED_BUCKETS: usize = 33;

pub(super) struct ContextModels {
    /// Per-object "changed" flags.
    pub presence: Shift2,
    /// Interacting XOR bits.
    pub interacting: Shift2,
    /// Largest XOR bit planes, low then high.
    pub largest: [Shift2; 2],
    /// Near-uniform bits: group widths and value bits.
    pub raw: Fixed,
    widths: [[Shift2; WIDTH_STEPS]; EXPECTED_BUCKETS],
}

impl ContextModels {
    pub fn new(config: &ModelConfig) -> Self {
        let zero = Shift2::mostly_zero(config);
        Self {
            presence: zero,
            interacting: zero,
            largest: [zero; 2],
            raw: Fixed::HALF,
            widths: [[zero; WIDTH_STEPS]; EXPECTED_BUCKETS],
        }
    }

    /// Model for unary position `step` of a slot whose expected change is `expected`.
    pub fn width(&mut self, expected: u32, step: u32) -> &mut Shift2 {
        let bucket = bit_width(expected) as usize;
        let step = (step as usize).min(WIDTH_STEPS - 1);
        &mut self.widths[bucket][step]
    }
}
