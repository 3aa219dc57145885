//! Adaptive probability models.
//!
//! Probabilities are 12-bit fixed point: `p1 = 2048` means a one is as likely
//! as a zero. Updates move the estimate toward each observed bit by a shifted
//! fraction of the remaining distance. Cheap and approximate, which is all
//! the coder needs since only the ratio matters.

use crate::config::ModelConfig;

/// Bits of probability precision.
pub const PROB_BITS: u32 = 12;

/// Fixed-point value of probability 1.0.
pub const PROB_ONE: u32 = 1 << PROB_BITS;

const P_MIN: u32 = 1;
const P_MAX: u32 = PROB_ONE - 1;

/// A binary probability model driven by the arithmetic coder.
pub trait Model {
    /// Probability that the next bit is a one, in `1..PROB_ONE`.
    fn p1(&self) -> u32;

    /// Adapts the estimate after coding `bit`.
    fn update(&mut self, bit: bool);
}

/// Single-rate shift model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shift {
    p: u16,
    shift: u8,
}

impl Shift {
    /// Creates a model starting at `p1` and adapting by `1 / 2^shift`.
    ///
    /// `p1` is clamped into `1..PROB_ONE` and `shift` to at least 1, so the
    /// estimate can never reach certainty.
    #[must_use]
    pub const fn new(p1: u16, shift: u8) -> Self {
        let p = if (p1 as u32) < P_MIN {
            P_MIN as u16
        } else if (p1 as u32) > P_MAX {
            P_MAX as u16
        } else {
            p1
        };
        let shift = if shift == 0 { 1 } else { shift };
        Self { p, shift }
    }
}

impl Model for Shift {
    #[inline]
    fn p1(&self) -> u32 {
        u32::from(self.p)
    }

    #[inline]
    fn update(&mut self, bit: bool) {
        let p = u32::from(self.p);
        let next = if bit {
            p + ((PROB_ONE - p) >> self.shift)
        } else {
            p - (p >> self.shift)
        };
        self.p = next.clamp(P_MIN, P_MAX) as u16;
    }
}

/// Two shift models at different rates, averaged.
///
/// The fast half tracks bursts, the slow half holds the long-run ratio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shift2 {
    fast: Shift,
    slow: Shift,
}

impl Shift2 {
    /// Creates a model with both halves starting at `p1`.
    #[must_use]
    pub const fn new(p1: u16, fast_shift: u8, slow_shift: u8) -> Self {
        Self {
            fast: Shift::new(p1, fast_shift),
            slow: Shift::new(p1, slow_shift),
        }
    }

    /// The "mostly zero" model used for change flags and rarely-changing bits.
    #[must_use]
    pub const fn mostly_zero(config: &ModelConfig) -> Self {
        Self::new(config.initial_p1, config.fast_shift, config.slow_shift)
    }
}

impl Model for Shift2 {
    #[inline]
    fn p1(&self) -> u32 {
        (self.fast.p1() + self.slow.p1()) / 2
    }

    #[inline]
    fn update(&mut self, bit: bool) {
        self.fast.update(bit);
        self.slow.update(bit);
    }
}

/// Non-adapting model for near-uniform bit planes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fixed {
    p: u16,
}

impl Fixed {
    /// Even odds.
    pub const HALF: Self = Self {
        p: (PROB_ONE / 2) as u16,
    };
}

impl Model for Fixed {
    #[inline]
    fn p1(&self) -> u32 {
        u32::from(self.p)
    }

    #[inline]
    fn update(&mut self, _bit: bool) {}
}
