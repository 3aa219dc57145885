//! # Ordering Engine
//!
//! Permutations that predict a good traversal order for this tick, computed
//! only from frames both sides already hold.
//!
//! ## Why it works
//!
//! ```text
//! order(historic → baseline, attr)  ≈  order(baseline → current, attr)
//! ```
//!
//! Objects that moved last tick tend to move this tick, by a similar amount.
//! Sorting the (object, field) slots by last tick's change clusters the
//! near-zero deltas, which is what the adaptive width models feed on. The
//! order never needs to be perfect, only identical on both sides, so every
//! sort here is stable and seeded from the previous tick's order.

use crate::bit::zigzag_encode;
use crate::config::SortStrategy;
use crate::cube::{Cube, Field};

/// One (object, field) slot of the flattened delta domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSlot {
    /// Object index within the frame.
    pub object: usize,
    /// Which of the six delta-coded fields.
    pub field: Field,
    /// Zigzag of last tick's change of this field (baseline - historic).
    pub expected: u32,
}

/// Per-attribute traversal orders, mutated in place every tick.
///
/// `abc` and `xyz` each cover their group's 3·N slots; together they span
/// the 6·N flattened (object, field) domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ordering {
    strategy: SortStrategy,
    largest: Vec<usize>,
    interacting: Vec<usize>,
    abc: Vec<FieldSlot>,
    xyz: Vec<FieldSlot>,
}

impl Ordering {
    /// Creates identity tables for `objects` objects.
    #[must_use]
    pub fn new(objects: usize, strategy: SortStrategy) -> Self {
        Self {
            strategy,
            largest: (0..objects).collect(),
            interacting: (0..objects).collect(),
            abc: identity_slots(objects, Field::ORIENTATION),
            xyz: identity_slots(objects, Field::POSITION),
        }
    }

    /// Number of objects the tables cover.
    #[must_use]
    pub fn len(&self) -> usize {
        self.largest.len()
    }

    /// True when the tables cover no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.largest.is_empty()
    }

    /// Sort strategy chosen at construction.
    #[must_use]
    pub const fn strategy(&self) -> SortStrategy {
        self.strategy
    }

    /// Objects by ascending baseline `largest`.
    #[must_use]
    pub fn by_largest(&self) -> &[usize] {
        &self.largest
    }

    /// Objects by ascending baseline `interacting`.
    #[must_use]
    pub fn by_interacting(&self) -> &[usize] {
        &self.interacting
    }

    /// Orientation slots by ascending expected change.
    #[must_use]
    pub fn abc(&self) -> &[FieldSlot] {
        &self.abc
    }

    /// Position slots by ascending expected change.
    #[must_use]
    pub fn xyz(&self) -> &[FieldSlot] {
        &self.xyz
    }

    /// Re-sorts every table from the two newest shared frames.
    ///
    /// Ties keep their previous relative order, so two instances fed the
    /// same frames always hold identical tables.
    ///
    /// # Panics
    ///
    /// Panics if either frame does not have [`len`](Self::len) objects; the
    /// index domain is fixed at construction.
    pub fn improve(&mut self, historic: &[Cube], baseline: &[Cube]) {
        assert_eq!(historic.len(), self.len(), "historic frame length");
        assert_eq!(baseline.len(), self.len(), "baseline frame length");

        for slot in self.abc.iter_mut().chain(self.xyz.iter_mut()) {
            let (hist, base) = (&historic[slot.object], &baseline[slot.object]);
            slot.expected = zigzag_encode(base.get(slot.field).wrapping_sub(hist.get(slot.field)));
        }

        match self.strategy {
            SortStrategy::Frozen => {}
            SortStrategy::Stable => {
                self.largest.sort_by_key(|&i| baseline[i].largest);
                self.interacting.sort_by_key(|&i| baseline[i].interacting);
                self.abc.sort_by_key(|slot| slot.expected);
                self.xyz.sort_by_key(|slot| slot.expected);
            }
            SortStrategy::Approx { max_passes } => {
                let passes = [
                    repair(&mut self.largest, max_passes, |&i| baseline[i].largest),
                    repair(&mut self.interacting, max_passes, |&i| baseline[i].interacting),
                    repair(&mut self.abc, max_passes, |slot| slot.expected),
                    repair(&mut self.xyz, max_passes, |slot| slot.expected),
                ];
                tracing::trace!(?passes, "ordering repaired");
            }
        }
    }
}

fn identity_slots(objects: usize, fields: [Field; 3]) -> Vec<FieldSlot> {
    fields
        .into_iter()
        .flat_map(|field| {
            (0..objects).map(move |object| FieldSlot {
                object,
                field,
                expected: 0,
            })
        })
        .collect()
}

/// Bounded bubble passes; stops after the first pass without a swap.
///
/// Only strictly out-of-order neighbours swap, so equal keys keep their
/// relative order. Returns the number of passes that swapped something.
fn repair<T, K, F>(items: &mut [T], max_passes: u32, key: F) -> u32
where
    K: Ord,
    F: Fn(&T) -> K,
{
    for pass in 0..max_passes {
        let mut swapped = false;
        for i in 1..items.len() {
            if key(&items[i - 1]) > key(&items[i]) {
                items.swap(i - 1, i);
                swapped = true;
            }
        }
        if !swapped {
            return pass;
        }
    }
    max_passes
}
