//! # Snapshot Codec
//!
//! Delta + entropy coding of one frame against the last agreed baseline.
//!
//! ## Bit Layout
//!
//! Every bit goes through the arithmetic coder, in this order:
//!
//! ```text
//! 1. presence     N bits      changed[i] = current[i] != baseline[i]
//! 2. interacting  1 / changed object      interacting XOR baseline
//! 3. largest      2 / changed object      largest XOR baseline, low then high
//! 4. indexed      per group (ABC, then XYZ), only if anything changed:
//!                   W        6 bits      shared width of the group
//!                   per slot of a changed object, in ordering-table order:
//!                     w      unary, truncated at W
//!                     value  w-1 bits below the implicit leading one
//! 5. flush        coder interval, then bit stream padding
//! ```
//!
//! Nothing here says which order the slots were walked in: the receiver
//! rebuilds the same ordering tables from frames it already has.

mod models;

use std::io::{Read, Write};

use crate::bit::{bit_width, max_bit_width, zigzag_decode, zigzag_encode};
use crate::coder::{ArithDecoder, ArithEncoder};
use crate::config::CodecConfig;
use crate::cube::Cube;
use crate::error::{BitError, CodecResult, SnapshotError};
use crate::ordering::{FieldSlot, Ordering};
use models::ContextModels;

/// Bits used for a group's shared width (0..=32).
const GROUP_WIDTH_BITS: u32 = 6;

/// Widest zigzag value.
const MAX_WIDTH: u32 = 32;

/// One slot of the indexed pass: an (object, field) of a changed object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexedEntry {
    /// The slot, as ordered by the ordering engine.
    pub slot: FieldSlot,
    /// `current - baseline` for this field (wrapping).
    pub delta: i32,
}

impl IndexedEntry {
    /// Zigzag-coded delta.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> u32 {
        zigzag_encode(self.delta)
    }

    /// Bits needed for [`value`](Self::value).
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        bit_width(self.value())
    }
}

/// Encodes and decodes snapshots.
///
/// Holds only configuration; per-snapshot model state is created inside
/// each call, so one codec may serve any number of peers.
#[derive(Clone, Debug, Default)]
pub struct SnapshotCodec {
    config: CodecConfig,
}

impl SnapshotCodec {
    /// Creates a codec. Both sides must use the same config.
    #[must_use]
    pub const fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Returns the codec configuration.
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encodes `current` against `baseline`.
    ///
    /// `ordering` must already have been improved with this tick's
    /// `historic` and `baseline`.
    ///
    /// # Errors
    ///
    /// - [`SnapshotError::FrameLength`] if a frame does not match the ordering size
    /// - [`SnapshotError::UnrepresentableChange`] if `largest` changes outside
    ///   2 bits or `interacting` outside 1 bit
    pub fn encode(
        &self,
        ordering: &Ordering,
        baseline: &[Cube],
        current: &[Cube],
    ) -> CodecResult<Vec<u8>> {
        check_len(ordering, baseline)?;
        check_len(ordering, current)?;
        let changed = presence(baseline, current);
        check_flags(&changed, baseline, current)?;

        let mut models = ContextModels::new(&self.config.models);
        let mut enc = ArithEncoder::new(Vec::with_capacity(baseline.len() / 8 + 16));
        encode_passes(&mut enc, &mut models, ordering, &changed, baseline, current)?;
        let bytes = enc.finish()?;

        tracing::debug!(
            objects = baseline.len(),
            changed = changed.iter().filter(|&&c| c).count(),
            bytes = bytes.len(),
            "snapshot encoded"
        );
        Ok(bytes)
    }

    /// Rebuilds `current` from `baseline` and a snapshot.
    ///
    /// Best effort: a truncated or corrupt snapshot yields a wrong frame,
    /// not an error. Callers needing integrity compare frames externally.
    ///
    /// # Errors
    ///
    /// [`SnapshotError::FrameLength`] if a frame does not match the ordering size.
    pub fn decode(
        &self,
        ordering: &Ordering,
        baseline: &[Cube],
        snapshot: &[u8],
        current: &mut [Cube],
    ) -> CodecResult<()> {
        check_len(ordering, baseline)?;
        check_len(ordering, current)?;
        current.copy_from_slice(baseline);

        let mut models = ContextModels::new(&self.config.models);
        let mut dec = ArithDecoder::new(snapshot);
        let changed = decode_passes(&mut dec, &mut models, ordering, baseline, current);

        if let Some(err) = dec.error() {
            tracing::warn!(%err, bytes = snapshot.len(), "snapshot ended early, reconstruction is best effort");
        }
        tracing::debug!(
            objects = baseline.len(),
            changed,
            bytes = snapshot.len(),
            "snapshot decoded"
        );
        Ok(())
    }
}

/// Lists the indexed-pass slots in the order they go on the wire.
///
/// Covers every slot of every changed object: the `ABC` table's slots first,
/// then the `XYZ` table's. Slots with a zero delta cost only a width-0 code.
///
/// # Errors
///
/// [`SnapshotError::FrameLength`] if a frame does not match the ordering size.
pub fn indexed_entries(
    ordering: &Ordering,
    baseline: &[Cube],
    current: &[Cube],
) -> CodecResult<Vec<IndexedEntry>> {
    check_len(ordering, baseline)?;
    check_len(ordering, current)?;
    let changed = presence(baseline, current);
    let mut entries = group_entries(ordering.abc(), &changed, baseline, current);
    entries.extend(group_entries(ordering.xyz(), &changed, baseline, current));
    Ok(entries)
}

fn check_len(ordering: &Ordering, frame: &[Cube]) -> CodecResult<()> {
    if frame.len() == ordering.len() {
        Ok(())
    } else {
        Err(SnapshotError::FrameLength {
            expected: ordering.len(),
            actual: frame.len(),
        })
    }
}

fn check_flags(changed: &[bool], baseline: &[Cube], current: &[Cube]) -> CodecResult<()> {
    for (index, _) in changed.iter().enumerate().filter(|(_, &c)| c) {
        let (cube, base) = (&current[index], &baseline[index]);
        if (cube.interacting ^ base.interacting) & !1 != 0 {
            return Err(SnapshotError::UnrepresentableChange {
                index,
                field: "interacting",
            });
        }
        if (cube.largest ^ base.largest) & !3 != 0 {
            return Err(SnapshotError::UnrepresentableChange {
                index,
                field: "largest",
            });
        }
    }
    Ok(())
}

fn presence(baseline: &[Cube], current: &[Cube]) -> Vec<bool> {
    baseline.iter().zip(current).map(|(b, c)| b != c).collect()
}

fn group_entries(
    slots: &[FieldSlot],
    changed: &[bool],
    baseline: &[Cube],
    current: &[Cube],
) -> Vec<IndexedEntry> {
    slots
        .iter()
        .filter(|slot| changed[slot.object])
        .map(|&slot| IndexedEntry {
            slot,
            delta: current[slot.object]
                .get(slot.field)
                .wrapping_sub(baseline[slot.object].get(slot.field)),
        })
        .collect()
}

fn encode_passes<W: Write>(
    enc: &mut ArithEncoder<W>,
    models: &mut ContextModels,
    ordering: &Ordering,
    changed: &[bool],
    baseline: &[Cube],
    current: &[Cube],
) -> Result<(), BitError> {
    for &c in changed {
        enc.encode(&mut models.presence, c)?;
    }

    let changed_objects = || changed.iter().enumerate().filter(|(_, &c)| c).map(|(i, _)| i);

    for i in changed_objects() {
        let flip = (current[i].interacting ^ baseline[i].interacting) & 1;
        enc.encode(&mut models.interacting, flip == 1)?;
    }

    for i in changed_objects() {
        let flip = current[i].largest ^ baseline[i].largest;
        enc.encode(&mut models.largest[0], flip & 1 == 1)?;
        enc.encode(&mut models.largest[1], (flip >> 1) & 1 == 1)?;
    }

    for slots in [ordering.abc(), ordering.xyz()] {
        let entries = group_entries(slots, changed, baseline, current);
        if entries.is_empty() {
            continue;
        }
        let shared = max_bit_width(entries.iter().map(|e| e.delta));
        enc.encode_bits(&mut models.raw, shared, GROUP_WIDTH_BITS)?;
        tracing::trace!(entries = entries.len(), shared, "indexed group");

        for entry in &entries {
            let (value, width) = (entry.value(), entry.width());
            let expected = entry.slot.expected;
            for step in 0..width {
                enc.encode(models.width(expected, step), true)?;
            }
            if width < shared {
                enc.encode(models.width(expected, width), false)?;
            }
            if width > 1 {
                enc.encode_bits(&mut models.raw, value, width - 1)?;
            }
        }
    }
    Ok(())
}

/// Mirrors [`encode_passes`]; returns the number of changed objects.
fn decode_passes<R: Read>(
    dec: &mut ArithDecoder<R>,
    models: &mut ContextModels,
    ordering: &Ordering,
    baseline: &[Cube],
    current: &mut [Cube],
) -> usize {
    let changed: Vec<bool> = (0..baseline.len())
        .map(|_| dec.decode(&mut models.presence))
        .collect();
    let changed_objects = || changed.iter().enumerate().filter(|(_, &c)| c).map(|(i, _)| i);

    for i in changed_objects() {
        let flip = i32::from(dec.decode(&mut models.interacting));
        current[i].interacting = baseline[i].interacting ^ flip;
    }

    let mut count = 0;
    for i in changed_objects() {
        let low = i32::from(dec.decode(&mut models.largest[0]));
        let high = i32::from(dec.decode(&mut models.largest[1]));
        current[i].largest = baseline[i].largest ^ ((high << 1) | low);
        count += 1;
    }

    if count == 0 {
        return 0;
    }

    for slots in [ordering.abc(), ordering.xyz()] {
        let shared = dec
            .decode_bits(&mut models.raw, GROUP_WIDTH_BITS)
            .min(MAX_WIDTH);
        for slot in slots.iter().filter(|slot| changed[slot.object]) {
            let mut width = 0;
            while width < shared && dec.decode(models.width(slot.expected, width)) {
                width += 1;
            }
            let value = if width == 0 {
                0
            } else {
                (1 << (width - 1)) | dec.decode_bits(&mut models.raw, width - 1)
            };
            let base = baseline[slot.object].get(slot.field);
            current[slot.object].set(slot.field, base.wrapping_add(zigzag_decode(value)));
        }
    }
    count
}
