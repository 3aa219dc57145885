//! # Object State
//!
//! One quantized object ("cube") per index; a frame is a slice of cubes
//! whose index identity is stable across ticks.
//!
//! ## Fields
//!
//! | Field         | Range  | Wire treatment                     |
//! |---------------|--------|------------------------------------|
//! | `largest`     | 0..=3  | 2-bit XOR against baseline         |
//! | `interacting` | 0..=1  | 1-bit XOR against baseline         |
//! | `a`, `b`, `c` | i32    | zigzag delta, ordered by `ABC`     |
//! | `x`, `y`, `z` | i32    | zigzag delta, ordered by `XYZ`     |

use serde::{Deserialize, Serialize};

use crate::bit::max_bit_width;

/// One object's quantized state at one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cube {
    /// Index of the largest quaternion component that was dropped (0..=3).
    pub largest: i32,
    /// First orientation component.
    pub a: i32,
    /// Second orientation component.
    pub b: i32,
    /// Third orientation component.
    pub c: i32,
    /// Position X.
    pub x: i32,
    /// Position Y.
    pub y: i32,
    /// Position Z.
    pub z: i32,
    /// 1 when the object is touching another object, else 0.
    pub interacting: i32,
}

/// One of the six delta-coded integer fields of a [`Cube`].
///
/// Being an enum, a field index is in range by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Field {
    /// Orientation A.
    A = 0,
    /// Orientation B.
    B = 1,
    /// Orientation C.
    C = 2,
    /// Position X.
    X = 3,
    /// Position Y.
    Y = 4,
    /// Position Z.
    Z = 5,
}

impl Field {
    /// All six fields in wire order.
    pub const ALL: [Self; 6] = [Self::A, Self::B, Self::C, Self::X, Self::Y, Self::Z];

    /// The orientation group, covered by the `ABC` ordering table.
    pub const ORIENTATION: [Self; 3] = [Self::A, Self::B, Self::C];

    /// The position group, covered by the `XYZ` ordering table.
    pub const POSITION: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Lower-case field name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

impl Cube {
    /// Size of one little-endian record.
    pub const RECORD_SIZE: usize = 32;

    /// Reads one of the six delta-coded fields.
    #[inline]
    #[must_use]
    pub const fn get(&self, field: Field) -> i32 {
        match field {
            Field::A => self.a,
            Field::B => self.b,
            Field::C => self.c,
            Field::X => self.x,
            Field::Y => self.y,
            Field::Z => self.z,
        }
    }

    /// Writes one of the six delta-coded fields.
    #[inline]
    pub fn set(&mut self, field: Field, value: i32) {
        let slot = match field {
            Field::A => &mut self.a,
            Field::B => &mut self.b,
            Field::C => &mut self.c,
            Field::X => &mut self.x,
            Field::Y => &mut self.y,
            Field::Z => &mut self.z,
        };
        *slot = value;
    }

    /// Widest zigzag-coded change of any field relative to `base`.
    ///
    /// Flags count by XOR, integers by wrapping difference. Zero means the
    /// cube is unchanged.
    #[must_use]
    pub fn delta_bits(&self, base: &Self) -> u32 {
        let flags = [
            self.interacting ^ base.interacting,
            self.largest ^ base.largest,
        ];
        let deltas = Field::ALL.map(|f| self.get(f).wrapping_sub(base.get(f)));
        max_bit_width(flags.into_iter().chain(deltas))
    }

    /// Serializes the record: largest, a, b, c, x, y, z, interacting.
    #[must_use]
    pub fn to_le_bytes(&self) -> [u8; Self::RECORD_SIZE] {
        let words = [
            self.largest,
            self.a,
            self.b,
            self.c,
            self.x,
            self.y,
            self.z,
            self.interacting,
        ];
        let mut out = [0u8; Self::RECORD_SIZE];
        for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    /// Inverse of [`to_le_bytes`](Self::to_le_bytes).
    #[must_use]
    pub fn from_le_bytes(bytes: &[u8; Self::RECORD_SIZE]) -> Self {
        let mut words = [0i32; 8];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        let [largest, a, b, c, x, y, z, interacting] = words;
        Self {
            largest,
            a,
            b,
            c,
            x,
            y,
            z,
            interacting,
        }
    }
}

/// Index of the first object where two frames differ.
///
/// Frames of different length differ at the shorter length. `None` means
/// the frames are identical.
#[must_use]
pub fn first_mismatch(expected: &[Cube], actual: &[Cube]) -> Option<usize> {
    expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_cover_every_field() {
        let mut cube = Cube::default();
        for (i, field) in Field::ALL.into_iter().enumerate() {
            cube.set(field, i as i32 + 10);
        }
        assert_eq!(
            cube,
            Cube {
                a: 10,
                b: 11,
                c: 12,
                x: 13,
                y: 14,
                z: 15,
                ..Cube::default()
            }
        );
        for (i, field) in Field::ALL.into_iter().enumerate() {
            assert_eq!(cube.get(field), i as i32 + 10, "{}", field.name());
        }
    }

    #[test]
    fn test_groups_partition_fields() {
        let mut joined: Vec<Field> = Field::ORIENTATION.to_vec();
        joined.extend(Field::POSITION);
        assert_eq!(joined, Field::ALL.to_vec());
    }

    #[test]
    fn test_delta_bits() {
        let base = Cube::default();
        assert_eq!(base.delta_bits(&base), 0);

        let moved = Cube { x: 3, ..base };
        assert_eq!(moved.delta_bits(&base), 3);

        let flipped = Cube { interacting: 1, ..base };
        assert_eq!(flipped.delta_bits(&base), 2);

        let wrapped = Cube { y: i32::MIN, ..base };
        assert_eq!(wrapped.delta_bits(&base), 32);
    }

    #[test]
    fn test_record_layout() {
        let cube = Cube {
            largest: 2,
            a: -1,
            b: 256,
            c: 0,
            x: 1,
            y: -2,
            z: 3,
            interacting: 1,
        };
        let bytes = cube.to_le_bytes();
        assert_eq!(&bytes[0..4], &[2, 0, 0, 0]);
        assert_eq!(&bytes[4..8], &[0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(&bytes[8..12], &[0, 1, 0, 0]);
        assert_eq!(&bytes[28..32], &[1, 0, 0, 0]);
        assert_eq!(Cube::from_le_bytes(&bytes), cube);
    }

    #[test]
    fn test_first_mismatch() {
        let a = vec![Cube::default(); 4];
        let mut b = a.clone();
        assert_eq!(first_mismatch(&a, &b), None);

        b[2].z = 9;
        assert_eq!(first_mismatch(&a, &b), Some(2));

        assert_eq!(first_mismatch(&a, &a[..3]), Some(3));
    }
}
