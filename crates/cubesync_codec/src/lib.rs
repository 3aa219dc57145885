//! # Cubesync Codec
//!
//! Per-tick physics state compression for a sender/receiver pair that share
//! a history of agreed frames.
//!
//! ## Pipeline
//!
//! ```text
//! historic ─┐
//!           ├─> Ordering::improve ──> slot order + expected change
//! baseline ─┘                               │
//!                                           v
//! baseline, current ──> SnapshotCodec::encode ──> ArithEncoder ──> BitWriter ──> bytes
//!
//! bytes ──> BitReader ──> ArithDecoder ──> SnapshotCodec::decode ──> current
//! ```
//!
//! ## Rules
//!
//! 1. **Shared state only** - both sides derive orderings and model contexts
//!    from frames they already hold; nothing about them goes on the wire
//! 2. **Deterministic** - identical inputs give identical bytes
//! 3. **Best-effort decode** - a short snapshot yields a wrong frame, never a panic
//!
//! ## Example
//!
//! ```rust,ignore
//! use cubesync_codec::{Cube, Ordering, SnapshotCodec, SortStrategy};
//!
//! let codec = SnapshotCodec::default();
//! let mut ordering = Ordering::new(901, SortStrategy::Stable);
//! ordering.improve(&historic, &baseline);
//! let bytes = codec.encode(&ordering, &baseline, &current)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bit;
pub mod coder;
pub mod config;
pub mod cube;
pub mod error;
pub mod ordering;
pub mod snapshot;

pub use bit::{BitReader, BitWriter};
pub use config::{CodecConfig, ModelConfig, SortStrategy};
pub use cube::{first_mismatch, Cube, Field};
pub use error::{BitError, CodecResult, ConfigError, SnapshotError};
pub use ordering::{FieldSlot, Ordering};
pub use snapshot::{indexed_entries, IndexedEntry, SnapshotCodec};
