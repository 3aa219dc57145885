//! # Codec Error Types
//!
//! All errors that can occur while packing bits, coding snapshots or
//! loading codec configuration.

use std::io;

use thiserror::Error;

/// Errors raised by the bit stream writer and reader.
///
/// The error is sticky: once a stream instance has failed, every later call
/// on it returns a clone of the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    /// The byte source ran out before the requested bits were available.
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// The underlying byte sink or source failed.
    #[error("bit stream I/O failure ({kind:?}): {message}")]
    Io {
        /// Kind reported by the failing reader or writer.
        kind: io::ErrorKind,
        /// Display text of the original error.
        message: String,
    },
}

impl From<io::Error> for BitError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::UnexpectedEof
        } else {
            Self::Io {
                kind: err.kind(),
                message: err.to_string(),
            }
        }
    }
}

/// Errors that can occur while encoding or decoding a snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// A frame does not have the object count the ordering tables were built for.
    #[error("frame length mismatch: ordering covers {expected} objects, frame has {actual}")]
    FrameLength {
        /// Object count of the ordering tables.
        expected: usize,
        /// Object count of the offending frame.
        actual: usize,
    },

    /// An object changed a field by more than the wire format can carry.
    #[error("object {index}: {field} change cannot be represented on the wire")]
    UnrepresentableChange {
        /// Object index within the frame.
        index: usize,
        /// Name of the offending field.
        field: &'static str,
    },

    /// The bit stream failed while writing.
    #[error("bit stream error: {0}")]
    Bit(#[from] BitError),
}

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML text could not be parsed into the config structure.
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is outside its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, SnapshotError>;
