//! # Session Error Types

use cubesync_codec::{ConfigError, SnapshotError};
use thiserror::Error;

/// Errors raised by the sender and receiver endpoints.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The snapshot codec rejected a frame.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    /// The session configuration could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A frame handed to the endpoint has the wrong object count.
    #[error("frame has {actual} objects, session was configured for {expected}")]
    ObjectCount {
        /// Configured object count.
        expected: usize,
        /// Object count of the offending frame.
        actual: usize,
    },
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
