//! # Cubesync Session
//!
//! Tick-level driver state around the snapshot codec: the history of agreed
//! frames and the two endpoints that consume it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use cubesync_session::{Receiver, Sender, SessionConfig};
//!
//! let config = SessionConfig::from_toml_str(&text)?;
//! let mut sender = Sender::new(&config)?;
//! let mut receiver = Receiver::new(&config)?;
//!
//! let bytes = sender.send(&frame)?;
//! let decoded = receiver.receive(&bytes)?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod history;
pub mod session;

pub use config::{SessionConfig, MIN_HISTORY_DEPTH};
pub use error::{SessionError, SessionResult};
pub use history::FrameHistory;
pub use session::{Receiver, Sender, SessionStats};
