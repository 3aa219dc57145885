//! # Sender and Receiver Endpoints
//!
//! One tick on each side:
//!
//! ```text
//! Sender                                 Receiver
//! ──────                                 ────────
//! improve(historic, baseline)            improve(historic, baseline)
//! encode(baseline, current) ──bytes────► decode(baseline, bytes) -> current
//! advance                                advance
//! ```
//!
//! Each endpoint owns its ordering tables and history. Both start from the
//! same zeroed frames and see the same committed frames, so their tables
//! never drift apart.

use cubesync_codec::{Cube, Ordering, SnapshotCodec};

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::history::FrameHistory;

/// Snapshot size statistics for one endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Snapshots handled.
    pub ticks: u64,
    /// Bytes of all snapshots handled.
    pub total_bytes: u64,
    /// Bytes of the latest snapshot.
    pub last_bytes: usize,
    /// Bytes of the largest snapshot.
    pub max_bytes: usize,
}

impl SessionStats {
    fn record(&mut self, bytes: usize) {
        self.ticks += 1;
        self.total_bytes += bytes as u64;
        self.last_bytes = bytes;
        self.max_bytes = self.max_bytes.max(bytes);
    }

    /// Mean snapshot size in bytes.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_bytes(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.total_bytes as f64 / self.ticks as f64
        }
    }
}

/// Shared state of one endpoint.
#[derive(Clone, Debug)]
struct Endpoint {
    codec: SnapshotCodec,
    ordering: Ordering,
    history: FrameHistory,
    /// Committed tick count the ordering was last improved at.
    improved_at: Option<u64>,
    stats: SessionStats,
}

impl Endpoint {
    fn new(config: &SessionConfig) -> SessionResult<Self> {
        config.validate()?;
        let codec = SnapshotCodec::new(config.codec);
        let ordering = Ordering::new(config.objects, codec.config().sort);
        Ok(Self {
            codec,
            ordering,
            history: FrameHistory::new(config.objects, config.history_depth),
            improved_at: None,
            stats: SessionStats::default(),
        })
    }

    /// Improves the ordering once per committed tick.
    ///
    /// `Approx` repair is not idempotent; a tick retried after a rejected
    /// frame reuses the tables.
    fn improve(&mut self) {
        let tick = self.history.ticks();
        if self.improved_at == Some(tick) {
            return;
        }
        self.ordering
            .improve(self.history.historic(), self.history.baseline());
        self.improved_at = Some(tick);
    }
}

/// Encoding side of a session.
#[derive(Clone, Debug)]
pub struct Sender {
    inner: Endpoint,
}

impl Sender {
    /// Creates a sender.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if `config` does not validate.
    pub fn new(config: &SessionConfig) -> SessionResult<Self> {
        Ok(Self {
            inner: Endpoint::new(config)?,
        })
    }

    /// Encodes `current` against the baseline and commits it.
    ///
    /// # Errors
    ///
    /// - [`SessionError::ObjectCount`] if `current` has the wrong length
    /// - [`SessionError::Snapshot`] if the codec rejects the frame; nothing
    ///   is committed and the next `send` retries the same tick
    pub fn send(&mut self, current: &[Cube]) -> SessionResult<Vec<u8>> {
        let inner = &mut self.inner;
        if current.len() != inner.history.objects() {
            return Err(SessionError::ObjectCount {
                expected: inner.history.objects(),
                actual: current.len(),
            });
        }

        inner.improve();
        let bytes = inner
            .codec
            .encode(&inner.ordering, inner.history.baseline(), current)?;
        inner.history.push(current);
        inner.stats.record(bytes.len());

        tracing::debug!(tick = inner.history.ticks(), bytes = bytes.len(), "sent");
        Ok(bytes)
    }

    /// The last committed frame.
    #[must_use]
    pub fn baseline(&self) -> &[Cube] {
        self.inner.history.baseline()
    }

    /// Ticks sent.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.inner.history.ticks()
    }

    /// Ordering tables as of the last tick.
    #[must_use]
    pub fn ordering(&self) -> &Ordering {
        &self.inner.ordering
    }

    /// Snapshot size statistics.
    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.inner.stats
    }
}

/// Decoding side of a session.
#[derive(Clone, Debug)]
pub struct Receiver {
    inner: Endpoint,
}

impl Receiver {
    /// Creates a receiver.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if `config` does not validate.
    pub fn new(config: &SessionConfig) -> SessionResult<Self> {
        Ok(Self {
            inner: Endpoint::new(config)?,
        })
    }

    /// Decodes a snapshot, commits the result and returns it.
    ///
    /// A damaged snapshot still commits a (wrong) frame, after which the
    /// two sides no longer share a baseline.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Snapshot`] only for frame length mismatches,
    /// which the endpoint's own buffers rule out.
    pub fn receive(&mut self, snapshot: &[u8]) -> SessionResult<&[Cube]> {
        let inner = &mut self.inner;
        inner.improve();
        {
            let (_, baseline, current) = inner.history.split_mut();
            inner.codec.decode(&inner.ordering, baseline, snapshot, current)?;
        }
        inner.history.advance();
        inner.stats.record(snapshot.len());

        tracing::debug!(tick = inner.history.ticks(), bytes = snapshot.len(), "received");
        Ok(inner.history.baseline())
    }

    /// The last committed frame.
    #[must_use]
    pub fn baseline(&self) -> &[Cube] {
        self.inner.history.baseline()
    }

    /// Ticks received.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.inner.history.ticks()
    }

    /// Ordering tables as of the last tick.
    #[must_use]
    pub fn ordering(&self) -> &Ordering {
        &self.inner.ordering
    }

    /// Snapshot size statistics.
    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.inner.stats
    }
}
