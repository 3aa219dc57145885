//! # Frame History
//!
//! Ring of agreed frames plus the buffer for the frame being built.
//!
//! ```text
//! committed ring (depth - 1 slots)          building
//! [t-3] [t-2] [t-1] [t-0] ...               [current]
//!         │      │     │                        │
//!         │   historic baseline                 │
//!         └───── oldest slot is recycled ◄──────┘ advance()
//! ```
//!
//! `advance` swaps buffers, so a tick never allocates.

use cubesync_codec::Cube;

/// Fixed-capacity history of N-object frames.
#[derive(Clone, Debug)]
pub struct FrameHistory {
    /// Committed frames; `head` is the newest.
    frames: Vec<Vec<Cube>>,
    head: usize,
    /// Frame under construction for the next tick.
    current: Vec<Cube>,
    /// Ticks committed so far.
    ticks: u64,
}

impl FrameHistory {
    /// Creates a history of `depth` buffers for `objects` objects, all zeroed.
    ///
    /// # Panics
    ///
    /// Panics if `depth < 3`; validated configs never hit this.
    #[must_use]
    pub fn new(objects: usize, depth: usize) -> Self {
        assert!(depth >= 3, "history depth {depth} < 3");
        Self {
            frames: vec![vec![Cube::default(); objects]; depth - 1],
            head: 0,
            current: vec![Cube::default(); objects],
            ticks: 0,
        }
    }

    /// Objects per frame.
    #[must_use]
    pub fn objects(&self) -> usize {
        self.current.len()
    }

    /// Total buffers, including the one being built.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len() + 1
    }

    /// Ticks committed with [`advance`](Self::advance).
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    fn slot(&self, age: usize) -> usize {
        let len = self.frames.len();
        (self.head + len - age) % len
    }

    /// Committed frame `age` ticks back; 0 is the baseline.
    #[must_use]
    pub fn frame(&self, age: usize) -> Option<&[Cube]> {
        (age < self.frames.len()).then(|| self.frames[self.slot(age)].as_slice())
    }

    /// The newest committed frame.
    #[must_use]
    pub fn baseline(&self) -> &[Cube] {
        &self.frames[self.slot(0)]
    }

    /// The committed frame before the baseline.
    #[must_use]
    pub fn historic(&self) -> &[Cube] {
        &self.frames[self.slot(1)]
    }

    /// The frame being built.
    pub fn current_mut(&mut self) -> &mut [Cube] {
        &mut self.current
    }

    /// Historic, baseline and the frame being built, borrowed together.
    pub fn split_mut(&mut self) -> (&[Cube], &[Cube], &mut [Cube]) {
        let (historic, baseline) = (self.slot(1), self.slot(0));
        (
            &self.frames[historic],
            &self.frames[baseline],
            &mut self.current,
        )
    }

    /// Commits the current frame as the new baseline.
    ///
    /// The oldest committed frame's buffer becomes the next current buffer;
    /// its contents are stale until overwritten.
    pub fn advance(&mut self) {
        self.head = (self.head + 1) % self.frames.len();
        std::mem::swap(&mut self.frames[self.head], &mut self.current);
        self.ticks += 1;
    }

    /// Copies `frame` into the current buffer and commits it.
    ///
    /// # Panics
    ///
    /// Panics if `frame` does not have [`objects`](Self::objects) objects.
    pub fn push(&mut self, frame: &[Cube]) {
        self.current.copy_from_slice(frame);
        self.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marked(tag: i32) -> Vec<Cube> {
        vec![Cube { x: tag, ..Cube::default() }; 2]
    }

    #[test]
    fn test_starts_zeroed() {
        let history = FrameHistory::new(4, 8);
        assert_eq!(history.depth(), 8);
        assert_eq!(history.objects(), 4);
        assert_eq!(history.ticks(), 0);
        assert!(history.baseline().iter().all(|c| *c == Cube::default()));
        assert!(history.historic().iter().all(|c| *c == Cube::default()));
    }

    #[test]
    fn test_push_rotates_baseline_and_historic() {
        let mut history = FrameHistory::new(2, 3);
        history.push(&marked(1));
        assert_eq!(history.baseline(), marked(1).as_slice());
        assert_eq!(history.historic(), marked(0).as_slice());

        history.push(&marked(2));
        history.push(&marked(3));
        assert_eq!(history.baseline(), marked(3).as_slice());
        assert_eq!(history.historic(), marked(2).as_slice());
        assert_eq!(history.ticks(), 3);
    }

    #[test]
    fn test_frame_by_age() {
        let mut history = FrameHistory::new(2, 5);
        for tag in 1..=6 {
            history.push(&marked(tag));
        }
        assert_eq!(history.frame(0), Some(marked(6).as_slice()));
        assert_eq!(history.frame(3), Some(marked(3).as_slice()));
        assert_eq!(history.frame(4), None);
    }

    #[test]
    fn test_split_mut_then_advance() {
        let mut history = FrameHistory::new(2, 4);
        history.push(&marked(1));
        {
            let (historic, baseline, current) = history.split_mut();
            assert_eq!(historic, marked(0).as_slice());
            current.copy_from_slice(baseline);
            current[1].y = 9;
        }
        history.advance();
        assert_eq!(history.baseline()[0].x, 1);
        assert_eq!(history.baseline()[1].y, 9);
        assert_eq!(history.historic(), marked(1).as_slice());
    }

    #[test]
    fn test_current_mut_then_advance() {
        let mut history = FrameHistory::new(2, 3);
        history.current_mut()[0].z = -4;
        history.advance();
        assert_eq!(history.baseline()[0].z, -4);
        assert_eq!(history.ticks(), 1);
    }

    #[test]
    #[should_panic(expected = "history depth")]
    fn test_depth_below_three_is_fatal() {
        let _ = FrameHistory::new(1, 2);
    }
}
