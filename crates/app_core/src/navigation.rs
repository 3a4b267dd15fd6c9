//! Sequential navigation within the open category

use serde::{Deserialize, Serialize};

/// Navigation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    pub fn delta(self) -> isize {
        match self {
            Direction::Prev => -1,
            Direction::Next => 1,
        }
    }
}

/// Index reached by one step in `direction`, wrapping at both ends.
///
/// Returns `None` when there is nothing to move to (`len <= 1`).
pub fn step_index(index: usize, len: usize, direction: Direction) -> Option<usize> {
    if len <= 1 {
        return None;
    }

    let index = index.min(len - 1);
    let next = match direction {
        Direction::Next => (index + 1) % len,
        Direction::Prev => (index + len - 1) % len,
    };
    Some(next)
}

/// Default horizontal displacement that counts as a swipe
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 50.0;

/// Detects horizontal swipe gestures from touch start/end positions
#[derive(Debug, Clone)]
pub struct SwipeTracker {
    threshold: f32,
    start: Option<(f32, f32)>,
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        let threshold = if threshold.is_finite() && threshold > 0.0 {
            threshold
        } else {
            DEFAULT_SWIPE_THRESHOLD
        };

        Self { threshold, start: None }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Record where the touch began
    pub fn touch_start(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
    }

    /// Finish the gesture; a swipe left moves to the next item
    pub fn touch_end(&mut self, x: f32, y: f32) -> Option<Direction> {
        let (start_x, start_y) = self.start.take()?;
        let dx = x - start_x;
        let dy = y - start_y;

        if dx.abs() <= self.threshold || dx.abs() < dy.abs() {
            return None;
        }

        Some(if dx < 0.0 { Direction::Next } else { Direction::Prev })
    }

    /// Drop a gesture in progress (touch cancelled)
    pub fn cancel(&mut self) {
        self.start = None;
    }

    pub fn is_tracking(&self) -> bool {
        self.start.is_some()
    }
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}
