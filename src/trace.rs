// ------------------------------------------------------------
// Bounded history of the second bob (fading trace)
// ------------------------------------------------------------

use std::collections::VecDeque;

use crate::error::{Result, VizError};
use crate::trajectory::Point2;

/// Most recent positions, newest at the front. A full buffer evicts from the
/// back; a zero-capacity buffer never holds anything.
#[derive(Debug, Clone)]
pub struct TraceHistory {
    points: VecDeque<Point2>,
    capacity: usize,
}

impl TraceHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Capacity for a trail covering `fraction` of `frames`, truncated.
    pub fn capacity_for(fraction: f64, frames: usize) -> Result<usize> {
        if !fraction.is_finite() || fraction < 0.0 {
            return Err(VizError::InvalidOption {
                name: "trace_len",
                reason: format!("expected a finite non-negative fraction, got {}", fraction),
            });
        }
        Ok((fraction * frames as f64).floor() as usize)
    }

    pub fn push(&mut self, point: Point2) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() >= self.capacity {
            self.points.pop_back();
        }
        self.points.push_front(point);
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point2> {
        self.points.iter()
    }
}
