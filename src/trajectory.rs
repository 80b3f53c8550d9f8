// ------------------------------------------------------------
// Trajectory input and the layout derived from its first frame
// ------------------------------------------------------------

use crate::error::{Result, VizError};

/// Margin applied around the fully extended pendulum.
pub const EXTENT_MARGIN: f64 = 1.1;

/// A position in world units (pivot at the origin).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Path of a single bob, stored as parallel `x` / `y` sequences.
#[derive(Debug, Clone, Default)]
pub struct BobPath {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl BobPath {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let (x, y) = points.iter().copied().unzip();
        Self { x, y }
    }

    /// Position at frame `i`. Missing samples in either sequence are reported
    /// against `series` so the caller can tell which input was short.
    fn at(&self, i: usize, series_x: &'static str, series_y: &'static str) -> Result<Point2> {
        let x = *self.x.get(i).ok_or(VizError::FrameOutOfRange {
            series: series_x,
            frame: i,
            len: self.x.len(),
        })?;
        let y = *self.y.get(i).ok_or(VizError::FrameOutOfRange {
            series: series_y,
            frame: i,
            len: self.y.len(),
        })?;
        Ok(Point2::new(x, y))
    }
}

/// Precomputed motion of both bobs.
///
/// The frame count is the length of the first bob's `x` sequence; the other
/// sequences are expected to match it and are only checked when a frame that
/// lies beyond them is requested.
#[derive(Debug, Clone)]
pub struct Trajectory {
    bob1: BobPath,
    bob2: BobPath,
}

impl Trajectory {
    pub fn new(bob1: BobPath, bob2: BobPath) -> Self {
        Self { bob1, bob2 }
    }

    pub fn len(&self) -> usize {
        self.bob1.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bob1.x.is_empty()
    }

    pub fn bob1(&self, i: usize) -> Result<Point2> {
        self.bob1.at(i, "bob 1 x", "bob 1 y")
    }

    pub fn bob2(&self, i: usize) -> Result<Point2> {
        self.bob2.at(i, "bob 2 x", "bob 2 y")
    }
}

// ------------------------------------------------------------
// Layout bounds (computed once from frame 0)
// ------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBounds {
    pub l1: f64,    // pivot to bob 1
    pub l2: f64,    // bob 1 to bob 2
    pub l_max: f64, // half-width of the square extent
}

impl LayoutBounds {
    pub fn from_first_frame(trajectory: &Trajectory) -> Result<Self> {
        if trajectory.is_empty() {
            return Err(VizError::EmptyTrajectory);
        }
        let p1 = trajectory.bob1(0)?;
        let p2 = trajectory.bob2(0)?;

        let l1 = p1.distance_to(&Point2::ORIGIN);
        let l2 = p2.distance_to(&p1);

        Ok(Self {
            l1,
            l2,
            l_max: EXTENT_MARGIN * (l1 + l2),
        })
    }
}
