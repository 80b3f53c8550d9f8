// ------------------------------------------------------------
// Drawable primitives and the per-frame update
// ------------------------------------------------------------

use crate::error::Result;
use crate::stats::{overlay_text, Statistic};
use crate::trace::TraceHistory;
use crate::trajectory::{Point2, Trajectory};

/// Everything that changes between frames.
///
/// The trace history is the only state carried from one frame to the next;
/// every other field is overwritten by [`FrameArtists::update`].
#[derive(Debug, Clone)]
pub struct FrameArtists {
    pub rod: [Point2; 3],
    pub bob1: Point2,
    pub bob2: Point2,
    pub trace: TraceHistory,
    pub overlay: Option<String>,
    pub frame: Option<usize>,
}

impl FrameArtists {
    pub fn new(trace_capacity: usize) -> Self {
        Self {
            rod: [Point2::ORIGIN; 3],
            bob1: Point2::ORIGIN,
            bob2: Point2::ORIGIN,
            trace: TraceHistory::with_capacity(trace_capacity),
            overlay: None,
            frame: None,
        }
    }

    /// Move every primitive to frame `i`. Frame 0 restarts the trace so a
    /// looping driver does not accumulate history across passes.
    pub fn update(
        &mut self,
        trajectory: &Trajectory,
        stats: Option<&[Statistic]>,
        i: usize,
    ) -> Result<()> {
        let p1 = trajectory.bob1(i)?;
        let p2 = trajectory.bob2(i)?;

        if i == 0 {
            self.trace.clear();
        }
        self.trace.push(p2);

        self.rod = [Point2::ORIGIN, p1, p2];
        self.bob1 = p1;
        self.bob2 = p2;

        // Text is left untouched when no statistics were given.
        if let Some(stats) = stats {
            self.overlay = Some(overlay_text(stats, i)?);
        }

        self.frame = Some(i);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VizError;
    use crate::trajectory::BobPath;

    fn circle_trajectory(frames: usize) -> Trajectory {
        let step = std::f64::consts::TAU / frames as f64;
        let bob1: Vec<(f64, f64)> = (0..frames)
            .map(|k| ((k as f64 * step).sin(), -(k as f64 * step).cos()))
            .collect();
        let bob2: Vec<(f64, f64)> = bob1.iter().map(|&(x, y)| (2.0 * x, 2.0 * y)).collect();
        Trajectory::new(BobPath::from_points(&bob1), BobPath::from_points(&bob2))
    }

    #[test]
    fn rod_runs_from_pivot_through_both_bobs() {
        let traj = circle_trajectory(8);
        let mut artists = FrameArtists::new(2);
        artists.update(&traj, None, 3).unwrap();

        let p1 = traj.bob1(3).unwrap();
        let p2 = traj.bob2(3).unwrap();
        assert_eq!(artists.rod, [Point2::ORIGIN, p1, p2]);
        assert_eq!(artists.bob1, p1);
        assert_eq!(artists.bob2, p2);
        assert_eq!(artists.frame, Some(3));
        assert!(artists.overlay.is_none());
    }

    #[test]
    fn wrap_to_frame_zero_restarts_trace() {
        let traj = circle_trajectory(20);
        let mut artists = FrameArtists::new(5);
        for i in 0..20 {
            artists.update(&traj, None, i).unwrap();
        }
        assert_eq!(artists.trace.len(), 5);

        artists.update(&traj, None, 0).unwrap();
        assert_eq!(artists.trace.len(), 1);
        assert_eq!(artists.trace.iter().next(), Some(&traj.bob2(0).unwrap()));
    }

    #[test]
    fn trace_holds_newest_first() {
        let traj = circle_trajectory(10);
        let mut artists = FrameArtists::new(3);
        for i in 0..4 {
            artists.update(&traj, None, i).unwrap();
        }
        let trace: Vec<Point2> = artists.trace.iter().copied().collect();
        assert_eq!(
            trace,
            vec![
                traj.bob2(3).unwrap(),
                traj.bob2(2).unwrap(),
                traj.bob2(1).unwrap()
            ]
        );
    }

    #[test]
    fn overlay_follows_frame() {
        let traj = circle_trajectory(3);
        let stats = vec![Statistic::new("E", vec![1.23456, 2.0, 3.0])];
        let mut artists = FrameArtists::new(1);

        artists.update(&traj, Some(&stats), 0).unwrap();
        assert_eq!(artists.overlay.as_deref(), Some("E:  1.235\n"));

        artists.update(&traj, Some(&stats), 2).unwrap();
        assert_eq!(artists.overlay.as_deref(), Some("E:  3.0\n"));
    }

    #[test]
    fn short_statistic_fails_lazily() {
        let traj = circle_trajectory(4);
        let stats = vec![Statistic::new("E", vec![0.0, 0.0])];
        let mut artists = FrameArtists::new(1);

        assert!(artists.update(&traj, Some(&stats), 0).is_ok());
        assert!(artists.update(&traj, Some(&stats), 1).is_ok());
        assert!(matches!(
            artists.update(&traj, Some(&stats), 2),
            Err(VizError::StatisticOutOfRange { frame: 2, .. })
        ));
    }
}
