// ------------------------------------------------------------
// Animation handle: scene + cached figure + frame driver settings
// ------------------------------------------------------------

use std::fs;
use std::path::Path;
use std::time::Duration;

use image::RgbImage;

use crate::artists::FrameArtists;
use crate::canvas::Figure;
use crate::error::{Result, VizError};
use crate::jshtml::JsHtmlEncoder;
use crate::stats::Statistic;
use crate::trace::TraceHistory;
use crate::trajectory::{LayoutBounds, Trajectory};
use crate::window::run_window;

/// Fixed name of the saved player, written to the working directory.
pub const OUTPUT_FILE: &str = "double_pendulum.html";

// Driver interval in milliseconds per second of `dt`.
const INTERVAL_MS_PER_DT: f64 = 500.0;

const WINDOW_TITLE: &str = "Double pendulum";

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Seconds between frames; the driver interval is `dt * 500` ms.
    pub dt: f64,
    /// Fraction of all frames kept in the fading trace.
    pub trace_len: f64,
    /// Write `double_pendulum.html` in the working directory.
    pub save: bool,
    /// Print progress lines.
    pub verbose: bool,
    /// Draw grid and tick labels instead of hiding the axes.
    pub axes: bool,
    /// Block on an interactive window.
    pub show: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dt: 0.01,
            trace_len: 0.1,
            save: false,
            verbose: true,
            axes: false,
            show: true,
        }
    }
}

fn frame_interval(dt: f64) -> Result<Duration> {
    let ms = dt * INTERVAL_MS_PER_DT;
    Duration::try_from_secs_f64(ms / 1000.0).map_err(|e| VizError::InvalidOption {
        name: "dt",
        reason: format!("cannot use {} as a time step: {}", dt, e),
    })
}

/// A fully configured animation, ready to be saved, shown or stepped.
#[derive(Debug, Clone)]
pub struct Animation {
    trajectory: Trajectory,
    stats: Option<Vec<Statistic>>,
    layout: LayoutBounds,
    figure: Figure,
    interval: Duration,
    trace_capacity: usize,
}

impl Animation {
    pub fn new(
        trajectory: Trajectory,
        stats: Option<Vec<Statistic>>,
        options: &RenderOptions,
    ) -> Result<Self> {
        let layout = LayoutBounds::from_first_frame(&trajectory)?;
        let interval = frame_interval(options.dt)?;
        let trace_capacity = TraceHistory::capacity_for(options.trace_len, trajectory.len())?;
        let figure = Figure::new(layout.l_max, options.axes)?;

        log::debug!(
            "l1 = {:.4}, l2 = {:.4}, l_max = {:.4}, {} frames every {:?}, trace of {}",
            layout.l1,
            layout.l2,
            layout.l_max,
            trajectory.len(),
            interval,
            trace_capacity
        );

        Ok(Self {
            trajectory,
            stats,
            layout,
            figure,
            interval,
            trace_capacity,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.trajectory.len()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn layout(&self) -> &LayoutBounds {
        &self.layout
    }

    pub fn trace_capacity(&self) -> usize {
        self.trace_capacity
    }

    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    /// Fresh primitives with an empty trace of the right capacity.
    pub fn artists(&self) -> FrameArtists {
        FrameArtists::new(self.trace_capacity)
    }

    pub fn update(&self, artists: &mut FrameArtists, i: usize) -> Result<()> {
        artists.update(&self.trajectory, self.stats.as_deref(), i)
    }

    pub fn render_frame(&self, artists: &mut FrameArtists, i: usize) -> Result<RgbImage> {
        self.update(artists, i)?;
        self.figure.rasterize(artists)
    }

    /// Every frame, in order, as a self-contained HTML player.
    pub fn to_jshtml(&self) -> Result<String> {
        let mut encoder = JsHtmlEncoder::new(self.interval);
        let mut artists = self.artists();
        for i in 0..self.frame_count() {
            let img = self.render_frame(&mut artists, i)?;
            if !encoder.push_frame(&img)? {
                break;
            }
        }
        log::debug!(
            "encoded {} of {} frames",
            encoder.frame_count(),
            self.frame_count()
        );
        Ok(encoder.finish())
    }

    pub fn save_html(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let html = self.to_jshtml()?;
        fs::write(path, html)?;
        log::info!("animation saved to {}", path.display());
        Ok(())
    }

    /// Loop the animation in a window until the user closes it.
    pub fn show(&self) -> Result<()> {
        let mut artists = self.artists();
        run_window(
            WINDOW_TITLE,
            self.figure.width(),
            self.figure.height(),
            self.interval,
            self.frame_count(),
            |i| self.render_frame(&mut artists, i),
        )
    }
}

/// Build the animation for two bob paths, then save and/or show it as the
/// options request. The handle is returned either way.
pub fn visualize_double_pendulum(
    trajectory: Trajectory,
    stats: Option<Vec<Statistic>>,
    options: &RenderOptions,
) -> Result<Animation> {
    let animation = Animation::new(trajectory, stats, options)?;

    if options.save {
        if options.verbose {
            println!("Animation being saved...");
        }
        animation.save_html(OUTPUT_FILE)?;
    }

    if options.verbose {
        println!("Animation begin...");
        println!("Hit CTRL+W to exit");
    }
    if options.show {
        animation.show()?;
    }

    Ok(animation)
}
