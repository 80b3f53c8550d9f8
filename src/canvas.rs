// ------------------------------------------------------------
// Figure: static background (Plotters) + dynamic primitives (imageproc)
// ------------------------------------------------------------
//
// The background (fill, grid, tick labels) is drawn once and cached. Every
// frame starts from a copy of it, so only the moving parts are redrawn:
//   1) rod, trace and bobs are rasterized with imageproc on an RGBA copy
//   2) the statistics overlay is drawn on top with Plotters
// ------------------------------------------------------------

use std::ops::Range;

use image::{DynamicImage, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, Blend, Canvas};
use plotters::prelude::*;

use crate::artists::FrameArtists;
use crate::error::{Result, VizError};
use crate::trajectory::Point2;

// 4 in x 4 in at 100 dpi.
pub const CANVAS_W: u32 = 400;
pub const CANVAS_H: u32 = 400;

// Smallest half-extent handed to the coordinate mapping; a degenerate
// (zero-length) pendulum collapses onto the centre pixel.
const MIN_HALF_EXTENT: f64 = 1e-9;

const ROD_THICKNESS_PX: i32 = 3;
const BOB_RADIUS_PX: i32 = 4;
const FONT_PX: f64 = 14.0;
const LINE_HEIGHT_PX: i32 = 17;

// Overlay anchor in axes fractions (x from the left, y from the bottom).
const OVERLAY_ANCHOR: (f64, f64) = (0.05, 0.8);

fn rgba(r: u8, g: u8, b: u8, a: u8) -> Rgba<u8> {
    Rgba([r, g, b, a])
}

fn draw_err<E: std::fmt::Display>(e: E) -> VizError {
    VizError::Draw(e.to_string())
}

// ------------------------------------------------------------
// World -> pixel mapping for the square plotting area
// ------------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    x0: f64,
    y0: f64,
    side: f64,
    half_extent: f64,
}

impl Viewport {
    pub fn new(x_px: Range<i32>, y_px: Range<i32>, half_extent: f64) -> Self {
        let w = (x_px.end - x_px.start).max(1) as f64;
        let h = (y_px.end - y_px.start).max(1) as f64;
        let side = w.min(h);
        Self {
            x0: x_px.start as f64 + 0.5 * (w - side),
            y0: y_px.start as f64 + 0.5 * (h - side),
            side,
            half_extent: half_extent.max(MIN_HALF_EXTENT),
        }
    }

    /// Image-space position (y grows downward).
    pub fn to_pixel(&self, p: Point2) -> (f32, f32) {
        let span = 2.0 * self.half_extent;
        let u = (p.x + self.half_extent) / span;
        let v = (self.half_extent - p.y) / span;
        (
            (self.x0 + u * self.side) as f32,
            (self.y0 + v * self.side) as f32,
        )
    }

    /// Pixel position of an axes-fraction coordinate (origin bottom-left).
    pub fn axes_fraction(&self, fx: f64, fy: f64) -> (i32, i32) {
        (
            (self.x0 + fx * self.side).round() as i32,
            (self.y0 + (1.0 - fy) * self.side).round() as i32,
        )
    }
}

// ------------------------------------------------------------
// Segment clipping (Liang-Barsky)
// Bobs that leave the frame-0 extent can map far outside the image; clipping
// keeps line rasterization proportional to what is visible.
// ------------------------------------------------------------
fn clip_segment(
    start: (f32, f32),
    end: (f32, f32),
    w: f32,
    h: f32,
) -> Option<((f32, f32), (f32, f32))> {
    if !(start.0.is_finite() && start.1.is_finite() && end.0.is_finite() && end.1.is_finite()) {
        return None;
    }
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let mut t0 = 0.0_f32;
    let mut t1 = 1.0_f32;

    let edges = [
        (-dx, start.0 + 1.0),
        (dx, w - start.0),
        (-dy, start.1 + 1.0),
        (dy, h - start.1),
    ];
    for (p, q) in edges {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some((
        (start.0 + t0 * dx, start.1 + t0 * dy),
        (start.0 + t1 * dx, start.1 + t1 * dy),
    ))
}

fn draw_clipped_line<C: Canvas>(
    canvas: &mut C,
    start: (f32, f32),
    end: (f32, f32),
    color: C::Pixel,
) {
    let (w, h) = canvas.dimensions();
    if let Some((s, e)) = clip_segment(start, end, w as f32, h as f32) {
        draw_line_segment_mut(canvas, s, e, color);
    }
}

// Thick line as parallel offsets of a 1 px segment. Zero-length rods draw
// nothing; the bob marker covers that point anyway.
fn draw_thick_line_segment<C: Canvas>(
    canvas: &mut C,
    start: (f32, f32),
    end: (f32, f32),
    thickness_px: i32,
    color: C::Pixel,
) {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;

    let len = (dx * dx + dy * dy).sqrt();
    if !(len >= 1e-3) {
        return;
    }

    let nx = -dy / len;
    let ny = dx / len;

    let half = thickness_px.max(1) / 2;

    for k in -half..=half {
        let off = k as f32;
        let s = (start.0 + nx * off, start.1 + ny * off);
        let e = (end.0 + nx * off, end.1 + ny * off);
        draw_clipped_line(canvas, s, e, color);
    }
}

fn draw_bob<C: Canvas>(canvas: &mut C, center: (f32, f32), color: C::Pixel) {
    let (w, h) = canvas.dimensions();
    let r = BOB_RADIUS_PX as f32;
    let visible_x = center.0 >= -r && center.0 <= w as f32 + r;
    let visible_y = center.1 >= -r && center.1 <= h as f32 + r;
    if !(visible_x && visible_y) {
        return;
    }
    draw_filled_circle_mut(
        canvas,
        (center.0.round() as i32, center.1.round() as i32),
        BOB_RADIUS_PX,
        color,
    );
}

// ------------------------------------------------------------
// Figure
// ------------------------------------------------------------

/// Fixed-extent square drawing surface with its cached background.
#[derive(Debug, Clone)]
pub struct Figure {
    width: u32,
    height: u32,
    background: Vec<u8>, // RGB8, row-major
    viewport: Viewport,
    axes: bool,
}

impl Figure {
    /// Render the static background for the extent `[-l_max, l_max]^2`.
    /// With `axes` a grid and tick labels are drawn, otherwise the axes are
    /// hidden.
    pub fn new(l_max: f64, axes: bool) -> Result<Self> {
        let (width, height) = (CANVAS_W, CANVAS_H);
        let half = l_max.max(MIN_HALF_EXTENT);
        let mut background = vec![0u8; (width * height * 3) as usize];

        let viewport = {
            let root = BitMapBackend::with_buffer(&mut background, (width, height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let mut builder = ChartBuilder::on(&root);
            if axes {
                // Label areas on the left/bottom, margins balance them so the
                // plotting area stays square.
                builder
                    .margin_top(20)
                    .margin_right(20)
                    .margin_bottom(20)
                    .margin_left(10)
                    .x_label_area_size(30)
                    .y_label_area_size(40);
            } else {
                builder.margin(35);
            }
            let mut chart = builder
                .build_cartesian_2d(-half..half, -half..half)
                .map_err(draw_err)?;

            if axes {
                chart
                    .configure_mesh()
                    .label_style(("sans-serif", 12))
                    .x_labels(9)
                    .y_labels(9)
                    .x_label_formatter(&|v| format!("{:.1}", v))
                    .y_label_formatter(&|v| format!("{:.1}", v))
                    .bold_line_style(BLACK.mix(0.5).stroke_width(1))
                    .light_line_style(TRANSPARENT.stroke_width(0))
                    .draw()
                    .map_err(draw_err)?;
            }

            let (x_px, y_px) = chart.plotting_area().get_pixel_range();
            root.present().map_err(draw_err)?;
            Viewport::new(x_px, y_px, half)
        };

        log::debug!(
            "figure {}x{} px, half extent {:.4}, axes {}",
            width,
            height,
            half,
            axes
        );

        Ok(Self {
            width,
            height,
            background,
            viewport,
            axes,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn has_axes(&self) -> bool {
        self.axes
    }

    /// Copy of the cached background.
    pub fn background(&self) -> Result<RgbImage> {
        RgbImage::from_raw(self.width, self.height, self.background.clone())
            .ok_or_else(|| VizError::Draw("background buffer has the wrong size".into()))
    }

    /// Draw the current primitives on a copy of the background.
    pub fn rasterize(&self, artists: &FrameArtists) -> Result<RgbImage> {
        let mut img: RgbaImage = DynamicImage::ImageRgb8(self.background()?).to_rgba8();
        let vp = &self.viewport;

        // Rod: pivot -> bob 1 -> bob 2
        let black = rgba(0, 0, 0, 255);
        for pair in artists.rod.windows(2) {
            draw_thick_line_segment(
                &mut img,
                vp.to_pixel(pair[0]),
                vp.to_pixel(pair[1]),
                ROD_THICKNESS_PX,
                black,
            );
        }

        // Trace: translucent red polyline, newest point first
        let mut blend = Blend(img);
        let trace_color = rgba(255, 0, 0, 51);
        let trace: Vec<(f32, f32)> = artists.trace.iter().map(|p| vp.to_pixel(*p)).collect();
        for seg in trace.windows(2) {
            draw_clipped_line(&mut blend, seg[0], seg[1], trace_color);
        }
        let mut img = blend.0;

        // Bobs sit above rod and trace
        draw_bob(&mut img, vp.to_pixel(artists.bob1), rgba(0, 0, 255, 255));
        draw_bob(&mut img, vp.to_pixel(artists.bob2), rgba(255, 0, 0, 255));

        let mut rgb = DynamicImage::ImageRgba8(img).to_rgb8().into_raw();

        if let Some(text) = artists.overlay.as_deref() {
            self.draw_overlay(&mut rgb, text)?;
        }

        RgbImage::from_raw(self.width, self.height, rgb)
            .ok_or_else(|| VizError::Draw("frame buffer has the wrong size".into()))
    }

    // Lines stack upward so the block ends at the anchor.
    fn draw_overlay(&self, rgb: &mut [u8], text: &str) -> Result<()> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return Ok(());
        }

        let root = BitMapBackend::with_buffer(rgb, (self.width, self.height)).into_drawing_area();
        let (ax, ay) = self
            .viewport
            .axes_fraction(OVERLAY_ANCHOR.0, OVERLAY_ANCHOR.1);
        let top = ay - lines.len() as i32 * LINE_HEIGHT_PX;

        for (k, line) in lines.iter().enumerate() {
            root.draw(&Text::new(
                line.to_string(),
                (ax, top + k as i32 * LINE_HEIGHT_PX),
                ("sans-serif", FONT_PX).into_font().color(&BLACK),
            ))
            .map_err(draw_err)?;
        }
        root.present().map_err(draw_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::{BobPath, Trajectory};

    fn pixel_at(img: &RgbImage, p: (f32, f32)) -> [u8; 3] {
        img.get_pixel(p.0.round() as u32, p.1.round() as u32).0
    }

    #[test]
    fn viewport_maps_extent_corners_and_origin() {
        let vp = Viewport::new(35..365, 35..365, 2.0);
        assert_eq!(vp.to_pixel(Point2::ORIGIN), (200.0, 200.0));
        assert_eq!(vp.to_pixel(Point2::new(-2.0, 2.0)), (35.0, 35.0));
        assert_eq!(vp.to_pixel(Point2::new(2.0, -2.0)), (365.0, 365.0));
    }

    #[test]
    fn viewport_centres_non_square_area() {
        let vp = Viewport::new(0..200, 0..100, 1.0);
        assert_eq!(vp.to_pixel(Point2::ORIGIN), (100.0, 50.0));
        assert_eq!(vp.to_pixel(Point2::new(-1.0, 0.0)), (50.0, 50.0));
    }

    #[test]
    fn zero_extent_maps_origin_to_centre() {
        let vp = Viewport::new(35..365, 35..365, 0.0);
        assert_eq!(vp.to_pixel(Point2::ORIGIN), (200.0, 200.0));
    }

    #[test]
    fn clipping_rejects_outside_and_trims_crossing_segments() {
        assert!(clip_segment((-50.0, -50.0), (-10.0, -20.0), 100.0, 100.0).is_none());
        assert!(clip_segment((f32::NAN, 0.0), (10.0, 10.0), 100.0, 100.0).is_none());

        let (s, e) = clip_segment((50.0, 50.0), (1e9, 50.0), 100.0, 100.0).unwrap();
        assert_eq!(s, (50.0, 50.0));
        assert!((e.0 - 100.0).abs() < 1e-3);
        assert_eq!(e.1, 50.0);
    }

    #[test]
    fn background_without_axes_is_blank() {
        let fig = Figure::new(1.0, false).unwrap();
        let bg = fig.background().unwrap();
        assert_eq!(bg.dimensions(), (CANVAS_W, CANVAS_H));
        assert!(bg.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn background_with_axes_has_grid() {
        let fig = Figure::new(2.0, true).unwrap();
        assert!(fig.has_axes());
        let bg = fig.background().unwrap();
        let inked = bg.pixels().filter(|p| p.0 != [255, 255, 255]).count();
        assert!(inked > 0, "mesh left the background blank");
        assert_eq!(bg.get_pixel(CANVAS_W - 1, 0).0, [255, 255, 255]);
    }

    #[test]
    fn overlay_is_drawn_above_anchor() {
        use crate::stats::Statistic;

        let traj = Trajectory::new(
            BobPath::from_points(&[(0.0, -1.0)]),
            BobPath::from_points(&[(0.0, -2.0)]),
        );
        let stats = vec![Statistic::new("E", vec![1.23456])];
        let fig = Figure::new(3.3, false).unwrap();
        let (ax, ay) = fig.viewport().axes_fraction(OVERLAY_ANCHOR.0, OVERLAY_ANCHOR.1);

        let inked_near_anchor = |img: &RgbImage| {
            (ax..ax + 80)
                .flat_map(|x| (ay - LINE_HEIGHT_PX..ay).map(move |y| (x, y)))
                .filter(|&(x, y)| img.get_pixel(x as u32, y as u32).0 != [255, 255, 255])
                .count()
        };

        let mut plain = FrameArtists::new(1);
        plain.update(&traj, None, 0).unwrap();
        assert_eq!(inked_near_anchor(&fig.rasterize(&plain).unwrap()), 0);

        let mut labelled = FrameArtists::new(1);
        labelled.update(&traj, Some(stats.as_slice()), 0).unwrap();
        assert_eq!(labelled.overlay.as_deref(), Some("E:  1.235\n"));
        assert!(inked_near_anchor(&fig.rasterize(&labelled).unwrap()) > 0);
    }

    #[test]
    fn frame_draws_bobs_in_their_colours() {
        let traj = Trajectory::new(
            BobPath::from_points(&[(0.0, -1.0)]),
            BobPath::from_points(&[(1.0, -1.0)]),
        );
        let fig = Figure::new(2.2, false).unwrap();
        let mut artists = FrameArtists::new(1);
        artists.update(&traj, None, 0).unwrap();

        let img = fig.rasterize(&artists).unwrap();
        let vp = fig.viewport();
        assert_eq!(pixel_at(&img, vp.to_pixel(artists.bob1)), [0, 0, 255]);
        assert_eq!(pixel_at(&img, vp.to_pixel(artists.bob2)), [255, 0, 0]);

        // Rod midpoint between pivot and bob 1
        let mid = vp.to_pixel(Point2::new(0.0, -0.5));
        assert_eq!(pixel_at(&img, mid), [0, 0, 0]);

        // Far corner untouched
        assert_eq!(img.get_pixel(2, 2).0, [255, 255, 255]);
    }

    #[test]
    fn trace_is_translucent() {
        let traj = Trajectory::new(
            BobPath::from_points(&[(0.0, -1.0), (0.0, -1.0)]),
            BobPath::from_points(&[(-1.0, 1.5), (1.0, 1.5)]),
        );
        let fig = Figure::new(2.0, false).unwrap();
        let mut artists = FrameArtists::new(2);
        artists.update(&traj, None, 0).unwrap();
        artists.update(&traj, None, 1).unwrap();

        let img = fig.rasterize(&artists).unwrap();
        let px = pixel_at(&img, fig.viewport().to_pixel(Point2::new(0.0, 1.5)));
        assert_eq!(px[0], 255);
        assert!(px[1] > 150 && px[1] < 255, "unexpected trace colour {:?}", px);
        assert_eq!(px[1], px[2]);
    }

    #[test]
    fn off_extent_frames_render() {
        let traj = Trajectory::new(
            BobPath::from_points(&[(0.0, -1.0), (1e12, 0.0)]),
            BobPath::from_points(&[(0.0, -2.0), (-1e12, 5e11)]),
        );
        let fig = Figure::new(2.2, false).unwrap();
        let mut artists = FrameArtists::new(2);
        artists.update(&traj, None, 0).unwrap();
        artists.update(&traj, None, 1).unwrap();
        assert!(fig.rasterize(&artists).is_ok());
    }
}
