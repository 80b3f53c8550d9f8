// ------------------------------------------------------------
// Interactive display (minifb)
// ------------------------------------------------------------

use std::time::Duration;

use image::RgbImage;
use minifb::{Key, Window, WindowOptions};

use crate::error::{Result, VizError};

// Convert an RGB image to a minifb buffer (u32 ARGB).
pub fn to_minifb_buffer(img: &RgbImage) -> Vec<u32> {
    img.pixels()
        .map(|p| {
            let r = p[0] as u32;
            let g = p[1] as u32;
            let b = p[2] as u32;
            (255u32 << 24) | (r << 16) | (g << 8) | b
        })
        .collect()
}

/// Update rate for a frame interval; zero means "as fast as possible".
pub fn target_fps(interval: Duration) -> usize {
    if interval.is_zero() {
        return 0;
    }
    (1.0 / interval.as_secs_f64()).round().max(1.0) as usize
}

fn close_requested(window: &Window) -> bool {
    let ctrl = window.is_key_down(Key::LeftCtrl) || window.is_key_down(Key::RightCtrl);
    !window.is_open() || window.is_key_down(Key::Escape) || (ctrl && window.is_key_down(Key::W))
}

/// Loop frames `0..frame_count` in a window until it is closed (window
/// button, Escape or Ctrl+W). `frame` is called with the driver's frame
/// counter, which wraps back to 0 after the last frame.
pub fn run_window<F>(
    title: &str,
    width: u32,
    height: u32,
    interval: Duration,
    frame_count: usize,
    mut frame: F,
) -> Result<()>
where
    F: FnMut(usize) -> Result<RgbImage>,
{
    if frame_count == 0 {
        return Ok(());
    }

    let mut window = Window::new(title, width as usize, height as usize, WindowOptions::default())
        .map_err(|e| VizError::Window(e.to_string()))?;
    window.set_target_fps(target_fps(interval));

    let mut i = 0usize;
    let mut passes = 0usize;
    while !close_requested(&window) {
        let img = frame(i)?;
        let buffer = to_minifb_buffer(&img);
        window
            .update_with_buffer(&buffer, width as usize, height as usize)
            .map_err(|e| VizError::Window(e.to_string()))?;

        i += 1;
        if i == frame_count {
            i = 0;
            passes += 1;
            log::debug!("animation pass {} complete", passes);
        }
    }

    log::debug!("window closed after {} full passes", passes);
    Ok(())
}
