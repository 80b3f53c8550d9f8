// ------------------------------------------------------------
// Double pendulum animation renderer
// ------------------------------------------------------------
//
// Presentation layer for precomputed double pendulum trajectories: rods,
// bobs, a fading trace of the second bob and an optional statistics overlay.
// Frames can be looped in a window or exported as a self-contained HTML
// player (`double_pendulum.html`).
//
// Nothing here integrates the equations of motion; positions come from the
// caller.
// ------------------------------------------------------------

pub mod animation;
pub mod artists;
pub mod canvas;
pub mod error;
pub mod jshtml;
pub mod stats;
pub mod trace;
pub mod trajectory;
pub mod window;

pub use animation::{visualize_double_pendulum, Animation, RenderOptions, OUTPUT_FILE};
pub use artists::FrameArtists;
pub use error::{Result, VizError};
pub use stats::Statistic;
pub use trajectory::{BobPath, LayoutBounds, Point2, Trajectory};
