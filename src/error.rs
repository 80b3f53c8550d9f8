// ------------------------------------------------------------
// Error type shared by the renderer, the HTML encoder and the window driver
// ------------------------------------------------------------

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("trajectory is empty: at least one frame is required")]
    EmptyTrajectory,

    #[error("invalid option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    #[error("frame {frame} is out of range for {series} (length {len})")]
    FrameOutOfRange {
        series: &'static str,
        frame: usize,
        len: usize,
    },

    #[error("statistic `{label}` has no value for frame {frame} (length {len})")]
    StatisticOutOfRange {
        label: String,
        frame: usize,
        len: usize,
    },

    #[error("drawing error: {0}")]
    Draw(String),

    #[error("encoding error: {0}")]
    Encode(String),

    #[error("window error: {0}")]
    Window(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, VizError>;
