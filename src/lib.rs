//! Vehicle counting and speed estimation over segmented video frames.
//!
//! Foreground blobs are matched frame to frame by box overlap, each track's
//! centre path is turned into a smoothed speed, and tracks moving down
//! across a horizontal line are counted once.

pub mod bbox;
pub mod calibration;
pub mod config;
pub mod detection;
pub mod detector;
pub mod error;
pub mod frame;
pub mod math;
pub mod rolling_avg;
pub mod scene;
pub mod segmenter;
pub mod speed;
pub mod stats;
pub mod tracker;

mod circular_queue;
mod track;

pub use config::Config;
pub use detection::Blob;
pub use detector::{FrameResult, VehicleDetector};
pub use error::Error;
pub use frame::Frame;
pub use segmenter::Segmenter;
pub use stats::{StatsHandle, StatsSnapshot};
pub use track::{Track, TrackId};
