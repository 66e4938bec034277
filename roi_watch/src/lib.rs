// THEORY:
// This file is the main entry point for the `roi_watch` library crate.
// It exposes the motion-detection core to front-ends (like `roi_player`) that own
// the window, the decoder and the drawing code.
//
// The public surface is deliberately small:
// - `pipeline::MotionDetector` runs one frame through the detection stages and
//   remembers the previous grayscale frame.
// - `playback::PlaybackController` turns per-frame results into play/pause/step
//   behavior and owns the video source for the session.
// - `source::VideoSource` is the seam a decoder implements.
// The individual stages live in `core_modules` and are public so they can be
// tested and reused on their own, but most callers never need them.

pub mod core_modules;
pub mod error;
pub mod pipeline;
pub mod playback;
pub mod source;

pub use crate::core_modules::frame::frame::{Frame, GrayFrame};
pub use crate::core_modules::region::{BoundingBox, Point, Region};
pub use crate::core_modules::region_filter::Roi;
pub use crate::core_modules::roi_capture::{DisplayMapping, RegionBuilder};
pub use crate::error::{MotionError, MotionResult};
pub use crate::pipeline::{DetectorConfig, FrameAnalysis, MotionDetector};
pub use crate::playback::{FrameReport, PlaybackController, PlaybackState, TickOutcome};
pub use crate::source::{MemorySource, VideoSource};
