// THEORY:
// The `pipeline` module is the top-level API of the detection core. It chains the
// stages in `core_modules` into a single per-frame call and keeps the only state
// the stages need between frames: the previous grayscale frame.
//
// Per frame:
// 1.  **Temporal**: Convert to grayscale and take the absolute difference against the
//     previous frame. The very first frame is compared against itself, so it never
//     reports motion.
// 2.  **Masking**: Binarize the difference at the intensity threshold and close the
//     mask to merge fragments.
// 3.  **ROI**: Intersect the mask with the region of interest.
// 4.  **Spatial**: Trace the outer borders and keep the bounding boxes of regions
//     whose area reaches the minimum.
//
// `analyze` is a pure function of (frame, stored state); `process_frame` is `analyze`
// followed by replacing the previous frame. The replacement happens whether or not
// motion was found, so a still scene stays still.

use crate::core_modules::frame::frame::{Frame, GrayFrame};
use crate::core_modules::frame_differencer::{abs_diff, to_gray};
use crate::core_modules::motion_mask::motion_mask;
use crate::core_modules::region::BoundingBox;
use crate::core_modules::region_extractor::region_extractor;
use crate::core_modules::region_filter::{Roi, apply_roi};
use crate::error::MotionResult;
use tracing::debug;

/// Sensitivity used when the caller does not choose one.
pub const DEFAULT_SENSITIVITY: u32 = 25;

/// Tunable thresholds of the detector.
///
/// A single operator-facing "sensitivity" value historically drove both fields; they
/// are kept apart here so each can be tuned on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorConfig {
    /// A pixel counts as changed when its gray difference is strictly above this.
    pub intensity_threshold: u32,
    /// Regions enclosing less area than this are ignored.
    pub min_region_area: u32,
}

impl DetectorConfig {
    /// Both thresholds set to the same sensitivity value.
    pub fn from_sensitivity(sensitivity: u32) -> Self {
        Self {
            intensity_threshold: sensitivity,
            min_region_area: sensitivity,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::from_sensitivity(DEFAULT_SENSITIVITY)
    }
}

/// What the detector found in one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameAnalysis {
    pub boxes: Vec<BoundingBox>,
    pub motion_present: bool,
}

impl FrameAnalysis {
    fn from_boxes(boxes: Vec<BoundingBox>) -> Self {
        Self {
            motion_present: !boxes.is_empty(),
            boxes,
        }
    }
}

struct Pass {
    analysis: FrameAnalysis,
    gray: GrayFrame,
    mask: GrayFrame,
}

/// The main, top-level struct of the detection core.
#[derive(Debug, Clone, Default)]
pub struct MotionDetector {
    config: DetectorConfig,
    roi: Roi,
    previous_gray: Option<GrayFrame>,
    last_mask: Option<GrayFrame>,
}

impl MotionDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_roi(mut self, roi: Roi) -> Self {
        self.roi = roi;
        self
    }

    /// Replaces the region of interest. Takes effect on the next frame.
    pub fn set_roi(&mut self, roi: Roi) {
        self.roi = roi;
    }

    pub fn roi(&self) -> &Roi {
        &self.roi
    }

    /// Sets both thresholds from one sensitivity value.
    pub fn set_sensitivity(&mut self, sensitivity: u32) {
        self.config = DetectorConfig::from_sensitivity(sensitivity);
    }

    pub fn set_intensity_threshold(&mut self, threshold: u32) {
        self.config.intensity_threshold = threshold;
    }

    pub fn set_min_region_area(&mut self, area: u32) {
        self.config.min_region_area = area;
    }

    pub fn config(&self) -> DetectorConfig {
        self.config
    }

    /// Forgets the previous frame, e.g. when a new source is opened.
    pub fn reset(&mut self) {
        self.previous_gray = None;
        self.last_mask = None;
    }

    /// Analyzes `frame` against the stored previous frame without changing any state.
    /// Returns the analysis and the grayscale version of `frame`.
    pub fn analyze(&self, frame: &Frame) -> MotionResult<(FrameAnalysis, GrayFrame)> {
        let pass = self.run_pass(frame)?;
        Ok((pass.analysis, pass.gray))
    }

    /// Analyzes `frame` and makes it the previous frame for the next call.
    ///
    /// On a dimension mismatch the stored frame is left as it was.
    pub fn process_frame(&mut self, frame: &Frame) -> MotionResult<FrameAnalysis> {
        let Pass {
            analysis,
            gray,
            mask,
        } = self.run_pass(frame)?;

        debug!(
            boxes = analysis.boxes.len(),
            motion = analysis.motion_present,
            "processed frame"
        );

        self.previous_gray = Some(gray);
        self.last_mask = Some(mask);
        Ok(analysis)
    }

    /// The ROI-filtered motion mask of the last processed frame, for debugging.
    pub fn last_mask(&self) -> Option<&GrayFrame> {
        self.last_mask.as_ref()
    }

    fn run_pass(&self, frame: &Frame) -> MotionResult<Pass> {
        // Stage 1: Temporal Analysis
        let gray = to_gray(frame);
        let previous = self.previous_gray.as_ref().unwrap_or(&gray);
        let diff = abs_diff(previous, &gray)?;

        // Stage 2: Masking
        let mask = motion_mask(&diff, self.config.intensity_threshold);

        // Stage 3: Region of Interest
        let mask = apply_roi(mask, &self.roi);

        // Stage 4: Spatial Grouping
        let boxes = region_extractor::extract_boxes(&mask, self.config.min_region_area);

        Ok(Pass {
            analysis: FrameAnalysis::from_boxes(boxes),
            gray,
            mask,
        })
    }
}
