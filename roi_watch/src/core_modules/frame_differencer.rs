// THEORY:
// The `frame_differencer` is the first stage of the detection pipeline. It answers
// one question per pixel: how much did the brightness change since the previous
// frame?
//
// Key principles:
// 1.  **Pure function**: It takes the previous and current grayscale frames and
//     returns a new difference image. It never stores anything; keeping the
//     previous frame alive is the orchestrator's job, and the orchestrator only
//     replaces it after the whole pipeline has run for the current frame.
// 2.  **Same shape or nothing**: Both inputs must have identical dimensions. A
//     mismatch means the video source changed format mid-stream, which is reported
//     as an error instead of being papered over.

use crate::core_modules::frame::frame::{Frame, GrayFrame, gray_level};
use crate::error::{MotionError, MotionResult};
use image::Luma;

/// Converts a color frame into its grayscale counterpart.
pub fn to_gray(frame: &Frame) -> GrayFrame {
    let (width, height) = frame.dimensions();
    GrayFrame::from_fn(width, height, |x, y| Luma([gray_level(frame.get_pixel(x, y))]))
}

/// Per-pixel absolute difference between two grayscale frames of the same size.
pub fn abs_diff(previous: &GrayFrame, current: &GrayFrame) -> MotionResult<GrayFrame> {
    if previous.dimensions() != current.dimensions() {
        return Err(MotionError::DimensionMismatch {
            expected: previous.dimensions(),
            actual: current.dimensions(),
        });
    }

    let (width, height) = current.dimensions();
    Ok(GrayFrame::from_fn(width, height, |x, y| {
        let before = previous.get_pixel(x, y)[0];
        let after = current.get_pixel(x, y)[0];
        Luma([before.abs_diff(after)])
    }))
}
