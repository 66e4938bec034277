// THEORY:
// `roi_capture` is the input-side capability for drawing a region of interest with a
// pointer. It is independent of the detection core: it only produces `Roi` values
// that callers hand to the detector.
//
// A capture is a tiny state machine:
// - `begin_region` starts a fresh draft (discarding any unfinished one),
// - `extend_region` appends points while a draft is open,
// - `commit_region` closes the draft and yields the finished `Roi`.
//
// Pointer events arrive in display space. `DisplayMapping` converts them to frame
// space so the core never sees window coordinates.

use crate::core_modules::region::Point;
use crate::core_modules::region_filter::Roi;

/// Builds an ROI point by point from pointer interaction.
#[derive(Debug, Clone, Default)]
pub struct RegionBuilder {
    draft: Option<Vec<Point>>,
}

impl RegionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new draft at `point`, dropping any draft in progress.
    pub fn begin_region(&mut self, point: Point) {
        self.draft = Some(vec![point]);
    }

    /// Appends `point` to the open draft. Ignored when nothing is being drawn.
    pub fn extend_region(&mut self, point: Point) {
        if let Some(draft) = self.draft.as_mut() {
            draft.push(point);
        }
    }

    /// Closes the draft. Without an open draft this yields the unrestricted ROI.
    pub fn commit_region(&mut self) -> Roi {
        Roi::new(self.draft.take().unwrap_or_default())
    }

    pub fn is_drawing(&self) -> bool {
        self.draft.is_some()
    }

    /// The points collected so far, for live preview.
    pub fn draft(&self) -> &[Point] {
        self.draft.as_deref().unwrap_or_default()
    }
}

/// Maps display-space pointer coordinates onto the frame grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMapping {
    /// Size of the displayed image, in display pixels.
    pub display: (u32, u32),
    /// Size of the decoded frame, in frame pixels.
    pub frame: (u32, u32),
}

impl DisplayMapping {
    pub fn new(display: (u32, u32), frame: (u32, u32)) -> Self {
        Self { display, frame }
    }

    /// Scales `(x, y)` from display to frame coordinates, truncating toward zero.
    pub fn to_frame(&self, x: i32, y: i32) -> Point {
        Point::new(
            Self::scale(x, self.frame.0, self.display.0),
            Self::scale(y, self.frame.1, self.display.1),
        )
    }

    fn scale(value: i32, frame_extent: u32, display_extent: u32) -> i32 {
        if display_extent == 0 {
            return value;
        }
        (i64::from(value) * i64::from(frame_extent) / i64::from(display_extent)) as i32
    }
}
