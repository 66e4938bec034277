// THEORY:
// The `region_filter` stage restricts the motion mask to the operator's region of
// interest (ROI), a polygon drawn over the frame.
//
// Key principles:
// 1.  **Empty means everywhere**: An ROI with no points places no restriction and
//     the mask passes through untouched.
// 2.  **Degenerate means nowhere**: A polygon needs at least three points to enclose
//     anything. One or two points are a defined edge case, not an error: they fill
//     nothing, so every motion pixel is suppressed.
// 3.  **Intersection, not clipping**: The ROI is rasterized into an eligibility mask
//     (edges inclusive) and ANDed with the motion mask. Regions straddling the edge
//     keep their inside part; regions entirely outside vanish.

use crate::core_modules::frame::frame::GrayFrame;
use crate::core_modules::motion_mask::FOREGROUND;
use crate::core_modules::region::Point;
use crate::error::{MotionError, MotionResult};
use image::Luma;
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as PixelPoint;
use std::fmt;
use std::str::FromStr;

/// Fewest points that can enclose an area.
pub const MIN_POLYGON_POINTS: usize = 3;

/// A polygonal region of interest in frame coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roi {
    points: Vec<Point>,
}

impl Roi {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// The unrestricted ROI: the whole frame is eligible.
    pub fn whole_frame() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Whether the polygon can enclose any area at all.
    pub fn is_well_formed(&self) -> bool {
        self.polygon(|point| point).len() >= MIN_POLYGON_POINTS
    }

    /// Rasterizes the ROI into an eligibility mask, or `None` when it is unrestricted.
    ///
    /// Vertices are clamped to a band of one frame size around the frame so the
    /// rasterizer's integer arithmetic cannot overflow.
    pub fn mask(&self, width: u32, height: u32) -> Option<GrayFrame> {
        if self.is_empty() {
            return None;
        }

        let mut eligible = GrayFrame::new(width, height);
        let (w, h) = (clamp_extent(width), clamp_extent(height));
        let polygon = self.polygon(|point| {
            Point::new(point.x.clamp(-w, 2 * w), point.y.clamp(-h, 2 * h))
        });
        if polygon.len() >= MIN_POLYGON_POINTS {
            draw_polygon_mut(&mut eligible, &polygon, Luma([FOREGROUND]));
        }
        Some(eligible)
    }

    /// The outline as the rasterizer wants it: no repeated neighbors and no explicit
    /// closing point.
    fn polygon(&self, place: impl Fn(Point) -> Point) -> Vec<PixelPoint<i32>> {
        let mut polygon: Vec<PixelPoint<i32>> = Vec::with_capacity(self.points.len());
        for point in &self.points {
            let point = place(*point);
            let candidate = PixelPoint::new(point.x, point.y);
            if polygon.last() != Some(&candidate) {
                polygon.push(candidate);
            }
        }
        while polygon.len() > 1 && polygon.first() == polygon.last() {
            polygon.pop();
        }
        polygon
    }
}

/// Largest frame extent used for vertex clamping; keeps every coordinate difference
/// the rasterizer computes well inside `i32`.
const MAX_CLAMP_EXTENT: i32 = i32::MAX / 8;

fn clamp_extent(extent: u32) -> i32 {
    i32::try_from(extent).map_or(MAX_CLAMP_EXTENT, |e| e.min(MAX_CLAMP_EXTENT))
}

impl From<Vec<Point>> for Roi {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

/// Parses `"x,y;x,y;..."`. An empty string is the unrestricted ROI.
impl FromStr for Roi {
    type Err = MotionError;

    fn from_str(s: &str) -> MotionResult<Self> {
        let points = s
            .split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| -> MotionResult<Point> {
                let (x, y) = pair
                    .split_once(',')
                    .ok_or_else(|| MotionError::invalid_roi(format!("`{pair}` is not an `x,y` pair")))?;
                let parse = |v: &str| {
                    v.trim()
                        .parse::<i32>()
                        .map_err(|e| MotionError::invalid_roi(format!("`{pair}`: {e}")))
                };
                Ok(Point::new(parse(x)?, parse(y)?))
            })
            .collect::<MotionResult<Vec<_>>>()?;
        Ok(Self::new(points))
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, point) in self.points.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{},{}", point.x, point.y)?;
        }
        Ok(())
    }
}

/// Restricts `mask` to the ROI. An unrestricted ROI returns the mask unchanged.
pub fn apply_roi(mask: GrayFrame, roi: &Roi) -> GrayFrame {
    let (width, height) = mask.dimensions();
    let Some(eligible) = roi.mask(width, height) else {
        return mask;
    };

    let mut filtered = mask;
    for (pixel, allowed) in filtered.pixels_mut().zip(eligible.pixels()) {
        pixel.0[0] &= allowed.0[0];
    }
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_mask(width: u32, height: u32) -> GrayFrame {
        GrayFrame::from_pixel(width, height, Luma([FOREGROUND]))
    }

    fn count(mask: &GrayFrame) -> usize {
        mask.pixels().filter(|p| p[0] != 0).count()
    }

    fn square(x0: i32, y0: i32, x1: i32, y1: i32) -> Roi {
        Roi::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
    }

    #[test]
    fn empty_roi_passes_mask_through() {
        let mask = full_mask(10, 10);
        assert_eq!(apply_roi(mask.clone(), &Roi::whole_frame()), mask);
    }

    #[test]
    fn polygon_keeps_only_inside_pixels_edges_included() {
        let filtered = apply_roi(full_mask(20, 20), &square(2, 3, 6, 8));

        assert_eq!(count(&filtered), 5 * 6);
        assert_eq!(filtered.get_pixel(2, 3)[0], FOREGROUND);
        assert_eq!(filtered.get_pixel(6, 8)[0], FOREGROUND);
        assert_eq!(filtered.get_pixel(7, 8)[0], 0);
    }

    #[test]
    fn fewer_than_three_points_suppress_everything() {
        let one = Roi::new(vec![Point::new(4, 4)]);
        let two = Roi::new(vec![Point::new(1, 1), Point::new(8, 8)]);

        assert!(!one.is_well_formed());
        assert!(!two.is_well_formed());
        assert_eq!(count(&apply_roi(full_mask(10, 10), &one)), 0);
        assert_eq!(count(&apply_roi(full_mask(10, 10), &two)), 0);
    }

    #[test]
    fn explicitly_closed_polygons_are_accepted() {
        let mut points = square(1, 1, 4, 4).points().to_vec();
        points.push(Point::new(1, 1));
        let closed = Roi::new(points);

        assert!(closed.is_well_formed());
        assert_eq!(count(&apply_roi(full_mask(10, 10), &closed)), 16);
    }

    #[test]
    fn polygon_outside_the_frame_is_clipped() {
        let filtered = apply_roi(full_mask(10, 10), &square(-5, -5, 2, 2));
        assert_eq!(count(&filtered), 9);
    }

    #[test]
    fn far_away_vertices_do_not_overflow() {
        let huge = Roi::new(vec![
            Point::new(-2_000_000_000, -2_000_000_000),
            Point::new(2_000_000_000, -2_000_000_000),
            Point::new(2_000_000_000, 2_000_000_000),
            Point::new(-2_000_000_000, 2_000_000_000),
        ]);

        assert_eq!(count(&apply_roi(full_mask(12, 8), &huge)), 12 * 8);

        let parsed: Roi = "-2147483648,0;2147483647,0;0,2147483647".parse().unwrap();
        assert!(parsed.mask(10, 10).is_some());
    }

    #[test]
    fn parses_point_lists() {
        let roi: Roi = "10,20; 30,20;30,40".parse().unwrap();
        assert_eq!(
            roi.points(),
            &[Point::new(10, 20), Point::new(30, 20), Point::new(30, 40)]
        );
        assert_eq!(roi.to_string(), "10,20;30,20;30,40");
        assert!("".parse::<Roi>().unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_point_lists() {
        assert!(matches!("10;20".parse::<Roi>(), Err(MotionError::InvalidRoi(_))));
        assert!(matches!("a,b".parse::<Roi>(), Err(MotionError::InvalidRoi(_))));
    }
}
