// THEORY:
// The `region` module holds the data produced by the spatial end of the pipeline.
// A `Region` is one contiguous patch of motion in a single frame, reduced to its
// outline, its enclosed area and its bounding box.
//
// Key principles:
// 1.  **Stateless data container**: A `Region` describes a single frame only. It has
//     no identity across frames and no memory of earlier positions.
// 2.  **Frame coordinates**: Every point and box is expressed in the pixel grid of
//     the decoded frame, never in display coordinates.
// 3.  **Boxes are the product**: Front-ends only draw `BoundingBox`es, so the box is
//     the value handed out of the pipeline; the outline and area exist to decide
//     which boxes survive.

/// A 2D integer point in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    /// Column of the left-most pixel.
    pub x: i32,
    /// Row of the top-most pixel.
    pub y: i32,
    /// Number of pixel columns covered, including both edges.
    pub width: i32,
    /// Number of pixel rows covered, including both edges.
    pub height: i32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The tightest box containing every point, or `None` for no points.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for point in &points[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }
}

/// One contiguous patch of motion detected in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// The simplified outer outline, in traversal order.
    pub contour: Vec<Point>,
    /// The area enclosed by the outline (shoelace formula over the outline points).
    pub area: f64,
    /// The rectangle enclosing every outline point.
    pub bounding_box: BoundingBox,
}
