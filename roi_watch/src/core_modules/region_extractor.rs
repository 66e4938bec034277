// THEORY:
// The `RegionExtractor` is the engine of the spatial grouping stage. It looks at the
// filtered binary motion mask and finds the separate patches of foreground in it.
//
// Algorithm steps:
// 1.  **Border following**: Outer and hole borders are traced over the mask
//     (Suzuki-Abe, as implemented by `imageproc::contours`). Only outer borders of
//     top-level components are kept; holes, and anything sitting inside a hole, are
//     part of the surrounding patch and not reported separately. The mask is traced
//     inside a one pixel zero margin so patches touching the frame edge get a border
//     like any other.
// 2.  **Chain simplification**: Each border comes back as every boundary pixel. Runs
//     of pixels moving in the same horizontal, vertical or diagonal direction are
//     collapsed to their end points, leaving a polyline. This changes neither the
//     enclosed area nor the bounding box.
// 3.  **Measurement**: The enclosed area is the shoelace area of the polyline and the
//     bounding box is the tightest rectangle around its points.
// 4.  **Filtering**: Regions whose area is strictly below the minimum are dropped.
//     A single isolated pixel encloses zero area, so it never survives a positive
//     minimum.
//
// The extractor is stateless: one mask in, one list of regions out, in the order the
// border tracer encounters them (a top-to-bottom, left-to-right raster scan).

use crate::core_modules::frame::frame::GrayFrame;
use crate::core_modules::region::{BoundingBox, Point, Region};

pub mod region_extractor {
    use super::*;
    use crate::core_modules::utils::image_helper::image_helper::pad_zero;
    use imageproc::contours::{BorderType, find_contours};

    /// Zero margin added around the mask while tracing. The tracer never starts an outer
    /// border in column 0, so patches touching the frame edge need one pixel of room.
    const TRACE_MARGIN: u32 = 1;

    /// Finds every top-level foreground patch in `mask`.
    pub fn find_regions(mask: &GrayFrame) -> Vec<Region> {
        let offset = TRACE_MARGIN as i32;
        find_contours::<i32>(&pad_zero(mask, TRACE_MARGIN))
            .into_iter()
            .filter(|contour| matches!(contour.border_type, BorderType::Outer) && contour.parent.is_none())
            .filter_map(|contour| {
                let outline: Vec<Point> = contour
                    .points
                    .iter()
                    .map(|p| Point::new(p.x - offset, p.y - offset))
                    .collect();
                let contour = simplify_chain(&outline);
                let bounding_box = BoundingBox::enclosing(&contour)?;
                Some(Region {
                    area: enclosed_area(&contour),
                    contour,
                    bounding_box,
                })
            })
            .collect()
    }

    /// Bounding boxes of every region whose area is at least `min_area`.
    pub fn extract_boxes(mask: &GrayFrame, min_area: u32) -> Vec<BoundingBox> {
        find_regions(mask)
            .into_iter()
            .filter(|region| region.area >= f64::from(min_area))
            .map(|region| region.bounding_box)
            .collect()
    }

    /// Drops the interior points of straight runs in a closed outline.
    pub fn simplify_chain(outline: &[Point]) -> Vec<Point> {
        let count = outline.len();
        if count < 3 {
            return outline.to_vec();
        }

        let direction = |from: Point, to: Point| ((to.x - from.x).signum(), (to.y - from.y).signum());

        (0..count)
            .filter(|&i| {
                let previous = outline[(i + count - 1) % count];
                let current = outline[i];
                let next = outline[(i + 1) % count];
                direction(previous, current) != direction(current, next)
            })
            .map(|i| outline[i])
            .collect()
    }

    /// Area enclosed by a closed polyline (shoelace formula, always non-negative).
    pub fn enclosed_area(polyline: &[Point]) -> f64 {
        if polyline.len() < 3 {
            return 0.0;
        }

        let twice_signed_area: i64 = polyline
            .iter()
            .zip(polyline.iter().cycle().skip(1))
            .map(|(a, b)| i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y))
            .sum();

        twice_signed_area.abs() as f64 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::region_extractor::*;
    use super::*;
    use image::Luma;

    fn fill(mask: &mut GrayFrame, x0: u32, y0: u32, width: u32, height: u32) {
        for y in y0..y0 + height {
            for x in x0..x0 + width {
                mask.put_pixel(x, y, Luma([255]));
            }
        }
    }

    #[test]
    fn square_blob_becomes_one_region() {
        let mut mask = GrayFrame::new(32, 32);
        fill(&mut mask, 5, 6, 10, 8);

        let regions = find_regions(&mask);

        assert_eq!(regions.len(), 1);
        let region = &regions[0];
        assert_eq!(region.bounding_box, BoundingBox::new(5, 6, 10, 8));
        assert_eq!(region.area, 9.0 * 7.0);
        assert_eq!(region.contour.len(), 4);
    }

    #[test]
    fn disjoint_blobs_are_reported_separately() {
        let mut mask = GrayFrame::new(40, 20);
        fill(&mut mask, 2, 2, 6, 6);
        fill(&mut mask, 20, 10, 8, 5);

        let mut boxes = extract_boxes(&mask, 1);
        boxes.sort_by_key(|b| (b.x, b.y));

        assert_eq!(
            boxes,
            vec![BoundingBox::new(2, 2, 6, 6), BoundingBox::new(20, 10, 8, 5)]
        );
    }

    #[test]
    fn area_filter_is_inclusive_of_the_minimum() {
        let mut mask = GrayFrame::new(32, 32);
        fill(&mut mask, 4, 4, 11, 11);

        assert_eq!(extract_boxes(&mask, 100).len(), 1);
        assert!(extract_boxes(&mask, 101).is_empty());
    }

    #[test]
    fn lone_pixels_have_no_area() {
        let mut mask = GrayFrame::new(10, 10);
        mask.put_pixel(4, 4, Luma([255]));

        let regions = find_regions(&mask);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].area, 0.0);
        assert!(extract_boxes(&mask, 1).is_empty());
    }

    #[test]
    fn islands_inside_holes_belong_to_the_surrounding_patch() {
        let mut mask = GrayFrame::new(40, 40);
        fill(&mut mask, 5, 5, 24, 24);
        for y in 9..25 {
            for x in 9..25 {
                mask.put_pixel(x, y, Luma([0]));
            }
        }
        fill(&mut mask, 15, 15, 4, 4);

        let regions = find_regions(&mask);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounding_box, BoundingBox::new(5, 5, 24, 24));
    }

    #[test]
    fn blobs_on_the_left_edge_are_found() {
        let mut mask = GrayFrame::new(32, 32);
        fill(&mut mask, 0, 8, 10, 10);

        let regions = find_regions(&mask);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounding_box, BoundingBox::new(0, 8, 10, 10));
        assert_eq!(regions[0].area, 81.0);
    }

    #[test]
    fn blobs_in_the_bottom_right_corner_are_found() {
        let mut mask = GrayFrame::new(30, 20);
        fill(&mut mask, 22, 14, 8, 6);

        assert_eq!(extract_boxes(&mask, 1), vec![BoundingBox::new(22, 14, 8, 6)]);
    }

    #[test]
    fn full_foreground_is_one_frame_sized_region() {
        let mask = GrayFrame::from_pixel(64, 48, Luma([255]));

        let regions = find_regions(&mask);

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].bounding_box, BoundingBox::new(0, 0, 64, 48));
        assert_eq!(regions[0].contour.len(), 4);
        assert_eq!(regions[0].area, 63.0 * 47.0);
    }

    #[test]
    fn empty_mask_has_no_regions() {
        assert!(find_regions(&GrayFrame::new(16, 16)).is_empty());
    }

    #[test]
    fn straight_runs_collapse_to_corners() {
        let outline = [
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(2, 0),
            Point::new(2, 1),
            Point::new(2, 2),
            Point::new(1, 2),
            Point::new(0, 2),
            Point::new(0, 1),
        ];

        let simplified = simplify_chain(&outline);

        assert_eq!(
            simplified,
            vec![Point::new(0, 0), Point::new(2, 0), Point::new(2, 2), Point::new(0, 2)]
        );
        assert_eq!(enclosed_area(&simplified), enclosed_area(&outline));
        assert_eq!(enclosed_area(&simplified), 4.0);
    }
}
