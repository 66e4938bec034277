// THEORY:
// The `motion_mask` stage turns a difference image into a clean binary mask of
// "something moved here" pixels.
//
// Two steps:
// 1.  **Binarization**: A pixel is foreground (255) when its difference is strictly
//     greater than the intensity threshold, background (0) otherwise. Thresholds of
//     255 and above therefore produce an empty mask.
// 2.  **Closing**: Dilate twice, then erode twice, with the 3x3 "all neighbors"
//     element. Dilation bridges small gaps left by sensor and compression noise;
//     erosion shrinks the blobs back to roughly their original outline while keeping
//     bridged blobs merged. Two passes of a 3x3 square equal one pass of a 5x5
//     square, which is what an L-infinity radius of 2 gives us.

use crate::core_modules::frame::frame::GrayFrame;
use crate::core_modules::utils::image_helper::image_helper::{pad_zero, strip_border};
use image::Luma;
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

/// Value of a foreground pixel in every mask the pipeline produces.
pub const FOREGROUND: u8 = 255;
/// Number of dilate passes, and of erode passes, in the closing.
pub const CLOSING_ITERATIONS: u8 = 2;

/// Marks pixels whose difference is strictly above `threshold`.
pub fn binarize(diff: &GrayFrame, threshold: u32) -> GrayFrame {
    let (width, height) = diff.dimensions();
    GrayFrame::from_fn(width, height, |x, y| {
        if u32::from(diff.get_pixel(x, y)[0]) > threshold {
            Luma([FOREGROUND])
        } else {
            Luma([0])
        }
    })
}

/// Morphological closing (dilate then erode) with a 3x3 element applied
/// `CLOSING_ITERATIONS` times each way.
///
/// Runs on a zero-padded copy: erosion treats pixels outside the image as foreground,
/// which would otherwise stretch blobs near the frame edge onto the edge.
pub fn close(mask: &GrayFrame) -> GrayFrame {
    let border = u32::from(CLOSING_ITERATIONS);
    let padded = pad_zero(mask, border);
    let grown = dilate(&padded, Norm::LInf, CLOSING_ITERATIONS);
    let closed = erode(&grown, Norm::LInf, CLOSING_ITERATIONS);
    strip_border(&closed, border)
}

/// Binarize and clean a difference image in one go.
pub fn motion_mask(diff: &GrayFrame, threshold: u32) -> GrayFrame {
    close(&binarize(diff, threshold))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(mask: &mut GrayFrame, x0: u32, y0: u32, width: u32, height: u32) {
        for y in y0..y0 + height {
            for x in x0..x0 + width {
                mask.put_pixel(x, y, Luma([FOREGROUND]));
            }
        }
    }

    fn foreground_count(mask: &GrayFrame) -> usize {
        mask.pixels().filter(|p| p[0] == FOREGROUND).count()
    }

    #[test]
    fn threshold_is_strict() {
        let mut diff = GrayFrame::new(3, 1);
        diff.put_pixel(0, 0, Luma([24]));
        diff.put_pixel(1, 0, Luma([25]));
        diff.put_pixel(2, 0, Luma([26]));

        let mask = binarize(&diff, 25);

        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(1, 0)[0], 0);
        assert_eq!(mask.get_pixel(2, 0)[0], FOREGROUND);
    }

    #[test]
    fn thresholds_beyond_eight_bits_reject_everything() {
        let diff = GrayFrame::from_pixel(5, 5, Luma([255]));
        assert_eq!(foreground_count(&binarize(&diff, 255)), 0);
        assert_eq!(foreground_count(&binarize(&diff, 1000)), 0);
    }

    #[test]
    fn closing_keeps_a_solid_block_intact() {
        let mut mask = GrayFrame::new(40, 40);
        fill(&mut mask, 10, 10, 12, 8);

        let closed = close(&mask);

        assert_eq!(closed, mask);
    }

    #[test]
    fn closing_bridges_a_narrow_gap() {
        let mut mask = GrayFrame::new(48, 32);
        fill(&mut mask, 10, 10, 10, 10);
        fill(&mut mask, 23, 10, 10, 10);

        let closed = close(&mask);

        for x in 10..33 {
            assert_eq!(closed.get_pixel(x, 15)[0], FOREGROUND, "column {x} not bridged");
        }
        assert_eq!(foreground_count(&closed), 23 * 10);
    }

    #[test]
    fn closing_does_not_bridge_a_wide_gap() {
        let mut mask = GrayFrame::new(48, 32);
        fill(&mut mask, 5, 10, 10, 10);
        fill(&mut mask, 25, 10, 10, 10);

        let closed = close(&mask);

        assert_eq!(closed.get_pixel(20, 15)[0], 0);
        assert_eq!(foreground_count(&closed), 200);
    }

    #[test]
    fn closing_does_not_stretch_blobs_onto_the_frame_edge() {
        let mut mask = GrayFrame::new(32, 24);
        fill(&mut mask, 1, 2, 10, 10);

        let closed = close(&mask);

        assert_eq!(closed, mask);
        assert_eq!(closed.get_pixel(0, 5)[0], 0);
    }

    #[test]
    fn closing_keeps_a_full_frame_full() {
        let mask = GrayFrame::from_pixel(20, 12, Luma([FOREGROUND]));
        assert_eq!(close(&mask), mask);
    }

    #[test]
    fn output_has_input_dimensions() {
        let diff = GrayFrame::new(17, 9);
        assert_eq!(motion_mask(&diff, 10).dimensions(), (17, 9));
    }
}
