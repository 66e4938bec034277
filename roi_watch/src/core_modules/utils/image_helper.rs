pub mod image_helper {
    use crate::core_modules::frame::frame::GrayFrame;
    use crate::error::MotionResult;
    use image::ImageEncoder;
    use std::path::Path;

    /// Writes a grayscale frame or mask to `path` as a PNG.
    pub fn save_gray(path: impl AsRef<Path>, frame: &GrayFrame) -> MotionResult<()> {
        let output = std::fs::File::create(path)?;
        let encoder = image::codecs::png::PngEncoder::new(output);

        encoder.write_image(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            image::ExtendedColorType::L8,
        )?;

        Ok(())
    }

    /// Copies `frame` into the middle of a zero canvas `border` pixels larger on every
    /// side, so the frame edge looks like any other background transition.
    pub fn pad_zero(frame: &GrayFrame, border: u32) -> GrayFrame {
        let mut padded = GrayFrame::new(frame.width() + 2 * border, frame.height() + 2 * border);
        image::imageops::replace(&mut padded, frame, i64::from(border), i64::from(border));
        padded
    }

    /// Inverse of `pad_zero`.
    pub fn strip_border(padded: &GrayFrame, border: u32) -> GrayFrame {
        let width = padded.width().saturating_sub(2 * border);
        let height = padded.height().saturating_sub(2 * border);
        image::imageops::crop_imm(padded, border, border, width, height).to_image()
    }

    /// File name for the mask of a given frame position, zero padded so dumps sort.
    pub fn mask_file_name(position: u64) -> String {
        format!("mask_{position:06}.png")
    }
}

#[cfg(test)]
mod tests {

    use super::image_helper::*;
    use crate::core_modules::frame::frame::GrayFrame;
    use image::Luma;

    #[test]
    fn save_mask_file() {
        let mut mask = GrayFrame::new(40, 30);
        for x in 10..20 {
            mask.put_pixel(x, 5, Luma([255]));
        }
        let path = std::env::temp_dir().join(format!("roi_watch_{}", mask_file_name(7)));

        save_gray(&path, &mask).expect("Error Saving File.");

        let reloaded = image::open(&path).expect("Error Loading File.").to_luma8();
        assert_eq!(reloaded, mask);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn padding_round_trips_and_keeps_edges_apart() {
        let mut mask = GrayFrame::new(6, 4);
        mask.put_pixel(0, 0, Luma([255]));
        mask.put_pixel(5, 3, Luma([255]));

        let padded = pad_zero(&mask, 2);

        assert_eq!(padded.dimensions(), (10, 8));
        assert_eq!(padded.get_pixel(2, 2)[0], 255);
        assert_eq!(padded.get_pixel(7, 5)[0], 255);
        assert_eq!(padded.get_pixel(1, 2)[0], 0);
        assert_eq!(strip_border(&padded, 2), mask);
    }

    #[test]
    fn mask_names_sort_by_position() {
        assert_eq!(mask_file_name(42), "mask_000042.png");
        assert!(mask_file_name(9) < mask_file_name(10));
    }
}
