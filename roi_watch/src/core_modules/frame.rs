// THEORY:
// The `frame` module holds the two pixel containers the pipeline works on and the
// single-pixel brightness heuristic used to move between them.
//
// Key principles:
// 1.  **Dumb containers**: A `Frame` is a decoded RGB image and a `GrayFrame` is a
//     single-channel 8-bit image. Both are plain `image` buffers; they carry no
//     behavior of their own and no knowledge of previous frames.
// 2.  **Single-pixel scope**: `luminance` looks at exactly one sample. Anything that
//     compares two pixels (differencing) or looks at neighbors (morphology, contours)
//     belongs in the stage modules.
// 3.  **Rec. 601 luma**: Brightness is the same weighted RGB sum decoders use for
//     BGR -> GRAY conversion, so a frame differenced here behaves like one
//     differenced by the decoder front-end.

pub mod frame {
    use image::{GrayImage, Rgb, RgbImage};

    /// A decoded color frame, height x width x 3 channels, 8 bits per channel.
    pub type Frame = RgbImage;
    /// A single-channel 8-bit frame derived from a `Frame`, or a binary mask.
    pub type GrayFrame = GrayImage;

    pub type Luminance = f64;

    const RED_WEIGHT: Luminance = 0.299;
    const GREEN_WEIGHT: Luminance = 0.587;
    const BLUE_WEIGHT: Luminance = 0.114;

    /// Luminance estimate (Rec. 601 luma) of a single RGB sample.
    pub fn luminance(pixel: &Rgb<u8>) -> Luminance {
        let [red, green, blue] = pixel.0;
        RED_WEIGHT * red as Luminance
            + GREEN_WEIGHT * green as Luminance
            + BLUE_WEIGHT * blue as Luminance
    }

    /// Luminance rounded to the nearest 8-bit gray level.
    pub fn gray_level(pixel: &Rgb<u8>) -> u8 {
        luminance(pixel).round().clamp(0.0, 255.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::frame::*;
    use image::Rgb;

    #[test]
    fn primaries_use_rec601_weights() {
        assert_eq!(gray_level(&Rgb([255, 0, 0])), 76);
        assert_eq!(gray_level(&Rgb([0, 255, 0])), 150);
        assert_eq!(gray_level(&Rgb([0, 0, 255])), 29);
    }

    #[test]
    fn extremes_map_to_extremes() {
        assert_eq!(gray_level(&Rgb([0, 0, 0])), 0);
        assert_eq!(gray_level(&Rgb([255, 255, 255])), 255);
    }
}
