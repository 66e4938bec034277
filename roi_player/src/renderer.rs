use opencv::{
    core::{self, Mat, Rect, Scalar, Vector},
    imgproc,
    prelude::*,
};
use roi_watch::{BoundingBox, Frame, Point, Roi};

const BOX_THICKNESS: i32 = 2;
const ROI_OUTLINE_THICKNESS: i32 = 6;
const DRAFT_THICKNESS: i32 = 1;
const ROI_OPACITY: f64 = 0.5;

fn green() -> Scalar {
    Scalar::new(0.0, 255.0, 0.0, 0.0)
}

fn red() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0)
}

/// Copies an RGB frame into a BGR `Mat` for drawing and display.
pub fn frame_to_bgr_mat(frame: &Frame) -> opencv::Result<Mat> {
    let mut rgb = Mat::new_rows_cols_with_default(
        frame.height() as i32,
        frame.width() as i32,
        core::CV_8UC3,
        Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(frame.as_raw());

    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

/// Draws the detections, the committed ROI and any ROI still being drawn.
pub fn render(
    frame: &Frame,
    boxes: &[BoundingBox],
    roi: &Roi,
    draft: &[Point],
) -> opencv::Result<Mat> {
    let mut canvas = frame_to_bgr_mat(frame)?;

    for bbox in boxes {
        let rect = Rect::new(bbox.x, bbox.y, bbox.width, bbox.height);
        imgproc::rectangle(&mut canvas, rect, green(), BOX_THICKNESS, imgproc::LINE_8, 0)?;
    }

    if draft.len() > 1 {
        let outline = polygon(draft);
        imgproc::polylines(
            &mut canvas,
            &outline,
            false,
            red(),
            DRAFT_THICKNESS,
            imgproc::LINE_8,
            0,
        )?;
    }

    if roi.is_empty() {
        return Ok(canvas);
    }

    // The ROI is painted on a copy and blended back so the video stays visible.
    let mut overlay = canvas.clone();
    let outline = polygon(roi.points());
    imgproc::fill_poly(
        &mut overlay,
        &outline,
        red(),
        imgproc::LINE_8,
        0,
        core::Point::default(),
    )?;
    imgproc::polylines(
        &mut overlay,
        &outline,
        true,
        red(),
        ROI_OUTLINE_THICKNESS,
        imgproc::LINE_8,
        0,
    )?;

    let mut blended = Mat::default();
    core::add_weighted(
        &overlay,
        ROI_OPACITY,
        &canvas,
        1.0 - ROI_OPACITY,
        0.0,
        &mut blended,
        -1,
    )?;
    Ok(blended)
}

/// Scales a rendered frame to the display width, keeping the aspect ratio.
pub fn fit_to_display(canvas: &Mat, display: (u32, u32)) -> opencv::Result<Mat> {
    let size = core::Size::new(display.0 as i32, display.1 as i32);
    if canvas.size()? == size {
        return Ok(canvas.clone());
    }
    let mut scaled = Mat::default();
    imgproc::resize(canvas, &mut scaled, size, 0.0, 0.0, imgproc::INTER_LINEAR)?;
    Ok(scaled)
}

fn polygon(points: &[Point]) -> Vector<Vector<core::Point>> {
    let ring: Vector<core::Point> = points.iter().map(|p| core::Point::new(p.x, p.y)).collect();
    let mut polygons = Vector::new();
    polygons.push(ring);
    polygons
}
