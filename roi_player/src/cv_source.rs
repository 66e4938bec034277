use opencv::{
    core::Mat,
    imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use roi_watch::{Frame, MotionError, MotionResult, VideoSource};

/// Frame rate assumed when the container does not report one.
const FALLBACK_FPS: f64 = 25.0;

/// A `VideoSource` backed by an OpenCV capture.
pub struct CvSource {
    capture: VideoCapture,
    frame_count: u64,
    position: u64,
    fps: f64,
    size: (u32, u32),
}

impl CvSource {
    pub fn open(path: &str) -> MotionResult<Self> {
        let opened = |e: opencv::Error| MotionError::source_open(path, e.to_string());

        let capture = VideoCapture::from_file(path, videoio::CAP_ANY).map_err(opened)?;
        if !capture.is_opened().map_err(opened)? {
            return Err(MotionError::source_open(path, "no backend could open the file"));
        }

        let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT).map_err(opened)?;
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH).map_err(opened)?;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT).map_err(opened)?;
        let fps = capture.get(videoio::CAP_PROP_FPS).map_err(opened)?;

        Ok(Self {
            capture,
            frame_count: frame_count.max(0.0) as u64,
            position: 0,
            fps: if fps > 0.0 { fps } else { FALLBACK_FPS },
            size: (width as u32, height as u32),
        })
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Frame size as reported by the container.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

impl VideoSource for CvSource {
    fn read_next_frame(&mut self) -> MotionResult<Option<Frame>> {
        let mut bgr = Mat::default();
        let grabbed = self
            .capture
            .read(&mut bgr)
            .map_err(|e| MotionError::decode(e.to_string()))?;
        if !grabbed || bgr.empty() {
            return Ok(None);
        }
        self.position += 1;
        mat_to_frame(&bgr).map(Some)
    }

    fn seek(&mut self, index: u64) -> MotionResult<()> {
        let moved = self
            .capture
            .set(videoio::CAP_PROP_POS_FRAMES, index as f64)
            .map_err(|e| MotionError::seek(index, e.to_string()))?;
        if !moved {
            return Err(MotionError::seek(index, "backend refused to reposition"));
        }
        self.position = index;
        Ok(())
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn current_position(&self) -> u64 {
        self.position
    }
}

impl Drop for CvSource {
    fn drop(&mut self) {
        let _ = self.capture.release();
    }
}

/// Converts a decoded BGR `Mat` into an RGB frame.
fn mat_to_frame(bgr: &Mat) -> MotionResult<Frame> {
    let decode = |e: opencv::Error| MotionError::decode(e.to_string());

    let mut rgb = Mat::default();
    imgproc::cvt_color(bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(decode)?;
    let bytes = rgb.data_bytes().map_err(decode)?.to_vec();

    image::RgbImage::from_raw(rgb.cols() as u32, rgb.rows() as u32, bytes)
        .ok_or_else(|| MotionError::decode("decoded buffer does not match the frame size"))
}
