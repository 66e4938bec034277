// THEORY:
// `VideoSource` is the seam between the detection core and whatever decodes video.
// The core only ever asks for the next frame, repositions the cursor, and reads the
// stream length and current position. Opening is the implementor's constructor and
// releasing is `Drop`, so a source that has been dropped can no longer be read.

use crate::core_modules::frame::frame::Frame;
use crate::error::{MotionError, MotionResult};

/// A seekable stream of decoded RGB frames.
pub trait VideoSource {
    /// The next frame, or `None` once the stream is exhausted.
    fn read_next_frame(&mut self) -> MotionResult<Option<Frame>>;

    /// Moves the cursor so the next read returns frame `index`.
    fn seek(&mut self, index: u64) -> MotionResult<()>;

    /// Total number of frames in the stream.
    fn frame_count(&self) -> u64;

    /// Index of the next frame to be read.
    fn current_position(&self) -> u64;
}

/// An in-memory stream, used for synthetic input.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    frames: Vec<Frame>,
    cursor: usize,
}

impl MemorySource {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames, cursor: 0 }
    }
}

impl FromIterator<Frame> for MemorySource {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl VideoSource for MemorySource {
    fn read_next_frame(&mut self) -> MotionResult<Option<Frame>> {
        let frame = self.frames.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }

    fn seek(&mut self, index: u64) -> MotionResult<()> {
        let target = usize::try_from(index)
            .ok()
            .filter(|&i| i <= self.frames.len())
            .ok_or_else(|| {
                MotionError::seek(index, format!("stream has {} frames", self.frames.len()))
            })?;
        self.cursor = target;
        Ok(())
    }

    fn frame_count(&self) -> u64 {
        self.frames.len() as u64
    }

    fn current_position(&self) -> u64 {
        self.cursor as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn shaded(levels: &[u8]) -> MemorySource {
        levels
            .iter()
            .map(|&level| Frame::from_pixel(4, 4, Rgb([level, level, level])))
            .collect()
    }

    #[test]
    fn reads_frames_in_order_then_ends() {
        let mut source = shaded(&[10, 20]);
        assert_eq!(source.frame_count(), 2);

        assert_eq!(source.read_next_frame().unwrap().unwrap().get_pixel(0, 0)[0], 10);
        assert_eq!(source.read_next_frame().unwrap().unwrap().get_pixel(0, 0)[0], 20);
        assert!(source.read_next_frame().unwrap().is_none());
        assert_eq!(source.current_position(), 2);
    }

    #[test]
    fn seek_repositions_the_cursor() {
        let mut source = shaded(&[1, 2, 3, 4]);
        source.seek(2).unwrap();

        assert_eq!(source.current_position(), 2);
        assert_eq!(source.read_next_frame().unwrap().unwrap().get_pixel(0, 0)[0], 3);
    }

    #[test]
    fn seek_past_the_end_fails() {
        let mut source = shaded(&[1, 2]);
        assert!(matches!(source.seek(3), Err(MotionError::Seek { index: 3, .. })));
        assert_eq!(source.current_position(), 0);
        assert!(source.seek(2).is_ok());
    }
}
