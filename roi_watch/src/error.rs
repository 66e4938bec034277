//! Error types for the detection core and its video-source seam.

use thiserror::Error;

/// Result type for motion-detection operations.
pub type MotionResult<T> = Result<T, MotionError>;

/// Errors that can occur while opening, reading or analysing a video stream.
#[derive(Debug, Error)]
pub enum MotionError {
    #[error("failed to open video source `{path}`: {reason}")]
    SourceOpen { path: String, reason: String },

    #[error("failed to decode frame: {0}")]
    Decode(String),

    #[error("failed to seek to frame {index}: {reason}")]
    Seek { index: u64, reason: String },

    #[error(
        "frame dimensions changed mid-stream: expected {}x{}, got {}x{}",
        expected.0, expected.1, actual.0, actual.1
    )]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("invalid region of interest: {0}")]
    InvalidRoi(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl MotionError {
    /// Create a source-open failure.
    pub fn source_open(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SourceOpen {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a decode failure.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    /// Create a seek failure.
    pub fn seek(index: u64, reason: impl Into<String>) -> Self {
        Self::Seek {
            index,
            reason: reason.into(),
        }
    }

    /// Create an ROI parse failure.
    pub fn invalid_roi(message: impl Into<String>) -> Self {
        Self::InvalidRoi(message.into())
    }

    /// Whether the error ends the session the same way running out of frames does.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}
