use image::error::ImageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to process image: {0}")]
    ImageError(#[from] ImageError),
    #[error("I/O operation failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Frame buffer is too large: {0} bytes")]
    FrameBufferOverflow(usize),
    #[error("FFmpeg command execution failed: {0}")]
    FfmpegFailed(String),
    #[error("FFmpeg is not available on this system")]
    FFmpegNotAvailable,
    #[error("Failed to read video metadata: {0}")]
    Metadata(String),
    #[error("The specified input path is invalid: {0}")]
    InvalidInputPath(String),
    #[error("Invalid argument provided: {0}")]
    InvalidArgument(String),
    #[error("Invalid frame number on line {line}: {value:?}")]
    InvalidFrameNumber { line: usize, value: String },
    #[error("Frame {index} is out of range, the video has {count} frames")]
    FrameOutOfRange { index: usize, count: usize },
    #[error("Failed to compare frames: {0}")]
    Compare(String),
}
