//! Error types for the `framedump` crate.
//!
//! This module defines [`ExtractError`], the unified error type returned by
//! all fallible operations in the crate. Variants carry file paths, frame
//! numbers, and upstream error messages so failures can be diagnosed without
//! additional logging at the call site.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `framedump` operations.
///
/// Every public method that can fail returns `Result<T, ExtractError>`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// The output directory could not be created.
    #[error("Failed to create output directory {path}: {source}")]
    DirectoryCreate {
        /// The directory that was being created.
        path: PathBuf,
        /// The underlying filesystem error.
        source: IoError,
    },

    /// The video file could not be opened.
    ///
    /// Covers a missing file, an unsupported container/codec, and corrupt
    /// input alike — whatever reason the demuxer gives for refusing the file.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoSource::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file opened but contains no video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A frame could not be decoded.
    ///
    /// This is a genuine mid-stream failure, deliberately distinct from a
    /// clean end of stream (which `next_frame` signals with `Ok(None)`).
    #[error("Failed to decode video frame: {0}")]
    Decode(String),

    /// A decoded frame could not be written to disk.
    #[error("Failed to write frame image {path}: {source}")]
    FrameWrite {
        /// The output file that was being written.
        path: PathBuf,
        /// The underlying encode/write error.
        source: ImageError,
    },

    /// The operation was cancelled via a
    /// [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate during frame conversion.
    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),
}

impl From<FfmpegError> for ExtractError {
    fn from(error: FfmpegError) -> Self {
        ExtractError::Ffmpeg(error.to_string())
    }
}
