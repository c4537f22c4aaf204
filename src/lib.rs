//! # framedump
//!
//! Dump every frame of a video file to sequentially numbered still images.
//!
//! `framedump` is a linear batch conversion tool: it opens a video container,
//! decodes frames one at a time in presentation order, and writes each one to
//! disk as `frame_00000.jpg`, `frame_00001.jpg`, … so that lexicographic
//! order matches temporal order. Decoding is powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate; frames are
//! encoded with the [`image`](https://crates.io/crates/image) crate.
//!
//! ## Quick Start
//!
//! ```no_run
//! let report = framedump::extract_frames("input.mov", "extracted_frames")?;
//! println!(
//!     "{} frames written to {}",
//!     report.frames_written,
//!     report.output_folder.display(),
//! );
//! # Ok::<(), framedump::ExtractError>(())
//! ```
//!
//! ### Configured extraction
//!
//! ```no_run
//! use framedump::{ExtractionConfig, OutputFormat, ZeroPad, extract_frames_with_config};
//!
//! let config = ExtractionConfig::new()
//!     .with_output_format(OutputFormat::Png)
//!     .with_zero_pad(ZeroPad::Auto);
//!
//! let report = extract_frames_with_config("input.mp4", "frames", &config)?;
//! # Ok::<(), framedump::ExtractError>(())
//! ```
//!
//! ### Decoding frames yourself
//!
//! [`VideoSource`] exposes the sequential decode step directly. Its three
//! outcomes are distinct: a frame, a clean end of stream, or a decode error.
//!
//! ```no_run
//! use framedump::VideoSource;
//!
//! let mut source = VideoSource::open("input.mp4")?;
//! println!("~{} frames declared", source.info().advisory_frame_count);
//! while let Some(frame) = source.next_frame()? {
//!     // each frame is an image::DynamicImage
//! }
//! # Ok::<(), framedump::ExtractError>(())
//! ```
//!
//! ## Behavior notes
//!
//! - The output directory is created (with intermediates) when missing;
//!   re-running against an existing directory silently reuses it.
//! - The container's declared frame count is **advisory** — it feeds progress
//!   percentages and [`ZeroPad::Auto`], never loop termination.
//! - Frames are written strictly in presentation order with contiguous
//!   zero-based indices; each file is fully written before the next frame is
//!   decoded.
//! - A mid-stream decode error stops the run but keeps the frames already
//!   written; [`ExtractionReport::stream_end`] records whether the stream
//!   ended cleanly.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system for
//! `ffmpeg-sys-next` to link against.

pub mod config;
pub mod error;
pub mod extractor;
pub mod ffmpeg;
pub mod progress;
pub mod source;

pub use config::{ExtractionConfig, OutputFormat, ZeroPad};
pub use error::ExtractError;
pub use extractor::{ExtractionReport, StreamEnd, extract_frames, extract_frames_with_config};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use source::{VideoInfo, VideoSource};
