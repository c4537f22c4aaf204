//! Extraction configuration.
//!
//! [`ExtractionConfig`] is a builder that carries the output image format,
//! filename padding policy, progress reporting, and cancellation through
//! [`extract_frames_with_config`](crate::extract_frames_with_config) without
//! burying runtime defaults in the extraction logic itself.
//!
//! # Example
//!
//! ```no_run
//! use framedump::{ExtractionConfig, OutputFormat, ZeroPad};
//!
//! let config = ExtractionConfig::new()
//!     .with_output_format(OutputFormat::Png)
//!     .with_zero_pad(ZeroPad::Auto)
//!     .with_progress_interval(50);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::progress::{CancellationToken, LogProgress, ProgressCallback};

/// Encoding used for the extracted frame images.
///
/// The format determines the file extension, and the extension drives the
/// encoder selected by [`image::DynamicImage::save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JPEG output (`.jpg`). This is the default.
    #[default]
    Jpg,
    /// PNG output (`.png`) — lossless, larger files.
    Png,
}

impl OutputFormat {
    /// The file extension for this format, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Zero-padding policy for frame filenames.
///
/// A fixed width of 5 reproduces the classic `frame_00000.jpg` naming, which
/// keeps lexicographic order equal to temporal order for up to 100 000
/// frames. [`ZeroPad::Auto`] sizes the width from the advisory frame count
/// instead, so longer videos keep sorting correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroPad {
    /// Always pad indices to exactly this many digits.
    Fixed(u32),
    /// Pad to the advisory frame count's digit count, with a floor of 5.
    Auto,
}

impl Default for ZeroPad {
    fn default() -> Self {
        ZeroPad::Fixed(5)
    }
}

impl ZeroPad {
    /// Resolve the concrete pad width given the advisory frame count.
    pub(crate) fn resolve(self, advisory_frame_count: u64) -> usize {
        match self {
            ZeroPad::Fixed(width) => width as usize,
            ZeroPad::Auto => {
                let digits = if advisory_frame_count == 0 {
                    1
                } else {
                    advisory_frame_count.ilog10() as usize + 1
                };
                digits.max(5)
            }
        }
    }
}

/// Configuration for a frame extraction run.
///
/// All fields have defaults matching the plain
/// [`extract_frames`](crate::extract_frames) behavior: JPEG output, 5-digit
/// padding, a progress report every 100 frames, no cancellation.
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Image encoding for the output files.
    pub(crate) output_format: OutputFormat,
    /// Filename zero-padding policy.
    pub(crate) zero_pad: ZeroPad,
    /// Fire the progress callback every N written frames.
    pub(crate) progress_interval: u64,
    /// Progress callback. Defaults to logging via the `log` crate.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Debug for ExtractionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractionConfig")
            .field("output_format", &self.output_format)
            .field("zero_pad", &self.zero_pad)
            .field("progress_interval", &self.progress_interval)
            .field("has_cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self {
            output_format: OutputFormat::Jpg,
            zero_pad: ZeroPad::default(),
            progress_interval: 100,
            progress: Arc::new(LogProgress),
            cancellation: None,
        }
    }

    /// Set the output image format.
    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set the filename zero-padding policy.
    #[must_use]
    pub fn with_zero_pad(mut self, zero_pad: ZeroPad) -> Self {
        self.zero_pad = zero_pad;
        self
    }

    /// Set how often the progress callback fires, in written frames.
    ///
    /// Clamped to a minimum of 1.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token.
    ///
    /// When the token is cancelled the extraction loop stops before the next
    /// frame and returns
    /// [`ExtractError::Cancelled`](crate::ExtractError::Cancelled).
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Returns `true` if cancellation has been requested.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plain_extraction() {
        let config = ExtractionConfig::new();
        assert_eq!(config.output_format, OutputFormat::Jpg);
        assert_eq!(config.zero_pad, ZeroPad::Fixed(5));
        assert_eq!(config.progress_interval, 100);
        assert!(config.cancellation.is_none());
        assert!(!config.is_cancelled());
    }

    #[test]
    fn progress_interval_clamped_to_one() {
        let config = ExtractionConfig::new().with_progress_interval(0);
        assert_eq!(config.progress_interval, 1);
    }

    #[test]
    fn fixed_pad_ignores_advisory_count() {
        assert_eq!(ZeroPad::Fixed(5).resolve(1_000_000), 5);
        assert_eq!(ZeroPad::Fixed(8).resolve(10), 8);
    }

    #[test]
    fn auto_pad_grows_with_advisory_count() {
        assert_eq!(ZeroPad::Auto.resolve(0), 5);
        assert_eq!(ZeroPad::Auto.resolve(250), 5);
        assert_eq!(ZeroPad::Auto.resolve(99_999), 5);
        assert_eq!(ZeroPad::Auto.resolve(100_000), 6);
        assert_eq!(ZeroPad::Auto.resolve(1_234_567), 7);
    }

    #[test]
    fn output_format_extensions() {
        assert_eq!(OutputFormat::Jpg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::default(), OutputFormat::Jpg);
    }
}
