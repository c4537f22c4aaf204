//! The frame extraction loop.
//!
//! [`extract_frames`] is the crate's single linear operation: ensure the
//! output directory exists, open the video, then pull frames one at a time in
//! presentation order, writing each as `frame_{index}.jpg` before requesting
//! the next. The run ends when the stream is exhausted, a decode error
//! occurs, or cancellation is requested; the decoder handle is released on
//! every path.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::{ExtractionConfig, OutputFormat},
    error::ExtractError,
    progress::ProgressTracker,
    source::VideoSource,
};

/// How the extraction loop reached its end.
///
/// A clean end of stream and a mid-stream decode failure both terminate the
/// loop with the frames written so far intact; this enum keeps the two
/// distinguishable in the [`ExtractionReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The demuxer reached EOF and the decoder was fully drained.
    EndOfStream,
    /// Decoding failed before the stream was exhausted.
    DecodeError {
        /// Index of the frame that failed (equal to the count written).
        frame: u64,
        /// The underlying decode error.
        reason: String,
    },
}

impl StreamEnd {
    /// `true` when the stream ended without a decode failure.
    pub fn is_clean(&self) -> bool {
        matches!(self, StreamEnd::EndOfStream)
    }
}

/// Summary of a completed extraction run.
#[derive(Debug, Clone)]
#[must_use]
pub struct ExtractionReport {
    /// Number of frames fully written to disk, which is also one past the
    /// highest index used in a filename.
    pub frames_written: u64,
    /// The container's declared frame count; advisory only, and may differ
    /// from `frames_written` even on a clean end.
    pub advisory_frame_count: u64,
    /// The directory the frames were written to.
    pub output_folder: PathBuf,
    /// How the decode loop terminated.
    pub stream_end: StreamEnd,
}

/// Extract every frame of `video_path` into `output_folder` with default
/// settings: JPEG output, `frame_00000.jpg` naming, a progress log every 100
/// frames.
///
/// See [`extract_frames_with_config`] for the full behavior description.
///
/// # Example
///
/// ```no_run
/// let report = framedump::extract_frames("input.mov", "extracted_frames")?;
/// println!("{} frames extracted", report.frames_written);
/// # Ok::<(), framedump::ExtractError>(())
/// ```
pub fn extract_frames<P, Q>(video_path: P, output_folder: Q) -> Result<ExtractionReport, ExtractError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    extract_frames_with_config(video_path, output_folder, &ExtractionConfig::default())
}

/// Extract every frame of `video_path` into `output_folder`.
///
/// Side effects, in order:
///
/// 1. Create `output_folder` (including intermediate directories) if it does
///    not exist. Re-running against an existing directory is not an error and
///    silently reuses it; creation is logged only when it actually happens.
/// 2. Open the video. The advisory frame count is logged once and used only
///    for progress percentages and [`ZeroPad::Auto`](crate::ZeroPad) width,
///    never for loop termination.
/// 3. Decode frames sequentially, writing each to
///    `output_folder/frame_{index}.{ext}` with a zero-based, contiguous,
///    zero-padded index. Each file is fully written before the next frame is
///    requested. The progress callback fires every
///    `progress_interval` written frames.
/// 4. Stop on end of stream or on a decode error — distinguished in
///    [`ExtractionReport::stream_end`] — releasing the decoder handle either
///    way, then log the final count.
///
/// # Errors
///
/// - [`ExtractError::DirectoryCreate`] if the output directory cannot be
///   created.
/// - [`ExtractError::FileOpen`] / [`ExtractError::NoVideoStream`] if the
///   video cannot be opened; no frames are produced, and the output
///   directory (already created in step 1) is the only side effect.
/// - [`ExtractError::FrameWrite`] if a frame cannot be encoded or written
///   (disk full, permission denied). Frames written before the failure
///   remain on disk.
/// - [`ExtractError::Cancelled`] if the configured
///   [`CancellationToken`](crate::CancellationToken) fires.
///
/// A mid-stream decode error is **not** an `Err`: the loop stops, and the
/// report carries [`StreamEnd::DecodeError`] alongside the count of frames
/// successfully written up to that point. A zero-frame but openable video
/// yields `Ok` with `frames_written == 0`.
pub fn extract_frames_with_config<P, Q>(
    video_path: P,
    output_folder: Q,
    config: &ExtractionConfig,
) -> Result<ExtractionReport, ExtractError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let output_folder = output_folder.as_ref();

    if !output_folder.exists() {
        fs::create_dir_all(output_folder).map_err(|source| ExtractError::DirectoryCreate {
            path: output_folder.to_path_buf(),
            source,
        })?;
        log::info!("Created directory: {}", output_folder.display());
    }

    let mut source = VideoSource::open(video_path)?;
    let advisory_frame_count = source.info().advisory_frame_count;
    log::info!("Total frames to extract (advisory): {advisory_frame_count}");

    let (frames_written, stream_end) = run_extraction_loop(
        || source.next_frame(),
        output_folder,
        config,
        advisory_frame_count,
    )?;
    drop(source);

    log::info!(
        "Done! Successfully extracted {frames_written} images to '{}'",
        output_folder.display(),
    );

    Ok(ExtractionReport {
        frames_written,
        advisory_frame_count,
        output_folder: output_folder.to_path_buf(),
        stream_end,
    })
}

/// The write loop: pull frames from `next_frame`, writing each one fully
/// before requesting the next.
///
/// Generic over the frame source so the terminal-state handling (clean end,
/// decode abort, cancellation, write failure) is testable without decoding.
/// Returns the count of frames written and how the stream ended.
fn run_extraction_loop<F>(
    mut next_frame: F,
    output_folder: &Path,
    config: &ExtractionConfig,
    advisory_frame_count: u64,
) -> Result<(u64, StreamEnd), ExtractError>
where
    F: FnMut() -> Result<Option<image::DynamicImage>, ExtractError>,
{
    let pad_width = config.zero_pad.resolve(advisory_frame_count);
    let format = config.output_format;
    let mut tracker = ProgressTracker::new(
        config.progress.clone(),
        Some(advisory_frame_count).filter(|&total| total > 0),
        config.progress_interval,
    );

    let mut frames_written: u64 = 0;
    let stream_end = loop {
        if config.is_cancelled() {
            return Err(ExtractError::Cancelled);
        }

        match next_frame() {
            Ok(Some(image)) => {
                let path = output_folder.join(frame_filename(frames_written, pad_width, format));
                image
                    .save(&path)
                    .map_err(|error| ExtractError::FrameWrite {
                        path,
                        source: error,
                    })?;
                frames_written += 1;
                tracker.advance();
            }
            Ok(None) => break StreamEnd::EndOfStream,
            Err(error) => {
                log::warn!("Decoding aborted at frame {frames_written}: {error}");
                break StreamEnd::DecodeError {
                    frame: frames_written,
                    reason: error.to_string(),
                };
            }
        }
    };

    Ok((frames_written, stream_end))
}

/// Build the filename for a frame index, e.g. `frame_00042.jpg`.
fn frame_filename(index: u64, pad_width: usize, format: OutputFormat) -> String {
    format!(
        "frame_{index:0pad_width$}.{ext}",
        ext = format.extension()
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use image::{DynamicImage, RgbImage};

    use super::*;
    use crate::progress::{CancellationToken, ProgressCallback, ProgressInfo};

    fn test_frame() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(4, 4))
    }

    /// A synthetic frame source yielding `frames` frames, then the given
    /// terminal state.
    fn synthetic_source(
        frames: u64,
        terminal: Result<Option<DynamicImage>, ExtractError>,
    ) -> impl FnMut() -> Result<Option<DynamicImage>, ExtractError> {
        let mut remaining = frames;
        let mut terminal = Some(terminal);
        move || {
            if remaining > 0 {
                remaining -= 1;
                Ok(Some(test_frame()))
            } else {
                terminal.take().unwrap_or(Ok(None))
            }
        }
    }

    struct RecordingProgress {
        reports: Mutex<Vec<ProgressInfo>>,
    }

    impl RecordingProgress {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                reports: Mutex::new(Vec::new()),
            })
        }

        fn frames(&self) -> Vec<u64> {
            self.reports
                .lock()
                .unwrap()
                .iter()
                .map(|info| info.frames_written)
                .collect()
        }
    }

    impl ProgressCallback for RecordingProgress {
        fn on_progress(&self, info: &ProgressInfo) {
            self.reports.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn decode_error_preserves_written_frames() {
        let scratch = tempfile::tempdir().expect("Failed to create temp dir");
        let source = synthetic_source(3, Err(ExtractError::Decode("corrupt packet".to_string())));

        let (frames_written, stream_end) =
            run_extraction_loop(source, scratch.path(), &ExtractionConfig::new(), 10)
                .expect("Decode abort must not be an Err");

        assert_eq!(frames_written, 3);
        match stream_end {
            StreamEnd::DecodeError { frame, reason } => {
                assert_eq!(frame, 3);
                assert!(reason.contains("corrupt packet"), "reason: {reason}");
            }
            other => panic!("Expected DecodeError, got {other:?}"),
        }

        // The frames written before the abort stay on disk, nothing after.
        for index in 0..3 {
            assert!(scratch.path().join(format!("frame_0000{index}.jpg")).exists());
        }
        assert!(!scratch.path().join("frame_00003.jpg").exists());
    }

    #[test]
    fn zero_frame_stream_completes_with_zero_files() {
        let scratch = tempfile::tempdir().expect("Failed to create temp dir");
        let source = synthetic_source(0, Ok(None));

        let (frames_written, stream_end) =
            run_extraction_loop(source, scratch.path(), &ExtractionConfig::new(), 0)
                .expect("Zero-frame stream must complete");

        assert_eq!(frames_written, 0);
        assert_eq!(stream_end, StreamEnd::EndOfStream);
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn cancelled_loop_stops_before_the_next_frame() {
        let scratch = tempfile::tempdir().expect("Failed to create temp dir");
        let token = CancellationToken::new();
        token.cancel();
        let config = ExtractionConfig::new().with_cancellation(token);

        let result = run_extraction_loop(synthetic_source(5, Ok(None)), scratch.path(), &config, 5);
        assert!(matches!(result, Err(ExtractError::Cancelled)));
        assert_eq!(fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn run_below_interval_boundary_emits_no_progress() {
        let scratch = tempfile::tempdir().expect("Failed to create temp dir");
        let recorder = RecordingProgress::new();
        let config = ExtractionConfig::new().with_progress(recorder.clone());

        let (frames_written, _) =
            run_extraction_loop(synthetic_source(99, Ok(None)), scratch.path(), &config, 99)
                .expect("Extraction failed");

        assert_eq!(frames_written, 99);
        assert!(
            recorder.frames().is_empty(),
            "99 frames with the default interval must report nothing",
        );
    }

    #[test]
    fn run_reports_exactly_on_interval_multiples() {
        let scratch = tempfile::tempdir().expect("Failed to create temp dir");
        let recorder = RecordingProgress::new();
        let config = ExtractionConfig::new().with_progress(recorder.clone());

        let (frames_written, stream_end) =
            run_extraction_loop(synthetic_source(250, Ok(None)), scratch.path(), &config, 250)
                .expect("Extraction failed");

        assert_eq!(frames_written, 250);
        assert_eq!(stream_end, StreamEnd::EndOfStream);
        assert_eq!(recorder.frames(), vec![100, 200]);
    }

    #[test]
    fn filenames_are_zero_based_and_padded() {
        assert_eq!(frame_filename(0, 5, OutputFormat::Jpg), "frame_00000.jpg");
        assert_eq!(frame_filename(42, 5, OutputFormat::Jpg), "frame_00042.jpg");
        assert_eq!(frame_filename(249, 5, OutputFormat::Jpg), "frame_00249.jpg");
    }

    #[test]
    fn filenames_respect_format_and_width() {
        assert_eq!(frame_filename(7, 5, OutputFormat::Png), "frame_00007.png");
        assert_eq!(frame_filename(7, 6, OutputFormat::Jpg), "frame_000007.jpg");
    }

    #[test]
    fn padding_overflows_rather_than_truncates() {
        // Past the pad width, sort order is no longer guaranteed but the
        // index is never cut short.
        assert_eq!(
            frame_filename(123_456, 5, OutputFormat::Jpg),
            "frame_123456.jpg"
        );
    }

    #[test]
    fn lexicographic_order_matches_temporal_order_within_width() {
        let names: Vec<String> = [0, 1, 9, 10, 99, 100, 9_999, 99_999]
            .iter()
            .map(|&index| frame_filename(index, 5, OutputFormat::Jpg))
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn stream_end_cleanliness() {
        assert!(StreamEnd::EndOfStream.is_clean());
        assert!(
            !StreamEnd::DecodeError {
                frame: 3,
                reason: "bad packet".to_string(),
            }
            .is_clean()
        );
    }
}
