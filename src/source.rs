//! Sequential video decoding.
//!
//! [`VideoSource`] wraps an opened FFmpeg demuxer plus a video decoder and
//! pixel-format converter, and yields decoded frames one at a time in
//! presentation order via [`next_frame`](VideoSource::next_frame). There is
//! no seeking: decoding always starts at the first frame and runs forward
//! until the stream is exhausted.
//!
//! The underlying decoder and file handle are released when the source is
//! dropped, on every exit path.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::error::ExtractError;

/// Metadata snapshot captured when the video is opened.
///
/// The frame count is **advisory**: containers routinely declare a count that
/// differs from the number of frames actually decodable. It is suitable for
/// progress ratios and filename padding, never for loop termination.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoInfo {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Declared total frame count; 0 when the container reports nothing usable.
    pub advisory_frame_count: u64,
    /// Video codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`).
    pub format: String,
    /// Container-level duration.
    pub duration: Duration,
}

/// An opened video stream handle.
///
/// Owns the demuxer context, the video decoder, and the scaler that converts
/// decoded frames to RGB. Created via [`open`](VideoSource::open); dropped
/// resources are released exactly once regardless of how the owner exits.
///
/// # Example
///
/// ```no_run
/// use framedump::VideoSource;
///
/// let mut source = VideoSource::open("input.mp4")?;
/// while let Some(frame) = source.next_frame()? {
///     println!("{}x{}", frame.width(), frame.height());
/// }
/// # Ok::<(), framedump::ExtractError>(())
/// ```
pub struct VideoSource {
    input: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    info: VideoInfo,
    decoded_frame: VideoFrame,
    rgb_frame: VideoFrame,
    eof_sent: bool,
    path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("info", &self.info)
            .field("video_stream_index", &self.video_stream_index)
            .field("eof_sent", &self.eof_sent)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video file for sequential decoding.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, locates the best
    /// video stream, builds a decoder for it, and captures [`VideoInfo`].
    ///
    /// # Errors
    ///
    /// - [`ExtractError::FileOpen`] if the file cannot be opened (missing
    ///   path, unsupported container, corrupt data) or its codec parameters
    ///   cannot be read.
    /// - [`ExtractError::NoVideoStream`] if the file has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ExtractError> {
        let path = path.as_ref().to_path_buf();

        // Initialise ffmpeg (safe to call multiple times).
        ffmpeg_next::init().map_err(|error| ExtractError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        log::debug!("Opening video file: {}", path.display());
        let input = ffmpeg_next::format::input(&path).map_err(|error| ExtractError::FileOpen {
            path: path.clone(),
            reason: error.to_string(),
        })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or(ExtractError::NoVideoStream)?;
        let video_stream_index = stream.index();
        let declared_frames = stream.frames();

        // Frames per second from the stream's average frame rate, falling
        // back to the nominal rate field.
        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let codec_parameters = stream.parameters();
        let decoder_context =
            CodecContext::from_parameters(codec_parameters).map_err(|error| {
                ExtractError::FileOpen {
                    path: path.clone(),
                    reason: format!("Failed to read video codec parameters: {error}"),
                }
            })?;
        let decoder = decoder_context
            .decoder()
            .video()
            .map_err(|error| ExtractError::FileOpen {
                path: path.clone(),
                reason: format!("Failed to create video decoder: {error}"),
            })?;

        let width = decoder.width();
        let height = decoder.height();

        let duration_microseconds = input.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        // Prefer the container's declared frame count; estimate from the
        // duration when the container does not carry one.
        let advisory_frame_count = if declared_frames > 0 {
            declared_frames as u64
        } else if frames_per_second > 0.0 {
            (duration.as_secs_f64() * frames_per_second) as u64
        } else {
            0
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let format = input.format().name().to_string();

        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        let info = VideoInfo {
            width,
            height,
            frames_per_second,
            advisory_frame_count,
            codec,
            format,
            duration,
        };

        Ok(Self {
            input,
            decoder,
            scaler,
            video_stream_index,
            info,
            decoded_frame: VideoFrame::empty(),
            rgb_frame: VideoFrame::empty(),
            eof_sent: false,
            path,
        })
    }

    /// Metadata captured at open time. Requires no additional decoding.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// The path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decode the next frame in presentation order.
    ///
    /// The three outcomes are deliberately distinct:
    ///
    /// - `Ok(Some(frame))` — the next decoded frame, as an RGB8
    ///   [`DynamicImage`].
    /// - `Ok(None)` — clean end of stream: the demuxer reached EOF and the
    ///   decoder has been fully drained.
    /// - `Err(..)` — a genuine mid-stream failure (packet read error, decoder
    ///   rejection, frame conversion failure).
    ///
    /// After `Ok(None)`, further calls keep returning `Ok(None)`.
    pub fn next_frame(&mut self) -> Result<Option<DynamicImage>, ExtractError> {
        loop {
            // Drain any frame the decoder has already produced.
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                let image = self.convert_current_frame()?;
                return Ok(Some(image));
            }

            if self.eof_sent {
                // EOF flushed and decoder drained.
                return Ok(None);
            }

            // Feed the decoder more packets.
            let mut packet = Packet::empty();
            match packet.read(&mut self.input) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        self.decoder
                            .send_packet(&packet)
                            .map_err(|error| ExtractError::Decode(error.to_string()))?;
                    }
                    // Non-video packets are silently skipped.
                }
                Err(FfmpegError::Eof) => {
                    self.decoder
                        .send_eof()
                        .map_err(|error| ExtractError::Decode(error.to_string()))?;
                    self.eof_sent = true;
                }
                Err(error) => {
                    return Err(ExtractError::Decode(format!(
                        "Packet read failed: {error}"
                    )));
                }
            }
        }
    }

    /// Scale the current decoded frame to RGB24 and wrap it as an image.
    fn convert_current_frame(&mut self) -> Result<DynamicImage, ExtractError> {
        self.scaler.run(&self.decoded_frame, &mut self.rgb_frame)?;

        let width = self.info.width;
        let height = self.info.height;
        let buffer = frame_to_rgb_buffer(&self.rgb_frame, width, height);
        let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            ExtractError::Decode(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(rgb_image))
    }
}

/// Copy pixel data from an FFmpeg video frame into a tightly-packed RGB
/// buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × 3); this
/// strips it so the result can be passed to [`image::RgbImage::from_raw`].
fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}
