//! Video source access.
//!
//! [`VideoSource`] opens a media file with FFmpeg, captures its metadata,
//! and provides the two access patterns matching needs: a sequential
//! [`FrameScanner`] that yields every frame downscaled to the comparison
//! resolution in ascending index order, and random-access full-resolution
//! fetch for export.
//!
//! Each scanner opens its own demuxer and decoder, so any number of sources
//! can be scanned concurrently without shared mutable state.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::Context as ScalingContext,
};
use image::{DynamicImage, RgbImage};

use crate::{error::FrameMatchError, plane::PlaneFrame, resizer::ResizeFilter};

/// Stream properties captured when a source is opened.
#[derive(Debug, Clone)]
pub struct SourceMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Total frame count. Zero when the container reports neither a frame
    /// count nor a usable duration.
    pub frame_count: u64,
    /// Average frames per second.
    pub frames_per_second: f64,
    /// Name of the source pixel format (e.g. `yuv420p`).
    pub pixel_format: String,
    /// Name of the video codec.
    pub codec: String,
}

/// An opened video source.
///
/// Created via [`VideoSource::open`]. Holds the demuxer context for
/// random-access frame fetches; sequential scanning goes through
/// [`scanner`](VideoSource::scanner), which opens an independent context.
pub struct VideoSource {
    /// The opened FFmpeg input (demuxer) context, used for seeking fetches.
    input: Input,
    /// Index of the best video stream.
    stream_index: usize,
    /// Cached metadata extracted at open time.
    metadata: SourceMetadata,
    /// Path to the opened file, kept for error messages and re-opening.
    path: PathBuf,
}

impl Debug for VideoSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoSource")
            .field("path", &self.path)
            .field("stream_index", &self.stream_index)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl VideoSource {
    /// Open a video source and capture its metadata.
    ///
    /// Initialises FFmpeg (idempotent), opens the file, and locates the best
    /// video stream.
    ///
    /// # Errors
    ///
    /// - [`FrameMatchError::SourceOpen`] if the file cannot be opened.
    /// - [`FrameMatchError::NoVideoStream`] if it has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameMatchError> {
        let path = path.as_ref().to_path_buf();

        ffmpeg_next::init().map_err(|error| FrameMatchError::SourceOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        log::debug!("Opening video source: {}", path.display());

        let input =
            ffmpeg_next::format::input(&path).map_err(|error| FrameMatchError::SourceOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| FrameMatchError::NoVideoStream { path: path.clone() })?;
        let stream_index = stream.index();

        let decoder = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| FrameMatchError::SourceOpen {
                path: path.clone(),
                reason: format!("Failed to read video codec parameters: {error}"),
            })?
            .decoder()
            .video()
            .map_err(|error| FrameMatchError::SourceOpen {
                path: path.clone(),
                reason: format!("Failed to create video decoder: {error}"),
            })?;

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

        // Prefer the stream's own frame count; fall back to duration x fps.
        let frame_count = if stream.frames() > 0 {
            stream.frames() as u64
        } else {
            let duration_microseconds = input.duration();
            if duration_microseconds > 0 && frames_per_second > 0.0 {
                (duration_microseconds as f64 / 1_000_000.0 * frames_per_second) as u64
            } else {
                0
            }
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = SourceMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frame_count,
            frames_per_second,
            pixel_format: format!("{:?}", decoder.format()),
            codec,
        };

        log::debug!(
            "Opened {} ({}x{}, {} frames, {:.3} fps, {})",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frame_count,
            metadata.frames_per_second,
            metadata.codec,
        );

        Ok(Self {
            input,
            stream_index,
            metadata,
            path,
        })
    }

    /// Cached metadata for this source.
    pub fn metadata(&self) -> &SourceMetadata {
        &self.metadata
    }

    /// The path this source was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file name component of the source path, used in export names.
    pub fn basename(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Create a sequential scanner over this source's frames, downscaled to
    /// `width` x `height` in planar YUV 4:2:0.
    ///
    /// The scanner opens its own demuxer context, so scanners for different
    /// sources (or even the same source) never interfere.
    ///
    /// # Errors
    ///
    /// Returns [`FrameMatchError::SourceOpen`] if the file cannot be
    /// re-opened, or a scaling setup error from FFmpeg.
    pub fn scanner(
        &self,
        width: u32,
        height: u32,
        filter: ResizeFilter,
    ) -> Result<FrameScanner, FrameMatchError> {
        FrameScanner::open(&self.path, width, height, filter)
    }

    /// Fetch one frame at full resolution, scaled to `width` x `height` RGB.
    ///
    /// Seeks to the nearest keyframe before the target and decodes forward
    /// until the requested frame is reached.
    ///
    /// # Errors
    ///
    /// Returns [`FrameMatchError::Decode`] if the frame cannot be located or
    /// decoded, or an FFmpeg error from seeking/scaling.
    pub fn fetch_frame(
        &mut self,
        frame_index: u64,
        width: u32,
        height: u32,
        filter: ResizeFilter,
    ) -> Result<DynamicImage, FrameMatchError> {
        let frames_per_second = self.metadata.frames_per_second;

        let stream = self
            .input
            .stream(self.stream_index)
            .ok_or_else(|| FrameMatchError::NoVideoStream {
                path: self.path.clone(),
            })?;
        let time_base = stream.time_base();
        let mut decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            width,
            height,
            filter.to_scaling_flags(),
        )?;

        // Seek to the nearest keyframe at or before the target frame.
        let target_timestamp = frame_index_to_stream_timestamp(frame_index, frames_per_second, time_base);
        self.input.seek(target_timestamp, ..target_timestamp)?;

        let mut decoded = VideoFrame::empty();
        let mut rgb = VideoFrame::empty();

        for (stream, packet) in self.input.packets() {
            if stream.index() != self.stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(0);
                let current = pts_to_frame_index(pts, time_base, frames_per_second);

                // Past-target frames are accepted too: a seek can land on a
                // keyframe after the requested index for open-GOP content.
                if current >= frame_index {
                    scaler.run(&decoded, &mut rgb)?;
                    return rgb_frame_to_image(&rgb, width, height, &self.path, frame_index);
                }
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            let pts = decoded.pts().unwrap_or(0);
            if pts_to_frame_index(pts, time_base, frames_per_second) >= frame_index {
                scaler.run(&decoded, &mut rgb)?;
                return rgb_frame_to_image(&rgb, width, height, &self.path, frame_index);
            }
        }

        Err(FrameMatchError::Decode {
            path: self.path.clone(),
            frame_index,
            reason: "frame not found in the video stream".to_string(),
        })
    }
}

/// Sequential decoder that yields comparison frames in ascending index
/// order.
///
/// Frame indices are assigned by decode order, starting at zero, which is
/// deterministic for a fixed input. The scanner never seeks.
pub struct FrameScanner {
    input: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    stream_index: usize,
    path: PathBuf,
    next_index: u64,
    eof_sent: bool,
    finished: bool,
}

impl FrameScanner {
    pub(crate) fn open(
        path: &Path,
        width: u32,
        height: u32,
        filter: ResizeFilter,
    ) -> Result<Self, FrameMatchError> {
        let input =
            ffmpeg_next::format::input(&path).map_err(|error| FrameMatchError::SourceOpen {
                path: path.to_path_buf(),
                reason: error.to_string(),
            })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| FrameMatchError::NoVideoStream {
                path: path.to_path_buf(),
            })?;
        let stream_index = stream.index();

        let decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::YUV420P,
            width,
            height,
            filter.to_scaling_flags(),
        )?;

        Ok(Self {
            input,
            decoder,
            scaler,
            stream_index,
            path: path.to_path_buf(),
            next_index: 0,
            eof_sent: false,
            finished: false,
        })
    }

    /// The index the next yielded frame will carry.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    fn decode_error(&self, reason: impl ToString) -> FrameMatchError {
        FrameMatchError::Decode {
            path: self.path.clone(),
            frame_index: self.next_index,
            reason: reason.to_string(),
        }
    }

    fn next_frame(&mut self) -> Result<Option<PlaneFrame>, FrameMatchError> {
        let mut decoded = VideoFrame::empty();

        loop {
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                let mut scaled = VideoFrame::empty();
                self.scaler
                    .run(&decoded, &mut scaled)
                    .map_err(|error| self.decode_error(error))?;
                self.next_index += 1;
                return Ok(Some(PlaneFrame::from_yuv420(&scaled)));
            }

            if self.eof_sent {
                return Ok(None);
            }

            // Pull the next packet belonging to the video stream; reaching
            // the end of the container flushes the decoder.
            let mut next_packet = None;
            for (stream, packet) in self.input.packets() {
                if stream.index() == self.stream_index {
                    next_packet = Some(packet);
                    break;
                }
            }

            match next_packet {
                Some(packet) => self
                    .decoder
                    .send_packet(&packet)
                    .map_err(|error| self.decode_error(error))?,
                None => {
                    self.decoder
                        .send_eof()
                        .map_err(|error| self.decode_error(error))?;
                    self.eof_sent = true;
                }
            }
        }
    }
}

impl Iterator for FrameScanner {
    type Item = Result<PlaneFrame, FrameMatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(error) => {
                // A failed decode invalidates the whole scan.
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

/// Convert a scaled RGB24 frame into an [`image::DynamicImage`].
fn rgb_frame_to_image(
    rgb: &VideoFrame,
    width: u32,
    height: u32,
    path: &Path,
    frame_index: u64,
) -> Result<DynamicImage, FrameMatchError> {
    let stride = rgb.stride(0);
    let row_bytes = width as usize * 3;
    let data = rgb.data(0);

    let buffer = if stride == row_bytes {
        data[..row_bytes * height as usize].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * stride;
            buffer.extend_from_slice(&data[start..start + row_bytes]);
        }
        buffer
    };

    let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        FrameMatchError::Decode {
            path: path.to_path_buf(),
            frame_index,
            reason: "failed to construct RGB image from decoded frame data".to_string(),
        }
    })?;
    Ok(DynamicImage::ImageRgb8(image))
}

/// Convert a frame index to a timestamp in the stream's time base.
fn frame_index_to_stream_timestamp(
    frame_index: u64,
    frames_per_second: f64,
    time_base: ffmpeg_next::Rational,
) -> i64 {
    if frames_per_second <= 0.0 {
        return 0;
    }
    let seconds = frame_index as f64 / frames_per_second;
    let numerator = time_base.numerator() as f64;
    let denominator = time_base.denominator() as f64;
    (seconds * denominator / numerator) as i64
}

/// Rescale a PTS value to a frame index.
fn pts_to_frame_index(pts: i64, time_base: ffmpeg_next::Rational, frames_per_second: f64) -> u64 {
    let seconds =
        pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64;
    let index = seconds * frames_per_second;
    if index <= 0.0 { 0 } else { index.round() as u64 }
}
