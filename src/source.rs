// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Video input sources.
//!
//! A [`Source`] names where frames come from: a video file, a webcam device,
//! or a network stream. [`SourceIterator`] opens it eagerly and yields
//! decoded RGB frames with per-frame metadata until the stream ends.
//!
//! Opening happens in [`SourceIterator::new`] so an unreadable file or a
//! dead stream fails before any processing starts, not on the first frame.

use std::fmt;
use std::path::PathBuf;

#[cfg(feature = "video")]
use std::sync::Once;

use image::RgbImage;

#[cfg(feature = "video")]
use crate::error::DetectionError;
use crate::error::Result;
#[cfg(feature = "video")]
use crate::warn;

/// Where frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Path to a video file.
    Video(PathBuf),
    /// Webcam device index.
    Webcam(u32),
    /// Streaming URL (RTSP, RTMP, HTTP).
    Stream(String),
}

impl Source {
    /// Whether frames arrive in real time (webcam or network stream).
    ///
    /// Live sources are never paced on playback; file sources are.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Webcam(_) | Self::Stream(_))
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        // A bare number selects a webcam device.
        if let Ok(idx) = s.parse::<u32>() {
            return Self::Webcam(idx);
        }

        if s.starts_with("rtsp://")
            || s.starts_with("rtmp://")
            || s.starts_with("http://")
            || s.starts_with("https://")
        {
            return Self::Stream(s.to_string());
        }

        Self::Video(PathBuf::from(s))
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<u32> for Source {
    fn from(idx: u32) -> Self {
        Self::Webcam(idx)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video(path) => write!(f, "{}", path.display()),
            Self::Webcam(idx) => write!(f, "/dev/video{idx}"),
            Self::Stream(url) => write!(f, "{url}"),
        }
    }
}

/// Metadata attached to each decoded frame.
#[derive(Debug, Clone)]
pub struct SourceMeta {
    /// Zero-based frame index.
    pub frame_idx: usize,
    /// Total frames, when the container declares a duration.
    pub total_frames: Option<usize>,
    /// Source path or identifier.
    pub path: String,
    /// Declared frame rate, when known.
    pub fps: Option<f32>,
}

#[cfg(feature = "video")]
static VIDEO_INIT: Once = Once::new();

/// Initialize the video backend once per process.
#[cfg(feature = "video")]
fn init_video_backend() {
    VIDEO_INIT.call_once(|| {
        if let Err(e) = video_rs::init() {
            warn!("Video backend initialization failed: {e}");
        }
    });
}

/// Iterator over decoded frames from a [`Source`].
#[cfg(feature = "video")]
pub struct SourceIterator {
    source: Source,
    decoder: video_rs::decode::Decoder,
    current_frame: usize,
    total_frames: Option<usize>,
    fps: Option<f32>,
}

#[cfg(feature = "video")]
impl SourceIterator {
    /// Open a source and prepare to decode frames.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::SourceError`] when the file, device, or
    /// stream cannot be opened.
    pub fn new(source: Source) -> Result<Self> {
        init_video_backend();

        let location: video_rs::Location = match &source {
            Source::Video(path) => {
                if !path.exists() {
                    return Err(DetectionError::SourceError(format!(
                        "Video file not found: {}",
                        path.display()
                    )));
                }
                path.clone().into()
            }
            Source::Webcam(idx) => PathBuf::from(format!("/dev/video{idx}")).into(),
            Source::Stream(url) => url::Url::parse(url)
                .map_err(|e| {
                    DetectionError::SourceError(format!("Invalid stream URL {url}: {e}"))
                })?
                .into(),
        };

        let decoder = video_rs::decode::Decoder::new(location)
            .map_err(|e| DetectionError::SourceError(format!("Failed to open {source}: {e}")))?;

        let rate = decoder.frame_rate();
        let fps = if rate > 0.0 { Some(rate) } else { None };

        // Only file sources have a meaningful duration.
        let total_frames = match &source {
            Source::Video(_) => decoder.duration().ok().and_then(|duration| {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                fps.map(|f| (duration.as_secs_f64() * f64::from(f)) as usize)
            }),
            _ => None,
        };

        Ok(Self {
            source,
            decoder,
            current_frame: 0,
            total_frames,
            fps,
        })
    }

    /// Declared frame rate, when the container reports one.
    #[must_use]
    pub fn fps(&self) -> Option<f32> {
        self.fps
    }

    /// The source this iterator reads from.
    #[must_use]
    pub fn source(&self) -> &Source {
        &self.source
    }
}

#[cfg(feature = "video")]
impl Iterator for SourceIterator {
    type Item = Result<(RgbImage, SourceMeta)>;

    fn next(&mut self) -> Option<Self::Item> {
        // Decode errors double as end of stream.
        let (_ts, frame) = self.decoder.decode().ok()?;

        let meta = SourceMeta {
            frame_idx: self.current_frame,
            total_frames: self.total_frames,
            path: self.source.to_string(),
            fps: self.fps,
        };
        self.current_frame += 1;

        Some(video_frame_to_image(&frame).map(|img| (img, meta)))
    }
}

/// Placeholder when video support is compiled out.
#[cfg(not(feature = "video"))]
pub struct SourceIterator(());

#[cfg(not(feature = "video"))]
impl SourceIterator {
    /// Always fails: video input requires the `video` feature.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DetectionError::FeatureNotEnabled`].
    pub fn new(_source: Source) -> Result<Self> {
        Err(crate::error::DetectionError::FeatureNotEnabled(
            "Video input requires the 'video' feature".to_string(),
        ))
    }

    /// Declared frame rate; never known without the `video` feature.
    #[must_use]
    pub fn fps(&self) -> Option<f32> {
        None
    }
}

#[cfg(not(feature = "video"))]
impl Iterator for SourceIterator {
    type Item = Result<(RgbImage, SourceMeta)>;

    fn next(&mut self) -> Option<Self::Item> {
        None
    }
}

/// Convert a decoded HWC frame to an `RgbImage`.
#[cfg(feature = "video")]
fn video_frame_to_image(arr: &video_rs::Frame) -> Result<RgbImage> {
    let shape = arr.shape();
    let height = u32::try_from(shape[0])
        .map_err(|_| DetectionError::FrameError("Frame height exceeds u32::MAX".to_string()))?;
    let width = u32::try_from(shape[1])
        .map_err(|_| DetectionError::FrameError("Frame width exceeds u32::MAX".to_string()))?;

    let mut rgb_data = Vec::with_capacity((height * width * 3) as usize);
    for y in 0..height as usize {
        for x in 0..width as usize {
            rgb_data.push(arr[[y, x, 0]]);
            rgb_data.push(arr[[y, x, 1]]);
            rgb_data.push(arr[[y, x, 2]]);
        }
    }

    RgbImage::from_raw(width, height, rgb_data)
        .ok_or_else(|| DetectionError::FrameError("Failed to create image from frame".to_string()))
}
