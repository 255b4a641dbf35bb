// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the detection pipeline.

use std::fmt;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, DetectionError>;

/// Main error type for the detection pipeline.
#[derive(Debug)]
pub enum DetectionError {
    /// Error loading the inference engine (bad weights/config).
    EngineLoadError(String),
    /// Error during a forward pass.
    InferenceError(String),
    /// Error processing frames or images.
    FrameError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// IO error (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// Video source error (failed to open or decode).
    SourceError(String),
    /// Visualizer error.
    VisualizerError(String),
    /// Feature not enabled.
    FeatureNotEnabled(String),
}

impl fmt::Display for DetectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EngineLoadError(msg) => write!(f, "Engine load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::FrameError(msg) => write!(f, "Frame error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::SourceError(msg) => write!(f, "Source error: {msg}"),
            Self::VisualizerError(msg) => write!(f, "Visualizer error: {msg}"),
            Self::FeatureNotEnabled(msg) => write!(f, "Feature not enabled: {msg}"),
        }
    }
}

impl std::error::Error for DetectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DetectionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for DetectionError {
    fn from(err: image::ImageError) -> Self {
        Self::FrameError(err.to_string())
    }
}
