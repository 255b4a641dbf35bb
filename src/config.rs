// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Detector configuration.
//!
//! This module defines the [`DetectorConfig`] struct, which controls the tunable
//! parameters of the per-frame pipeline: the decoder confidence threshold, the
//! suppression score and IoU thresholds, and the inference blob size.

/// Configuration for the detection pipeline.
///
/// This struct is used to customize the behavior of the detector.
/// It uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use yolo_stream::DetectorConfig;
///
/// let config = DetectorConfig::new()
///     .with_confidence(0.5)
///     .with_score(0.6)
///     .with_iou(0.45);
/// ```
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Decoder confidence threshold (0.0 to 1.0).
    /// Rows whose best class score does not exceed this value never become
    /// candidates.
    pub confidence_threshold: f32,
    /// Suppression score threshold (0.0 to 1.0).
    /// A second, independent filter applied before NMS; may be stricter than
    /// the decoder threshold.
    pub score_threshold: f32,
    /// Intersection over Union (IoU) threshold for NMS (0.0 to 1.0).
    /// Candidates overlapping a kept box by more than this are suppressed.
    pub iou_threshold: f32,
    /// Inference blob size (height, width) the frame is resized to before
    /// the forward pass.
    pub blob_size: (usize, usize),
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.4,
            score_threshold: 0.5,
            iou_threshold: 0.4,
            blob_size: (416, 416),
        }
    }
}

impl DetectorConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the decoder confidence threshold.
    ///
    /// Rows whose best class score does not exceed this threshold are
    /// discarded during decoding.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum confidence score (0.0 to 1.0).
    #[must_use]
    pub const fn with_confidence(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the suppression score threshold.
    ///
    /// Candidates below this score are dropped before NMS, independently of
    /// the decoder threshold.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The minimum score (0.0 to 1.0).
    #[must_use]
    pub const fn with_score(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Set the IoU threshold for Non-Maximum Suppression.
    ///
    /// Overlap above this value marks a candidate as a duplicate of a
    /// higher-confidence box.
    ///
    /// # Arguments
    ///
    /// * `threshold` - The IoU threshold (0.0 to 1.0).
    #[must_use]
    pub const fn with_iou(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    /// Set the inference blob size.
    ///
    /// Frames are resized to this square shape before the forward pass.
    ///
    /// # Arguments
    ///
    /// * `height` - The blob height.
    /// * `width` - The blob width.
    #[must_use]
    pub const fn with_blob_size(mut self, height: usize, width: usize) -> Self {
        self.blob_size = (height, width);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = DetectorConfig::default();
        assert!((config.confidence_threshold - 0.4).abs() < f32::EPSILON);
        assert!((config.score_threshold - 0.5).abs() < f32::EPSILON);
        assert!((config.iou_threshold - 0.4).abs() < f32::EPSILON);
        assert_eq!(config.blob_size, (416, 416));
    }

    #[test]
    fn test_config_builder() {
        let config = DetectorConfig::new()
            .with_confidence(0.5)
            .with_score(0.6)
            .with_iou(0.3)
            .with_blob_size(608, 608);

        assert!((config.confidence_threshold - 0.5).abs() < f32::EPSILON);
        assert!((config.score_threshold - 0.6).abs() < f32::EPSILON);
        assert!((config.iou_threshold - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.blob_size, (608, 608));
    }
}
