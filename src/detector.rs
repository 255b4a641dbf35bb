// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Detection pipeline facade.
//!
//! [`Detector`] owns an inference engine plus the class labels and
//! thresholds, and runs the full per-frame pipeline: preprocess, forward,
//! decode, suppress. Frames are independent; the detector keeps no state
//! between calls beyond the engine itself.
//!
//! # Example
//!
//! ```no_run
//! use yolo_stream::{ClassLabels, Detector, DetectorConfig};
//!
//! # fn run(engine: impl yolo_stream::InferenceEngine + 'static) -> yolo_stream::Result<()> {
//! let labels = ClassLabels::load("coco.names");
//! let mut detector = Detector::new(engine, labels, DetectorConfig::default());
//!
//! let frame = image::RgbImage::new(640, 480);
//! for detection in detector.detect(&frame)? {
//!     println!("class {} at {:?}", detection.class_id, detection.bbox);
//! }
//! # Ok(())
//! # }
//! ```

use image::RgbImage;

#[cfg(feature = "annotate")]
use crate::annotate::Annotator;
use crate::config::DetectorConfig;
use crate::decoder::{self, BoundingBox};
use crate::engine::InferenceEngine;
use crate::error::Result;
use crate::labels::ClassLabels;
use crate::preprocessing;
use crate::suppression;

/// One detected object in source-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Class index into the label list.
    pub class_id: usize,
    /// Confidence in `[0, 1]` (the winning class score).
    pub confidence: f32,
    /// Pixel-space box, unclamped.
    pub bbox: BoundingBox,
}

/// Runs the detection pipeline over frames.
pub struct Detector {
    engine: Box<dyn InferenceEngine>,
    labels: ClassLabels,
    config: DetectorConfig,
    #[cfg(feature = "annotate")]
    annotator: Annotator,
}

impl Detector {
    /// Create a detector from an engine, class labels, and thresholds.
    pub fn new(
        engine: impl InferenceEngine + 'static,
        labels: ClassLabels,
        config: DetectorConfig,
    ) -> Self {
        Self {
            engine: Box::new(engine),
            labels,
            config,
            #[cfg(feature = "annotate")]
            annotator: Annotator::new(),
        }
    }

    /// Detect objects in one frame.
    ///
    /// Returns surviving detections in descending confidence order.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine fails to run the forward pass.
    pub fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Detection>> {
        let blob = preprocessing::make_blob(frame, self.config.blob_size);
        let outputs = self.engine.forward(&blob)?;

        let candidates = decoder::decode(
            &outputs,
            frame.width(),
            frame.height(),
            self.config.confidence_threshold,
        );
        let keep = suppression::suppress(
            &candidates.boxes,
            &candidates.confidences,
            self.config.score_threshold,
            self.config.iou_threshold,
        );

        Ok(keep
            .into_iter()
            .map(|i| Detection {
                class_id: candidates.class_ids[i],
                confidence: candidates.confidences[i],
                bbox: candidates.boxes[i],
            })
            .collect())
    }

    /// Draw detections onto a frame with the configured annotator.
    #[cfg(feature = "annotate")]
    pub fn annotate(&self, frame: &mut RgbImage, detections: &[Detection]) {
        for detection in detections {
            self.annotator.draw(frame, detection, &self.labels);
        }
    }

    /// Detect and annotate in one step, mutating the frame in place.
    ///
    /// # Errors
    ///
    /// Returns an error when the engine fails to run the forward pass.
    pub fn process_frame(&mut self, frame: &mut RgbImage) -> Result<Vec<Detection>> {
        let detections = self.detect(frame)?;
        #[cfg(feature = "annotate")]
        self.annotate(frame, &detections);
        Ok(detections)
    }

    /// Replace the annotator, e.g. to attach a font or change the style.
    #[cfg(feature = "annotate")]
    pub fn set_annotator(&mut self, annotator: Annotator) {
        self.annotator = annotator;
    }

    /// Class labels used for naming detections.
    #[must_use]
    pub fn labels(&self) -> &ClassLabels {
        &self.labels
    }

    /// Active pipeline thresholds.
    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}
