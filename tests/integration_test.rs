// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! End-to-end pipeline tests with a canned inference engine.

use image::RgbImage;
use ndarray::Array2;
use yolo_stream::{
    Blob, BoundingBox, ClassLabels, Detector, DetectorConfig, InferenceEngine, RawOutput, Result,
};

/// Engine that replays a fixed set of prediction rows.
struct CannedEngine {
    rows: Vec<Vec<f32>>,
}

impl InferenceEngine for CannedEngine {
    fn forward(&mut self, _blob: &Blob) -> Result<Vec<RawOutput>> {
        let ncols = self.rows.first().map_or(12, Vec::len);
        let flat: Vec<f32> = self.rows.iter().flatten().copied().collect();
        let output = Array2::from_shape_vec((self.rows.len(), ncols), flat).unwrap();
        Ok(vec![output])
    }
}

fn labels() -> ClassLabels {
    ClassLabels::from_vec(vec![
        "person".into(),
        "bicycle".into(),
        "car".into(),
        "dog".into(),
        "cat".into(),
        "horse".into(),
        "sheep".into(),
        "cow".into(),
    ])
}

/// Build a prediction row: 4 geometry values plus 8 class scores.
fn row(cx: f32, cy: f32, w: f32, h: f32, class_id: usize, score: f32) -> Vec<f32> {
    let mut r = vec![cx, cy, w, h];
    let mut scores = vec![0.0; 8];
    scores[class_id] = score;
    r.extend(scores);
    r
}

#[test]
fn test_pipeline_single_detection() {
    let engine = CannedEngine {
        rows: vec![row(0.5, 0.5, 0.2, 0.3, 3, 0.9)],
    };
    let mut detector = Detector::new(engine, labels(), DetectorConfig::default());

    let frame = RgbImage::new(640, 480);
    let detections = detector.detect(&frame).unwrap();

    assert_eq!(detections.len(), 1);
    let det = detections[0];
    assert_eq!(det.class_id, 3);
    assert!((det.confidence - 0.9).abs() < f32::EPSILON);
    assert_eq!(det.bbox, BoundingBox::new(256, 168, 128, 144));
}

#[test]
fn test_pipeline_suppresses_duplicates() {
    // Two rows for the same dog plus one disjoint person.
    let engine = CannedEngine {
        rows: vec![
            row(0.5, 0.5, 0.2, 0.3, 3, 0.9),
            row(0.51, 0.5, 0.2, 0.3, 3, 0.75),
            row(0.1, 0.1, 0.08, 0.08, 0, 0.85),
        ],
    };
    let mut detector = Detector::new(engine, labels(), DetectorConfig::default());

    let frame = RgbImage::new(640, 480);
    let detections = detector.detect(&frame).unwrap();

    assert_eq!(detections.len(), 2);
    // Pick order is descending confidence.
    assert_eq!(detections[0].class_id, 3);
    assert!((detections[0].confidence - 0.9).abs() < f32::EPSILON);
    assert_eq!(detections[1].class_id, 0);
    assert!((detections[1].confidence - 0.85).abs() < f32::EPSILON);
}

#[test]
fn test_pipeline_weak_rows_dropped() {
    let engine = CannedEngine {
        rows: vec![
            // At the confidence threshold: dropped by decoding.
            row(0.5, 0.5, 0.2, 0.2, 1, 0.4),
            // Above confidence but at the score threshold: dropped by
            // suppression.
            row(0.2, 0.2, 0.1, 0.1, 2, 0.5),
        ],
    };
    let mut detector = Detector::new(engine, labels(), DetectorConfig::default());

    let frame = RgbImage::new(640, 480);
    assert!(detector.detect(&frame).unwrap().is_empty());
}

#[test]
fn test_pipeline_no_predictions() {
    let engine = CannedEngine { rows: vec![] };
    let mut detector = Detector::new(engine, labels(), DetectorConfig::default());

    let frame = RgbImage::new(640, 480);
    assert!(detector.detect(&frame).unwrap().is_empty());
}

#[cfg(feature = "annotate")]
#[test]
fn test_pipeline_label_text() {
    let engine = CannedEngine {
        rows: vec![row(0.5, 0.5, 0.2, 0.3, 3, 0.9)],
    };
    let mut detector = Detector::new(engine, labels(), DetectorConfig::default());

    let frame = RgbImage::new(640, 480);
    let detections = detector.detect(&frame).unwrap();

    let label = yolo_stream::annotate::label_text(
        detections[0].class_id,
        detections[0].confidence,
        detector.labels(),
    );
    assert_eq!(label, "dog: 0.90");
}

#[cfg(feature = "annotate")]
#[test]
fn test_pipeline_annotates_frame() {
    let engine = CannedEngine {
        rows: vec![row(0.5, 0.5, 0.2, 0.3, 3, 0.9)],
    };
    let mut detector = Detector::new(engine, labels(), DetectorConfig::default());

    let mut frame = RgbImage::new(640, 480);
    let detections = detector.process_frame(&mut frame).unwrap();
    assert_eq!(detections.len(), 1);

    // Box (256, 168) 128x144: marker center (320, 240), radius 128.
    assert_eq!(*frame.get_pixel(448, 240), image::Rgb([0, 0, 255]));
    assert_eq!(*frame.get_pixel(320, 112), image::Rgb([0, 0, 255]));
}
