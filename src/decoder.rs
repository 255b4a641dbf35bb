// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Detection decoding.
//!
//! Converts raw output tensors into pixel-space candidates: per row, the best
//! class score becomes the confidence, and the normalized center/size
//! geometry is scaled to the source frame and truncated to integer pixels.
//! Rows whose confidence does not exceed the threshold are dropped here,
//! before suppression ever sees them.

use ndarray::s;

use crate::engine::RawOutput;
use crate::warn;

/// Axis-aligned box in source-frame pixel coordinates.
///
/// Coordinates are not clamped to the frame: a box may extend past any edge
/// (or start at negative coordinates) when the network says so. Rendering is
/// responsible for clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// Left edge (x) in pixels.
    pub left: i32,
    /// Top edge (y) in pixels.
    pub top: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl BoundingBox {
    /// Create a box from its left/top corner and size.
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (x) in pixels.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.left + self.width
    }

    /// Bottom edge (y) in pixels.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Corner form `[x1, y1, x2, y2]` as floats, for IoU math.
    #[must_use]
    pub fn as_xyxy(&self) -> [f32; 4] {
        [
            self.left as f32,
            self.top as f32,
            self.right() as f32,
            self.bottom() as f32,
        ]
    }
}

/// Parallel candidate lists produced by [`decode`].
///
/// The three sequences always have the same length; index `i` describes one
/// candidate. Kept as parallel arrays because suppression consumes boxes and
/// confidences separately and returns indices into them.
#[derive(Debug, Clone, Default)]
pub struct Candidates {
    /// Class index per candidate (argmax of the class-score columns).
    pub class_ids: Vec<usize>,
    /// Confidence per candidate (max class score).
    pub confidences: Vec<f32>,
    /// Pixel-space box per candidate.
    pub boxes: Vec<BoundingBox>,
}

impl Candidates {
    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.class_ids.len()
    }

    /// Whether there are no candidates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.class_ids.is_empty()
    }

    fn push(&mut self, class_id: usize, confidence: f32, bbox: BoundingBox) {
        self.class_ids.push(class_id);
        self.confidences.push(confidence);
        self.boxes.push(bbox);
    }
}

/// Decode raw output tensors into frame-space candidates.
///
/// Candidates appear in encounter order: tensor order, then row order within
/// a tensor. A row survives only if its best class score strictly exceeds
/// `confidence_threshold`. Box geometry is scaled to the frame and truncated
/// to integer pixels (`left = (int)(cx*W) - (int)(w*W)/2`), with no bounds
/// clamping.
///
/// Tensors with fewer than 5 columns (no room for geometry plus at least one
/// class score) are skipped with a diagnostic instead of aborting the frame.
///
/// # Arguments
///
/// * `outputs` - Raw output tensors from the engine.
/// * `frame_width` - Source frame width in pixels.
/// * `frame_height` - Source frame height in pixels.
/// * `confidence_threshold` - Minimum (exclusive) confidence to emit a row.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn decode(
    outputs: &[RawOutput],
    frame_width: u32,
    frame_height: u32,
    confidence_threshold: f32,
) -> Candidates {
    let mut candidates = Candidates::default();
    let fw = frame_width as f32;
    let fh = frame_height as f32;

    for output in outputs {
        if output.ncols() < 5 {
            warn!(
                "Skipping malformed output tensor: {} columns, need at least 5",
                output.ncols()
            );
            continue;
        }

        for i in 0..output.nrows() {
            // Class scores are the columns after the 4 geometry values.
            let class_scores = output.slice(s![i, 4..]);

            // Find the best class. Incomparable (NaN) scores resolve
            // toward the later column; a NaN winner decays to 0.0 and
            // fails the threshold.
            let (class_id, confidence) = class_scores
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Less))
                .map(|(idx, &score)| (idx, if score.is_nan() { 0.0 } else { score }))
                .unwrap_or((0, 0.0));

            if confidence <= confidence_threshold {
                continue;
            }

            let center_x = (output[[i, 0]] * fw) as i32;
            let center_y = (output[[i, 1]] * fh) as i32;
            let width = (output[[i, 2]] * fw) as i32;
            let height = (output[[i, 3]] * fh) as i32;
            let left = center_x - width / 2;
            let top = center_y - height / 2;

            candidates.push(class_id, confidence, BoundingBox::new(left, top, width, height));
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Build a tensor from rows of geometry plus class scores.
    fn tensor(rows: &[Vec<f32>]) -> RawOutput {
        let ncols = rows[0].len();
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        Array2::from_shape_vec((rows.len(), ncols), flat).unwrap()
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // Confidences at or below the threshold never become candidates.
        for score in [0.0, 0.1, 0.25, 0.39, 0.4] {
            let t = tensor(&[vec![0.5, 0.5, 0.2, 0.2, score, 0.0]]);
            let c = decode(&[t], 640, 480, 0.4);
            assert!(c.is_empty(), "score {score} must be discarded");
        }

        let t = tensor(&[vec![0.5, 0.5, 0.2, 0.2, 0.41, 0.0]]);
        let c = decode(&[t], 640, 480, 0.4);
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn test_decode_arithmetic() {
        // 640x480 frame, centered box 0.2x0.3, class 3 at 0.9.
        let t = tensor(&[vec![0.5, 0.5, 0.2, 0.3, 0.0, 0.0, 0.0, 0.9]]);
        let c = decode(&[t], 640, 480, 0.4);

        assert_eq!(c.len(), 1);
        assert_eq!(c.class_ids[0], 3);
        assert!((c.confidences[0] - 0.9).abs() < f32::EPSILON);
        assert_eq!(c.boxes[0], BoundingBox::new(256, 168, 128, 144));
    }

    #[test]
    fn test_boxes_are_not_clamped() {
        // A wide box near the left edge extends past x = 0.
        let t = tensor(&[vec![0.05, 0.5, 0.5, 0.2, 0.9, 0.0]]);
        let c = decode(&[t], 640, 480, 0.4);

        assert_eq!(c.len(), 1);
        let b = c.boxes[0];
        assert!(b.left < 0);
        assert_eq!(b.width, (0.5_f32 * 640.0) as i32);
    }

    #[test]
    fn test_encounter_order_across_tensors() {
        let t1 = tensor(&[
            vec![0.2, 0.2, 0.1, 0.1, 0.9, 0.0],
            vec![0.8, 0.8, 0.1, 0.1, 0.0, 0.8],
        ]);
        let t2 = tensor(&[vec![0.5, 0.5, 0.1, 0.1, 0.7, 0.0]]);
        let c = decode(&[t1, t2], 100, 100, 0.4);

        assert_eq!(c.len(), 3);
        assert_eq!(c.class_ids, vec![0, 1, 0]);
        assert!((c.confidences[0] - 0.9).abs() < f32::EPSILON);
        assert!((c.confidences[1] - 0.8).abs() < f32::EPSILON);
        assert!((c.confidences[2] - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_malformed_tensor_is_skipped() {
        // 3 columns cannot hold geometry plus a class score.
        let bad = Array2::from_shape_vec((1, 3), vec![0.5, 0.5, 0.9]).unwrap();
        let good = tensor(&[vec![0.5, 0.5, 0.2, 0.2, 0.9, 0.0]]);

        let c = decode(&[bad, good], 640, 480, 0.4);
        assert_eq!(c.len(), 1);
        assert_eq!(c.class_ids[0], 0);
    }

    #[test]
    fn test_nan_scores_do_not_panic() {
        let t = tensor(&[vec![0.5, 0.5, 0.2, 0.2, f32::NAN, f32::NAN]]);
        let c = decode(&[t], 640, 480, 0.4);
        assert!(c.is_empty());
    }

    #[test]
    fn test_nan_comparisons_resolve_to_later_columns() {
        // A trailing NaN wins the max, decays to 0.0, and the row is
        // dropped; a leading NaN loses to the real score that follows.
        let t = tensor(&[vec![0.5, 0.5, 0.2, 0.2, 0.9, f32::NAN]]);
        assert!(decode(&[t], 640, 480, 0.4).is_empty());

        let t = tensor(&[vec![0.5, 0.5, 0.2, 0.2, f32::NAN, 0.9]]);
        let c = decode(&[t], 640, 480, 0.4);
        assert_eq!(c.len(), 1);
        assert_eq!(c.class_ids[0], 1);
    }

    #[test]
    fn test_empty_outputs() {
        let c = decode(&[], 640, 480, 0.4);
        assert!(c.is_empty());
        assert_eq!(c.len(), 0);
    }
}
