// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Greedy non-maximum suppression.
//!
//! Candidates are visited in descending confidence order; each survivor
//! suppresses every remaining candidate it overlaps beyond the IoU
//! threshold, regardless of class. A separate score threshold removes weak
//! candidates before any pairwise comparison happens.

use crate::decoder::BoundingBox;

/// Intersection-over-union of two boxes.
///
/// Returns 0.0 when the union is empty (degenerate boxes), so callers never
/// see NaN from a 0/0 division.
#[must_use]
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let a = a.as_xyxy();
    let b = b.as_xyxy();

    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    let union = area_a + area_b - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Run greedy non-maximum suppression over parallel candidate slices.
///
/// Returns the indices of the surviving candidates in pick order, i.e.
/// descending confidence. Candidates whose confidence does not exceed
/// `score_threshold` are dropped before any comparison. Suppression is
/// class-agnostic: overlapping boxes compete even across classes. Ties in
/// confidence resolve to the lower index (the sort is stable).
///
/// # Panics
///
/// Panics if any confidence is NaN, or if the slices differ in length.
#[must_use]
pub fn suppress(
    boxes: &[BoundingBox],
    confidences: &[f32],
    score_threshold: f32,
    iou_threshold: f32,
) -> Vec<usize> {
    assert_eq!(boxes.len(), confidences.len());

    let mut indices: Vec<usize> = (0..boxes.len()).collect();
    indices.sort_by(|&a, &b| confidences[b].partial_cmp(&confidences[a]).unwrap());

    // Weak candidates are marked suppressed up front so the pairwise loop
    // never considers them.
    let mut suppressed: Vec<bool> = confidences.iter().map(|&c| c <= score_threshold).collect();
    let mut keep = Vec::new();

    for &idx in &indices {
        if suppressed[idx] {
            continue;
        }
        keep.push(idx);

        for &other_idx in &indices {
            if other_idx != idx && !suppressed[other_idx] {
                let overlap = iou(&boxes[idx], &boxes[other_idx]);
                if overlap > iou_threshold {
                    suppressed[other_idx] = true;
                }
            }
        }
    }

    keep
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iou_partial_overlap() {
        // 25 px² intersection over 175 px² union.
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(5, 5, 10, 10);
        assert!((iou(&a, &b) - 25.0 / 175.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_disjoint_and_identical() {
        let a = BoundingBox::new(0, 0, 10, 10);
        let b = BoundingBox::new(20, 20, 10, 10);
        assert_eq!(iou(&a, &b), 0.0);
        assert!((iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_iou_degenerate_boxes() {
        let a = BoundingBox::new(5, 5, 0, 0);
        assert_eq!(iou(&a, &a), 0.0);
    }

    #[test]
    fn test_stronger_box_suppresses_weaker() {
        let boxes = [BoundingBox::new(0, 0, 100, 100), BoundingBox::new(10, 10, 100, 100)];
        let confidences = [0.6, 0.9];

        let keep = suppress(&boxes, &confidences, 0.5, 0.4);
        assert_eq!(keep, vec![1]);
    }

    #[test]
    fn test_disjoint_boxes_both_survive() {
        let boxes = [BoundingBox::new(0, 0, 50, 50), BoundingBox::new(200, 200, 50, 50)];
        let confidences = [0.9, 0.6];

        let keep = suppress(&boxes, &confidences, 0.5, 0.4);
        assert_eq!(keep, vec![0, 1]);
    }

    #[test]
    fn test_keep_order_is_descending_confidence() {
        let boxes = [
            BoundingBox::new(0, 0, 10, 10),
            BoundingBox::new(100, 0, 10, 10),
            BoundingBox::new(200, 0, 10, 10),
        ];
        let confidences = [0.5, 0.9, 0.7];

        let keep = suppress(&boxes, &confidences, 0.1, 0.4);
        assert_eq!(keep, vec![1, 2, 0]);
    }

    #[test]
    fn test_score_threshold_excludes_weak_candidates() {
        let boxes = [BoundingBox::new(0, 0, 50, 50), BoundingBox::new(200, 200, 50, 50)];
        // The second candidate sits exactly at the threshold and is dropped.
        let confidences = [0.9, 0.5];

        let keep = suppress(&boxes, &confidences, 0.5, 0.4);
        assert_eq!(keep, vec![0]);
    }

    #[test]
    fn test_overlap_at_iou_threshold_survives() {
        // IoU is exactly 20/50 = 0.4; only strictly greater overlap
        // suppresses.
        let boxes = [BoundingBox::new(0, 0, 5, 6), BoundingBox::new(0, 2, 5, 8)];
        let confidences = [0.9, 0.8];

        assert!((iou(&boxes[0], &boxes[1]) - 0.4).abs() < f32::EPSILON);
        assert_eq!(suppress(&boxes, &confidences, 0.5, 0.4), vec![0, 1]);
    }

    #[test]
    fn test_equal_confidence_keeps_lower_index() {
        let boxes = [BoundingBox::new(0, 0, 50, 50), BoundingBox::new(0, 0, 50, 50)];
        let confidences = [0.9, 0.9];

        let keep = suppress(&boxes, &confidences, 0.5, 0.4);
        assert_eq!(keep, vec![0]);
    }

    #[test]
    fn test_suppression_is_idempotent() {
        let boxes = [
            BoundingBox::new(0, 0, 100, 100),
            BoundingBox::new(5, 5, 100, 100),
            BoundingBox::new(300, 300, 40, 40),
            BoundingBox::new(310, 305, 40, 40),
        ];
        let confidences = [0.95, 0.85, 0.7, 0.75];

        let keep = suppress(&boxes, &confidences, 0.5, 0.4);

        // Re-running on the survivors changes nothing.
        let kept_boxes: Vec<BoundingBox> = keep.iter().map(|&i| boxes[i]).collect();
        let kept_confidences: Vec<f32> = keep.iter().map(|&i| confidences[i]).collect();
        let again = suppress(&kept_boxes, &kept_confidences, 0.5, 0.4);

        assert_eq!(again.len(), keep.len());
        assert_eq!(again, (0..keep.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_cross_class_suppression() {
        // Class identity is not consulted: callers pass boxes from every
        // class together and overlapping ones still compete.
        let boxes = [BoundingBox::new(0, 0, 100, 100), BoundingBox::new(2, 2, 100, 100)];
        let confidences = [0.9, 0.8];

        let keep = suppress(&boxes, &confidences, 0.5, 0.4);
        assert_eq!(keep, vec![0]);
    }

    #[test]
    fn test_empty_input() {
        let keep = suppress(&[], &[], 0.5, 0.4);
        assert!(keep.is_empty());
    }
}
