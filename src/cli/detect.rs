// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! The `detect` command.
//!
//! Wires the pipeline to a video source: open the engine and the source,
//! then detect and annotate frame by frame until the stream ends, the user
//! quits, or Ctrl-C fires. File sources are paced to their native frame
//! rate; webcams and network streams already arrive at theirs.

use std::collections::HashMap;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[cfg(feature = "annotate")]
use crate::annotate::{self, Annotator};
use crate::cli::args::DetectArgs;
use crate::config::DetectorConfig;
use crate::detector::{Detection, Detector};
use crate::engine::InferenceEngine;
#[cfg(feature = "ort")]
use crate::engine::OrtEngine;
use crate::labels::ClassLabels;
use crate::source::{Source, SourceIterator};
#[cfg(feature = "visualize")]
use crate::visualizer::Viewer;
use crate::{error, info, success, verbose, warn};

/// Run the detect command with the compiled-in inference backend.
///
/// Exits the process with status 1 when the engine or the source cannot be
/// opened, or when inference fails mid-run.
pub fn run_detection(args: &DetectArgs) {
    crate::cli::logging::set_verbose(args.verbose);

    #[cfg(feature = "ort")]
    {
        let model_path = match args.model.as_deref() {
            Some(path) => path,
            None => {
                error!("'model' argument is required (path to an ONNX file).");
                process::exit(1);
            }
        };

        let engine = match OrtEngine::load(model_path) {
            Ok(engine) => engine,
            Err(e) => {
                error!("{e}");
                process::exit(1);
            }
        };

        run_with_engine(engine, args);
    }

    #[cfg(not(feature = "ort"))]
    {
        error!("No inference backend available. Rebuild with '--features ort'.");
        process::exit(1);
    }
}

/// Run the detection loop with a caller-supplied engine.
///
/// Public so embedders can drive the same loop with their own backend.
#[allow(clippy::too_many_lines)]
pub fn run_with_engine(engine: impl InferenceEngine + 'static, args: &DetectArgs) {
    let config = DetectorConfig::new()
        .with_confidence(args.conf)
        .with_score(args.score)
        .with_iou(args.iou);

    let labels = args
        .classes
        .as_ref()
        .map_or_else(ClassLabels::default, ClassLabels::load);

    let mut detector = Detector::new(engine, labels, config);

    #[cfg(feature = "annotate")]
    match annotate::load_system_font(detector.labels()) {
        Some(font) => detector.set_annotator(Annotator::new().with_font(font)),
        None => {
            warn!("Label font unavailable; drawing markers without text");
        }
    }

    let source = Source::from(args.source.as_deref().unwrap_or("0"));
    let live = source.is_live();

    let frames = match SourceIterator::new(source) {
        Ok(frames) => frames,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    // Pace file playback to its native rate; live sources set their own.
    let frame_delay = if live {
        None
    } else {
        frames.fps().map(|f| Duration::from_secs_f32(1.0 / f))
    };

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            warn!("Failed to install Ctrl-C handler: {e}");
        }
    }

    #[cfg(feature = "visualize")]
    let mut viewer: Option<Viewer> = None;
    #[cfg(not(feature = "visualize"))]
    if args.show {
        warn!("--show requires the 'visualize' feature; continuing without display");
    }

    info!("{} {} 🚀", crate::NAME, crate::VERSION);

    let started = Instant::now();
    let mut frame_count = 0usize;
    let mut detection_count = 0usize;

    for item in frames {
        if !running.load(Ordering::SeqCst) {
            verbose!("Interrupted, stopping");
            break;
        }

        let (mut frame, meta) = match item {
            Ok(item) => item,
            Err(e) => {
                error!("Error reading source: {e}");
                break;
            }
        };

        let frame_start = Instant::now();
        let detections = match detector.process_frame(&mut frame) {
            Ok(detections) => detections,
            Err(e) => {
                error!("Error processing frame {}: {e}", meta.frame_idx + 1);
                process::exit(1);
            }
        };
        let elapsed_ms = frame_start.elapsed().as_secs_f64() * 1000.0;

        frame_count += 1;
        detection_count += detections.len();

        let total = meta
            .total_frames
            .map_or_else(|| "?".to_string(), |n| n.to_string());
        verbose!(
            "frame {}/{} {}: {}x{} {}, {:.1}ms",
            meta.frame_idx + 1,
            total,
            meta.path,
            frame.width(),
            frame.height(),
            format_class_counts(&detections, detector.labels()),
            elapsed_ms
        );

        #[cfg(feature = "visualize")]
        if args.show {
            if viewer.is_none() {
                match Viewer::new("YOLO Stream", frame.width() as usize, frame.height() as usize) {
                    Ok(v) => viewer = Some(v),
                    Err(e) => {
                        error!("{e}");
                        process::exit(1);
                    }
                }
            }
            if let Some(ref mut v) = viewer {
                match v.update(&frame) {
                    Ok(true) => {}
                    Ok(false) => {
                        verbose!("Window closed, stopping");
                        break;
                    }
                    Err(e) => {
                        error!("{e}");
                        break;
                    }
                }
            }
        }

        if let Some(delay) = frame_delay {
            let elapsed = frame_start.elapsed();
            if elapsed < delay {
                let remaining = delay - elapsed;
                #[cfg(feature = "visualize")]
                {
                    if let Some(ref mut v) = viewer {
                        if !v.wait(remaining).unwrap_or(false) {
                            break;
                        }
                    } else {
                        std::thread::sleep(remaining);
                    }
                }
                #[cfg(not(feature = "visualize"))]
                std::thread::sleep(remaining);
            }
        }
    }

    verbose!("");
    success!(
        "Processed {frame_count} frames in {:.1}s ({detection_count} detections)",
        started.elapsed().as_secs_f64()
    );
}

/// Count detections per class and format as a summary string (e.g. "2 persons, 1 dog").
fn format_class_counts(detections: &[Detection], labels: &ClassLabels) -> String {
    if detections.is_empty() {
        return String::new();
    }

    let mut counts: HashMap<usize, usize> = HashMap::new();
    for detection in detections {
        *counts.entry(detection.class_id).or_insert(0) += 1;
    }

    // Sort by class ID for consistent output
    let mut sorted_counts: Vec<(usize, usize)> = counts.into_iter().collect();
    sorted_counts.sort_by_key(|(class_id, _)| *class_id);

    let parts: Vec<String> = sorted_counts
        .iter()
        .map(|(class_id, count)| {
            let class_name = labels.get(*class_id).unwrap_or("object");
            let name = if *count > 1 {
                pluralize(class_name)
            } else {
                class_name.to_string()
            };
            format!("{count} {name}")
        })
        .collect();

    parts.join(", ")
}

/// Pluralize a class name for count summaries.
fn pluralize(word: &str) -> String {
    match word {
        "person" => "persons".to_string(),
        "bus" => "buses".to_string(),
        "knife" => "knives".to_string(),
        "mouse" => "mice".to_string(),
        "sheep" => "sheep".to_string(),
        "skis" => "skis".to_string(),
        _ => {
            if word.ends_with('s') || word.ends_with("ch") || word.ends_with("sh") {
                format!("{word}es")
            } else if word.ends_with('y') && !word.ends_with("ey") && !word.ends_with("ay") {
                format!("{}ies", &word[..word.len() - 1])
            } else {
                format!("{word}s")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::BoundingBox;

    fn det(class_id: usize) -> Detection {
        Detection {
            class_id,
            confidence: 0.9,
            bbox: BoundingBox::new(0, 0, 10, 10),
        }
    }

    fn labels() -> ClassLabels {
        ClassLabels::from_vec(vec!["person".into(), "bicycle".into(), "dog".into()])
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("dog"), "dogs");
        assert_eq!(pluralize("person"), "persons");
        assert_eq!(pluralize("bus"), "buses");
        assert_eq!(pluralize("knife"), "knives");
        assert_eq!(pluralize("sheep"), "sheep");
        assert_eq!(pluralize("pony"), "ponies");
        assert_eq!(pluralize("donkey"), "donkeys");
    }

    #[test]
    fn test_format_class_counts_empty() {
        assert!(format_class_counts(&[], &labels()).is_empty());
    }

    #[test]
    fn test_format_class_counts_single() {
        let summary = format_class_counts(&[det(0)], &labels());
        assert_eq!(summary, "1 person");
    }

    #[test]
    fn test_format_class_counts_sorted_by_class() {
        let summary = format_class_counts(&[det(2), det(0), det(0)], &labels());
        assert_eq!(summary, "2 persons, 1 dog");
    }

    #[test]
    fn test_format_class_counts_unknown_class() {
        let summary = format_class_counts(&[det(9)], &labels());
        assert_eq!(summary, "1 object");
    }
}
