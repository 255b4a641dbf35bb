// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # YOLO Stream Detection Library
//!
//! Real-time YOLO object detection over video streams, written in Rust.
//! Decodes frames from files, webcams, or network streams, runs an ONNX
//! detection model on each one, and draws the surviving detections back
//! onto the frame.
//!
//! ## Features
//!
//! - **Per-frame pipeline** - Preprocess, forward, decode, and greedy NMS
//!   with no state carried between frames
//! - **ONNX Runtime** - Model execution through ONNX Runtime (`ort` feature)
//! - **Engine-agnostic core** - Any [`InferenceEngine`] implementation can
//!   drive the pipeline; the decode and suppression stages never touch the
//!   backend
//! - **Multiple sources** - Video files, webcam devices, RTSP/RTMP/HTTP
//!   streams
//! - **Annotation** - Circle markers with class/confidence labels, clipped
//!   at frame edges
//! - **Live display** - Optional window showing annotated frames as they
//!   are processed
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use yolo_stream::{ClassLabels, Detector, DetectorConfig, Source, SourceIterator};
//!
//! fn main() -> yolo_stream::Result<()> {
//!     // Any InferenceEngine works; the `ort` feature provides OrtEngine.
//!     # struct Noop;
//!     # impl yolo_stream::InferenceEngine for Noop {
//!     #     fn forward(
//!     #         &mut self,
//!     #         _: &yolo_stream::Blob,
//!     #     ) -> yolo_stream::Result<Vec<yolo_stream::RawOutput>> {
//!     #         Ok(vec![])
//!     #     }
//!     # }
//!     # let engine = Noop;
//!     let labels = ClassLabels::load("coco.names");
//!     let config = DetectorConfig::new().with_confidence(0.5);
//!     let mut detector = Detector::new(engine, labels, config);
//!
//!     for item in SourceIterator::new(Source::from("video.mp4"))? {
//!         let (mut frame, meta) = item?;
//!         let detections = detector.process_frame(&mut frame)?;
//!         println!("frame {}: {} objects", meta.frame_idx, detections.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Detect on a video file
//! yolo-stream detect --model yolov4.onnx --classes coco.names --source video.mp4
//!
//! # Webcam with a live window
//! yolo-stream detect --model yolov4.onnx --source 0 --show
//!
//! # Network stream with custom thresholds
//! yolo-stream detect -m yolov4.onnx -s rtsp://camera.local/stream --conf 0.5 --iou 0.6
//! ```
//!
//! **CLI Options:**
//!
//! | Option | Short | Description | Default |
//! |--------|-------|-------------|---------|
//! | `--model` | `-m` | Path to ONNX model | (required) |
//! | `--source` | `-s` | Video file, stream URL, or webcam index | `0` |
//! | `--classes` | | Class names file, one per line | (unnamed classes) |
//! | `--conf` | | Confidence threshold | `0.4` |
//! | `--score` | | Score threshold for suppression | `0.5` |
//! | `--iou` | | `IoU` threshold for suppression | `0.4` |
//! | `--show` | | Display annotated frames | `false` |
//! | `--verbose` | | Per-frame output | `true` |
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`detector`] | [`Detector`] facade running the per-frame pipeline |
//! | [`engine`] | [`InferenceEngine`] trait and the ONNX Runtime backend |
//! | [`decoder`] | Raw tensor rows to pixel-space candidates |
//! | [`suppression`] | Greedy class-agnostic non-maximum suppression |
//! | [`preprocessing`] | Frame to network input blob |
//! | [`annotate`] | Marker and label drawing |
//! | [`labels`] | Class name loading ([`ClassLabels`]) |
//! | [`source`] | Video input ([`Source`], [`SourceIterator`]) |
//! | [`visualizer`] | Live display window |
//! | [`error`] | Error types ([`DetectionError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `annotate` | Marker and label drawing (default) |
//! | `video` | Video file, webcam, and stream decoding |
//! | `visualize` | Real-time window display |
//! | `ort` | ONNX Runtime inference backend |
//!
//! ## License
//!
//! This project is licensed under [AGPL-3.0](https://ultralytics.com/license).

// Modules
#[cfg(feature = "annotate")]
pub mod annotate;
pub mod cli;
pub mod config;
pub mod decoder;
pub mod detector;
pub mod engine;
pub mod error;
pub mod labels;
pub mod preprocessing;
pub mod source;
pub mod suppression;
pub mod visualizer;

// Re-export main types for convenience
pub use config::DetectorConfig;
pub use decoder::{BoundingBox, Candidates, decode};
pub use detector::{Detection, Detector};
#[cfg(feature = "ort")]
pub use engine::OrtEngine;
pub use engine::{Blob, InferenceEngine, RawOutput};
pub use error::{DetectionError, Result};
pub use labels::ClassLabels;
pub use preprocessing::make_blob;
pub use source::{Source, SourceIterator, SourceMeta};
pub use suppression::{iou, suppress};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
