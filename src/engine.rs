// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Inference engine abstraction.
//!
//! The pipeline never depends on how inference is implemented or accelerated:
//! it consumes an [`InferenceEngine`] as an injected capability with a fixed
//! contract — blob in, raw output tensors out. This keeps the decoder,
//! suppression, and annotation core backend-agnostic and lets tests
//! substitute canned engines.
//!
//! An ONNX Runtime backend ([`OrtEngine`]) is available behind the `ort`
//! feature.

use ndarray::{Array2, Array3};

use crate::error::Result;

#[cfg(feature = "ort")]
use std::path::Path;

#[cfg(feature = "ort")]
use ndarray::Axis;
#[cfg(feature = "ort")]
use ort::session::Session;
#[cfg(feature = "ort")]
use ort::value::TensorRef;

#[cfg(feature = "ort")]
use crate::error::DetectionError;
#[cfg(feature = "ort")]
use crate::warn;

/// Normalized CHW image buffer fed to the engine.
pub type Blob = Array3<f32>;

/// Raw output tensor: one row per candidate detection, columns
/// `[cx, cy, w, h, c0, c1, …]` (normalized geometry, then per-class scores).
pub type RawOutput = Array2<f32>;

/// An opaque inference engine.
///
/// Constructed once at startup and reused for every frame. Construction
/// failure (bad weights/config) is fatal and must be surfaced before a
/// detector exists; `forward` errors are per-frame.
///
/// Implementations are not required to be safe for concurrent use; the
/// pipeline never runs two forward passes against the same engine at once.
pub trait InferenceEngine {
    /// Run one forward pass over a preprocessed blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the forward pass fails.
    fn forward(&mut self, blob: &Blob) -> Result<Vec<RawOutput>>;
}

/// Reshape a flat engine output into a candidate-row matrix.
///
/// Leading batch dimensions of 1 are dropped. For the remaining two
/// dimensions the smaller one is taken to be the feature axis (4 box columns
/// plus class scores are always far fewer than prediction rows), so
/// features-first layouts like `[84, 8400]` are transposed into row-major
/// `[8400, 84]`. Returns `None` when the shape cannot describe a 2-D
/// candidate matrix.
#[must_use]
pub fn to_candidate_rows(data: Vec<f32>, shape: &[usize]) -> Option<RawOutput> {
    let mut dims = shape;
    while dims.len() > 2 && dims[0] == 1 {
        dims = &dims[1..];
    }
    if dims.len() != 2 {
        return None;
    }

    let (a, b) = (dims[0], dims[1]);
    if a == 0 || b == 0 || a * b != data.len() {
        return None;
    }

    let arr = Array2::from_shape_vec((a, b), data).ok()?;
    if a < b {
        // Features-first layout; transpose to one row per prediction.
        Some(arr.t().to_owned())
    } else {
        Some(arr)
    }
}

/// ONNX Runtime backed engine.
///
/// Adapts an exported detection model to the [`InferenceEngine`] contract:
/// session creation at load time, tensor IO per frame, and normalization of
/// the output layout via [`to_candidate_rows`].
#[cfg(feature = "ort")]
pub struct OrtEngine {
    session: Session,
    input_name: String,
    output_names: Vec<String>,
}

#[cfg(feature = "ort")]
impl OrtEngine {
    /// Load an ONNX model from disk.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::EngineLoadError`] if the file doesn't exist
    /// or the session can't be created.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DetectionError::EngineLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| {
                DetectionError::EngineLoadError(format!("Failed to create session builder: {e}"))
            })?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(|e| {
                DetectionError::EngineLoadError(format!("Failed to set optimization level: {e}"))
            })?
            .commit_from_file(path)
            .map_err(|e| DetectionError::EngineLoadError(format!("Failed to load model: {e}")))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();

        Ok(Self {
            session,
            input_name,
            output_names,
        })
    }
}

#[cfg(feature = "ort")]
impl InferenceEngine for OrtEngine {
    fn forward(&mut self, blob: &Blob) -> Result<Vec<RawOutput>> {
        // Add the batch dimension and ensure contiguous memory.
        let input = blob.view().insert_axis(Axis(0));
        let input = input.as_standard_layout();

        let input_tensor = TensorRef::from_array_view(&input).map_err(|e| {
            DetectionError::InferenceError(format!("Failed to create input tensor: {e}"))
        })?;

        let outputs = self
            .session
            .run(ort::inputs![&self.input_name => input_tensor])
            .map_err(|e| DetectionError::InferenceError(format!("Inference failed: {e}")))?;

        let mut tensors = Vec::with_capacity(self.output_names.len());
        for name in &self.output_names {
            let output = outputs.get(name.as_str()).ok_or_else(|| {
                DetectionError::InferenceError(format!("Output '{name}' not found"))
            })?;

            let (shape, data) = output.try_extract_tensor::<f32>().map_err(|e| {
                DetectionError::InferenceError(format!("Failed to extract output: {e}"))
            })?;

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let shape: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
            if let Some(rows) = to_candidate_rows(data.to_vec(), &shape) {
                tensors.push(rows);
            } else {
                warn!("Skipping output '{name}' with unusable shape {shape:?}");
            }
        }

        Ok(tensors)
    }
}
