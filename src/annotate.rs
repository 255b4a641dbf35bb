// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame annotation.
//!
//! Draws each detection as a hollow circle marker centered on its box, with
//! an optional text label on a filled background above the box. All drawing
//! primitives clip to the frame, so boxes that extend past the edges render
//! their visible portion and nothing else.

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_circle_mut, draw_text_mut};
use imageproc::rect::Rect;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::detector::Detection;
use crate::labels::ClassLabels;
use crate::{info, warn};

/// Assets URL for downloading fonts
const ASSETS_URL: &str = "https://github.com/ultralytics/assets/releases/download/v0.0.0";

/// Visual style for detection markers.
#[derive(Debug, Clone, Copy)]
pub struct MarkerStyle {
    /// Marker stroke color.
    pub color: Rgb<u8>,
    /// Marker stroke thickness in pixels.
    pub thickness: i32,
    /// Label text height in pixels.
    pub label_scale: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: Rgb([0, 0, 255]),
            thickness: 3,
            label_scale: 16.0,
        }
    }
}

/// Measured footprint of a label string at a given scale.
struct TextExtent {
    width: i32,
    /// Height above the baseline.
    height: i32,
    /// Extra space below the baseline.
    baseline: i32,
}

/// Draws detections onto frames.
///
/// Works without a font: markers are always drawn, labels only when a font
/// was supplied. Use [`load_system_font`] to fetch the bundled Arial face,
/// or [`Annotator::with_font`] to provide any other.
#[derive(Default)]
pub struct Annotator {
    font: Option<FontVec>,
    style: MarkerStyle,
}

impl Annotator {
    /// Create an annotator with the default style and no font.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the marker style.
    #[must_use]
    pub fn with_style(mut self, style: MarkerStyle) -> Self {
        self.style = style;
        self
    }

    /// Supply a font for label rendering.
    #[must_use]
    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    /// Whether labels will be rendered.
    #[must_use]
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw one detection onto the frame.
    ///
    /// The marker is a circle centered on the box with radius
    /// `min(width, height)`, stroked `thickness` times inward. When a font
    /// is loaded, the label goes on a white background anchored above the
    /// box top, pushed down just enough to stay inside the frame.
    pub fn draw(&self, frame: &mut RgbImage, detection: &Detection, labels: &ClassLabels) {
        let bbox = detection.bbox;
        let center_x = (bbox.left + bbox.right()) / 2;
        let center_y = (bbox.top + bbox.bottom()) / 2;
        let radius = bbox.width.min(bbox.height);

        for t in 0..self.style.thickness {
            let r = radius - t;
            if r > 0 {
                draw_hollow_circle_mut(frame, (center_x, center_y), r, self.style.color);
            }
        }

        if let Some(ref font) = self.font {
            let label = label_text(detection.class_id, detection.confidence, labels);
            let scale = PxScale::from(self.style.label_scale);
            let extent = text_extent(font, scale, &label);
            let anchor = label_anchor(bbox.top, extent.height);

            // White background, black text, baseline sitting on the anchor.
            let background_top = anchor - extent.height;
            let background_height = extent.height + extent.baseline;
            if extent.width > 0 && background_height > 0 {
                let rect = Rect::at(bbox.left, background_top)
                    .of_size(extent.width as u32, background_height as u32);
                draw_filled_rect_mut(frame, rect, Rgb([255, 255, 255]));
            }
            draw_text_mut(
                frame,
                Rgb([0, 0, 0]),
                bbox.left,
                background_top,
                scale,
                font,
                &label,
            );
        }
    }
}

/// Format the label for a detection.
///
/// `"name: 0.90"` when the class has a name, bare `"0.90"` otherwise.
#[must_use]
pub fn label_text(class_id: usize, confidence: f32, labels: &ClassLabels) -> String {
    match labels.get(class_id) {
        Some(name) => format!("{name}: {confidence:.2}"),
        None => format!("{confidence:.2}"),
    }
}

/// Baseline y for a label above a box top, clamped so the text stays on
/// screen even when the box starts at (or above) the frame top.
#[must_use]
pub fn label_anchor(top: i32, label_height: i32) -> i32 {
    top.max(label_height)
}

fn text_extent(font: &FontVec, scale: PxScale, text: &str) -> TextExtent {
    let scaled = font.as_scaled(scale);
    let width: f32 = text
        .chars()
        .map(|c| scaled.h_advance(font.glyph_id(c)))
        .sum();

    TextExtent {
        width: width.ceil() as i32,
        height: scaled.ascent().ceil() as i32,
        baseline: scaled.descent().abs().ceil() as i32,
    }
}

/// Check if font exists locally or download it
pub fn check_font(font: &str) -> Option<PathBuf> {
    let font_name = Path::new(font).file_name()?.to_string_lossy();
    let config_dir = dirs::config_dir()?.join("Ultralytics");
    let font_path = config_dir.join(font_name.as_ref());

    if font_path.exists() {
        return Some(font_path);
    }

    // Create config directory if it doesn't exist
    if let Err(e) = fs::create_dir_all(&config_dir) {
        warn!("Failed to create config directory: {e}");
        return None;
    }

    // Download font
    let url = format!("{ASSETS_URL}/{font_name}");
    info!("Downloading {url} to {}", font_path.display());

    match ureq::get(&url).call() {
        Ok(response) => {
            let mut file = match File::create(&font_path) {
                Ok(f) => f,
                Err(e) => {
                    warn!("Failed to create font file: {e}");
                    return None;
                }
            };

            let mut reader = response.into_body().into_reader();
            if let Err(e) = io::copy(&mut reader, &mut file) {
                warn!("Failed to download font: {e}");
                // Try to remove partial file
                let _ = fs::remove_file(&font_path);
                return None;
            }

            Some(font_path)
        }
        Err(e) => {
            warn!("Failed to download font from {url}: {e}");
            None
        }
    }
}

/// Load the label font, downloading it on first use.
///
/// Picks `Arial.Unicode.ttf` when any class name needs it, `Arial.ttf`
/// otherwise. Returns `None` when the font cannot be fetched or parsed;
/// annotation then falls back to markers without labels.
#[must_use]
pub fn load_system_font(labels: &ClassLabels) -> Option<FontVec> {
    let font_name = if labels.iter().all(|name| name.is_ascii()) {
        "Arial.ttf"
    } else {
        "Arial.Unicode.ttf"
    };

    let font_path = check_font(font_name)?;
    let mut file = File::open(font_path).ok()?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).ok()?;
    FontVec::try_from_vec(buffer).ok()
}
