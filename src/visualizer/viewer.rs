// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Live window for annotated frames.

use image::RgbImage;
use minifb::{Key, Window, WindowOptions};

use crate::error::{DetectionError, Result};

/// A simple frame viewer using minifb.
///
/// [`Viewer::update`] returns `Ok(false)` once the user closes the window or
/// presses Escape/Q; callers treat that as a stop signal, not an error.
pub struct Viewer {
    window: Window,
    pub width: usize,
    pub height: usize,
    buffer: Vec<u32>,
}

impl Viewer {
    /// Create a new viewer window.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::VisualizerError`] when no window can be
    /// created (e.g. headless environment).
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| DetectionError::VisualizerError(format!("Failed to create window: {e}")))?;

        // Limit update rate
        window.limit_update_rate(Some(std::time::Duration::from_micros(16600)));

        Ok(Self {
            window,
            width,
            height,
            buffer: Vec::new(),
        })
    }

    /// Show a frame, returning `Ok(false)` when the user asked to quit.
    ///
    /// # Errors
    ///
    /// Returns [`DetectionError::VisualizerError`] when the window rejects
    /// the buffer.
    pub fn update(&mut self, frame: &RgbImage) -> Result<bool> {
        if !self.window.is_open()
            || self.window.is_key_down(Key::Escape)
            || self.window.is_key_down(Key::Q)
        {
            return Ok(false);
        }

        let (img_width, img_height) = (frame.width() as usize, frame.height() as usize);

        let num_pixels = img_width * img_height;
        if self.buffer.len() != num_pixels {
            self.buffer.resize(num_pixels, 0);
        }

        // Pack pixels as 0x00RRGGBB, the format minifb expects.
        for (i, pixel) in frame.pixels().enumerate() {
            let r = u32::from(pixel[0]);
            let g = u32::from(pixel[1]);
            let b = u32::from(pixel[2]);
            self.buffer[i] = (r << 16) | (g << 8) | b;
        }

        if self.width != img_width || self.height != img_height {
            self.width = img_width;
            self.height = img_height;
        }

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| DetectionError::VisualizerError(format!("Failed to update window: {e}")))?;

        Ok(true)
    }

    /// Hold the last frame for `duration` while keeping the window
    /// responsive, returning `Ok(false)` when the user asked to quit.
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible to match [`Viewer::update`].
    pub fn wait(&mut self, duration: std::time::Duration) -> Result<bool> {
        if self.buffer.is_empty() {
            return Ok(true);
        }

        let start = std::time::Instant::now();
        while start.elapsed() < duration {
            if !self.window.is_open()
                || self.window.is_key_down(Key::Escape)
                || self.window.is_key_down(Key::Q)
            {
                return Ok(false);
            }
            // Re-present the held frame; limit_update_rate keeps this loop
            // from spinning.
            let _ = self
                .window
                .update_with_buffer(&self.buffer, self.width, self.height);
        }
        Ok(true)
    }
}
