// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Frame preprocessing.
//!
//! Turns an RGB frame into the planar float blob the network consumes:
//! bilinear resize to the configured input size, then scale to `[0, 1]` in
//! CHW layout. The resize is a plain stretch with no letterbox padding, so
//! the normalized geometry the network emits maps straight back to the
//! source frame by multiplying with its dimensions.

use image::RgbImage;
use image::imageops::{self, FilterType};
use ndarray::Array3;

use crate::engine::Blob;

/// Build the network input blob from a frame.
///
/// `blob_size` is `(height, width)`. Channels come out in RGB order.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn make_blob(frame: &RgbImage, blob_size: (usize, usize)) -> Blob {
    let (height, width) = blob_size;
    let resized = imageops::resize(frame, width as u32, height as u32, FilterType::Triangle);

    let mut blob = Array3::<f32>::zeros((3, height, width));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let x = x as usize;
        let y = y as usize;
        blob[[0, y, x]] = f32::from(pixel[0]) / 255.0;
        blob[[1, y, x]] = f32::from(pixel[1]) / 255.0;
        blob[[2, y, x]] = f32::from(pixel[2]) / 255.0;
    }

    blob
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_blob_shape() {
        let frame = RgbImage::new(640, 480);
        let blob = make_blob(&frame, (416, 416));
        assert_eq!(blob.shape(), &[3, 416, 416]);

        let blob = make_blob(&frame, (100, 200));
        assert_eq!(blob.shape(), &[3, 100, 200]);
    }

    #[test]
    fn test_blob_values_normalized() {
        let frame = RgbImage::from_pixel(64, 48, Rgb([255, 128, 0]));
        let blob = make_blob(&frame, (32, 32));

        assert!(blob.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!((blob[[0, 16, 16]] - 1.0).abs() < 1e-6);
        assert!((blob[[1, 16, 16]] - 128.0 / 255.0).abs() < 1e-2);
        assert!(blob[[2, 16, 16]] < 1e-6);
    }

    #[test]
    fn test_blob_preserves_channel_order() {
        // Pure red stays in the first plane after resize.
        let frame = RgbImage::from_pixel(10, 10, Rgb([255, 0, 0]));
        let blob = make_blob(&frame, (4, 4));

        assert!((blob[[0, 0, 0]] - 1.0).abs() < 1e-6);
        assert!(blob[[1, 0, 0]] < 1e-6);
        assert!(blob[[2, 0, 0]] < 1e-6);
    }
}
