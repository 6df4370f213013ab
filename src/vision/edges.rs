//! Edge map extraction
//!
//! Characters produce strong horizontal intensity changes, so a horizontal
//! first-derivative highlights vertical strokes. The absolute response is
//! saturated to 8 bits and thresholded into a binary mask.

use image::{GrayImage, Luma};
use imageproc::gradients::horizontal_sobel;

use crate::input::Frame;

/// Foreground value of binary masks
pub const MASK_ON: u8 = 255;

/// Builds binary vertical-stroke masks
#[derive(Debug, Clone, Copy)]
pub struct EdgeMapBuilder {
    threshold: u8,
}

impl EdgeMapBuilder {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    /// Binary mask of the frame, same dimensions
    pub fn build(&self, frame: &Frame) -> GrayImage {
        self.build_from_gray(&frame.to_grayscale())
    }

    /// Binary mask of an already grayscale image
    pub fn build_from_gray(&self, gray: &GrayImage) -> GrayImage {
        let gradient = horizontal_sobel(gray);
        let (width, height) = gray.dimensions();
        let mut mask = GrayImage::new(width, height);

        for (x, y, value) in gradient.enumerate_pixels() {
            let magnitude = value.0[0].unsigned_abs().min(255) as u8;
            if magnitude > self.threshold {
                mask.put_pixel(x, y, Luma([MASK_ON]));
            }
        }

        mask
    }
}
