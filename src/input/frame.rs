//! Owned raster images handed to the pipeline

use image::{DynamicImage, GenericImageView, GrayImage, Luma, RgbImage, SubImage};

use crate::error::PipelineError;
use crate::vision::Rect;

/// Channel layout of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Three (or four, with alpha) color channels
    Color,
    /// Single luminance channel, optionally with alpha
    Gray,
}

/// A validated, non-empty image
#[derive(Debug, Clone)]
pub struct Frame {
    image: DynamicImage,
}

impl Frame {
    /// Wrap a decoded image, rejecting zero-sized buffers
    pub fn new(image: DynamicImage) -> Result<Self, PipelineError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::InvalidInput(format!(
                "image must be non-empty, got {}x{}",
                width, height
            )));
        }
        Ok(Self { image })
    }

    pub fn from_rgb(image: RgbImage) -> Result<Self, PipelineError> {
        Self::new(DynamicImage::ImageRgb8(image))
    }

    pub fn from_gray(image: GrayImage) -> Result<Self, PipelineError> {
        Self::new(DynamicImage::ImageLuma8(image))
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn color_space(&self) -> ColorSpace {
        match self.image {
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => ColorSpace::Gray,
            _ => ColorSpace::Color,
        }
    }

    /// Underlying decoded image
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Luminance image using 0.299/0.587/0.114 weights
    pub fn to_grayscale(&self) -> GrayImage {
        if let DynamicImage::ImageLuma8(gray) = &self.image {
            return gray.clone();
        }

        let rgb = self.image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let mut gray = GrayImage::new(width, height);

        for (x, y, pixel) in rgb.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            let value = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
            gray.put_pixel(x, y, Luma([value.round().min(255.0) as u8]));
        }

        gray
    }

    /// RGB copy of the frame
    pub fn to_rgb(&self) -> RgbImage {
        self.image.to_rgb8()
    }

    /// Borrowed view of a region, no pixels are copied
    pub fn view(&self, rect: Rect) -> Result<SubImage<&DynamicImage>, PipelineError> {
        self.check_bounds(rect)?;
        Ok(self.image.view(rect.x, rect.y, rect.width, rect.height))
    }

    /// Materialized RGB copy of a region at its native resolution
    pub fn crop(&self, rect: Rect) -> Result<RgbImage, PipelineError> {
        let view = self.view(rect)?;
        let mut crop = RgbImage::new(rect.width, rect.height);
        for (x, y, pixel) in view.pixels() {
            let [r, g, b, _] = pixel.0;
            crop.put_pixel(x, y, image::Rgb([r, g, b]));
        }
        Ok(crop)
    }

    fn check_bounds(&self, rect: Rect) -> Result<(), PipelineError> {
        let (width, height) = self.dimensions();
        if rect.fits_within(width, height) {
            Ok(())
        } else {
            Err(PipelineError::InvalidInput(format!(
                "rectangle {:?} exceeds {}x{} image",
                rect, width, height
            )))
        }
    }
}
