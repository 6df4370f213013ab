//! Image Input Layer
//!
//! Decodes images from disk into frames and writes annotated results back out.
//! Format handling is delegated entirely to the `image` crate.

pub mod frame;

pub use frame::{ColorSpace, Frame};

use anyhow::{Context, Result};
use image::RgbImage;
use std::path::Path;
use tracing::info;

/// Decode an image file into a frame
pub fn load_frame(path: &Path) -> Result<Frame> {
    let image = image::open(path).with_context(|| format!("Failed to load image: {:?}", path))?;
    let frame = Frame::new(image)?;
    let (width, height) = frame.dimensions();
    info!("Loaded {:?} ({}x{}, {:?})", path, width, height, frame.color_space());
    Ok(frame)
}

/// Encode an annotated image, format inferred from the extension
pub fn save_image(image: &RgbImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .with_context(|| format!("Failed to save image: {:?}", path))?;
    info!("Saved {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_save_and_load_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let image = RgbImage::from_pixel(8, 4, Rgb([10, 20, 30]));

        save_image(&image, &path).unwrap();
        let frame = load_frame(&path).unwrap();

        assert_eq!(frame.dimensions(), (8, 4));
        assert_eq!(frame.to_rgb().get_pixel(3, 2), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_frame(Path::new("/nonexistent/frame.png")).is_err());
    }
}
