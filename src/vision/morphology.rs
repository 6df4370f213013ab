//! Rectangular dilation of binary masks
//!
//! A wide, short structuring element bridges the gaps between characters on
//! the same line without merging neighbouring lines. The element is anchored
//! at `(width / 2, height / 2)` and the border is mirrored including the edge
//! pixel (`fedcba|abcdefgh|hgfedcb`).

use image::GrayImage;

use crate::config::DetectionSettings;
use crate::error::ConfigError;

/// Dilates masks with a rectangular structuring element
#[derive(Debug, Clone, Copy)]
pub struct RegionDilator {
    kernel_width: u32,
    kernel_height: u32,
    iterations: u32,
}

impl RegionDilator {
    /// Create a dilator, rejecting empty kernels and zero iterations
    pub fn new(
        kernel_width: u32,
        kernel_height: u32,
        iterations: u32,
    ) -> Result<Self, ConfigError> {
        Self::from_settings(&DetectionSettings {
            dilate_kernel_width: kernel_width,
            dilate_kernel_height: kernel_height,
            dilate_iterations: iterations,
            ..Default::default()
        })
    }

    pub fn from_settings(settings: &DetectionSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            kernel_width: settings.dilate_kernel_width,
            kernel_height: settings.dilate_kernel_height,
            iterations: settings.dilate_iterations,
        })
    }

    /// Dilated copy of the mask, same dimensions
    pub fn dilate(&self, mask: &GrayImage) -> GrayImage {
        let mut result = mask.clone();
        for _ in 0..self.iterations {
            // A rectangle is separable: row maximum, then column maximum
            let rows = max_filter_rows(&result, self.kernel_width);
            result = max_filter_columns(&rows, self.kernel_height);
        }
        result
    }
}

/// Mirror an out-of-range coordinate back into `0..len`
fn reflect(index: i64, len: i64) -> usize {
    let period = 2 * len;
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - 1 - i;
    }
    i as usize
}

fn max_filter_rows(image: &GrayImage, size: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let w = width as usize;
    let anchor = i64::from(size / 2);
    let raw = image.as_raw();
    let mut out = vec![0u8; raw.len()];

    for y in 0..height as usize {
        let row = &raw[y * w..(y + 1) * w];
        for x in 0..w {
            let start = x as i64 - anchor;
            let mut value = 0u8;
            for k in 0..i64::from(size) {
                value = value.max(row[reflect(start + k, w as i64)]);
            }
            out[y * w + x] = value;
        }
    }

    GrayImage::from_raw(width, height, out).unwrap_or_else(|| GrayImage::new(width, height))
}

fn max_filter_columns(image: &GrayImage, size: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    let w = width as usize;
    let h = height as i64;
    let anchor = i64::from(size / 2);
    let raw = image.as_raw();
    let mut out = vec![0u8; raw.len()];

    for y in 0..height as usize {
        let start = y as i64 - anchor;
        for x in 0..w {
            let mut value = 0u8;
            for k in 0..i64::from(size) {
                value = value.max(raw[reflect(start + k, h) * w + x]);
            }
            out[y * w + x] = value;
        }
    }

    GrayImage::from_raw(width, height, out).unwrap_or_else(|| GrayImage::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn single_pixel(width: u32, height: u32, x: u32, y: u32) -> GrayImage {
        let mut mask = GrayImage::new(width, height);
        mask.put_pixel(x, y, Luma([255]));
        mask
    }

    fn lit(mask: &GrayImage) -> Vec<(u32, u32)> {
        mask.enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] > 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn test_reflect_includes_edge_pixel() {
        assert_eq!(reflect(-1, 5), 0);
        assert_eq!(reflect(-2, 5), 1);
        assert_eq!(reflect(5, 5), 4);
        assert_eq!(reflect(6, 5), 3);
        assert_eq!(reflect(2, 5), 2);
    }

    #[test]
    fn test_default_kernel_footprint() {
        // 10x2 anchored at (5, 1): a point spreads to x-4..=x+5, y..=y+1
        let mask = single_pixel(40, 10, 20, 4);
        let dilated = RegionDilator::new(10, 2, 1).unwrap().dilate(&mask);
        let points = lit(&dilated);

        assert_eq!(points.len(), 20);
        assert!(points.iter().all(|&(x, y)| (16..=25).contains(&x) && (4..=5).contains(&y)));
    }

    #[test]
    fn test_dilation_bridges_nearby_strokes() {
        let mut mask = GrayImage::new(40, 6);
        for y in 2..4 {
            mask.put_pixel(10, y, Luma([255]));
            mask.put_pixel(18, y, Luma([255]));
        }
        let dilated = RegionDilator::new(10, 2, 1).unwrap().dilate(&mask);
        assert!((10..=18).all(|x| dilated.get_pixel(x, 2).0[0] == 255));
    }

    #[test]
    fn test_iterations_grow_further() {
        let mask = single_pixel(40, 10, 20, 4);
        let once = RegionDilator::new(3, 1, 1).unwrap().dilate(&mask);
        let twice = RegionDilator::new(3, 1, 2).unwrap().dilate(&mask);
        assert_eq!(lit(&once).len(), 3);
        assert_eq!(lit(&twice).len(), 5);
    }

    #[test]
    fn test_invalid_kernel_rejected() {
        assert!(RegionDilator::new(0, 2, 1).is_err());
        assert!(RegionDilator::new(10, 0, 1).is_err());
        assert!(RegionDilator::new(10, 2, 0).is_err());
    }

    #[test]
    fn test_empty_mask_stays_empty() {
        let mask = GrayImage::new(30, 30);
        let dilated = RegionDilator::new(10, 2, 1).unwrap().dilate(&mask);
        assert!(lit(&dilated).is_empty());
    }
}
