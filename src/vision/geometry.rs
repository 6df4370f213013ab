//! Axis-aligned rectangles in image pixel coordinates

use serde::{Deserialize, Serialize};

/// Integer rectangle with a strictly positive size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a rectangle, `None` if either side is zero
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Smallest rectangle containing both inclusive corners
    pub fn from_corners(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Option<Self> {
        if max_x < min_x || max_y < min_y {
            return None;
        }
        Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    }

    /// Width divided by height as a real number
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Exclusive right edge
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && u64::from(x) < self.right() && u64::from(y) < self.bottom()
    }

    /// Whether the rectangle lies fully inside an image of the given size
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= u64::from(width) && self.bottom() <= u64::from(height)
    }

    /// Same rectangle shrunk by `amount` on every side, `None` once it vanishes
    pub fn inset(&self, amount: u32) -> Option<Self> {
        let shrink = amount.checked_mul(2)?;
        Self::new(
            self.x.checked_add(amount)?,
            self.y.checked_add(amount)?,
            self.width.checked_sub(shrink)?,
            self.height.checked_sub(shrink)?,
        )
    }
}

impl From<Rect> for imageproc::rect::Rect {
    fn from(rect: Rect) -> Self {
        imageproc::rect::Rect::at(rect.x as i32, rect.y as i32).of_size(rect.width, rect.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_rect_rejected() {
        assert!(Rect::new(0, 0, 0, 5).is_none());
        assert!(Rect::new(0, 0, 5, 0).is_none());
        assert!(Rect::new(3, 4, 1, 1).is_some());
    }

    #[test]
    fn test_from_corners_is_inclusive() {
        let rect = Rect::from_corners(2, 3, 11, 5).unwrap();
        assert_eq!(rect, Rect::new(2, 3, 10, 3).unwrap());
        assert!(Rect::from_corners(5, 5, 4, 5).is_none());
    }

    #[test]
    fn test_aspect_ratio_uses_real_division() {
        let rect = Rect::new(0, 0, 9, 10).unwrap();
        assert!((rect.aspect_ratio() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_fits_within() {
        let rect = Rect::new(10, 10, 20, 5).unwrap();
        assert!(rect.fits_within(30, 15));
        assert!(!rect.fits_within(29, 15));
        assert!(!rect.fits_within(30, 14));
    }

    #[test]
    fn test_inset() {
        let rect = Rect::new(10, 10, 20, 6).unwrap();
        assert_eq!(rect.inset(1), Rect::new(11, 11, 18, 4));
        assert!(rect.inset(3).is_none());
    }

    #[test]
    fn test_contains() {
        let rect = Rect::new(2, 2, 3, 3).unwrap();
        assert!(rect.contains(2, 2));
        assert!(rect.contains(4, 4));
        assert!(!rect.contains(5, 4));
        assert!(!rect.contains(1, 3));
    }
}
