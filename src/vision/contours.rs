//! External contour extraction and bounding rectangles

use image::{imageops, GrayImage};
use imageproc::contours::{find_contours, BorderType};

use super::Rect;

/// Bounding rectangles of the outermost borders in a binary mask
///
/// Holes and components nested inside holes are ignored. Rectangles come
/// back in the tracer's raster discovery order, which callers must not treat
/// as a spatial sort.
pub fn external_bounding_rects(mask: &GrayImage) -> Vec<Rect> {
    // The tracer misreads blobs touching the left column as holes; a zero
    // border keeps every component strictly inside.
    let (width, height) = mask.dimensions();
    let mut padded = GrayImage::new(width + 2, height + 2);
    imageops::replace(&mut padded, mask, 1, 1);

    find_contours::<u32>(&padded)
        .into_iter()
        .filter(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none())
        .filter_map(|contour| {
            let mut points = contour.points.iter();
            let first = points.next()?;
            let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
            for p in points {
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
            Rect::from_corners(
                min_x.saturating_sub(1),
                min_y.saturating_sub(1),
                max_x.saturating_sub(1),
                max_y.saturating_sub(1),
            )
        })
        .collect()
}
