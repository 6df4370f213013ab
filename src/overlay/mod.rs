//! Overlay Rendering Layer
//!
//! Paints detection results onto a copy of the source image:
//! - Box mode outlines every candidate rectangle
//! - Redact-and-label mode fills regions with recognized text and writes the
//!   text centered inside them
//!
//! The caller's frame is never modified.

pub mod font;
pub mod style;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{imageops, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};

use crate::config::OverlaySettings;
use crate::error::ConfigError;
use crate::input::Frame;
use crate::vision::{Rect, TextRegion};

pub use style::OverlayStyle;

/// Renders detection and recognition overlays
pub struct OverlayRenderer {
    style: OverlayStyle,
    font: Option<FontVec>,
    font_scale: PxScale,
}

impl OverlayRenderer {
    /// Create a renderer, resolving the label font from the settings
    pub fn new(settings: &OverlaySettings) -> Result<Self, ConfigError> {
        Ok(Self {
            style: OverlayStyle::from_settings(settings)?,
            font: font::resolve_font(settings),
            font_scale: PxScale::from(font::points_to_pixels(settings.font_size)),
        })
    }

    /// Replace the label font
    pub fn with_font(mut self, font: Option<FontVec>) -> Self {
        self.font = font;
        self
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    /// Whether labels can be drawn
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Outline every rectangle on a copy of the frame
    pub fn draw_boxes(&self, frame: &Frame, rects: &[Rect]) -> RgbImage {
        let mut canvas = frame.to_rgb();
        for rect in rects {
            // Rings are inset so the stroke never leaves the rectangle
            for ring in 0..self.style.box_thickness {
                let Some(inner) = rect.inset(ring) else {
                    break;
                };
                draw_hollow_rect_mut(&mut canvas, inner.into(), self.style.box_color);
            }
        }
        canvas
    }

    /// Fill regions that hold text and write the text centered inside them
    ///
    /// Regions without recognized text are left untouched.
    pub fn redact_and_label(&self, frame: &Frame, regions: &[TextRegion]) -> RgbImage {
        let mut canvas = frame.to_rgb();
        let (width, height) = canvas.dimensions();

        for region in regions {
            let Some(text) = region.text.as_deref().filter(|t| !t.is_empty()) else {
                continue;
            };
            if !region.bounds.fits_within(width, height) {
                continue;
            }

            let tile = self.label_tile(region.bounds, text);
            imageops::replace(
                &mut canvas,
                &tile,
                i64::from(region.bounds.x),
                i64::from(region.bounds.y),
            );
        }

        canvas
    }

    /// Redaction fill the size of `bounds` with the label drawn on it
    fn label_tile(&self, bounds: Rect, text: &str) -> RgbImage {
        let mut tile = RgbImage::from_pixel(bounds.width, bounds.height, self.style.redaction_color);

        let Some(font) = &self.font else {
            return tile;
        };

        let scaled = font.as_scaled(self.font_scale);
        let line_height = scaled.ascent() - scaled.descent();
        let lines: Vec<&str> = text.lines().collect();
        let block_height =
            line_height * lines.len() as f32 + scaled.line_gap() * (lines.len() as f32 - 1.0);

        let mut y = (bounds.height as f32 - block_height) / 2.0;
        for line in lines {
            let line_width = measure_text_width(line, font, self.font_scale);
            let x = (bounds.width as f32 - line_width) / 2.0;
            draw_text_mut(
                &mut tile,
                self.style.text_color,
                x.round() as i32,
                y.round() as i32,
                self.font_scale,
                font,
                line,
            );
            y += line_height + scaled.line_gap();
        }

        tile
    }
}

/// Advance width of a single line of text
fn measure_text_width(text: &str, font: &FontVec, scale: PxScale) -> f32 {
    let scaled = font.as_scaled(scale);
    text.chars()
        .map(|ch| scaled.h_advance(scaled.glyph_id(ch)))
        .sum()
}
