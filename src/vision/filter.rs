//! Geometric acceptance of candidate rectangles
//!
//! Text lines are assumed to be wide, short bands. Very tall headings and
//! vertical scripts are rejected by construction.

use crate::config::FilterSettings;
use crate::error::ConfigError;

use super::Rect;

/// Accepts rectangles shaped like text lines
#[derive(Debug, Clone)]
pub struct GeometricFilter {
    settings: FilterSettings,
}

impl GeometricFilter {
    /// Create a filter, rejecting contradictory thresholds
    pub fn new(settings: FilterSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    /// True iff every threshold holds
    pub fn accepts(&self, rect: &Rect) -> bool {
        let s = &self.settings;
        rect.aspect_ratio() > s.min_aspect_ratio
            && rect.width > s.min_width
            && rect.height > s.min_height
            && rect.height < s.max_height
    }

    /// Keep accepted rectangles, preserving order
    pub fn apply(&self, rects: Vec<Rect>) -> Vec<Rect> {
        rects.into_iter().filter(|r| self.accepts(r)).collect()
    }
}
