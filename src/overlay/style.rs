//! Colors and stroke settings for overlay rendering

use image::Rgb;

use crate::config::OverlaySettings;
use crate::error::ConfigError;

/// Resolved overlay colors and stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    /// Detection outline color
    pub box_color: Rgb<u8>,
    /// Detection outline width in pixels, drawn inward
    pub box_thickness: u32,
    /// Redaction fill color
    pub redaction_color: Rgb<u8>,
    /// Label color
    pub text_color: Rgb<u8>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            box_color: Rgb([255, 0, 0]),
            box_thickness: 2,
            redaction_color: Rgb([220, 220, 220]),
            text_color: Rgb([0, 0, 0]),
        }
    }
}

impl OverlayStyle {
    /// Resolve colors and stroke, rejecting a zero stroke or font size
    pub fn from_settings(settings: &OverlaySettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            box_color: Rgb(settings.box_color),
            box_thickness: settings.box_thickness,
            redaction_color: Rgb(settings.redaction_color),
            text_color: Rgb(settings.text_color),
        })
    }
}
