//! OCR capability contract
//!
//! The pipeline never embeds an OCR engine. It talks to one through
//! [`OcrCapability`], which is injected by the caller and may be slow or
//! blocking. Implementations must tolerate one call per candidate region.

use image::RgbImage;
use serde::Serialize;

use crate::error::OcrError;

/// A single OCR request for one cropped region
#[derive(Debug, Clone)]
pub struct OcrRequest {
    /// Region pixels at native resolution
    pub crop: RgbImage,
    /// Resolution hint; `None` lets the engine infer it
    pub dpi_hint: Option<u32>,
}

/// A recognized line with geometry relative to the crop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrLine {
    pub text: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f32,
}

/// Result of recognizing one crop
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OcrOutput {
    /// Full recognized text, lines separated by `\n`
    pub text: String,
    /// Optional per-line detail
    pub lines: Vec<OcrLine>,
    /// Overall confidence (0.0 - 1.0) if the engine reports one
    pub confidence: Option<f32>,
}

impl OcrOutput {
    /// Output carrying only text
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// An OCR engine shared read-only across pipeline invocations
pub trait OcrCapability: Send + Sync {
    /// Recognize the text in a single crop
    fn recognize(&self, request: &OcrRequest) -> Result<OcrOutput, OcrError>;
}
