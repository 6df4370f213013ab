//! Vision/OCR Layer
//!
//! Classical text-region detection and per-region OCR gating:
//! - Edge map, dilation, contours and geometric filtering produce candidates
//! - An injected OCR capability decides which candidates hold text

pub mod contours;
pub mod detection;
pub mod edges;
pub mod filter;
pub mod gate;
pub mod geometry;
pub mod morphology;
pub mod ocr;
pub mod tesseract;

use serde::Serialize;

pub use detection::CandidateRegionDetector;
pub use edges::EdgeMapBuilder;
pub use filter::GeometricFilter;
pub use gate::{normalize_text, OcrGate};
pub use geometry::Rect;
pub use morphology::RegionDilator;
pub use ocr::{OcrCapability, OcrLine, OcrOutput, OcrRequest};
pub use tesseract::TesseractOcr;

/// Candidate region after OCR gating
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRegion {
    /// Region bounds in source image coordinates
    pub bounds: Rect,
    /// Recognized text, `None` when the region is judged not to hold text
    pub text: Option<String>,
    /// Engine confidence (0.0 - 1.0) if reported
    pub confidence: Option<f32>,
}

impl TextRegion {
    /// Region with no recognized text
    pub fn empty(bounds: Rect) -> Self {
        Self {
            bounds,
            text: None,
            confidence: None,
        }
    }

    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// A recovered OCR failure for one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrDiagnostic {
    /// Position of the region in detection order
    pub index: usize,
    pub bounds: Rect,
    pub message: String,
}

/// Result of gating every candidate in an image
#[derive(Debug, Clone, Default, Serialize)]
pub struct Recognition {
    /// One entry per candidate, in detection order
    pub regions: Vec<TextRegion>,
    /// Non-fatal per-region failures
    pub diagnostics: Vec<OcrDiagnostic>,
}

impl Recognition {
    /// Regions that contain recognized text
    pub fn text_regions(&self) -> impl Iterator<Item = &TextRegion> {
        self.regions.iter().filter(|r| r.has_text())
    }
}
