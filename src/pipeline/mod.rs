//! Detection and recognition pipeline
//!
//! Orchestrates candidate detection, optional OCR gating and overlay
//! rendering. Every entry point is a synchronous, total computation: the full
//! region set is known before rendering begins and the result is a fresh image.

use image::RgbImage;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::input::Frame;
use crate::overlay::OverlayRenderer;
use crate::vision::{CandidateRegionDetector, OcrCapability, OcrGate, Recognition, Rect};

/// Validated, immutable pipeline
pub struct Pipeline {
    config: AppConfig,
    detector: CandidateRegionDetector,
    gate: OcrGate,
    renderer: OverlayRenderer,
}

impl Pipeline {
    /// Validate the configuration and build every stage
    pub fn new(config: AppConfig) -> Result<Self, PipelineError> {
        config.validate()?;

        let detector = CandidateRegionDetector::new(&config)?;
        let gate = OcrGate::new(&config.ocr)?;
        let renderer = OverlayRenderer::new(&config.overlay)?;

        Ok(Self {
            config,
            detector,
            gate,
            renderer,
        })
    }

    /// Replace the overlay renderer
    pub fn with_renderer(mut self, renderer: OverlayRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn renderer(&self) -> &OverlayRenderer {
        &self.renderer
    }

    /// Candidate rectangles in detection order
    pub fn detect(&self, frame: &Frame) -> Vec<Rect> {
        self.detector.detect(frame)
    }

    /// Detect candidates and outline them on a copy of the frame
    pub fn detect_and_box(&self, frame: &Frame) -> RgbImage {
        let rects = self.detect(frame);
        self.renderer.draw_boxes(frame, &rects)
    }

    /// [`Self::detect_and_box`] that gives up once `cancel` fires
    pub fn detect_and_box_cancellable(
        &self,
        frame: &Frame,
        cancel: &CancellationToken,
    ) -> Result<RgbImage, PipelineError> {
        let start = Instant::now();
        let rects = self.detect(frame);
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let image = self.renderer.draw_boxes(frame, &rects);
        info!("Boxed {} candidate regions in {:?}", rects.len(), start.elapsed());
        Ok(image)
    }

    /// Detect candidates and gate each one through the OCR capability
    pub fn recognize(
        &self,
        frame: &Frame,
        ocr: &dyn OcrCapability,
        cancel: &CancellationToken,
    ) -> Result<Recognition, PipelineError> {
        let rects = self.detect(frame);
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        debug!("Running OCR on {} candidate regions", rects.len());
        self.gate.evaluate_all(frame, &rects, ocr, cancel)
    }

    /// Detect, recognize and paint labels over regions that hold text
    pub fn recognize_and_overlay(
        &self,
        frame: &Frame,
        ocr: &dyn OcrCapability,
    ) -> Result<RgbImage, PipelineError> {
        self.recognize_and_overlay_cancellable(frame, ocr, &CancellationToken::new())
            .map(|(image, _)| image)
    }

    /// [`Self::recognize_and_overlay`] that also returns the raw regions and
    /// gives up once `cancel` fires
    pub fn recognize_and_overlay_cancellable(
        &self,
        frame: &Frame,
        ocr: &dyn OcrCapability,
        cancel: &CancellationToken,
    ) -> Result<(RgbImage, Recognition), PipelineError> {
        let start = Instant::now();
        let recognition = self.recognize(frame, ocr, cancel)?;
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let image = self.renderer.redact_and_label(frame, &recognition.regions);
        info!(
            "Relabelled {} of {} regions in {:?} ({} OCR failures)",
            recognition.text_regions().count(),
            recognition.regions.len(),
            start.elapsed(),
            recognition.diagnostics.len()
        );
        Ok((image, recognition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::detection::tests::synthetic_text_lines;
    use crate::vision::gate::tests::ScriptedOcr;
    use image::Rgb;

    fn pipeline() -> Pipeline {
        Pipeline::new(AppConfig::default()).unwrap()
    }

    fn three_line_frame() -> Frame {
        Frame::from_rgb(synthetic_text_lines(200, 130, &[(10, 20), (55, 20), (100, 20)])).unwrap()
    }

    #[test]
    fn test_contradictory_config_rejected() {
        let mut config = AppConfig::default();
        config.filter.min_height = 70;
        assert!(matches!(Pipeline::new(config), Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_detect_and_box_is_idempotent() {
        let p = pipeline();
        let frame = three_line_frame();
        assert_eq!(p.detect_and_box(&frame), p.detect_and_box(&frame));
    }

    #[test]
    fn test_detect_and_box_only_touches_outlines() {
        let p = pipeline();
        let frame = three_line_frame();
        let rects = p.detect(&frame);
        let original = frame.to_rgb();
        let boxed = p.detect_and_box(&frame);

        for (x, y, pixel) in boxed.enumerate_pixels() {
            let on_outline = rects.iter().any(|r| {
                r.contains(x, y) && !r.inset(2).is_some_and(|inner| inner.contains(x, y))
            });
            if !on_outline {
                assert_eq!(pixel, original.get_pixel(x, y));
            }
        }
        assert_ne!(boxed, original);
    }

    #[test]
    fn test_empty_ocr_leaves_image_identical() {
        let frame = three_line_frame();
        let ocr = ScriptedOcr::returning("");
        let out = pipeline().recognize_and_overlay(&frame, &ocr).unwrap();
        assert_eq!(out, frame.to_rgb());
    }

    #[test]
    fn test_failure_on_second_region_is_isolated() {
        let frame = three_line_frame();
        let ocr = ScriptedOcr::returning("recognized").failing_on(1);
        let recognition = pipeline()
            .recognize(&frame, &ocr, &CancellationToken::new())
            .unwrap();

        assert_eq!(recognition.regions.len(), 3);
        assert_eq!(recognition.regions[0].text.as_deref(), Some("recognized"));
        assert!(recognition.regions[1].text.is_none());
        assert_eq!(recognition.regions[2].text.as_deref(), Some("recognized"));
        assert_eq!(recognition.diagnostics.len(), 1);
    }

    #[test]
    fn test_redaction_confined_to_regions() {
        let frame = three_line_frame();
        let ocr = ScriptedOcr::returning("abc");
        let (out, recognition) = pipeline()
            .recognize_and_overlay_cancellable(&frame, &ocr, &CancellationToken::new())
            .unwrap();
        let original = frame.to_rgb();

        for (x, y, pixel) in out.enumerate_pixels() {
            let inside = recognition.regions.iter().any(|r| r.bounds.contains(x, y));
            if !inside {
                assert_eq!(pixel, original.get_pixel(x, y));
            }
        }
        let first = recognition.regions[0].bounds;
        assert_eq!(out.get_pixel(first.x, first.y), &Rgb([220, 220, 220]));
    }

    #[test]
    fn test_cancelled_recognition() {
        let token = CancellationToken::new();
        token.cancel();
        let ocr = ScriptedOcr::returning("abc");
        let result = pipeline().recognize_and_overlay_cancellable(&three_line_frame(), &ocr, &token);
        assert!(matches!(result, Err(PipelineError::Cancelled)));
    }
}
