//! Per-region OCR gating
//!
//! Crops each candidate rectangle, asks the OCR capability what it reads, and
//! decides whether the region really contains text. A failure for one region
//! is recorded as a diagnostic and never aborts its siblings.

use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{OcrSettings, TextDecisionPolicy};
use crate::error::{ConfigError, PipelineError};
use crate::input::Frame;

use super::ocr::{OcrCapability, OcrOutput, OcrRequest};
use super::{OcrDiagnostic, Recognition, Rect, TextRegion};

/// Decides text presence for candidate regions
#[derive(Debug, Clone)]
pub struct OcrGate {
    policy: TextDecisionPolicy,
    dpi_hint: Option<u32>,
}

impl OcrGate {
    pub fn new(settings: &OcrSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self {
            policy: settings.decision_policy,
            dpi_hint: settings.dpi_hint,
        })
    }

    pub fn with_policy(mut self, policy: TextDecisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Evaluate a single region; OCR failures become `text = None`
    pub fn evaluate(&self, frame: &Frame, rect: Rect, ocr: &dyn OcrCapability) -> TextRegion {
        self.try_evaluate(frame, rect, ocr).unwrap_or_else(|message| {
            warn!("OCR failed for region {:?}: {}", rect, message);
            TextRegion::empty(rect)
        })
    }

    /// Evaluate every region in order, collecting per-region diagnostics
    pub fn evaluate_all(
        &self,
        frame: &Frame,
        rects: &[Rect],
        ocr: &dyn OcrCapability,
        cancel: &CancellationToken,
    ) -> Result<Recognition, PipelineError> {
        let start = Instant::now();
        let mut recognition = Recognition::default();

        for (index, &rect) in rects.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            match self.try_evaluate(frame, rect, ocr) {
                Ok(region) => recognition.regions.push(region),
                Err(message) => {
                    warn!("OCR failed for region #{} {:?}: {}", index, rect, message);
                    recognition.regions.push(TextRegion::empty(rect));
                    recognition.diagnostics.push(OcrDiagnostic {
                        index,
                        bounds: rect,
                        message,
                    });
                }
            }
        }

        debug!(
            "OCR gate complete in {:?}: {} of {} regions contain text, {} failures",
            start.elapsed(),
            recognition.text_regions().count(),
            rects.len(),
            recognition.diagnostics.len()
        );

        Ok(recognition)
    }

    fn try_evaluate(
        &self,
        frame: &Frame,
        rect: Rect,
        ocr: &dyn OcrCapability,
    ) -> Result<TextRegion, String> {
        let crop = frame.crop(rect).map_err(|e| e.to_string())?;
        let request = OcrRequest {
            crop,
            dpi_hint: self.dpi_hint,
        };
        let output = ocr.recognize(&request).map_err(|e| e.to_string())?;
        Ok(self.decide(rect, output))
    }

    fn decide(&self, rect: Rect, output: OcrOutput) -> TextRegion {
        let text = normalize_text(&output.text);
        let has_text = !text.trim().is_empty();
        let contains_text = match self.policy {
            TextDecisionPolicy::NonEmptyText => has_text,
            TextDecisionPolicy::ConfidenceAboveZero => {
                has_text && output.confidence.is_some_and(|c| c > 0.0)
            }
        };

        TextRegion {
            bounds: rect,
            text: contains_text.then_some(text),
            confidence: output.confidence,
        }
    }
}

/// Clean engine output before the text decision
///
/// Line endings become `\n`, byte-order marks and control characters other
/// than newline and tab are dropped, trailing whitespace is trimmed from
/// every line and blank lines at either end are removed.
pub fn normalize_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let cleaned: String = unified
        .chars()
        .filter(|&c| c == '\n' || c == '\t' || !(c.is_control() || c == '\u{feff}'))
        .collect();

    let lines: Vec<&str> = cleaned.lines().map(str::trim_end).collect();
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());

    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}
