//! Tesseract OCR backend
//!
//! Runs the `tesseract` command-line engine on each crop and parses its TSV
//! report into lines with geometry and confidence. The crop is written to a
//! temporary PNG at native resolution; no rescaling happens here.

use std::process::Command;
use tempfile::Builder;
use tracing::{debug, info};

use crate::config::OcrSettings;
use crate::error::OcrError;

use super::ocr::{OcrCapability, OcrLine, OcrOutput, OcrRequest};

/// Tesseract CLI engine wrapper
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    settings: OcrSettings,
}

impl TesseractOcr {
    /// Create an engine from OCR settings
    pub fn new(settings: OcrSettings) -> Self {
        info!(
            "Tesseract OCR configured: language={}, oem={}, psm={}",
            settings.language, settings.engine_mode, settings.page_segmentation_mode
        );
        Self { settings }
    }

    /// Get the configured language
    pub fn language(&self) -> &str {
        &self.settings.language
    }

    /// Languages installed for the configured executable
    pub fn available_languages(&self) -> Result<Vec<String>, OcrError> {
        let output = Command::new(&self.settings.tesseract_path)
            .arg("--list-langs")
            .output()
            .map_err(|e| unavailable(&self.settings, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!(
                "tesseract --list-langs failed: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .skip(1) // "List of available languages ..."
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn run_tsv(&self, request: &OcrRequest) -> Result<String, OcrError> {
        let input = Builder::new().prefix("ocr-region-").suffix(".png").tempfile()?;
        request.crop.save_with_format(input.path(), image::ImageFormat::Png)?;

        let mut command = Command::new(&self.settings.tesseract_path);
        command
            .arg(input.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.settings.language)
            .arg("--oem")
            .arg(self.settings.engine_mode.to_string())
            .arg("--psm")
            .arg(self.settings.page_segmentation_mode.to_string());
        if let Some(dpi) = request.dpi_hint {
            command.arg("--dpi").arg(dpi.to_string());
        }
        command.arg("tsv");

        let output = command.output().map_err(|e| unavailable(&self.settings, e))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(format!("tesseract failed: {}", stderr.trim())));
        }

        // Lossy decoding replaces malformed sequences instead of failing the region
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl OcrCapability for TesseractOcr {
    fn recognize(&self, request: &OcrRequest) -> Result<OcrOutput, OcrError> {
        let (width, height) = request.crop.dimensions();
        debug!("Tesseract: processing {}x{} crop", width, height);

        let tsv = self.run_tsv(request)?;
        let output = parse_tsv(&tsv);

        debug!("Tesseract: {} lines recognized", output.lines.len());
        Ok(output)
    }
}

fn unavailable(settings: &OcrSettings, err: std::io::Error) -> OcrError {
    OcrError::Unavailable(format!(
        "failed to run {:?} (is tesseract installed?): {}",
        settings.tesseract_path, err
    ))
}

type LineKey = (u32, u32, u32, u32);

#[derive(Debug)]
struct LineAccumulator {
    words: Vec<String>,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    confidences: Vec<f32>,
}

/// Parse tesseract TSV output into lines
///
/// Only word rows (level 5) with non-empty text contribute. Word confidences
/// are reported as 0-100 and scaled to 0.0-1.0; `-1` means "not reported".
pub fn parse_tsv(tsv: &str) -> OcrOutput {
    let mut lines: Vec<(LineKey, LineAccumulator)> = Vec::new();

    for row in tsv.lines().skip(1) {
        let fields: Vec<&str> = row.splitn(12, '\t').collect();
        if fields.len() < 12 || fields[0] != "5" {
            continue;
        }
        let text = fields[11].trim();
        if text.is_empty() {
            continue;
        }

        let num = |i: usize| fields[i].trim().parse::<u32>().ok();
        let (Some(page), Some(block), Some(par), Some(line)) = (num(1), num(2), num(3), num(4))
        else {
            continue;
        };
        let (Some(left), Some(top), Some(width), Some(height)) = (num(6), num(7), num(8), num(9))
        else {
            continue;
        };
        let confidence = fields[10].trim().parse::<f32>().ok().filter(|c| *c >= 0.0);

        let key = (page, block, par, line);
        let right = left.saturating_add(width);
        let bottom = top.saturating_add(height);

        match lines.iter_mut().find(|(k, _)| *k == key) {
            Some((_, acc)) => {
                acc.words.push(text.to_string());
                acc.min_x = acc.min_x.min(left);
                acc.min_y = acc.min_y.min(top);
                acc.max_x = acc.max_x.max(right);
                acc.max_y = acc.max_y.max(bottom);
                acc.confidences.extend(confidence);
            }
            None => lines.push((
                key,
                LineAccumulator {
                    words: vec![text.to_string()],
                    min_x: left,
                    min_y: top,
                    max_x: right,
                    max_y: bottom,
                    confidences: confidence.into_iter().collect(),
                },
            )),
        }
    }

    let all_confidences: Vec<f32> = lines
        .iter()
        .flat_map(|(_, acc)| acc.confidences.iter().copied())
        .collect();

    let lines: Vec<OcrLine> = lines
        .into_iter()
        .map(|(_, acc)| OcrLine {
            text: acc.words.join(" "),
            x: acc.min_x,
            y: acc.min_y,
            width: acc.max_x - acc.min_x,
            height: acc.max_y - acc.min_y,
            confidence: mean(&acc.confidences).unwrap_or(0.0) / 100.0,
        })
        .collect();

    OcrOutput {
        text: lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"),
        lines,
        confidence: mean(&all_confidences).map(|c| c / 100.0),
    }
}

fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f32>() / values.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn tsv(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_parse_groups_words_into_lines() {
        let report = tsv(&[
            "1\t1\t0\t0\t0\t0\t0\t0\t200\t60\t-1\t",
            "4\t1\t1\t1\t1\t0\t5\t4\t120\t20\t-1\t",
            "5\t1\t1\t1\t1\t1\t5\t4\t50\t20\t90\tHello",
            "5\t1\t1\t1\t1\t2\t60\t6\t65\t18\t80\tworld",
            "5\t1\t1\t1\t2\t1\t5\t30\t40\t20\t70\tagain",
        ]);

        let output = parse_tsv(&report);

        assert_eq!(output.text, "Hello world\nagain");
        assert_eq!(output.lines.len(), 2);

        let first = &output.lines[0];
        assert_eq!((first.x, first.y, first.width, first.height), (5, 4, 120, 20));
        assert!((first.confidence - 0.85).abs() < 1e-4);

        let overall = output.confidence.unwrap();
        assert!((overall - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_parse_empty_report() {
        let output = parse_tsv(&tsv(&["1\t1\t0\t0\t0\t0\t0\t0\t200\t60\t-1\t"]));
        assert!(output.text.is_empty());
        assert!(output.lines.is_empty());
        assert!(output.confidence.is_none());
    }

    #[test]
    fn test_parse_skips_blank_words_and_bad_rows() {
        let report = tsv(&[
            "5\t1\t1\t1\t1\t1\t5\t4\t50\t20\t95\t   ",
            "5\t1\t1\tx\t1\t1\t5\t4\t50\t20\t95\tbroken",
            "5\t1\t1\t1\t1\t2\t5\t4\t50\t20\t-1\tkept",
        ]);
        let output = parse_tsv(&report);
        assert_eq!(output.text, "kept");
        assert!(output.confidence.is_none());
    }

    #[test]
    fn test_parse_oversized_geometry_saturates() {
        let report = tsv(&["5\t1\t1\t1\t1\t1\t4294967290\t4294967295\t100\t100\t50\tedge"]);
        let output = parse_tsv(&report);

        let line = &output.lines[0];
        assert_eq!(line.x, 4_294_967_290);
        assert_eq!(line.width, 5);
        assert_eq!(line.height, 0);
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let settings = OcrSettings {
            tesseract_path: "/nonexistent/tesseract-binary".into(),
            ..Default::default()
        };
        let engine = TesseractOcr::new(settings);
        let request = OcrRequest {
            crop: image::RgbImage::new(4, 4),
            dpi_hint: None,
        };
        assert!(matches!(engine.recognize(&request), Err(OcrError::Unavailable(_))));
    }
}
