//! Pipeline Configuration
//!
//! All tunable detection, recognition and rendering parameters, stored in TOML format.
//! A config is validated once when it is loaded or handed to a pipeline and is
//! shared read-only afterwards.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Pipeline settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Edge extraction and dilation settings
    pub detection: DetectionSettings,
    /// Geometric acceptance thresholds
    pub filter: FilterSettings,
    /// OCR engine and text decision settings
    pub ocr: OcrSettings,
    /// Overlay rendering settings
    pub overlay: OverlaySettings,
}

impl AppConfig {
    /// Reject contradictory or out-of-range values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detection.validate()?;
        self.filter.validate()?;
        self.ocr.validate()?;
        self.overlay.validate()
    }
}

/// Edge map and dilation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Binary cutoff applied to the absolute horizontal gradient
    pub edge_threshold: u8,
    /// Structuring element width
    pub dilate_kernel_width: u32,
    /// Structuring element height
    pub dilate_kernel_height: u32,
    /// Number of dilation passes
    pub dilate_iterations: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            edge_threshold: 50,
            dilate_kernel_width: 10,
            dilate_kernel_height: 2,
            dilate_iterations: 1,
        }
    }
}

impl DetectionSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dilate_kernel_width == 0 || self.dilate_kernel_height == 0 {
            return Err(ConfigError::invalid(
                "detection.dilate_kernel",
                format!(
                    "kernel must be at least 1x1, got {}x{}",
                    self.dilate_kernel_width, self.dilate_kernel_height
                ),
            ));
        }
        if self.dilate_iterations == 0 {
            return Err(ConfigError::invalid(
                "detection.dilate_iterations",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Geometric acceptance thresholds for candidate rectangles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Exclusive lower bound on width / height
    pub min_aspect_ratio: f64,
    /// Exclusive lower bound on width
    pub min_width: u32,
    /// Exclusive lower bound on height
    pub min_height: u32,
    /// Exclusive upper bound on height
    pub max_height: u32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            min_aspect_ratio: 0.8,
            min_width: 10,
            min_height: 10,
            max_height: 60,
        }
    }
}

impl FilterSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_aspect_ratio.is_finite() || self.min_aspect_ratio < 0.0 {
            return Err(ConfigError::invalid(
                "filter.min_aspect_ratio",
                format!("must be a finite non-negative number, got {}", self.min_aspect_ratio),
            ));
        }
        if self.min_height >= self.max_height {
            return Err(ConfigError::invalid(
                "filter.max_height",
                format!(
                    "min_height ({}) must be below max_height ({})",
                    self.min_height, self.max_height
                ),
            ));
        }
        Ok(())
    }
}

/// How the OCR gate decides that a region contains text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDecisionPolicy {
    /// Normalized text is non-empty after trimming
    #[default]
    #[serde(alias = "nonEmptyText")]
    NonEmptyText,
    /// Non-empty text and a reported confidence above zero
    #[serde(alias = "confidenceAboveZero")]
    ConfidenceAboveZero,
}

/// OCR engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Text presence decision policy
    pub decision_policy: TextDecisionPolicy,
    /// Resolution hint forwarded to the engine; unset lets it infer
    pub dpi_hint: Option<u32>,
    /// Tesseract language code(s), e.g. "eng" or "chi_sim+eng"
    pub language: String,
    /// Tesseract OCR engine mode (1 = LSTM only)
    pub engine_mode: u8,
    /// Tesseract page segmentation mode (12 = sparse text with OSD)
    pub page_segmentation_mode: u8,
    /// Tesseract executable
    pub tesseract_path: PathBuf,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            decision_policy: TextDecisionPolicy::NonEmptyText,
            dpi_hint: None,
            language: "chi_sim".to_string(),
            engine_mode: 1,
            page_segmentation_mode: 12,
            tesseract_path: PathBuf::from("tesseract"),
        }
    }
}

impl OcrSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dpi_hint == Some(0) {
            return Err(ConfigError::invalid("ocr.dpi_hint", "must be positive when set"));
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::invalid("ocr.language", "must not be empty"));
        }
        Ok(())
    }
}

/// Overlay rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Label font family ("serif", "sans-serif" or "monospace")
    pub font_family: String,
    /// Label font size in points
    pub font_size: f32,
    /// Explicit font file, takes precedence over the family lookup
    pub font_path: Option<PathBuf>,
    /// Redaction fill (RGB)
    pub redaction_color: [u8; 3],
    /// Label color (RGB)
    pub text_color: [u8; 3],
    /// Detection outline color (RGB)
    pub box_color: [u8; 3],
    /// Detection outline stroke in pixels
    pub box_thickness: u32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            font_family: "serif".to_string(),
            font_size: 11.0,
            font_path: None,
            redaction_color: [220, 220, 220],
            text_color: [0, 0, 0],
            box_color: [255, 0, 0],
            box_thickness: 2,
        }
    }
}

impl OverlaySettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(ConfigError::invalid(
                "overlay.font_size",
                format!("must be positive, got {}", self.font_size),
            ));
        }
        if self.box_thickness == 0 {
            return Err(ConfigError::invalid("overlay.box_thickness", "must be at least 1"));
        }
        Ok(())
    }
}

/// Load and validate configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
