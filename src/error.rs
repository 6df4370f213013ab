//! Error types shared by the detection, recognition and rendering stages

use thiserror::Error;

/// Errors surfaced by a pipeline invocation
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Null, zero-sized or out-of-bounds input
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Contradictory or out-of-range configuration
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),
    /// OCR capability failure that could not be isolated to a single region
    #[error("OCR failure: {0}")]
    Ocr(#[from] OcrError),
    /// The run was cancelled or superseded by a newer request
    #[error("pipeline run was cancelled")]
    Cancelled,
    /// Background worker exited without reporting a result
    #[error("pipeline worker exited without a result")]
    WorkerLost,
}

/// Errors raised while building or loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("failed to read or write config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors raised by an OCR capability for a single request
#[derive(Debug, Error)]
pub enum OcrError {
    /// Engine binary or language data is missing
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),
    /// Engine ran but reported a failure
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode OCR input: {0}")]
    Image(#[from] image::ImageError),
}
