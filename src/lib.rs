//! Text Region Overlay
//!
//! Locates probable text regions in raster images with classical edge and
//! morphology heuristics, optionally runs OCR over each candidate, and renders
//! an annotated copy in which regions are boxed or redacted and relabelled.

pub mod config;
pub mod error;
pub mod input;
pub mod overlay;
pub mod pipeline;
pub mod runner;
pub mod storage;
pub mod vision;

pub use config::AppConfig;
pub use error::{ConfigError, OcrError, PipelineError};
pub use input::Frame;
pub use overlay::OverlayRenderer;
pub use pipeline::Pipeline;
pub use runner::{JobHandle, PipelineRunner};
pub use vision::{OcrCapability, Rect, Recognition, TesseractOcr, TextRegion};
