//! Candidate text region detection
//!
//! Classical detection in four stages:
//! 1. Edge map from the horizontal Sobel derivative
//! 2. Dilation with a wide, short rectangle
//! 3. External contours reduced to bounding rectangles
//! 4. Geometric constraints on the rectangles

use std::time::Instant;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::input::Frame;

use super::contours::external_bounding_rects;
use super::edges::EdgeMapBuilder;
use super::filter::GeometricFilter;
use super::morphology::RegionDilator;
use super::Rect;

/// Composes the detection stages into a single pure operation
#[derive(Debug, Clone)]
pub struct CandidateRegionDetector {
    edges: EdgeMapBuilder,
    dilator: RegionDilator,
    filter: GeometricFilter,
}

impl CandidateRegionDetector {
    /// Create a detector from the detection and filter settings
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            edges: EdgeMapBuilder::new(config.detection.edge_threshold),
            dilator: RegionDilator::from_settings(&config.detection)?,
            filter: GeometricFilter::new(config.filter.clone())?,
        })
    }

    /// Candidate rectangles in contour discovery order
    pub fn detect(&self, frame: &Frame) -> Vec<Rect> {
        let start = Instant::now();

        let edges = self.edges.build(frame);
        let dilated = self.dilator.dilate(&edges);
        let candidates = external_bounding_rects(&dilated);
        let total = candidates.len();
        let accepted = self.filter.apply(candidates);

        debug!(
            "Candidate detection complete in {:?}: {} of {} contours accepted",
            start.elapsed(),
            accepted.len(),
            total
        );

        accepted
    }
}
