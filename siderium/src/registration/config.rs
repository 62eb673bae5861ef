//! Registration configuration.

use crate::star_detection::DetectionConfig;

use super::constellation::MAX_NEIGHBORS;

/// Configuration for frame extraction and alignment.
#[derive(Debug, Clone)]
pub struct RegistrationConfig {
    /// Star detection settings used by the frame extractor.
    pub detection: DetectionConfig,

    /// Per-star neighborhood size for constellation extraction: each star
    /// forms triangles with pairs drawn from its K nearest higher-indexed
    /// neighbors.
    /// Default: 5
    pub neighbor_count: usize,

    /// Catalog deduplication radius in pixels: a translated star is merged
    /// into the global catalog only if no existing star lies within this
    /// distance.
    /// Default: 50.0
    pub dedup_radius: f32,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            neighbor_count: 5,
            dedup_radius: 50.0,
        }
    }
}

impl RegistrationConfig {
    /// Panics on nonsensical settings; called once at pipeline construction.
    pub fn validate(&self) {
        self.detection.validate();
        assert!(
            self.neighbor_count >= 2 && self.neighbor_count <= MAX_NEIGHBORS,
            "neighbor_count must be in 2..={}",
            MAX_NEIGHBORS
        );
        assert!(self.dedup_radius >= 0.0, "dedup_radius must not be negative");
    }
}
