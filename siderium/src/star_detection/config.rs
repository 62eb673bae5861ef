//! Star detection configuration.

/// Tuning knobs for the preparation and extraction stages.
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Gaussian blur sigma applied to the grayscale frame before
    /// binarization and centroiding. The half-kernel radius is `ceil(4 * sigma)`.
    /// Default: 2.0
    pub blur_sigma: f32,

    /// Binarization threshold in standard deviations above the mean:
    /// a pixel is part of the star mask if `p > mean + k * stddev`.
    /// Default: 2.0
    pub binarize_sigma: f32,

    /// Mask cutoff used by the coarse extractor; mask pixels at or above this
    /// value belong to a star. The binarizer writes exact 0/1 values.
    /// Default: 0.5
    pub mask_cutoff: f32,

    /// Half-size of the square window used for sub-pixel centroiding.
    /// Coarse stars closer than this to an image edge are rejected.
    /// Default: 16
    pub centroid_radius: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 2.0,
            binarize_sigma: 2.0,
            mask_cutoff: 0.5,
            centroid_radius: 16,
        }
    }
}

impl DetectionConfig {
    /// Panics on nonsensical settings; called once at pipeline construction.
    pub fn validate(&self) {
        assert!(self.blur_sigma > 0.0, "blur_sigma must be positive");
        assert!(self.binarize_sigma >= 0.0, "binarize_sigma must not be negative");
        assert!(
            self.mask_cutoff > 0.0 && self.mask_cutoff <= 1.0,
            "mask_cutoff must be in (0, 1]"
        );
        assert!(self.centroid_radius > 0, "centroid_radius must be positive");
    }
}
