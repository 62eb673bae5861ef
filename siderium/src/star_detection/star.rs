//! Star detection result types.

use glam::Vec2;

/// A star blob found in the binarized mask.
///
/// The centroid is the plain average of the integer pixel coordinates making
/// up the blob; `size` is the blob's pixel count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoarseStar {
    pub x: f32,
    pub y: f32,
    pub size: u32,
}

/// A sub-pixel star centroid refined from a [`CoarseStar`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FineStar {
    /// Intensity-weighted sub-pixel position.
    pub pos: Vec2,
    /// Spread estimate around the centroid; a quality indicator only.
    pub stddev: f32,
}
