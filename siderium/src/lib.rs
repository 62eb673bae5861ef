//! Siderium - star-based astronomical image stacking.
//!
//! Given a set of FITS frames of the same patch of sky, this library detects
//! stars in each frame, recovers the translation that maps each frame onto a
//! common reference frame, and sums the aligned frames:
//! - Image model and filters (grayscale, gaussian blur, statistical binarize)
//! - Coarse (blob centroid) and fine (sub-pixel) star extraction
//! - Constellation descriptors and translation alignment
//! - Frame summation and per-pixel median
//! - FITS decoding and PPM encoding
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use siderium::{load_fits, stack_images, write_ppm, RegistrationConfig};
//!
//! let mut images = Vec::new();
//! for path in ["light_001.fits", "light_002.fits"] {
//!     let (mut image, _meta) = load_fits(path.as_ref())?;
//!     image.normalize();
//!     images.push(image);
//! }
//!
//! let mut stacked = stack_images(&images, &RegistrationConfig::default())?;
//! stacked.normalize();
//! write_ppm(&stacked, "stacked.ppm".as_ref(), false)?;
//! ```

mod astro_image;
mod calibration;
pub(crate) mod common;
pub(crate) mod math;
mod registration;
mod stacking;
mod star_detection;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Image model and I/O
// ============================================================================

pub use astro_image::{
    BitPix, Image, ImageDimensions, ImageError, ImageMetadata, encode_ppm, load_fits, write_ppm,
};

// ============================================================================
// Calibration
// ============================================================================

pub use calibration::CalibrationFrames;

// ============================================================================
// Star detection
// ============================================================================

pub use star_detection::{
    CoarseStar, DetectionConfig, FineStar, binarize, extract_coarse_stars, extract_fine_stars,
    gaussian_blur, grayscale,
};

// ============================================================================
// Registration
// ============================================================================

pub use registration::{
    AlignError, Aligner, Constellation, ConstellationMatch, FrameExtractor, FrameOffsets,
    FrameRecord, FrameStack, RegistrationConfig, align, extract_constellations,
};

// ============================================================================
// Stacking
// ============================================================================

pub use stacking::{
    FrameType, Progress, StackError, StackingStage, pixel_median, stack_images,
};
