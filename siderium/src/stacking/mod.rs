//! Frame combination: aligned summation and per-pixel median.
//!
//! The summation stacker runs the full pipeline: per-frame star extraction
//! into a [`FrameStack`], translation alignment, then an
//! accumulate-with-offset loop over the aligned frames. Offsets are rounded
//! to whole pixels; no sub-pixel resampling is performed.

mod error;
mod progress;

pub use error::StackError;
pub use progress::{Progress, StackingStage};

use strum::Display;

use crate::astro_image::Image;
use crate::math;
use crate::registration::{FrameExtractor, FrameStack, RegistrationConfig, align};

/// Type of frame being processed, for log and error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FrameType {
    /// Light frames - actual image data.
    Light,
    /// Dark frames - thermal noise calibration.
    Dark,
    /// Bias frames - readout noise calibration.
    Bias,
}

// ============================================================================
// Summation stacking
// ============================================================================

/// Align all images against a common reference and sum them.
///
/// Frames in which no constellations could be extracted are skipped; if no
/// frame survives extraction the stack fails with
/// [`StackError::InsufficientStars`]. The result accumulates raw sums, so
/// its values exceed `[0, 1]`; callers normalize before encoding.
pub fn stack_images(images: &[Image], config: &RegistrationConfig) -> Result<Image, StackError> {
    if images.is_empty() {
        return Err(StackError::NoInputs);
    }
    check_dimensions(images)?;

    let progress = Progress::new(StackingStage::Extracting, images.len());
    let mut extractor = FrameExtractor::new(config.clone());
    let mut stack = FrameStack::new();
    for (index, image) in images.iter().enumerate() {
        extractor.process(image, index, &mut stack)?;
        progress.step();
    }
    progress.finish();

    if stack.is_empty() {
        return Err(StackError::InsufficientStars);
    }
    if stack.len() < images.len() {
        tracing::warn!(
            dropped = images.len() - stack.len(),
            "frames without constellations are excluded from the stack"
        );
    }

    tracing::info!(frames = stack.len(), "aligning frames");
    let offsets = align(&stack, config)?;

    let progress = Progress::new(StackingStage::Summing, stack.len());
    let mut output = Image::new(images[0].dimensions())?;
    for (frame_index, frame) in stack.frames.iter().enumerate() {
        let offset = offsets.offsets[frame_index];
        accumulate(
            &mut output,
            &images[frame.image_index],
            offset.x.round() as i64,
            offset.y.round() as i64,
        );
        progress.step();
    }
    progress.finish();

    Ok(output)
}

/// Add `src`, translated by `(dx, dy)` whole pixels, into `dst`.
///
/// Destination pixel `(x, y)` accumulates source pixel `(x - dx, y - dy)`;
/// samples falling outside the source contribute nothing.
fn accumulate(dst: &mut Image, src: &Image, dx: i64, dy: i64) {
    let width = dst.width() as i64;
    let height = dst.height() as i64;
    let channels = dst.channels();

    for y in 0..height {
        let sy = y - dy;
        if sy < 0 || sy >= src.height() as i64 {
            continue;
        }
        for x in 0..width {
            let sx = x - dx;
            if sx < 0 || sx >= src.width() as i64 {
                continue;
            }

            let d = ((y * width + x) as usize) * channels;
            let s = ((sy * src.width() as i64 + sx) as usize) * channels;
            for c in 0..channels {
                dst.data_mut()[d + c] += src.data()[s + c];
            }
        }
    }
}

// ============================================================================
// Per-pixel median
// ============================================================================

/// Element-wise median across identically-sized inputs.
pub fn pixel_median(images: &[Image]) -> Result<Image, StackError> {
    if images.is_empty() {
        return Err(StackError::NoInputs);
    }
    check_dimensions(images)?;

    let mut output = Image::new(images[0].dimensions())?;
    let mut samples = vec![0.0f32; images.len()];

    for i in 0..output.data().len() {
        for (slot, image) in samples.iter_mut().zip(images) {
            *slot = image.data()[i];
        }
        output.data_mut()[i] = math::median_f32_mut(&mut samples);
    }

    Ok(output)
}

/// All inputs must share the first image's dimensions.
fn check_dimensions(images: &[Image]) -> Result<(), StackError> {
    let expected = images[0].dimensions();
    for (index, image) in images.iter().enumerate().skip(1) {
        if image.dimensions() != expected {
            return Err(StackError::DimensionMismatch {
                frame_type: FrameType::Light,
                index,
                expected,
                actual: image.dimensions(),
            });
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
