//! Error types for stacking operations.

use thiserror::Error;

use crate::astro_image::{ImageDimensions, ImageError};
use crate::registration::AlignError;

use super::FrameType;

/// Errors that can occur while stacking frames.
#[derive(Debug, Error)]
pub enum StackError {
    #[error("no input frames provided")]
    NoInputs,

    #[error("no frame produced enough stars to align")]
    InsufficientStars,

    #[error(
        "dimension mismatch for {frame_type} frame {index}: expected {expected:?}, got {actual:?}"
    )]
    DimensionMismatch {
        frame_type: FrameType,
        index: usize,
        expected: ImageDimensions,
        actual: ImageDimensions,
    },

    #[error(transparent)]
    Align(#[from] AlignError),

    #[error(transparent)]
    Image(#[from] ImageError),
}
