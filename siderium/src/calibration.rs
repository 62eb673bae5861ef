//! Dark/bias master frames: per-pixel subtraction before normalization.

use std::path::Path;

use crate::astro_image::{Image, ImageError, load_fits};
use crate::stacking::{FrameType, StackError};

/// Optional master frames subtracted from every light frame.
#[derive(Debug, Default)]
pub struct CalibrationFrames {
    pub dark: Option<Image>,
    pub bias: Option<Image>,
}

impl CalibrationFrames {
    /// Load master frames from FITS files; `None` paths are skipped.
    pub fn load(dark: Option<&Path>, bias: Option<&Path>) -> Result<Self, ImageError> {
        let dark = match dark {
            Some(path) => {
                let (image, _) = load_fits(path)?;
                tracing::info!(path = %path.display(), "loaded master dark");
                Some(image)
            }
            None => None,
        };
        let bias = match bias {
            Some(path) => {
                let (image, _) = load_fits(path)?;
                tracing::info!(path = %path.display(), "loaded master bias");
                Some(image)
            }
            None => None,
        };
        Ok(Self { dark, bias })
    }

    /// Subtract the configured masters from `light` in place.
    ///
    /// `index` identifies the light frame in error messages.
    pub fn apply(&self, light: &mut Image, index: usize) -> Result<(), StackError> {
        if let Some(dark) = &self.dark {
            subtract(light, dark, FrameType::Dark, index)?;
        }
        if let Some(bias) = &self.bias {
            subtract(light, bias, FrameType::Bias, index)?;
        }
        Ok(())
    }
}

fn subtract(
    light: &mut Image,
    master: &Image,
    frame_type: FrameType,
    index: usize,
) -> Result<(), StackError> {
    if light.dimensions() != master.dimensions() {
        return Err(StackError::DimensionMismatch {
            frame_type,
            index,
            expected: light.dimensions(),
            actual: master.dimensions(),
        });
    }

    for (value, &m) in light.data_mut().iter_mut().zip(master.data()) {
        *value -= m;
    }
    Ok(())
}
