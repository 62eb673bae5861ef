//! Superpixel demosaicing for RGGB Bayer mosaics.
//!
//! Each 2x2 sensor quad becomes a single RGB pixel at half resolution:
//! `R, (G0 + G1) / 2, B`. Trailing odd rows/columns are dropped.

use std::collections::TryReserveError;

use super::ImageDimensions;

/// Collapse a 1-channel RGGB mosaic into a half-resolution interleaved RGB
/// buffer.
pub(crate) fn superpixel_rggb(
    mosaic: &[f32],
    width: usize,
    height: usize,
) -> Result<(ImageDimensions, Vec<f32>), TryReserveError> {
    debug_assert_eq!(mosaic.len(), width * height);
    debug_assert!(width >= 2 && height >= 2);

    let out_width = width / 2;
    let out_height = height / 2;

    let mut rgb = Vec::new();
    rgb.try_reserve_exact(out_width * out_height * 3)?;

    for y in 0..out_height {
        let top = y * 2 * width;
        let bottom = top + width;
        for x in 0..out_width {
            let sx = x * 2;
            let r = mosaic[top + sx];
            let g0 = mosaic[top + sx + 1];
            let g1 = mosaic[bottom + sx];
            let b = mosaic[bottom + sx + 1];

            rgb.push(r);
            rgb.push((g0 + g1) * 0.5);
            rgb.push(b);
        }
    }

    Ok((ImageDimensions::new(out_width, out_height, 3), rgb))
}
