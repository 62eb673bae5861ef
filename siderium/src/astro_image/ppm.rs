//! PPM/PGM encoding of the stacked result.
//!
//! 3-channel images are written as binary `P6`, 1-channel images as `P5`
//! (or `P6` with the channel triplicated). Values are expected in `[0, 1]`
//! and are quantized as `clamp(v * 255, 0, 255)`.

use std::fs;
use std::path::Path;

use super::{Image, ImageError};

/// Encode an image into PPM/PGM bytes.
///
/// `force_rgb` triplicates the channel of a grayscale image so the output is
/// always `P6`.
pub fn encode_ppm(image: &Image, force_rgb: bool) -> Vec<u8> {
    let channels = image.channels();
    assert!(
        channels == 1 || channels == 3,
        "PPM encoding expects 1 or 3 channels, got {}",
        channels
    );

    let rgb = channels == 3 || force_rgb;
    let magic = if rgb { 6 } else { 5 };
    let header = format!("P{}\n{} {}\n255\n", magic, image.width(), image.height());

    let payload_len = image.dimensions().pixel_count() * if rgb { 3 } else { 1 };
    let mut bytes = Vec::with_capacity(header.len() + payload_len);
    bytes.extend_from_slice(header.as_bytes());

    if channels == 1 && force_rgb {
        for &v in image.data() {
            let q = quantize(v);
            bytes.extend_from_slice(&[q, q, q]);
        }
    } else {
        bytes.extend(image.data().iter().map(|&v| quantize(v)));
    }

    bytes
}

/// Encode and write an image to `path`.
pub fn write_ppm(image: &Image, path: &Path, force_rgb: bool) -> Result<(), ImageError> {
    let bytes = encode_ppm(image, force_rgb);
    fs::write(path, bytes).map_err(|source| ImageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "wrote output image");
    Ok(())
}

#[inline]
fn quantize(v: f32) -> u8 {
    (v * 255.0).clamp(0.0, 255.0) as u8
}
