//! Preparation filters: grayscale, separable gaussian blur, binarization.

use crate::astro_image::{Image, ImageDimensions, ImageError};
use crate::math;

/// Reduce an image to one channel by averaging its channels per pixel.
///
/// The destination is reallocated to `(W, H, 1)`.
pub fn grayscale(src: &Image, dst: &mut Image) -> Result<(), ImageError> {
    dst.realloc(ImageDimensions::new(src.width(), src.height(), 1))?;

    let channels = src.channels();
    if channels == 1 {
        dst.data_mut().copy_from_slice(src.data());
        return Ok(());
    }

    let inv = 1.0 / channels as f32;
    let src_data = src.data();
    for (i, out) in dst.data_mut().iter_mut().enumerate() {
        let base = i * channels;
        let mut sum = 0.0;
        for &v in &src_data[base..base + channels] {
            sum += v;
        }
        *out = sum * inv;
    }

    Ok(())
}

/// Blur a 1-channel image in place with a separable gaussian.
///
/// The half-kernel is `k[0..=r]` with `r = ceil(4 * sigma)` and
/// `k[i] = exp(-i^2 / (2 sigma^2))`, normalized so `k[0] + 2 * sum(k[1..]) = 1`.
/// The vertical pass writes into `scratch`, the horizontal pass back into
/// `image`. Samples outside the image contribute zero.
pub fn gaussian_blur(image: &mut Image, scratch: &mut Image, sigma: f32) -> Result<(), ImageError> {
    assert_eq!(image.channels(), 1, "gaussian blur expects a 1-channel image");
    assert!(sigma > 0.0, "sigma must be positive");

    let kernel = gaussian_kernel(sigma);
    scratch.realloc(image.dimensions())?;

    let width = image.width();
    let height = image.height();

    // Vertical pass: image -> scratch.
    {
        let src = image.data();
        let dst = scratch.data_mut();
        for y in 0..height {
            for x in 0..width {
                let mut acc = kernel[0] * src[y * width + x];
                for (i, &k) in kernel.iter().enumerate().skip(1) {
                    if y >= i {
                        acc += k * src[(y - i) * width + x];
                    }
                    if y + i < height {
                        acc += k * src[(y + i) * width + x];
                    }
                }
                dst[y * width + x] = acc;
            }
        }
    }

    // Horizontal pass: scratch -> image.
    {
        let src = scratch.data();
        let dst = image.data_mut();
        for y in 0..height {
            let row = y * width;
            for x in 0..width {
                let mut acc = kernel[0] * src[row + x];
                for (i, &k) in kernel.iter().enumerate().skip(1) {
                    if x >= i {
                        acc += k * src[row + x - i];
                    }
                    if x + i < width {
                        acc += k * src[row + x + i];
                    }
                }
                dst[row + x] = acc;
            }
        }
    }

    Ok(())
}

/// Build the normalized gaussian half-kernel for `sigma`.
fn gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (4.0 * sigma).ceil() as usize;
    let mut kernel = vec![0.0f32; radius + 1];
    for (i, k) in kernel.iter_mut().enumerate() {
        *k = (-((i * i) as f32) / (2.0 * sigma * sigma)).exp();
    }

    let sum = kernel[0] + 2.0 * kernel[1..].iter().sum::<f32>();
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel
}

/// Threshold a 1-channel image into a 0/1 star mask.
///
/// A pixel becomes 1 if it exceeds `mean + k * stddev` over the whole image.
pub fn binarize(src: &Image, dst: &mut Image, k: f32) -> Result<(), ImageError> {
    assert_eq!(src.channels(), 1, "binarize expects a 1-channel image");

    dst.realloc(src.dimensions())?;

    let (mean, stddev) = math::mean_and_stddev(src.data());
    let threshold = mean + k * stddev;

    for (out, &p) in dst.data_mut().iter_mut().zip(src.data()) {
        *out = if p > threshold { 1.0 } else { 0.0 };
    }

    Ok(())
}
