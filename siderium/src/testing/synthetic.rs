//! Synthetic star field rendering for tests.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::astro_image::{Image, ImageDimensions};

/// Render unit-amplitude gaussian stars onto a dark 1-channel field.
pub(crate) fn render_star_field(
    width: usize,
    height: usize,
    positions: &[Vec2],
    sigma: f32,
) -> Image {
    let mut data = vec![0.0f32; width * height];
    let reach = (5.0 * sigma).ceil() as i64;

    for pos in positions {
        let cx = pos.x.round() as i64;
        let cy = pos.y.round() as i64;
        let x0 = (cx - reach).max(0) as usize;
        let x1 = ((cx + reach) as usize).min(width - 1);
        let y0 = (cy - reach).max(0) as usize;
        let y1 = ((cy + reach) as usize).min(height - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f32 - pos.x;
                let dy = y as f32 - pos.y;
                data[y * width + x] +=
                    (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
            }
        }
    }

    Image::from_pixels(ImageDimensions::new(width, height, 1), data)
}

/// Evenly spaced grid of star positions, centered in the field.
pub(crate) fn star_grid(field: usize, per_side: usize, spacing: f32) -> Vec<Vec2> {
    let extent = (per_side - 1) as f32 * spacing;
    let start = (field as f32 - extent) / 2.0;

    let mut positions = Vec::with_capacity(per_side * per_side);
    for row in 0..per_side {
        for col in 0..per_side {
            positions.push(Vec2::new(
                start + col as f32 * spacing,
                start + row as f32 * spacing,
            ));
        }
    }
    positions
}

/// Deterministic irregular star positions with a minimum pairwise
/// separation, kept away from the edges by `margin`.
pub(crate) fn random_star_positions(
    count: usize,
    width: usize,
    height: usize,
    margin: f32,
    min_separation: f32,
    seed: u64,
) -> Vec<Vec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut positions: Vec<Vec2> = Vec::with_capacity(count);
    let min_sep_sq = min_separation * min_separation;

    let mut attempts = 0;
    while positions.len() < count {
        attempts += 1;
        assert!(attempts < 100_000, "star placement did not converge");

        let candidate = Vec2::new(
            rng.gen_range(margin..width as f32 - margin),
            rng.gen_range(margin..height as f32 - margin),
        );
        if positions
            .iter()
            .all(|p| p.distance_squared(candidate) >= min_sep_sq)
        {
            positions.push(candidate);
        }
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_places_peaks() {
        let positions = [Vec2::new(20.0, 30.0)];
        let image = render_star_field(64, 64, &positions, 2.0);

        let peak = image.pixel(20, 30)[0];
        assert!((peak - 1.0).abs() < 1e-3);
        assert!(image.pixel(0, 0)[0] < 1e-6);
    }

    #[test]
    fn test_star_grid_layout() {
        let positions = star_grid(256, 3, 64.0);
        assert_eq!(positions.len(), 9);
        assert_eq!(positions[0], Vec2::new(64.0, 64.0));
        assert_eq!(positions[8], Vec2::new(192.0, 192.0));
    }

    #[test]
    fn test_random_positions_deterministic_and_separated() {
        let a = random_star_positions(12, 256, 256, 40.0, 25.0, 7);
        let b = random_star_positions(12, 256, 256, 40.0, 25.0, 7);
        assert_eq!(a, b);

        for i in 0..a.len() {
            assert!(a[i].x >= 40.0 && a[i].x <= 216.0);
            assert!(a[i].y >= 40.0 && a[i].y <= 216.0);
            for j in (i + 1)..a.len() {
                assert!(a[i].distance(a[j]) >= 25.0);
            }
        }
    }
}
