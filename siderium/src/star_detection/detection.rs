//! Coarse star extraction: flood-fill blob centroids over the star mask.

use std::collections::VecDeque;

use crate::astro_image::{Image, ImageError};
use crate::common::BitGrid;

use super::CoarseStar;

/// Extract one [`CoarseStar`] per connected blob of mask pixels at or above
/// `cutoff`.
///
/// Pixels are scanned in row-major order and each blob is grown with a
/// 4-connected FIFO flood fill; the visited bitset is test-and-set on
/// enqueue, so no pixel enters the queue twice. Stars are emitted in
/// first-discovery scan order. The only failure mode is allocation failure.
pub fn extract_coarse_stars(mask: &Image, cutoff: f32) -> Result<Vec<CoarseStar>, ImageError> {
    assert_eq!(mask.channels(), 1, "coarse extraction expects a 1-channel mask");

    let width = mask.width();
    let height = mask.height();
    let data = mask.data();

    let mut visited = BitGrid::new(width, height)?;
    let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
    let mut stars = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let index = y * width + x;
            if data[index] < cutoff || visited.test_and_set(index) {
                continue;
            }

            let mut sum_x = 0u64;
            let mut sum_y = 0u64;
            let mut count = 0u32;

            queue.push_back((x, y));
            while let Some((px, py)) = queue.pop_front() {
                sum_x += px as u64;
                sum_y += py as u64;
                count += 1;

                if px > 0 {
                    enqueue(data, &mut visited, &mut queue, cutoff, px - 1, py, width);
                }
                if px + 1 < width {
                    enqueue(data, &mut visited, &mut queue, cutoff, px + 1, py, width);
                }
                if py > 0 {
                    enqueue(data, &mut visited, &mut queue, cutoff, px, py - 1, width);
                }
                if py + 1 < height {
                    enqueue(data, &mut visited, &mut queue, cutoff, px, py + 1, width);
                }
            }

            stars.push(CoarseStar {
                x: sum_x as f32 / count as f32,
                y: sum_y as f32 / count as f32,
                size: count,
            });
        }
    }

    Ok(stars)
}

#[inline]
fn enqueue(
    data: &[f32],
    visited: &mut BitGrid,
    queue: &mut VecDeque<(usize, usize)>,
    cutoff: f32,
    x: usize,
    y: usize,
    width: usize,
) {
    let index = y * width + x;
    if data[index] >= cutoff && !visited.test_and_set(index) {
        queue.push_back((x, y));
    }
}
