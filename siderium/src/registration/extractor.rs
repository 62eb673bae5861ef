//! Frame extraction: the per-image stage chain feeding a [`FrameStack`].

use glam::Vec2;

use crate::astro_image::{Image, ImageError};
use crate::star_detection::{
    binarize, extract_coarse_stars, extract_fine_stars, gaussian_blur, grayscale,
};

use super::config::RegistrationConfig;
use super::constellation::extract_constellations;
use super::frames::{FrameRecord, FrameStack};

/// Runs grayscale, blur, binarize, coarse, fine and constellation extraction
/// once per input image into a shared [`FrameStack`].
///
/// The scratch images are created once and reallocated in place across
/// frames; their backing storage never shrinks between frames.
#[derive(Debug)]
pub struct FrameExtractor {
    config: RegistrationConfig,
    tmp_grayscale: Image,
    tmp_starmask: Image,
    positions: Vec<Vec2>,
}

impl FrameExtractor {
    pub fn new(config: RegistrationConfig) -> Self {
        config.validate();
        Self {
            config,
            tmp_grayscale: Image::empty(),
            tmp_starmask: Image::empty(),
            positions: Vec::new(),
        }
    }

    pub fn config(&self) -> &RegistrationConfig {
        &self.config
    }

    /// Extract one image into `stack`.
    ///
    /// Returns whether the frame was kept. A frame that produced no
    /// constellations leaves no footprint: its stars are truncated back off
    /// the stack. Errors also truncate back before propagating, so the
    /// stack's invariants hold on the failure path.
    pub fn process(
        &mut self,
        image: &Image,
        image_index: usize,
        stack: &mut FrameStack,
    ) -> Result<bool, ImageError> {
        let first_star = stack.stars.len();
        let first_constellation = stack.constellations.len();

        let result = self.extract(image, stack, first_star);

        let kept = match result {
            Ok(()) => stack.constellations.len() > first_constellation,
            Err(err) => {
                stack.stars.truncate(first_star);
                stack.constellations.truncate(first_constellation);
                return Err(err);
            }
        };

        if kept {
            stack.frames.push(FrameRecord {
                image_index,
                first_star,
                first_constellation,
            });
            tracing::debug!(
                frame = image_index,
                stars = stack.stars.len() - first_star,
                constellations = stack.constellations.len() - first_constellation,
                "extracted frame"
            );
        } else {
            stack.stars.truncate(first_star);
            stack.constellations.truncate(first_constellation);
            tracing::warn!(frame = image_index, "frame produced no constellations, dropped");
        }

        Ok(kept)
    }

    /// The five-stage chain; appends stars and constellations to `stack`.
    fn extract(
        &mut self,
        image: &Image,
        stack: &mut FrameStack,
        first_star: usize,
    ) -> Result<(), ImageError> {
        let detection = &self.config.detection;

        grayscale(image, &mut self.tmp_grayscale)?;
        gaussian_blur(
            &mut self.tmp_grayscale,
            &mut self.tmp_starmask,
            detection.blur_sigma,
        )?;
        binarize(
            &self.tmp_grayscale,
            &mut self.tmp_starmask,
            detection.binarize_sigma,
        )?;

        let coarse = extract_coarse_stars(&self.tmp_starmask, detection.mask_cutoff)?;
        let fine = extract_fine_stars(&self.tmp_grayscale, &coarse, detection.centroid_radius);

        tracing::trace!(
            coarse = coarse.len(),
            fine = fine.len(),
            "star extraction stages"
        );

        self.positions.clear();
        self.positions.extend(fine.iter().map(|s| s.pos));
        stack.stars.extend_from_slice(&fine);

        extract_constellations(
            &self.positions,
            first_star as u32,
            self.config.neighbor_count,
            &mut stack.constellations,
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::synthetic::{render_star_field, star_grid};

    #[test]
    fn test_frame_with_stars_is_kept() {
        let positions = star_grid(256, 3, 64.0);
        let image = render_star_field(256, 256, &positions, 2.0);

        let mut extractor = FrameExtractor::new(RegistrationConfig::default());
        let mut stack = FrameStack::new();

        let kept = extractor.process(&image, 0, &mut stack).unwrap();
        assert!(kept);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.frames[0].image_index, 0);
        assert_eq!(stack.star_range(0).len(), positions.len());
        assert!(!stack.constellation_range(0).is_empty());
    }

    #[test]
    fn test_starless_frame_leaves_no_footprint() {
        let empty = render_star_field(128, 128, &[], 2.0);
        let positions = star_grid(256, 3, 64.0);
        let field = render_star_field(256, 256, &positions, 2.0);

        let mut extractor = FrameExtractor::new(RegistrationConfig::default());
        let mut stack = FrameStack::new();

        let kept = extractor.process(&field, 0, &mut stack).unwrap();
        assert!(kept);
        let stars_before = stack.stars.len();
        let constellations_before = stack.constellations.len();

        let kept = extractor.process(&empty, 1, &mut stack).unwrap();
        assert!(!kept);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.stars.len(), stars_before);
        assert_eq!(stack.constellations.len(), constellations_before);
    }

    #[test]
    fn test_two_frames_get_disjoint_ranges() {
        let positions = star_grid(256, 3, 64.0);
        let image = render_star_field(256, 256, &positions, 2.0);

        let mut extractor = FrameExtractor::new(RegistrationConfig::default());
        let mut stack = FrameStack::new();

        extractor.process(&image, 0, &mut stack).unwrap();
        extractor.process(&image, 1, &mut stack).unwrap();

        assert_eq!(stack.len(), 2);
        let r0 = stack.star_range(0);
        let r1 = stack.star_range(1);
        assert_eq!(r0.end, r1.start);
        assert_eq!(r0.len(), r1.len());

        // Constellation indices of frame 1 point into frame 1's star range.
        for ci in stack.constellation_range(1) {
            for &s in &stack.constellations[ci].stars {
                assert!(r1.contains(&(s as usize)));
            }
        }
    }

    #[test]
    fn test_constellations_with_too_few_stars_drop_frame() {
        // Two stars yield no triangles, so the frame is dropped even though
        // stars were found.
        let positions = [glam::Vec2::new(100.0, 100.0), glam::Vec2::new(160.0, 140.0)];
        let image = render_star_field(256, 256, &positions, 2.0);

        let mut extractor = FrameExtractor::new(RegistrationConfig::default());
        let mut stack = FrameStack::new();

        let kept = extractor.process(&image, 0, &mut stack).unwrap();
        assert!(!kept);
        assert!(stack.is_empty());
        assert!(stack.stars.is_empty());
    }
}
