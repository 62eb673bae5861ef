//! Frame alignment: translation recovery against a growing star catalog.

use glam::Vec2;
use thiserror::Error;

use super::config::RegistrationConfig;
use super::constellation::{Constellation, extract_constellations};
use super::frames::FrameStack;

/// Per-frame translations into the reference frame's coordinate system,
/// indexed parallel to [`FrameStack::frames`].
#[derive(Debug, Clone)]
pub struct FrameOffsets {
    /// `frame.stars + offsets[i]` lies in reference coordinates.
    pub offsets: Vec<Vec2>,
    /// Index (into `frames`) of the reference frame; its offset is zero.
    pub reference_frame: usize,
}

/// Alignment failures.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("no frames with constellations to align")]
    EmptyStack,

    #[error("constellation catalog exhausted before all frames were aligned")]
    CatalogExhausted,
}

/// Incremental aligner: owns the global star catalog and the worklist of
/// frames still to be placed.
#[derive(Debug)]
pub struct Aligner<'a> {
    stack: &'a FrameStack,
    config: &'a RegistrationConfig,
    /// Star positions in reference coordinates.
    all_stars: Vec<Vec2>,
    /// Constellations over `all_stars`, rebuilt after every merge.
    all_constellations: Vec<Constellation>,
    /// Frame indices not yet aligned.
    unprocessed: Vec<usize>,
    offsets: Vec<Vec2>,
    reference_frame: usize,
}

/// Align every frame of `stack`, producing one offset per frame.
pub fn align(stack: &FrameStack, config: &RegistrationConfig) -> Result<FrameOffsets, AlignError> {
    Aligner::new(stack, config)?.run()
}

impl<'a> Aligner<'a> {
    /// Seed the catalog from the reference frame: the frame with the most
    /// stars, ties resolved toward the lowest index.
    pub fn new(stack: &'a FrameStack, config: &'a RegistrationConfig) -> Result<Self, AlignError> {
        if stack.is_empty() {
            return Err(AlignError::EmptyStack);
        }

        let mut reference_frame = 0;
        let mut most_stars = stack.star_range(0).len();
        for frame in 1..stack.len() {
            let count = stack.star_range(frame).len();
            if count > most_stars {
                reference_frame = frame;
                most_stars = count;
            }
        }

        let all_stars: Vec<Vec2> = stack.stars[stack.star_range(reference_frame)]
            .iter()
            .map(|s| s.pos)
            .collect();
        let mut all_constellations = Vec::new();
        extract_constellations(
            &all_stars,
            0,
            config.neighbor_count,
            &mut all_constellations,
        );

        let unprocessed: Vec<usize> = (0..stack.len()).filter(|&f| f != reference_frame).collect();

        tracing::debug!(
            reference = reference_frame,
            catalog_stars = all_stars.len(),
            catalog_constellations = all_constellations.len(),
            "seeded alignment catalog"
        );

        Ok(Self {
            stack,
            config,
            all_stars,
            all_constellations,
            unprocessed,
            offsets: vec![Vec2::ZERO; stack.len()],
            reference_frame,
        })
    }

    /// Place every remaining frame, one per iteration.
    ///
    /// Each iteration removes exactly one frame from the worklist, so the
    /// loop terminates after `stack.len() - 1` rounds.
    pub fn run(mut self) -> Result<FrameOffsets, AlignError> {
        while !self.unprocessed.is_empty() {
            let (frame, offset) = self.place_best_frame()?;
            self.offsets[frame] = offset;

            tracing::debug!(
                frame,
                dx = offset.x,
                dy = offset.y,
                catalog_stars = self.all_stars.len(),
                "aligned frame"
            );
        }

        Ok(FrameOffsets {
            offsets: self.offsets,
            reference_frame: self.reference_frame,
        })
    }

    /// Find the globally best (catalog, frame) constellation pair, compute
    /// the winning frame's offset, merge its stars, and rebuild the catalog
    /// constellations.
    fn place_best_frame(&mut self) -> Result<(usize, Vec2), AlignError> {
        struct Best {
            distance_sq: f32,
            worklist_pos: usize,
            catalog_index: usize,
            frame_constellation: usize,
            rotation: usize,
        }

        let mut best: Option<Best> = None;

        for (worklist_pos, &frame) in self.unprocessed.iter().enumerate() {
            for fc in self.stack.constellation_range(frame) {
                let candidate = &self.stack.constellations[fc];
                for (catalog_index, catalog) in self.all_constellations.iter().enumerate() {
                    let m = catalog.cmp(candidate);
                    let better = match &best {
                        Some(b) => m.distance_sq < b.distance_sq,
                        None => true,
                    };
                    if better {
                        best = Some(Best {
                            distance_sq: m.distance_sq,
                            worklist_pos,
                            catalog_index,
                            frame_constellation: fc,
                            rotation: m.rotation,
                        });
                    }
                }
            }
        }

        let best = best.ok_or(AlignError::CatalogExhausted)?;
        let frame = self.unprocessed.swap_remove(best.worklist_pos);

        // Mean displacement over the three index-aligned star pairs.
        let catalog = self.all_constellations[best.catalog_index];
        let aligned = self.stack.constellations[best.frame_constellation].rotate(best.rotation);
        let mut delta = Vec2::ZERO;
        for i in 0..3 {
            let catalog_pos = self.all_stars[catalog.stars[i] as usize];
            let frame_pos = self.stack.stars[aligned.stars[i] as usize].pos;
            delta += catalog_pos - frame_pos;
        }
        let offset = delta / 3.0;

        self.merge_stars(frame, offset);

        Ok((frame, offset))
    }

    /// Translate the frame's stars into reference coordinates and merge them
    /// into the catalog, dropping candidates within the dedup radius of an
    /// existing star. The catalog constellations are rebuilt from scratch.
    fn merge_stars(&mut self, frame: usize, offset: Vec2) {
        let dedup_radius_sq = self.config.dedup_radius * self.config.dedup_radius;
        let mut merged = 0usize;

        let stack = self.stack;
        for star in &stack.stars[stack.star_range(frame)] {
            let candidate = star.pos + offset;
            let duplicate = self
                .all_stars
                .iter()
                .any(|&existing| existing.distance_squared(candidate) < dedup_radius_sq);
            if !duplicate {
                self.all_stars.push(candidate);
                merged += 1;
            }
        }

        self.all_constellations.clear();
        extract_constellations(
            &self.all_stars,
            0,
            self.config.neighbor_count,
            &mut self.all_constellations,
        );

        tracing::trace!(frame, merged, "merged frame stars into catalog");
    }
}
