//! Constellation descriptors: oriented star triplets with recorded side
//! lengths.
//!
//! Side lengths are invariant under translation and rotation; all frames
//! share one sensor, so scale is constant as well. Winding normalization
//! reduces each unordered triple to three cyclic candidates, and matching
//! resolves the remaining 3-fold symmetry by trying all three rotations.

use arrayvec::ArrayVec;
use glam::Vec2;

/// Upper bound on the per-star neighborhood size.
pub(crate) const MAX_NEIGHBORS: usize = 16;

// ============================================================================
// Constellation
// ============================================================================

/// An oriented triple of star indices plus the three opposing side lengths.
///
/// `distances[i]` is the length of the side between the two stars that are
/// not `stars[i]`. The triple is wound counter-clockwise in image
/// coordinates (y grows downward) and every side length is positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constellation {
    /// Indices into the star list this constellation was built over.
    pub stars: [u32; 3],
    /// Opposing side lengths: `distances[i] = |stars[(i+1)%3] stars[(i+2)%3]|`.
    pub distances: [f32; 3],
}

/// Result of comparing two constellations over all cyclic rotations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstellationMatch {
    /// Sum of squared side-length differences at the best rotation.
    pub distance_sq: f32,
    /// Cyclic rotation of the second constellation that aligns it with the
    /// first, index-wise.
    pub rotation: usize,
}

impl Constellation {
    /// Build a counter-clockwise constellation from three stars.
    ///
    /// Returns `None` for degenerate (collinear or coincident) triples,
    /// which have no winding and would break the positive-side-length
    /// invariant.
    fn from_triple(indices: [usize; 3], positions: &[Vec2], index_base: u32) -> Option<Self> {
        let [i, j, k] = indices;
        let pa = positions[i];
        let mut pb = positions[j];
        let mut pc = positions[k];

        let cross = (pb.x - pa.x) * (pc.y - pa.y) - (pb.y - pa.y) * (pc.x - pa.x);
        if cross == 0.0 {
            return None;
        }

        let (jj, kk) = if cross < 0.0 {
            std::mem::swap(&mut pb, &mut pc);
            (k, j)
        } else {
            (j, k)
        };

        let distances = [pb.distance(pc), pc.distance(pa), pa.distance(pb)];
        debug_assert!(distances.iter().all(|&d| d > 0.0));

        Some(Self {
            stars: [
                index_base + i as u32,
                index_base + jj as u32,
                index_base + kk as u32,
            ],
            distances,
        })
    }

    /// Compare against `other` over the three cyclic rotations.
    ///
    /// `D(r) = sum((self.distances[i] - other.distances[(i+r) % 3])^2)`;
    /// the returned tag is the `r` minimizing `D`, i.e. the rotation that
    /// brings `other` into index alignment with `self` (see
    /// [`Constellation::rotate`]).
    pub fn cmp(&self, other: &Constellation) -> ConstellationMatch {
        let mut best = ConstellationMatch {
            distance_sq: f32::INFINITY,
            rotation: 0,
        };

        for rotation in 0..3 {
            let mut distance_sq = 0.0;
            for i in 0..3 {
                let d = self.distances[i] - other.distances[(i + rotation) % 3];
                distance_sq += d * d;
            }
            if distance_sq < best.distance_sq {
                best = ConstellationMatch {
                    distance_sq,
                    rotation,
                };
            }
        }

        best
    }

    /// Cyclically rotate stars and distances by `r` positions.
    pub fn rotate(&self, r: usize) -> Constellation {
        let mut stars = [0u32; 3];
        let mut distances = [0.0f32; 3];
        for i in 0..3 {
            stars[i] = self.stars[(i + r) % 3];
            distances[i] = self.distances[(i + r) % 3];
        }
        Constellation { stars, distances }
    }
}

// ============================================================================
// Extraction
// ============================================================================

/// Emit constellations over a flat star position list.
///
/// For every star `i`, the `neighbor_count` nearest stars with index greater
/// than `i` are found (ties broken by lower index), and every unordered
/// neighbor pair yields one triangle. `index_base` is added to all emitted
/// star indices so per-frame extractions can address a shared flat array.
pub fn extract_constellations(
    positions: &[Vec2],
    index_base: u32,
    neighbor_count: usize,
    out: &mut Vec<Constellation>,
) {
    assert!(
        neighbor_count >= 2 && neighbor_count <= MAX_NEIGHBORS,
        "neighbor_count must be in 2..={}, got {}",
        MAX_NEIGHBORS,
        neighbor_count
    );

    for i in 0..positions.len() {
        let mut nearest = BoundedMinSet::new(neighbor_count);
        for j in (i + 1)..positions.len() {
            nearest.insert(positions[i].distance_squared(positions[j]), j as u32);
        }

        let neighbors = nearest.entries();
        for a in 0..neighbors.len() {
            for b in (a + 1)..neighbors.len() {
                let triple = [
                    i,
                    neighbors[a].index as usize,
                    neighbors[b].index as usize,
                ];
                if let Some(constellation) =
                    Constellation::from_triple(triple, positions, index_base)
                {
                    out.push(constellation);
                }
            }
        }
    }
}

// ============================================================================
// BoundedMinSet
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct Neighbor {
    distance_sq: f32,
    index: u32,
}

/// "Insert; keep the K smallest": a sorted array of capacity K with O(K)
/// insert.
#[derive(Debug)]
struct BoundedMinSet {
    entries: ArrayVec<Neighbor, MAX_NEIGHBORS>,
    limit: usize,
}

impl BoundedMinSet {
    fn new(limit: usize) -> Self {
        debug_assert!(limit <= MAX_NEIGHBORS);
        Self {
            entries: ArrayVec::new(),
            limit,
        }
    }

    fn insert(&mut self, distance_sq: f32, index: u32) {
        let pos = self
            .entries
            .iter()
            .position(|n| {
                distance_sq < n.distance_sq
                    || (distance_sq == n.distance_sq && index < n.index)
            })
            .unwrap_or(self.entries.len());

        if self.entries.len() == self.limit {
            if pos >= self.limit {
                return;
            }
            self.entries.pop();
        }
        self.entries.insert(pos, Neighbor { distance_sq, index });
    }

    fn entries(&self) -> &[Neighbor] {
        &self.entries
    }
}

// ============================================================================
// Tests
// ============================================================================
