//! Render sets: convex boxes of face-adjacent bricks drawn together
//!
//! Bricks are merged greedily: each set looks for the set whose minimum
//! corner sits on its own maximum face along one axis and absorbs it when
//! both have identical extents on the other two axes. Sets only ever grow
//! towards +x/+y/+z, so a set keeps the key of its minimum corner.

use std::collections::BTreeMap;

use crate::core::error::Error;
use crate::core::types::{IVec3, Result};
use crate::math::{Aabb, GridBox, Range};
use super::brick::RenderBrick;

/// Bricks that jointly tile one axis-aligned box
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSet {
    pub bricks: Vec<RenderBrick>,
    pub grid_box: GridBox,
    pub world_box: Aabb,
}

impl RenderSet {
    pub fn from_brick(brick: RenderBrick) -> Self {
        Self {
            grid_box: brick.grid_box,
            world_box: brick.world_box,
            bricks: vec![brick],
        }
    }

    /// One set holding `bricks` as given, boxed by their union
    pub fn unmerged(bricks: Vec<RenderBrick>) -> Option<Self> {
        let first = bricks.first()?;
        let (grid_box, world_box) = bricks.iter().skip(1).fold(
            (first.grid_box, first.world_box),
            |(g, w), b| (g.merge(&b.grid_box), w.merged(&b.world_box)),
        );
        Some(Self { bricks, grid_box, world_box })
    }

    pub fn len(&self) -> usize {
        self.bricks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bricks.is_empty()
    }

    fn absorb(&mut self, other: RenderSet) {
        self.grid_box = self.grid_box.merge(&other.grid_box);
        self.world_box = self.world_box.merged(&other.world_box);
        self.bricks.extend(other.bricks);
    }
}

fn corner_key(v: IVec3) -> [i32; 3] {
    v.to_array()
}

/// Group `bricks` into render sets.
///
/// With `Range::ALL` (screen-space decomposition) all bricks go into one
/// unmerged set; otherwise they are merged into convex boxes.
pub fn build_render_sets(bricks: &[RenderBrick], range: Range, frame_id: u64) -> Result<Vec<RenderSet>> {
    if bricks.is_empty() {
        return Ok(Vec::new());
    }
    if range.is_all() {
        return Ok(RenderSet::unmerged(bricks.to_vec()).into_iter().collect());
    }
    let mut builder = RenderSetBuilder::new(bricks)?;
    builder.merge(frame_id)?;
    Ok(builder.finish())
}

/// Arena of sets indexed by their minimum grid corner
pub struct RenderSetBuilder {
    sets: Vec<Option<RenderSet>>,
    by_corner: BTreeMap<[i32; 3], usize>,
}

impl RenderSetBuilder {
    /// One singleton set per brick; bricks sharing a minimum corner are rejected
    pub fn new(bricks: &[RenderBrick]) -> Result<Self> {
        let mut sets = Vec::with_capacity(bricks.len());
        let mut by_corner = BTreeMap::new();
        for brick in bricks {
            let key = corner_key(brick.grid_box.min);
            if by_corner.insert(key, sets.len()).is_some() {
                return Err(Error::InvariantViolation(format!(
                    "two bricks share grid corner {:?}",
                    key
                )));
            }
            sets.push(Some(RenderSet::from_brick(*brick)));
        }
        Ok(Self { sets, by_corner })
    }

    pub fn set_count(&self) -> usize {
        self.by_corner.len()
    }

    /// Merge until no set can absorb a neighbour
    pub fn merge(&mut self, frame_id: u64) -> Result<()> {
        let initial = self.set_count();
        let mut passes = 0;
        loop {
            passes += 1;
            let mut merged_any = false;
            let keys: Vec<[i32; 3]> = self.by_corner.keys().copied().collect();
            for key in keys {
                // Absorbed earlier in this pass
                let Some(&idx) = self.by_corner.get(&key) else {
                    continue;
                };
                while self.grow(idx, frame_id)? {
                    merged_any = true;
                }
            }
            // A late merge can enable one for a set already visited
            if !merged_any {
                break;
            }
        }
        log::debug!(
            "Frame {}: merged {} bricks into {} render sets in {} passes",
            frame_id,
            initial,
            self.set_count(),
            passes
        );
        Ok(())
    }

    /// Try each axis once; true if the set at `idx` absorbed a neighbour
    fn grow(&mut self, idx: usize, frame_id: u64) -> Result<bool> {
        let Some(grid_box) = self.sets[idx].as_ref().map(|s| s.grid_box) else {
            return Err(Error::InvariantViolation(format!("render set {} is gone", idx)));
        };

        for axis in 0..3 {
            let mut adjacent = grid_box.min;
            adjacent[axis] = grid_box.max[axis];
            let key = corner_key(adjacent);

            let Some(&other) = self.by_corner.get(&key) else {
                continue;
            };
            debug_assert_ne!(other, idx, "render set adjacent to itself");
            if other == idx {
                return Err(Error::InvariantViolation(format!(
                    "render set {} is adjacent to itself along axis {}",
                    idx, axis
                )));
            }

            let congruent = self.sets[other]
                .as_ref()
                .is_some_and(|s| grid_box.congruent_except(&s.grid_box, axis));
            if !congruent {
                continue;
            }

            let absorbed = self.sets[other].take().ok_or_else(|| {
                Error::InvariantViolation(format!("render set {} is gone", other))
            })?;
            self.by_corner.remove(&key);
            if let Some(set) = self.sets[idx].as_mut() {
                log::trace!(
                    "Frame {}: merge {:?} + {:?} along axis {}",
                    frame_id,
                    set.grid_box,
                    absorbed.grid_box,
                    axis
                );
                set.absorb(absorbed);
            }
            return Ok(true);
        }
        Ok(false)
    }

    /// Remaining sets in minimum-corner order
    pub fn finish(mut self) -> Vec<RenderSet> {
        self.by_corner
            .values()
            .filter_map(|&idx| self.sets[idx].take())
            .collect()
    }
}
