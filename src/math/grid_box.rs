//! Integer axis-aligned box in octree grid coordinates

use crate::core::types::IVec3;

/// Half-open integer box `[min, max)` in finest-level grid units
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridBox {
    pub min: IVec3,
    pub max: IVec3,
}

impl GridBox {
    pub fn new(min: IVec3, max: IVec3) -> Self {
        Self { min, max }
    }

    /// Box of edge length `size` starting at `min`
    pub fn cube(min: IVec3, size: i32) -> Self {
        Self { min, max: min + IVec3::splat(size) }
    }

    pub fn size(&self) -> IVec3 {
        self.max - self.min
    }

    /// Number of grid cells covered
    pub fn volume(&self) -> i64 {
        let s = self.size().max(IVec3::ZERO);
        s.x as i64 * s.y as i64 * s.z as i64
    }

    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y || self.min.z >= self.max.z
    }

    /// Union hull of both boxes
    pub fn merge(&self, other: &GridBox) -> GridBox {
        GridBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Overlapping part of both boxes, `None` when they share no cell
    pub fn intersect(&self, other: &GridBox) -> Option<GridBox> {
        let b = GridBox {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        };
        if b.is_empty() { None } else { Some(b) }
    }

    /// True if `other` lies completely inside `self`
    pub fn contains(&self, other: &GridBox) -> bool {
        other.min.cmpge(self.min).all() && other.max.cmple(self.max).all()
    }

    /// Whether `other` has the same extent as `self` on both axes other than `axis`
    pub fn congruent_except(&self, other: &GridBox, axis: usize) -> bool {
        (0..3).filter(|&a| a != axis).all(|a| {
            self.min[a] == other.min[a] && self.max[a] == other.max[a]
        })
    }
}
