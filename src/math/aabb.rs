//! Axis-aligned world-space bounding box

use crate::core::types::Vec3;

/// Axis-aligned bounding box defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The canonical volume box, [-1, 1] on every axis
    pub fn unit_centered() -> Self {
        Self::new(Vec3::splat(-1.0), Vec3::ONE)
    }

    /// Get center point
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get size (max - min)
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Enclosed volume, zero for empty or inverted boxes
    pub fn volume(&self) -> f32 {
        let s = self.size().max(Vec3::ZERO);
        s.x * s.y * s.z
    }

    /// True when the box encloses no volume
    pub fn is_empty(&self) -> bool {
        self.min.x >= self.max.x || self.min.y >= self.max.y || self.min.z >= self.max.z
    }

    /// Check if point is inside AABB
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x && p.x <= self.max.x &&
        p.y >= self.min.y && p.y <= self.max.y &&
        p.z >= self.min.z && p.z <= self.max.z
    }

    /// Return merged AABB containing both
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Overlapping part of both boxes, `None` if they are disjoint
    pub fn intersection(&self, other: &Aabb) -> Option<Aabb> {
        let b = Aabb {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        };
        if b.is_empty() { None } else { Some(b) }
    }

    /// Closest point inside the box to `p`
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }

    /// Position of `t` in [0, 1] along `axis`, mapped into world space
    pub fn lerp_axis(&self, axis: usize, t: f32) -> f32 {
        self.min[axis] + (self.max[axis] - self.min[axis]) * t
    }

    /// Normalized [start, end] span of `inner` along `axis` relative to `self`
    pub fn normalized_span(&self, inner: &Aabb, axis: usize) -> (f32, f32) {
        let extent = self.max[axis] - self.min[axis];
        if extent <= 0.0 {
            return (0.0, 1.0);
        }
        (
            (inner.min[axis] - self.min[axis]) / extent,
            (inner.max[axis] - self.min[axis]) / extent,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_accessors() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.center(), Vec3::splat(0.5));
        assert_eq!(aabb.size(), Vec3::ONE);
        assert_eq!(aabb.volume(), 1.0);
    }

    #[test]
    fn test_intersection() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::splat(0.5), Vec3::splat(1.5));
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.min, Vec3::splat(0.5));
        assert_eq!(i.max, Vec3::ONE);

        // Touching faces share no volume
        let c = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_normalized_span() {
        let volume = Aabb::unit_centered();
        let slab = Aabb::new(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.5));
        let (start, end) = volume.normalized_span(&slab, 2);
        assert_eq!(start, 0.5);
        assert_eq!(end, 0.75);
        assert_eq!(volume.lerp_axis(2, 0.75), 0.5);
    }
}
