//! Screen-space error level-of-detail evaluation
//!
//! A node at level `l` of an octree of depth `D` stores its region with
//! voxels `2^(D - l)` times larger than the finest bricks. Refining it by one
//! level halves the voxel size; the difference, projected to the screen, is
//! the error the selector compares against its pixel budget.

use crate::math::Frustum;
use crate::octree::OctreeNode;

/// Calculate voxel size after `coarsening` halvings of resolution
///
/// Each step doubles the voxel size from the base.
///
/// # Examples
/// ```
/// use sortlast::select::lod::voxel_size_at_lod;
///
/// assert_eq!(voxel_size_at_lod(0.01, 0), 0.01);
/// assert_eq!(voxel_size_at_lod(0.01, 1), 0.02);
/// assert_eq!(voxel_size_at_lod(0.01, 5), 0.32);
/// ```
pub fn voxel_size_at_lod(base_voxel_size: f32, coarsening: u32) -> f32 {
    base_voxel_size * (1u64 << coarsening.min(63)) as f32
}

/// Evaluates the on-screen error of rendering a node at its own level
#[derive(Clone, Copy, Debug)]
pub struct ScreenSpaceLod {
    pub viewport_height_px: u32,
    /// World size of one finest-level voxel
    pub world_space_per_voxel: f32,
    /// Level of the finest bricks
    pub volume_depth: u32,
}

impl ScreenSpaceLod {
    pub fn new(viewport_height_px: u32, world_space_per_voxel: f32, volume_depth: u32) -> Self {
        Self {
            viewport_height_px,
            world_space_per_voxel,
            volume_depth,
        }
    }

    /// World size of a voxel stored at `level`
    pub fn voxel_size(&self, level: u32) -> f32 {
        voxel_size_at_lod(self.world_space_per_voxel, self.volume_depth.saturating_sub(level))
    }

    /// Pixel error of using `node` instead of its children.
    ///
    /// Zero for finest-level nodes. Grows without bound as the eye
    /// approaches the node.
    pub fn pixel_error(&self, frustum: &Frustum, node: &OctreeNode) -> f32 {
        if node.depth >= self.volume_depth {
            return 0.0;
        }
        let deviation = self.voxel_size(node.depth) - self.voxel_size(node.depth + 1);
        let distance = frustum.distance_to(&node.world_box);
        deviation * frustum.pixels_per_unit(distance, self.viewport_height_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Mat4, Vec3};
    use crate::octree::{OctreeNodeId, UniformVolume, VolumeSource};

    fn frustum_at(z: f32) -> Frustum {
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, 0.01, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, z), Vec3::ZERO, Vec3::Y);
        Frustum::new(view, proj)
    }

    #[test]
    fn test_voxel_size_powers_of_two() {
        for lod in 0..=5 {
            let size = voxel_size_at_lod(1.0, lod);
            assert_eq!(size, 2.0_f32.powi(lod as i32));
        }
    }

    #[test]
    fn test_voxel_size_by_level() {
        let lod = ScreenSpaceLod::new(1080, 0.01, 4);
        assert_eq!(lod.voxel_size(4), 0.01);
        assert_eq!(lod.voxel_size(3), 0.02);
        assert_eq!(lod.voxel_size(0), 0.16);
    }

    #[test]
    fn test_error_decreases_with_distance() {
        let volume = UniformVolume::new(4, crate::math::Aabb::unit_centered());
        let root = volume.root();
        let lod = ScreenSpaceLod::new(1080, 2.0 / 16.0, 4);

        let near = lod.pixel_error(&frustum_at(3.0), &root);
        let far = lod.pixel_error(&frustum_at(30.0), &root);
        assert!(near > far);
        assert!(far > 0.0);
    }

    #[test]
    fn test_error_finer_levels_smaller() {
        let volume = UniformVolume::new(4, crate::math::Aabb::unit_centered());
        let lod = ScreenSpaceLod::new(1080, 2.0 / 16.0, 4);
        let frustum = frustum_at(20.0);

        let coarse = volume.node(OctreeNodeId::ROOT).unwrap();
        let fine = volume.node(OctreeNodeId::new(3, crate::core::types::IVec3::splat(4))).unwrap();
        assert!(lod.pixel_error(&frustum, &coarse) > lod.pixel_error(&frustum, &fine));

        let finest = volume.node(OctreeNodeId::new(4, crate::core::types::IVec3::splat(8))).unwrap();
        assert_eq!(lod.pixel_error(&frustum, &finest), 0.0);
    }
}
