//! Volume data source interface and an implicit uniform octree

use std::collections::HashSet;

use crate::core::config::VolumeInfo;
use crate::core::types::{IVec3, Vec3};
use crate::math::{Aabb, GridBox};
use super::node_id::OctreeNodeId;

/// Resolved octree node as reported by the data source
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeNode {
    pub id: OctreeNodeId,
    /// Level of detail (0 = root)
    pub depth: u32,
    pub world_box: Aabb,
    /// Extent in finest-level grid cells
    pub grid_box: GridBox,
}

/// Read-only view of the multi-resolution volume
pub trait VolumeSource {
    /// Root node of the octree
    fn root(&self) -> OctreeNode;

    /// Maximum octree depth (level of the finest bricks)
    fn depth(&self) -> u32;

    /// Whole-volume world box
    fn world_box(&self) -> Aabb;

    fn node_exists(&self, id: OctreeNodeId) -> bool;

    /// Resolve `id`, `None` when the source has no data for it
    fn node(&self, id: OctreeNodeId) -> Option<OctreeNode>;
}

/// Complete implicit octree over a world box.
///
/// Every node down to `depth` exists unless a subtree was removed with
/// [`UniformVolume::remove_subtree`].
#[derive(Clone, Debug)]
pub struct UniformVolume {
    depth: u32,
    world_box: Aabb,
    removed: HashSet<OctreeNodeId>,
}

impl UniformVolume {
    pub fn new(depth: u32, world_box: Aabb) -> Self {
        Self {
            depth,
            world_box,
            removed: HashSet::new(),
        }
    }

    /// Drop `id` and all its descendants from the source
    /// Complete octree matching a volume description
    pub fn from_info(info: &VolumeInfo) -> Self {
        Self::new(info.depth, info.world_box())
    }

    pub fn remove_subtree(&mut self, id: OctreeNodeId) {
        self.removed.insert(id);
    }

    /// Grid box of `id` in finest-level cells
    pub fn grid_box_of(&self, id: OctreeNodeId) -> GridBox {
        let cells = 1i32 << (self.depth - id.level.min(self.depth));
        GridBox::cube(id.position * cells, cells)
    }

    /// Map a grid box to world space
    pub fn world_box_of(&self, grid: &GridBox) -> Aabb {
        let cells = (1u32 << self.depth) as f32;
        let scale = self.world_box.size() / cells;
        Aabb::new(
            self.world_box.min + grid.min.as_vec3() * scale,
            self.world_box.min + grid.max.as_vec3() * scale,
        )
    }

    fn in_bounds(&self, id: OctreeNodeId) -> bool {
        if id.level > self.depth {
            return false;
        }
        let side = 1i32 << id.level;
        id.position.cmpge(IVec3::ZERO).all() && id.position.cmplt(IVec3::splat(side)).all()
    }
}

impl VolumeSource for UniformVolume {
    fn root(&self) -> OctreeNode {
        OctreeNode {
            id: OctreeNodeId::ROOT,
            depth: 0,
            world_box: self.world_box,
            grid_box: self.grid_box_of(OctreeNodeId::ROOT),
        }
    }

    fn depth(&self) -> u32 {
        self.depth
    }

    fn world_box(&self) -> Aabb {
        self.world_box
    }

    fn node_exists(&self, id: OctreeNodeId) -> bool {
        self.in_bounds(id)
            && !self.removed.contains(&id)
            && !id.ancestors().any(|a| self.removed.contains(&a))
    }

    fn node(&self, id: OctreeNodeId) -> Option<OctreeNode> {
        if !self.node_exists(id) {
            return None;
        }
        let grid_box = self.grid_box_of(id);
        Some(OctreeNode {
            id,
            depth: id.level,
            world_box: self.world_box_of(&grid_box),
            grid_box,
        })
    }
}

impl Default for UniformVolume {
    fn default() -> Self {
        Self::new(4, Aabb::unit_centered())
    }
}

/// World size of one voxel in a volume of `voxels_per_side` voxels along its longest edge
pub fn world_space_per_voxel(world_box: &Aabb, voxels_per_side: u32) -> f32 {
    world_box.size().max_element() / voxels_per_side.max(1) as f32
}
