//! Visibility selection: LOD-driven depth-first descent of the octree

use crate::core::config::NodeConfig;
use crate::core::types::PARTITION_AXIS;
use crate::frame::FrameStatus;
use crate::math::{Frustum, Range};
use crate::octree::{OctreeNode, OctreeNodeId, VolumeSource};
use super::lod::ScreenSpaceLod;

/// Result of one selection run
#[derive(Clone, Debug, Default)]
pub struct VisibleSet {
    /// Frame the traversal was started for
    pub frame_id: u64,
    /// Accepted nodes in pre-order; treat as a set
    pub visibles: Vec<OctreeNode>,
    /// Every node the traversal looked at, accepted or not
    pub evaluated: Vec<OctreeNodeId>,
    /// The frame went stale mid-traversal and the result was discarded
    pub aborted: bool,
}

impl VisibleSet {
    fn aborted(frame_id: u64) -> Self {
        Self {
            frame_id,
            aborted: true,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.visibles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.visibles.len()
    }
}

/// Selects the visible octree nodes of one render node for one frame
pub struct SelectVisibles<'a, S: VolumeSource> {
    source: &'a S,
    frustum: &'a Frustum,
    lod: ScreenSpaceLod,
    screen_space_error: f32,
    min_lod: u32,
    max_lod: u32,
    range: Range,
}

impl<'a, S: VolumeSource> SelectVisibles<'a, S> {
    pub fn new(source: &'a S, frustum: &'a Frustum, config: &NodeConfig) -> Self {
        let depth = source.depth();
        Self {
            source,
            frustum,
            lod: ScreenSpaceLod::new(config.viewport_height_px, config.world_space_per_voxel, depth),
            screen_space_error: config.screen_space_error,
            min_lod: config.min_lod.min(depth),
            max_lod: config.max_lod.min(depth),
            range: config.assigned_range,
        }
    }

    /// Override the slab restriction taken from the config
    pub fn with_range(mut self, range: Range) -> Self {
        self.range = range;
        self
    }

    /// Walk the octree from its root.
    ///
    /// Aborts with an empty result as soon as `status` no longer reports
    /// `frame_id`.
    pub fn traverse(&self, frame_id: u64, status: &FrameStatus) -> VisibleSet {
        let volume_box = self.source.world_box();
        let mut result = VisibleSet {
            frame_id,
            ..Default::default()
        };

        let mut stack = vec![self.source.root()];
        while let Some(node) = stack.pop() {
            if status.is_stale(frame_id) {
                log::debug!(
                    "Frame {}: traversal stale (now {}), dropping {} visibles",
                    frame_id,
                    status.current(),
                    result.visibles.len()
                );
                return VisibleSet::aborted(frame_id);
            }
            result.evaluated.push(node.id);

            let (start, end) = volume_box.normalized_span(&node.world_box, PARTITION_AXIS);
            if !self.range.overlaps_span(start, end) {
                continue;
            }
            if !self.frustum.intersects_aabb(&node.world_box) {
                continue;
            }

            if self.is_terminal(&node) {
                result.visibles.push(node);
                continue;
            }

            let children: Vec<OctreeNode> = node
                .id
                .children()
                .into_iter()
                .filter_map(|id| self.source.node(id))
                .collect();

            if children.is_empty() {
                // No finer data: draw what we have
                result.visibles.push(node);
                continue;
            }

            // Reverse so that octant 0 is visited first
            stack.extend(children.into_iter().rev());
        }

        log::debug!(
            "Frame {}: {} visible of {} evaluated nodes in range {}",
            frame_id,
            result.visibles.len(),
            result.evaluated.len(),
            self.range
        );
        result
    }

    fn is_terminal(&self, node: &OctreeNode) -> bool {
        if node.depth >= self.max_lod {
            return true;
        }
        if node.depth < self.min_lod {
            return false;
        }
        self.lod.pixel_error(self.frustum, node) <= self.screen_space_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{IVec3, Mat4, Vec3};
    use crate::math::Aabb;
    use crate::octree::UniformVolume;

    fn perspective(eye: Vec3) -> Frustum {
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1.0, 0.01, 100.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        Frustum::new(view, proj)
    }

    fn config(sse: f32) -> NodeConfig {
        NodeConfig {
            screen_space_error: sse,
            world_space_per_voxel: 2.0 / 512.0,
            viewport_height_px: 512,
            ..Default::default()
        }
    }

    #[test]
    fn test_large_budget_accepts_root() {
        let volume = UniformVolume::new(4, Aabb::unit_centered());
        let frustum = perspective(Vec3::new(0.0, 0.0, 6.0));
        let status = FrameStatus::new(1);

        let set = SelectVisibles::new(&volume, &frustum, &config(1e6)).traverse(1, &status);
        assert_eq!(set.len(), 1);
        assert_eq!(set.visibles[0].id, OctreeNodeId::ROOT);
        assert_eq!(set.evaluated, vec![OctreeNodeId::ROOT]);
        assert!(!set.aborted);
    }

    #[test]
    fn test_tiny_budget_reaches_max_lod() {
        let volume = UniformVolume::new(3, Aabb::unit_centered());
        let frustum = perspective(Vec3::new(0.0, 0.0, 6.0));
        let status = FrameStatus::new(1);

        let mut cfg = config(1e-6);
        cfg.max_lod = 2;
        let set = SelectVisibles::new(&volume, &frustum, &cfg).traverse(1, &status);
        assert_eq!(set.len(), 64);
        assert!(set.visibles.iter().all(|n| n.depth == 2));
    }

    #[test]
    fn test_min_lod_forces_descent() {
        let volume = UniformVolume::new(4, Aabb::unit_centered());
        let frustum = perspective(Vec3::new(0.0, 0.0, 6.0));
        let status = FrameStatus::new(1);

        let mut cfg = config(1e6);
        cfg.min_lod = 1;
        let set = SelectVisibles::new(&volume, &frustum, &cfg).traverse(1, &status);
        assert_eq!(set.len(), 8);
        assert!(set.visibles.iter().all(|n| n.depth == 1));
    }

    #[test]
    fn test_lod_monotonic_in_error_budget() {
        let volume = UniformVolume::new(5, Aabb::unit_centered());
        let frustum = perspective(Vec3::new(0.5, 0.8, 2.5));
        let status = FrameStatus::new(1);

        let mut previous = usize::MAX;
        for sse in [0.25, 0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 64.0, 256.0] {
            let count = SelectVisibles::new(&volume, &frustum, &config(sse))
                .traverse(1, &status)
                .len();
            assert!(count <= previous, "sse {} accepted {} > {}", sse, count, previous);
            previous = count;
        }
        assert!(previous >= 1);
    }

    #[test]
    fn test_range_clipping() {
        let volume = UniformVolume::new(4, Aabb::unit_centered());
        let frustum = perspective(Vec3::new(0.0, 3.0, 3.0));
        let status = FrameStatus::new(1);
        let range = Range::new(0.25, 0.5);

        for sse in [0.1, 1.0, 10.0, 1e6] {
            let mut cfg = config(sse);
            cfg.assigned_range = range;
            let set = SelectVisibles::new(&volume, &frustum, &cfg).traverse(1, &status);
            assert!(!set.is_empty());
            for node in &set.visibles {
                let (start, end) = volume.world_box().normalized_span(&node.world_box, PARTITION_AXIS);
                assert!(range.overlaps_span(start, end), "node {:?} outside range", node.id);
            }
        }
    }

    #[test]
    fn test_outside_range_not_descended() {
        let volume = UniformVolume::new(4, Aabb::unit_centered());
        let frustum = perspective(Vec3::new(0.0, 0.0, 6.0));
        let status = FrameStatus::new(1);

        let mut cfg = config(1e-6);
        cfg.assigned_range = Range::new(0.0, 0.5);
        let set = SelectVisibles::new(&volume, &frustum, &cfg).traverse(1, &status);

        // Upper-half octants are evaluated but never expanded
        let upper = OctreeNodeId::new(1, IVec3::new(0, 0, 1));
        assert!(set.evaluated.contains(&upper));
        assert!(!set.evaluated.contains(&upper.children()[0]));
    }

    #[test]
    fn test_missing_children_fall_back_to_parent() {
        let mut volume = UniformVolume::new(3, Aabb::unit_centered());
        let parent = OctreeNodeId::new(1, IVec3::ZERO);
        for child in parent.children() {
            volume.remove_subtree(child);
        }
        let frustum = perspective(Vec3::new(0.0, 0.0, 6.0));
        let status = FrameStatus::new(1);

        let set = SelectVisibles::new(&volume, &frustum, &config(1e-6)).traverse(1, &status);
        assert!(set.visibles.iter().any(|n| n.id == parent));
        assert!(set.visibles.iter().all(|n| !parent.is_ancestor_of(&n.id)));
    }

    #[test]
    fn test_culls_outside_frustum() {
        let volume = UniformVolume::new(3, Aabb::unit_centered());
        // Looking away from the volume
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1.0, 0.01, 100.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 6.0), Vec3::new(0.0, 0.0, 12.0), Vec3::Y);
        let frustum = Frustum::new(view, proj);
        let status = FrameStatus::new(1);

        let set = SelectVisibles::new(&volume, &frustum, &config(1.0)).traverse(1, &status);
        assert!(set.is_empty());
        assert_eq!(set.evaluated, vec![OctreeNodeId::ROOT]);
    }

    #[test]
    fn test_stale_frame_aborts() {
        let volume = UniformVolume::new(3, Aabb::unit_centered());
        let frustum = perspective(Vec3::new(0.0, 0.0, 6.0));
        let status = FrameStatus::new(8);

        let set = SelectVisibles::new(&volume, &frustum, &config(1.0)).traverse(7, &status);
        assert!(set.aborted);
        assert!(set.is_empty());
        assert_eq!(set.frame_id, 7);
    }
}
