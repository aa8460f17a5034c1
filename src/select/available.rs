//! Available-set generation: resolve visible nodes against brick residency

use std::collections::HashSet;

use crate::octree::{BrickResidency, OctreeNode, OctreeNodeId, VolumeSource};
use super::visibles::VisibleSet;

/// Per-frame bookkeeping of what was wanted and what can be drawn
#[derive(Clone, Debug, Default)]
pub struct FrameInfo {
    pub frame_id: u64,
    /// Every node the selector asked for
    pub all_nodes: Vec<OctreeNodeId>,
    /// Nodes that will actually be drawn, no two overlapping
    pub render_nodes: Vec<OctreeNode>,
    /// Requested nodes whose own brick is not resident
    pub not_available: Vec<OctreeNodeId>,
}

impl FrameInfo {
    pub fn clear(&mut self) {
        self.all_nodes.clear();
        self.render_nodes.clear();
        self.not_available.clear();
    }

    /// Fraction of requested nodes drawn at the requested LOD
    pub fn loaded_fraction(&self) -> f32 {
        let all = self.all_nodes.len();
        if all == 0 {
            return 0.0;
        }
        (all - self.not_available.len()) as f32 / all as f32
    }
}

/// Picks drawable bricks, substituting the nearest resident ancestor for
/// any visible node whose brick is not loaded yet
pub struct AvailableSetGenerator<'a, S: VolumeSource, R: BrickResidency> {
    source: &'a S,
    residency: &'a R,
}

impl<'a, S: VolumeSource, R: BrickResidency> AvailableSetGenerator<'a, S, R> {
    pub fn new(source: &'a S, residency: &'a R) -> Self {
        Self { source, residency }
    }

    pub fn generate(&self, visibles: &VisibleSet) -> FrameInfo {
        let mut info = FrameInfo {
            frame_id: visibles.frame_id,
            ..Default::default()
        };

        let mut chosen_ids = HashSet::new();
        let mut chosen = Vec::new();

        for node in &visibles.visibles {
            info.all_nodes.push(node.id);

            if self.residency.is_resident(node.id) {
                if chosen_ids.insert(node.id) {
                    chosen.push(*node);
                }
                continue;
            }

            info.not_available.push(node.id);
            let fallback = node
                .id
                .ancestors()
                .find(|id| self.residency.is_resident(*id))
                .and_then(|id| self.source.node(id));

            match fallback {
                Some(ancestor) => {
                    if chosen_ids.insert(ancestor.id) {
                        chosen.push(ancestor);
                    }
                }
                None => log::trace!("Frame {}: no resident data for {:?}", visibles.frame_id, node.id),
            }
        }

        // A coarser fallback already covers its descendants
        info.render_nodes = chosen
            .into_iter()
            .filter(|node| !node.id.ancestors().any(|a| chosen_ids.contains(&a)))
            .collect();

        log::debug!(
            "Frame {}: {} render nodes, {:.0}% loaded",
            info.frame_id,
            info.render_nodes.len(),
            info.loaded_fraction() * 100.0
        );
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec3;
    use crate::math::Aabb;
    use crate::octree::{AllResident, ResidencyCache, UniformVolume};

    fn visible_set(volume: &UniformVolume, ids: &[OctreeNodeId]) -> VisibleSet {
        VisibleSet {
            frame_id: 1,
            visibles: ids.iter().map(|id| volume.node(*id).unwrap()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_all_resident_passes_through() {
        let volume = UniformVolume::new(2, Aabb::unit_centered());
        let ids: Vec<_> = OctreeNodeId::ROOT.children().to_vec();
        let info = AvailableSetGenerator::new(&volume, &AllResident).generate(&visible_set(&volume, &ids));
        assert_eq!(info.render_nodes.len(), 8);
        assert!(info.not_available.is_empty());
        assert_eq!(info.loaded_fraction(), 1.0);
    }

    #[test]
    fn test_falls_back_to_resident_ancestor() {
        let volume = UniformVolume::new(3, Aabb::unit_centered());
        let parent = OctreeNodeId::new(1, IVec3::ZERO);
        let children = parent.children();

        let mut cache = ResidencyCache::new();
        cache.mark_loaded(parent, 9);
        cache.mark_loaded(children[0], 1);

        let info = AvailableSetGenerator::new(&volume, &cache).generate(&visible_set(&volume, &children));

        // The parent stands in for all its children, including the resident one
        assert_eq!(info.render_nodes.len(), 1);
        assert_eq!(info.render_nodes[0].id, parent);
        assert_eq!(info.not_available.len(), 7);
        assert_eq!(info.loaded_fraction(), 1.0 / 8.0);
    }

    #[test]
    fn test_no_resident_ancestor_is_dropped() {
        let volume = UniformVolume::new(2, Aabb::unit_centered());
        let children = OctreeNodeId::ROOT.children();
        let mut cache = ResidencyCache::new();
        cache.mark_loaded(children[3], 0);

        let info = AvailableSetGenerator::new(&volume, &cache).generate(&visible_set(&volume, &children));
        assert_eq!(info.render_nodes.len(), 1);
        assert_eq!(info.render_nodes[0].id, children[3]);
        assert_eq!(info.not_available.len(), 7);
    }

    #[test]
    fn test_empty_visible_set() {
        let volume = UniformVolume::default();
        let info = AvailableSetGenerator::new(&volume, &AllResident).generate(&VisibleSet::default());
        assert!(info.render_nodes.is_empty());
        assert_eq!(info.loaded_fraction(), 0.0);
    }
}
