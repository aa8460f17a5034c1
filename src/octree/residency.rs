//! Brick residency - which octree bricks have a texture loaded
//!

use std::collections::{HashMap, VecDeque};

use super::node_id::OctreeNodeId;

/// Non-owning reference to a brick texture living in the external texture pool
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle {
    pub slot: u32,
}

/// Availability queries the selector and available-set generator need
pub trait BrickResidency {
    fn is_resident(&self, id: OctreeNodeId) -> bool;

    /// Texture of a resident brick
    fn texture(&self, id: OctreeNodeId) -> Option<TextureHandle>;
}

/// Loading state of one brick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrickState {
    NotLoaded,
    /// Queued for the loader
    Pending,
    /// Handed to the loader by `pop_pending`
    Loading,
    Loaded { slot: u32 },
}

/// Brick cache keyed by octree node.
///
/// Doubles as the indirection table from node to texture slot. Requests
/// are counted per frame so the driver can report how much of the wanted
/// set was already resident.
#[derive(Debug, Default)]
pub struct ResidencyCache {
    states: HashMap<OctreeNodeId, BrickState>,
    // FIFO of ids waiting for the loader
    queue: VecDeque<OctreeNodeId>,
    frame_id: u64,
    requested: u32,
    resident_hits: u32,
}

impl ResidencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the request counters for `frame_id`
    pub fn begin_frame(&mut self, frame_id: u64) {
        self.frame_id = frame_id;
        self.requested = 0;
        self.resident_hits = 0;
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// Ask for a brick. Unknown bricks are queued; the state before the call is returned
    /// unless the brick was just queued.
    pub fn request(&mut self, id: OctreeNodeId) -> BrickState {
        self.requested += 1;
        match self.state(id) {
            BrickState::NotLoaded => {
                self.states.insert(id, BrickState::Pending);
                self.queue.push_back(id);
                BrickState::Pending
            }
            loaded @ BrickState::Loaded { .. } => {
                self.resident_hits += 1;
                loaded
            }
            other => other,
        }
    }

    pub fn state(&self, id: OctreeNodeId) -> BrickState {
        self.states.get(&id).copied().unwrap_or(BrickState::NotLoaded)
    }

    /// Oldest queued brick, now marked `Loading`
    pub fn pop_pending(&mut self) -> Option<OctreeNodeId> {
        while let Some(id) = self.queue.pop_front() {
            if self.state(id) == BrickState::Pending {
                self.states.insert(id, BrickState::Loading);
                return Some(id);
            }
        }
        None
    }

    pub fn mark_loaded(&mut self, id: OctreeNodeId, slot: u32) {
        self.states.insert(id, BrickState::Loaded { slot });
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Share of this frame's requests that found their brick resident
    pub fn hit_rate(&self) -> f32 {
        match self.requested {
            0 => 1.0,
            n => self.resident_hits as f32 / n as f32,
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.states
            .values()
            .filter(|s| matches!(s, BrickState::Loaded { .. }))
            .count()
    }
}

impl BrickResidency for ResidencyCache {
    fn is_resident(&self, id: OctreeNodeId) -> bool {
        matches!(self.state(id), BrickState::Loaded { .. })
    }

    fn texture(&self, id: OctreeNodeId) -> Option<TextureHandle> {
        match self.state(id) {
            BrickState::Loaded { slot } => Some(TextureHandle { slot }),
            _ => None,
        }
    }
}

/// Residency source that reports every brick as loaded in slot 0
#[derive(Clone, Copy, Debug, Default)]
pub struct AllResident;

impl BrickResidency for AllResident {
    fn is_resident(&self, _id: OctreeNodeId) -> bool {
        true
    }

    fn texture(&self, _id: OctreeNodeId) -> Option<TextureHandle> {
        Some(TextureHandle { slot: 0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::IVec3;

    fn id(level: u32, x: i32) -> OctreeNodeId {
        OctreeNodeId::new(level, IVec3::new(x, 0, 0))
    }

    #[test]
    fn test_request_queues_then_loads() {
        let mut cache = ResidencyCache::new();

        assert_eq!(cache.request(id(1, 1)), BrickState::Pending);
        assert!(!cache.is_resident(id(1, 1)));
        assert_eq!(cache.pop_pending(), Some(id(1, 1)));
        assert_eq!(cache.state(id(1, 1)), BrickState::Loading);
        assert_eq!(cache.pop_pending(), None);

        cache.mark_loaded(id(1, 1), 42);
        assert_eq!(cache.request(id(1, 1)), BrickState::Loaded { slot: 42 });
        assert_eq!(cache.texture(id(1, 1)), Some(TextureHandle { slot: 42 }));
        assert_eq!(cache.loaded_count(), 1);
    }

    #[test]
    fn test_repeated_request_queues_once() {
        let mut cache = ResidencyCache::new();
        cache.request(id(2, 3));
        cache.request(id(2, 3));
        assert_eq!(cache.pending_count(), 1);

        cache.pop_pending();
        assert_eq!(cache.request(id(2, 3)), BrickState::Loading);
        assert_eq!(cache.pending_count(), 0);
    }

    #[test]
    fn test_hit_rate_resets_per_frame() {
        let mut cache = ResidencyCache::new();
        cache.mark_loaded(id(0, 0), 0);

        cache.begin_frame(1);
        cache.request(id(0, 0));
        cache.request(id(1, 1));
        assert_eq!(cache.hit_rate(), 0.5);

        cache.begin_frame(2);
        assert_eq!(cache.frame_id(), 2);
        assert_eq!(cache.hit_rate(), 1.0);
    }
}
