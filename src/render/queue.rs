//! Pending render sets for one rendering pass
//!
//! The external draw layer is called once per set until nothing is left,
//! which lets it pipeline asynchronous readbacks between calls.

use std::collections::VecDeque;

use crate::core::types::Result;
use super::render_set::RenderSet;

/// External draw step: uploads the bricks of a set and submits the draw
pub trait SetRenderer {
    fn draw_set(&mut self, frame_id: u64, set: &RenderSet) -> Result<()>;
}

/// FIFO of render sets waiting to be drawn
#[derive(Debug, Default)]
pub struct RenderSetQueue {
    pending: VecDeque<RenderSet>,
}

impl RenderSetQueue {
    pub fn new(sets: Vec<RenderSet>) -> Self {
        Self { pending: sets.into() }
    }

    /// Loop condition for the draw step
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn push(&mut self, set: RenderSet) {
        self.pending.push_back(set);
    }

    pub fn pop(&mut self) -> Option<RenderSet> {
        self.pending.pop_front()
    }

    /// Hand every pending set to `renderer`, returning how many were drawn.
    ///
    /// Stops at the first failing draw; the failed set is dropped and the
    /// rest stay queued.
    pub fn drain<R: SetRenderer>(&mut self, frame_id: u64, renderer: &mut R) -> Result<usize> {
        let mut drawn = 0;
        while let Some(set) = self.pop() {
            renderer.draw_set(frame_id, &set)?;
            drawn += 1;
        }
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::math::Aabb;
    use crate::octree::{OctreeNodeId, TextureHandle, UniformVolume, VolumeSource};
    use crate::render::brick::RenderBrick;

    struct Recorder {
        bricks: Vec<usize>,
        fail_after: usize,
    }

    impl SetRenderer for Recorder {
        fn draw_set(&mut self, _frame_id: u64, set: &RenderSet) -> Result<()> {
            if self.bricks.len() == self.fail_after {
                return Err(Error::CompositeSkipped("draw failed".into()));
            }
            self.bricks.push(set.len());
            Ok(())
        }
    }

    fn sets(count: usize) -> Vec<RenderSet> {
        let volume = UniformVolume::new(2, Aabb::unit_centered());
        OctreeNodeId::ROOT
            .children()
            .iter()
            .take(count)
            .map(|id| RenderSet::from_brick(RenderBrick::new(&volume.node(*id).unwrap(), TextureHandle { slot: 0 })))
            .collect()
    }

    #[test]
    fn test_drain_until_empty() {
        let mut queue = RenderSetQueue::new(sets(3));
        assert!(queue.has_pending());
        let mut recorder = Recorder { bricks: Vec::new(), fail_after: usize::MAX };
        assert_eq!(queue.drain(1, &mut recorder).unwrap(), 3);
        assert!(!queue.has_pending());
        assert_eq!(recorder.bricks, vec![1, 1, 1]);
    }

    #[test]
    fn test_drain_stops_on_error() {
        let mut queue = RenderSetQueue::new(sets(4));
        let mut recorder = Recorder { bricks: Vec::new(), fail_after: 2 };
        assert!(queue.drain(1, &mut recorder).is_err());
        assert_eq!(queue.len(), 1);
    }
}
