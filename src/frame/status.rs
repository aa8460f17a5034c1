//! Frame id shared between the frame driver and long-running traversals

use std::sync::atomic::{AtomicU64, Ordering};

/// Frame id meaning "no valid frame"; drawing is skipped for it
pub const INVALID_FRAME: u64 = u64::MAX;

/// Current frame id of a render node.
///
/// A traversal tagged with an older id is stale and aborts.
#[derive(Debug)]
pub struct FrameStatus {
    frame_id: AtomicU64,
}

impl FrameStatus {
    pub fn new(frame_id: u64) -> Self {
        Self { frame_id: AtomicU64::new(frame_id) }
    }

    pub fn current(&self) -> u64 {
        self.frame_id.load(Ordering::Acquire)
    }

    pub fn set(&self, frame_id: u64) {
        self.frame_id.store(frame_id, Ordering::Release);
    }

    pub fn is_valid(&self) -> bool {
        self.current() != INVALID_FRAME
    }

    /// Whether work tagged `frame_id` is out of date
    pub fn is_stale(&self, frame_id: u64) -> bool {
        self.current() != frame_id
    }
}

impl Default for FrameStatus {
    fn default() -> Self {
        Self::new(INVALID_FRAME)
    }
}
