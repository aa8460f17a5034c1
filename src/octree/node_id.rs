//! Octree node identifiers

use crate::core::types::IVec3;

/// Identifies a node of the multi-resolution octree.
///
/// `level` 0 is the root (coarsest); a node at `level` has position
/// components in `0..2^level`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OctreeNodeId {
    pub level: u32,
    pub position: IVec3,
}

impl OctreeNodeId {
    pub const ROOT: OctreeNodeId = OctreeNodeId { level: 0, position: IVec3::ZERO };

    pub fn new(level: u32, position: IVec3) -> Self {
        Self { level, position }
    }

    pub fn is_root(&self) -> bool {
        self.level == 0
    }

    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<OctreeNodeId> {
        if self.is_root() {
            return None;
        }
        Some(Self::new(self.level - 1, self.position / 2))
    }

    /// The 8 children, ordered by octant index (bit 0=x, bit 1=y, bit 2=z)
    pub fn children(&self) -> [OctreeNodeId; 8] {
        let base = self.position * 2;
        std::array::from_fn(|i| {
            let offset = IVec3::new((i & 1) as i32, ((i >> 1) & 1) as i32, ((i >> 2) & 1) as i32);
            Self::new(self.level + 1, base + offset)
        })
    }

    /// True if `self` is a strict ancestor of `other`
    pub fn is_ancestor_of(&self, other: &OctreeNodeId) -> bool {
        if other.level <= self.level {
            return false;
        }
        let shift = other.level - self.level;
        other.position / (1i32 << shift) == self.position
    }

    /// Iterator over strict ancestors, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = OctreeNodeId> {
        std::iter::successors(self.parent(), |id| id.parent())
    }
}
