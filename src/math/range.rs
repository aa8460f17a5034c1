//! Normalized depth-slab range owned by one cluster node

use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` in normalized [0, 1] space along the
/// partition axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub start: f32,
    pub end: f32,
}

impl Range {
    /// The whole volume; a node with this range is not partitioned by depth.
    pub const ALL: Range = Range { start: 0.0, end: 1.0 };

    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn is_all(&self) -> bool {
        *self == Self::ALL
    }

    pub fn is_valid(&self) -> bool {
        self.start >= 0.0 && self.end <= 1.0 && self.start < self.end
    }

    pub fn len(&self) -> f32 {
        self.end - self.start
    }

    /// Extend this range to cover `other` as well
    pub fn merge(&mut self, other: &Range) {
        self.start = self.start.min(other.start);
        self.end = self.end.max(other.end);
    }

    /// Whether the closed span `[start, end]` overlaps this range with
    /// non-zero length
    pub fn overlaps_span(&self, start: f32, end: f32) -> bool {
        start < self.end && end > self.start
    }

    /// Split [0, 1) into `count` equal consecutive slabs
    pub fn slabs(count: usize) -> Vec<Range> {
        let n = count.max(1) as f32;
        (0..count.max(1))
            .map(|i| Range::new(i as f32 / n, (i + 1) as f32 / n))
            .collect()
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::ALL
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.3}, {:.3})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all() {
        assert!(Range::ALL.is_all());
        assert!(Range::default().is_all());
        assert!(!Range::new(0.0, 0.5).is_all());
    }

    #[test]
    fn test_merge() {
        let mut r = Range::new(0.25, 0.5);
        r.merge(&Range::new(0.5, 0.75));
        assert_eq!(r, Range::new(0.25, 0.75));
    }

    #[test]
    fn test_overlaps_span() {
        let r = Range::new(0.25, 0.5);
        assert!(r.overlaps_span(0.0, 0.3));
        assert!(r.overlaps_span(0.3, 0.4));
        // Touching the boundary is not an overlap
        assert!(!r.overlaps_span(0.5, 0.75));
        assert!(!r.overlaps_span(0.0, 0.25));
    }

    #[test]
    fn test_slabs() {
        let slabs = Range::slabs(4);
        assert_eq!(slabs.len(), 4);
        assert_eq!(slabs[0], Range::new(0.0, 0.25));
        assert_eq!(slabs[3], Range::new(0.75, 1.0));
        assert_eq!(Range::slabs(1), vec![Range::ALL]);
    }

    #[test]
    fn test_validity() {
        assert!(Range::new(0.2, 0.4).is_valid());
        assert!(!Range::new(0.4, 0.2).is_valid());
        assert!(!Range::new(-0.1, 0.2).is_valid());
    }
}
