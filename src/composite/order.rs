//! Back-to-front ordering of depth-slab fragments
//!
//! Slabs are sorted by range start, then split where the eye crosses from
//! one side of the slab boundaries to the other. Everything past the split
//! point is composited first in reversed order, so the slab containing the
//! eye always lands last.

use crate::core::types::{Mat3, Mat4, PARTITION_AXIS, Vec3};
use crate::math::{Aabb, Range};

/// Volume partition axis transformed into eye space
pub fn view_normal(model_view: &Mat4) -> Vec3 {
    let inverse_transpose = Mat3::from_mat4(model_view.inverse()).transpose();
    (inverse_transpose * Vec3::Z).normalize_or_zero()
}

/// Stateful order resolver.
///
/// Remembers the previous frame's split so that boundaries almost exactly
/// edge-on to the eye keep the order they had instead of flickering.
#[derive(Clone, Debug)]
pub struct OrderResolver {
    epsilon: f32,
    volume_box: Aabb,
    // (fragment count, tail length) of the last resolved order
    last_split: Option<(usize, usize)>,
}

impl Default for OrderResolver {
    fn default() -> Self {
        Self::new(1e-4, Aabb::unit_centered())
    }
}

impl OrderResolver {
    pub fn new(epsilon: f32, volume_box: Aabb) -> Self {
        Self {
            epsilon,
            volume_box,
            last_split: None,
        }
    }

    pub fn volume_box(&self) -> &Aabb {
        &self.volume_box
    }

    pub fn set_volume_box(&mut self, volume_box: Aabb) {
        self.volume_box = volume_box;
    }

    /// Forget the remembered split
    pub fn reset(&mut self) {
        self.last_split = None;
    }

    /// Composite order for `ranges` as a permutation of their indices,
    /// first entry composited first.
    pub fn order(&mut self, ranges: &[Range], model_view: &Mat4) -> Vec<usize> {
        let n = ranges.len();
        let mut sorted: Vec<usize> = (0..n).collect();
        // stable: equal starts keep submission order
        sorted.sort_by(|&a, &b| ranges[b].start.total_cmp(&ranges[a].start));
        if n < 2 {
            return sorted;
        }

        let dots = self.boundary_dots(ranges, &sorted, model_view);
        let strict = tail_len(&dots, self.epsilon);
        let loose = tail_len(&dots, -self.epsilon);

        let tail = match self.last_split {
            _ if strict == loose => strict,
            Some((count, prev)) if count == n && (prev == strict || prev == loose) => prev,
            _ => strict,
        };
        if strict != loose {
            log::trace!("ambiguous composite split: strict {}, loose {}, using {}", strict, loose, tail);
        }
        self.last_split = Some((n, tail));

        if tail >= n {
            return sorted;
        }
        let mut ordered: Vec<usize> = sorted[tail..].iter().rev().copied().collect();
        ordered.extend_from_slice(&sorted[..tail]);
        ordered
    }

    // Sign of the dot product between the eye-space partition normal and the
    // eye-to-boundary vector, one entry per slab end plus the last slab's start
    fn boundary_dots(&self, ranges: &[Range], sorted: &[usize], model_view: &Mat4) -> Vec<f32> {
        let normal = view_normal(model_view);
        let center = self.volume_box.center();
        let dot_at = |t: f32| {
            let mut p = center;
            p[PARTITION_AXIS] = self.volume_box.lerp_axis(PARTITION_AXIS, t);
            normal.dot(model_view.transform_point3(p).normalize_or_zero())
        };

        let mut dots: Vec<f32> = sorted.iter().map(|&i| dot_at(ranges[i].end)).collect();
        if let Some(&last) = sorted.last() {
            dots.push(dot_at(ranges[last].start));
        }
        dots
    }
}

// Index just past the last pair of consecutive boundaries both above `threshold`
fn tail_len(dots: &[f32], threshold: f32) -> usize {
    dots.windows(2)
        .rposition(|w| w[0] > threshold && w[1] > threshold)
        .map_or(1, |i| i + 2)
}
