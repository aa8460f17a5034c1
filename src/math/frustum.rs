//! Per-frame view frustum: camera matrices plus culling planes

use crate::core::types::{Mat4, Vec3, Vec4};
use super::aabb::Aabb;

/// A plane defined by normal and distance from origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Signed distance from point to plane (positive = in front)
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }
}

/// Model-view and projection for one frame, with the 6 planes (Near, Far,
/// Left, Right, Top, Bottom) extracted in model space.
///
/// Built once per frame and not modified afterwards. Two frusta compare
/// equal when their matrices do.
#[derive(Clone, Copy, Debug)]
pub struct Frustum {
    model_view: Mat4,
    projection: Mat4,
    eye: Vec3,
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Build from the camera's model-view and projection matrices
    pub fn new(model_view: Mat4, projection: Mat4) -> Self {
        let planes = Self::extract_planes(&(projection * model_view));
        let eye = model_view.inverse().transform_point3(Vec3::ZERO);
        Self { model_view, projection, eye, planes }
    }

    pub fn model_view(&self) -> &Mat4 {
        &self.model_view
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    /// Eye position in model space
    pub fn eye_position(&self) -> Vec3 {
        self.eye
    }

    /// True for projections without perspective divide
    pub fn is_orthographic(&self) -> bool {
        self.projection.w_axis.w != 0.0
    }

    // Left/Right/Bottom/Top/Near/Far from row3 +/- row0..2 (Gribb/Hartmann)
    fn extract_planes(vp: &Mat4) -> [Plane; 6] {
        let m = vp.to_cols_array_2d();
        let row = |r: usize| Vec4::new(m[0][r], m[1][r], m[2][r], m[3][r]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));

        let near = Self::normalize_plane(r3 + r2);
        let far = Self::normalize_plane(r3 - r2);
        let left = Self::normalize_plane(r3 + r0);
        let right = Self::normalize_plane(r3 - r0);
        let top = Self::normalize_plane(r3 - r1);
        let bottom = Self::normalize_plane(r3 + r1);

        [near, far, left, right, top, bottom]
    }

    fn normalize_plane(plane: Vec4) -> Plane {
        let normal = Vec3::new(plane.x, plane.y, plane.z);
        let len = normal.length();
        if len == 0.0 {
            return Plane::new(Vec3::ZERO, plane.w);
        }
        Plane {
            normal: normal / len,
            distance: plane.w / len,
        }
    }

    /// Check if point is inside frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes.iter().all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Check if AABB intersects frustum (conservative test)
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        for plane in &self.planes {
            // Find the corner most aligned with plane normal (p-vertex)
            let p = Vec3::new(
                if plane.normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if plane.normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if plane.normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );

            // If p-vertex is outside, AABB is completely outside
            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }
        true
    }

    /// Eye-space distance from the eye to the nearest point of `aabb`
    pub fn distance_to(&self, aabb: &Aabb) -> f32 {
        let closest = aabb.closest_point(self.eye);
        self.model_view.transform_point3(closest).length()
    }

    /// On-screen pixels covered by one world unit at eye distance `distance`
    pub fn pixels_per_unit(&self, distance: f32, viewport_height_px: u32) -> f32 {
        let half_height = viewport_height_px as f32 * 0.5;
        let focal = self.projection.y_axis.y;
        if self.is_orthographic() {
            half_height * focal
        } else {
            half_height * focal / distance.max(f32::EPSILON)
        }
    }
}

impl PartialEq for Frustum {
    fn eq(&self, other: &Self) -> bool {
        self.model_view == other.model_view && self.projection == other.projection
    }
}

impl Default for Frustum {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}
