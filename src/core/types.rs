//! Core type aliases and re-exports

pub use glam::{
    Vec2, Vec3, Vec4,
    Mat3, Mat4,
    IVec2, IVec3, UVec3,
};

/// Standard Result type for the renderer core
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;

/// Index of the axis a cluster node's depth slab is cut along (Z).
pub const PARTITION_AXIS: usize = 2;
