//! Mathematical utilities and data structures

pub mod aabb;
pub mod grid_box;
pub mod range;
pub mod viewport;
pub mod frustum;

pub use aabb::Aabb;
pub use grid_box::GridBox;
pub use range::Range;
pub use viewport::PixelViewport;
pub use frustum::{Plane, Frustum};
