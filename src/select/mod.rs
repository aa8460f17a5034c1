//! Visibility selection and available-set generation

pub mod lod;
pub mod visibles;
pub mod available;

pub use lod::ScreenSpaceLod;
pub use visibles::{SelectVisibles, VisibleSet};
pub use available::{AvailableSetGenerator, FrameInfo};
