//! Render bricks, render-set merging and the per-pass draw queue

pub mod brick;
pub mod render_set;
pub mod queue;

pub use brick::{RenderBrick, generate_render_bricks};
pub use render_set::{RenderSet, RenderSetBuilder, build_render_sets};
pub use queue::{RenderSetQueue, SetRenderer};
