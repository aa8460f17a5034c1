//! Sortlast - sort-last cluster volume rendering core
//!
//! Each render node selects the octree bricks of its depth slab, merges them
//! into convex render sets and hands those to an external ray caster. The
//! partial images of all nodes are then composited back to front.

pub mod core;
pub mod math;
pub mod octree;
pub mod select;
pub mod render;
pub mod composite;
pub mod frame;
