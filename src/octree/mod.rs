//! Multi-resolution octree access: node ids, the volume data source and
//! brick residency

pub mod node_id;
pub mod source;
pub mod residency;

pub use node_id::OctreeNodeId;
pub use source::{OctreeNode, UniformVolume, VolumeSource};
pub use residency::{AllResident, BrickResidency, BrickState, ResidencyCache, TextureHandle};
