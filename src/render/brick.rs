//! Render bricks: visible octree nodes bound to their resident texture

use crate::math::{Aabb, GridBox};
use crate::octree::{BrickResidency, OctreeNode, OctreeNodeId, TextureHandle};
use crate::select::FrameInfo;

/// A visible node resolved to a concrete LOD, ready to be drawn.
///
/// The texture is owned by the external texture pool.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderBrick {
    pub node: OctreeNodeId,
    pub lod: u32,
    pub grid_box: GridBox,
    pub world_box: Aabb,
    pub texture: TextureHandle,
}

impl RenderBrick {
    pub fn new(node: &OctreeNode, texture: TextureHandle) -> Self {
        Self {
            node: node.id,
            lod: node.depth,
            grid_box: node.grid_box,
            world_box: node.world_box,
            texture,
        }
    }
}

/// Bind every render node of `info` to its texture
pub fn generate_render_bricks<R: BrickResidency>(info: &FrameInfo, residency: &R) -> Vec<RenderBrick> {
    let mut bricks = Vec::with_capacity(info.render_nodes.len());
    for node in &info.render_nodes {
        match residency.texture(node.id) {
            Some(texture) => bricks.push(RenderBrick::new(node, texture)),
            None => log::warn!("Frame {}: render node {:?} lost its texture", info.frame_id, node.id),
        }
    }
    bricks
}
