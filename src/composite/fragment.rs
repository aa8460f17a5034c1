//! Partial images produced by one render node per frame

use crate::core::types::{IVec2, Mat4, Vec4};
use crate::math::{Aabb, PixelViewport, Range};

/// Row-major RGBA float image, row 0 at the bottom
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<Vec4>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Vec4::ZERO)
    }

    pub fn filled(width: u32, height: u32, color: Vec4) -> Self {
        Self {
            width,
            height,
            data: vec![color; width as usize * height as usize],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Vec4) {
        let i = self.index(x, y);
        self.data[i] = color;
    }

    /// Quantize to 8-bit RGBA
    pub fn to_rgba8(&self) -> Vec<[u8; 4]> {
        self.data
            .iter()
            .map(|c| {
                let q = (c.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
                [q.x as u8, q.y as u8, q.z as u8, q.w as u8]
            })
            .collect()
    }
}

/// Who produced a fragment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentSource {
    /// This node's own image, still sitting in the local framebuffer
    Local,
    /// Received from another cluster node
    Remote { node: u32 },
}

/// A partial rendered image with the slab and camera it was rendered with.
///
/// The image covers `pixel_viewport` shifted by `offset` in the destination.
#[derive(Clone, Debug)]
pub struct Fragment {
    pub name: String,
    pub source: FragmentSource,
    pub range: Range,
    pub world_box: Aabb,
    pub pixel_viewport: PixelViewport,
    pub offset: IVec2,
    pub pixels: PixelBuffer,
    pub model_view: Mat4,
    pub projection: Mat4,
    ready: bool,
}

impl Fragment {
    /// Image received from `node`, not yet marked ready
    pub fn remote(node: u32, range: Range, world_box: Aabb, pixel_viewport: PixelViewport, pixels: PixelBuffer) -> Self {
        debug_assert_eq!(pixel_viewport.w.max(0) as u32, pixels.width);
        debug_assert_eq!(pixel_viewport.h.max(0) as u32, pixels.height);
        Self {
            name: format!("node{}", node),
            source: FragmentSource::Remote { node },
            range,
            world_box,
            pixel_viewport,
            offset: IVec2::ZERO,
            pixels,
            model_view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            ready: false,
        }
    }

    /// Placeholder for this node's own image; pixels are read back on demand
    pub fn local(name: &str, range: Range, world_box: Aabb, pixel_viewport: PixelViewport) -> Self {
        Self {
            name: format!("self.{}", name),
            source: FragmentSource::Local,
            range,
            world_box,
            pixel_viewport,
            offset: IVec2::ZERO,
            pixels: PixelBuffer::default(),
            model_view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            ready: true,
        }
    }

    /// Attach the camera the image was rendered with
    pub fn with_camera(mut self, model_view: Mat4, projection: Mat4) -> Self {
        self.model_view = model_view;
        self.projection = projection;
        self
    }

    pub fn with_offset(mut self, offset: IVec2) -> Self {
        self.offset = offset;
        self
    }

    /// Called by the transport once all pixels have arrived
    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_local(&self) -> bool {
        self.source == FragmentSource::Local
    }

    /// Destination rectangle covered by the image
    pub fn footprint(&self) -> PixelViewport {
        self.pixel_viewport.offset(self.offset.x, self.offset.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_buffer_access() {
        let mut buffer = PixelBuffer::new(4, 2);
        buffer.set(3, 1, Vec4::ONE);
        assert_eq!(buffer.get(3, 1), Vec4::ONE);
        assert_eq!(buffer.data[7], Vec4::ONE);
        assert_eq!(buffer.get(0, 0), Vec4::ZERO);
    }

    #[test]
    fn test_to_rgba8() {
        let buffer = PixelBuffer::filled(1, 1, Vec4::new(1.0, 0.5, 0.0, 2.0));
        assert_eq!(buffer.to_rgba8(), vec![[255, 128, 0, 255]]);
    }

    #[test]
    fn test_footprint_applies_offset() {
        let pvp = PixelViewport::new(0, 0, 2, 2);
        let fragment = Fragment::remote(1, Range::ALL, Aabb::unit_centered(), pvp, PixelBuffer::new(2, 2))
            .with_offset(IVec2::new(5, 7));
        assert_eq!(fragment.footprint(), PixelViewport::new(5, 7, 2, 2));
        assert!(!fragment.is_ready());
        assert!(!fragment.is_local());
    }
}
