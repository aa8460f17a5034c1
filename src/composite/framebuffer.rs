//! Local framebuffer the compositor assembles into

use rayon::prelude::*;

use crate::core::types::Vec4;
use crate::math::PixelViewport;
use super::fragment::PixelBuffer;

/// `dst = src * src.a + dst * (1 - src.a)` on all four channels
pub fn blend_over(src: Vec4, dst: Vec4) -> Vec4 {
    src * src.w + dst * (1.0 - src.w)
}

// Never read past the end of `image`, whatever rectangle it claims to cover
fn clamp_to_image(dst: &PixelViewport, image: &PixelBuffer) -> PixelViewport {
    let w = dst.w.min(image.width as i32);
    let h = dst.h.min(image.height as i32);
    PixelViewport::new(dst.x, dst.y, w, h)
}

/// Pixels of the local viewport plus the active scissor rectangle.
///
/// Writes outside the scissor are discarded.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    viewport: PixelViewport,
    scissor: PixelViewport,
    pub pixels: PixelBuffer,
}

impl Framebuffer {
    pub fn new(viewport: PixelViewport) -> Self {
        Self {
            viewport,
            scissor: viewport,
            pixels: PixelBuffer::new(viewport.w.max(0) as u32, viewport.h.max(0) as u32),
        }
    }

    pub fn viewport(&self) -> PixelViewport {
        self.viewport
    }

    pub fn scissor(&self) -> PixelViewport {
        self.scissor
    }

    /// Color at absolute pixel position
    pub fn get(&self, x: i32, y: i32) -> Vec4 {
        self.pixels.get((x - self.viewport.x) as u32, (y - self.viewport.y) as u32)
    }

    /// Clear `pvp` to transparent black, then restore the full-viewport scissor
    pub fn clear_viewport(&mut self, pvp: &PixelViewport) {
        self.scissor = self.viewport.intersection(pvp);
        let region = self.scissor;
        self.for_each_row(&region, &region, |_, _, line| line.fill(Vec4::ZERO));
        self.scissor = self.viewport;
    }

    /// Copy of the pixels inside `pvp`, clipped to the viewport
    pub fn read_pixels(&self, pvp: &PixelViewport) -> PixelBuffer {
        let clip = self.viewport.intersection(pvp);
        let mut out = PixelBuffer::new(clip.w.max(0) as u32, clip.h.max(0) as u32);
        for y in 0..clip.h {
            for x in 0..clip.w {
                out.set(x as u32, y as u32, self.get(clip.x + x, clip.y + y));
            }
        }
        out
    }

    /// Overwrite the pixels under `dst` with `image`
    pub fn write_pixels(&mut self, image: &PixelBuffer, dst: &PixelViewport) {
        let viewport = self.viewport;
        let width = image.width as usize;
        let dst = clamp_to_image(dst, image);
        self.for_each_row(&dst, &viewport, |sx, sy, line| {
            let start = sy * width + sx;
            let len = line.len();
            line.copy_from_slice(&image.data[start..start + len]);
        });
    }

    /// Alpha-blend `image` placed at `dst` over the framebuffer inside `region`
    pub fn blend_pixels(&mut self, image: &PixelBuffer, dst: &PixelViewport, region: &PixelViewport) {
        let width = image.width as usize;
        let dst = clamp_to_image(dst, image);
        self.for_each_row(&dst, region, |sx, sy, line| {
            let start = sy * width + sx;
            let len = line.len();
            for (d, s) in line.iter_mut().zip(&image.data[start..start + len]) {
                *d = blend_over(*s, *d);
            }
        });
    }

    // Calls `op(src_x, src_y, span)` for each framebuffer row span covered by
    // dst ∩ region ∩ scissor, where (src_x, src_y) is the first pixel of the
    // span in image coordinates relative to `dst`.
    fn for_each_row<F>(&mut self, dst: &PixelViewport, region: &PixelViewport, op: F)
    where
        F: Fn(usize, usize, &mut [Vec4]) + Sync,
    {
        let clip = dst.intersection(region).intersection(&self.scissor);
        if !clip.has_area() || self.pixels.width == 0 {
            return;
        }
        let vp = self.viewport;
        let width = self.pixels.width as usize;
        let x0 = (clip.x - vp.x) as usize;
        let x1 = (clip.x_end() - vp.x) as usize;
        let y0 = (clip.y - vp.y) as usize;
        let rows = clip.h as usize;
        let src_x = (clip.x - dst.x) as usize;

        self.pixels
            .data
            .par_chunks_mut(width)
            .enumerate()
            .skip(y0)
            .take(rows)
            .for_each(|(row, line)| {
                let src_y = (row as i32 + vp.y - dst.y) as usize;
                op(src_x, src_y, &mut line[x0..x1]);
            });
    }
}
