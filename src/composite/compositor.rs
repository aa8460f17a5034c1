//! Frame assembly: merges received fragments into the local framebuffer

use crate::core::error::Error;
use crate::core::types::{IVec2, Mat4, Result};
use crate::math::{PixelViewport, Range};

use super::fragment::Fragment;
use super::framebuffer::Framebuffer;
use super::order::OrderResolver;

/// Counters reported by one assembly pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompositeStats {
    /// Fragments written opaquely because they cover the whole volume
    pub assembled_2d: usize,
    pub blended: usize,
    /// Framebuffer readbacks of this node's own image (0 or 1)
    pub readbacks: usize,
    /// Local image was composited first and left in place
    pub self_skipped: bool,
    pub covered: PixelViewport,
    /// Fragment names in composite order
    pub order: Vec<String>,
}

/// Assembles depth-slab fragments in back-to-front order.
pub struct Compositor {
    resolver: OrderResolver,
}

impl Compositor {
    pub fn new(resolver: OrderResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &OrderResolver {
        &self.resolver
    }

    /// Assemble `fragments` into `fb` for the current frame.
    ///
    /// `draw_range` is this node's own slab and grows to cover every slab
    /// composited here, so that the result can be forwarded as one fragment.
    /// Fails with [`Error::CompositeSkipped`] without touching the framebuffer
    /// if any fragment is not ready.
    pub fn assemble(
        &mut self,
        fb: &mut Framebuffer,
        fragments: Vec<Fragment>,
        draw_range: &mut Range,
        model_view: &Mat4,
        frame_id: u64,
    ) -> Result<CompositeStats> {
        if let Some(pending) = fragments.iter().find(|f| !f.is_ready()) {
            return Err(Error::CompositeSkipped(format!(
                "frame {}: fragment {} not ready",
                frame_id, pending.name
            )));
        }
        if let Some(bad) = fragments.iter().find(|f| !payload_matches(f)) {
            return Err(Error::CompositeSkipped(format!(
                "frame {}: fragment {} claims {}x{} pixels but carries {}x{}",
                frame_id, bad.name, bad.pixel_viewport.w, bad.pixel_viewport.h, bad.pixels.width, bad.pixels.height
            )));
        }

        let mut stats = CompositeStats::default();
        let mut depth_frames = Vec::with_capacity(fragments.len() + 1);
        let mut covered = PixelViewport::default();

        for fragment in fragments {
            if fragment.range.is_all() {
                fb.write_pixels(&fragment.pixels, &fragment.footprint());
                stats.assembled_2d += 1;
            } else {
                covered.merge(&fragment.footprint());
                depth_frames.push(fragment);
            }
        }
        covered.intersect(&fb.viewport());
        stats.covered = covered;

        if depth_frames.is_empty() || !covered.has_area() {
            log::debug!(
                "frame {}: no depth-sorted compositing needed ({} 2D fragments)",
                frame_id,
                stats.assembled_2d
            );
            return Ok(stats);
        }

        if !draw_range.is_all() {
            let world_box = *self.resolver.volume_box();
            depth_frames.push(Fragment::local("frame", *draw_range, world_box, covered));
        }

        let ranges: Vec<Range> = depth_frames.iter().map(|f| f.range).collect();
        let order = self.resolver.order(&ranges, model_view);
        let mut slots: Vec<Option<Fragment>> = depth_frames.into_iter().map(Some).collect();
        let mut ordered: Vec<Fragment> = order.iter().filter_map(|&i| slots[i].take()).collect();

        if ordered.first().is_some_and(Fragment::is_local) {
            // own image is already at the bottom of the framebuffer
            let local = ordered.remove(0);
            draw_range.merge(&local.range);
            stats.order.push(local.name);
            stats.self_skipped = true;
        } else if let Some(local) = ordered.iter_mut().find(|f| f.is_local()) {
            local.pixels = fb.read_pixels(&covered);
            local.pixel_viewport = PixelViewport::new(0, 0, covered.w, covered.h);
            local.offset = IVec2::new(covered.x, covered.y);
            stats.readbacks += 1;
            fb.clear_viewport(&covered);
        }

        for fragment in &ordered {
            fb.blend_pixels(&fragment.pixels, &fragment.footprint(), &covered);
            draw_range.merge(&fragment.range);
            stats.blended += 1;
        }
        stats.order.extend(ordered.into_iter().map(|f| f.name));

        log::debug!(
            "frame {}: composited {} fragments over {:?}, range now {}",
            frame_id,
            stats.blended,
            covered,
            draw_range
        );
        Ok(stats)
    }
}

// Local placeholders get their pixels on readback
fn payload_matches(fragment: &Fragment) -> bool {
    if fragment.is_local() {
        return true;
    }
    let pvp = fragment.pixel_viewport;
    pvp.w.max(0) as u32 == fragment.pixels.width && pvp.h.max(0) as u32 == fragment.pixels.height
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(OrderResolver::default())
    }
}
