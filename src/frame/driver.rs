//! Per-node frame driver: selection, set building, drawing and assembly

use std::sync::Arc;

use crate::composite::{CompositeStats, Compositor, Fragment, Framebuffer, OrderResolver};
use crate::core::config::NodeConfig;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::math::{Aabb, Frustum, Range};
use crate::octree::{BrickResidency, OctreeNodeId, ResidencyCache, VolumeSource};
use crate::render::{RenderSetQueue, SetRenderer, build_render_sets, generate_render_bricks};
use crate::select::{AvailableSetGenerator, SelectVisibles};

use super::redraw::{RedrawNotifier, RedrawReason};
use super::status::FrameStatus;

/// Outcome of one draw pass
#[derive(Clone, Debug, Default)]
pub struct DrawStats {
    pub frame_id: u64,
    /// Frame id was invalid or went stale; nothing was drawn
    pub skipped: bool,
    pub visibles: usize,
    pub rendered_nodes: usize,
    pub bricks: usize,
    pub sets: usize,
    pub drawn: usize,
    /// Every node the selector wanted drawn
    pub wanted: Vec<OctreeNodeId>,
    /// Visible nodes whose own brick still has to be loaded
    pub missing: Vec<OctreeNodeId>,
    pub loaded_fraction: f32,
}

/// Drives one render node (one channel) through its frames
pub struct FrameDriver {
    config: NodeConfig,
    status: Arc<FrameStatus>,
    frustum: Frustum,
    // frustum the data loader last worked with
    received_frustum: Frustum,
    draw_range: Range,
    compositor: Compositor,
    notifier: Option<RedrawNotifier>,
}

impl FrameDriver {
    pub fn new(config: NodeConfig, status: Arc<FrameStatus>, volume_box: Aabb) -> Result<Self> {
        config.validate()?;
        let resolver = OrderResolver::new(config.order_epsilon, volume_box);
        Ok(Self {
            draw_range: config.assigned_range,
            config,
            status,
            frustum: Frustum::default(),
            received_frustum: Frustum::default(),
            compositor: Compositor::new(resolver),
            notifier: None,
        })
    }

    pub fn with_notifier(mut self, notifier: RedrawNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Slab covered by this node's current image
    pub fn draw_range(&self) -> Range {
        self.draw_range
    }

    pub fn frame_id(&self) -> u64 {
        self.status.current()
    }

    /// Start `frame_id`; the draw range shrinks back to the assigned slab
    pub fn begin_frame(&mut self, frame_id: u64) {
        self.status.set(frame_id);
        self.draw_range = self.config.assigned_range;
    }

    pub fn update_frustum(&mut self, frustum: Frustum) {
        self.frustum = frustum;
    }

    /// Select, resolve residency, build render sets and hand them to `renderer`
    pub fn draw<S, R, D>(&mut self, source: &S, residency: &R, renderer: &mut D) -> Result<DrawStats>
    where
        S: VolumeSource,
        R: BrickResidency,
        D: SetRenderer,
    {
        let frame_id = self.status.current();
        let mut stats = DrawStats {
            frame_id,
            ..Default::default()
        };
        if !self.status.is_valid() {
            log::debug!("no valid frame, skipping draw");
            stats.skipped = true;
            return Ok(stats);
        }

        let visibles = SelectVisibles::new(source, &self.frustum, &self.config).traverse(frame_id, &self.status);
        if visibles.aborted {
            log::debug!("frame {}: selection went stale", frame_id);
            stats.skipped = true;
            return Ok(stats);
        }
        stats.visibles = visibles.len();

        let info = AvailableSetGenerator::new(source, residency).generate(&visibles);
        stats.rendered_nodes = info.render_nodes.len();
        stats.loaded_fraction = info.loaded_fraction();

        let bricks = generate_render_bricks(&info, residency);
        stats.bricks = bricks.len();
        stats.wanted = info.all_nodes;
        stats.missing = info.not_available;

        let sets = build_render_sets(&bricks, self.config.assigned_range, frame_id)?;
        stats.sets = sets.len();

        let mut queue = RenderSetQueue::new(sets);
        stats.drawn = queue.drain(frame_id, renderer)?;

        log::info!(
            "frame {}: {} visible, {} bricks in {} sets, {:.0}% loaded",
            frame_id,
            stats.visibles,
            stats.bricks,
            stats.sets,
            stats.loaded_fraction * 100.0
        );
        Ok(stats)
    }

    /// Feed a draw pass's wanted nodes to the brick cache.
    ///
    /// Non-resident bricks are queued for the loader. Returns how many
    /// bricks are waiting to load afterwards.
    pub fn request_bricks(&self, stats: &DrawStats, cache: &mut ResidencyCache) -> usize {
        if stats.skipped {
            return cache.pending_count();
        }
        cache.begin_frame(stats.frame_id);
        for id in &stats.wanted {
            cache.request(*id);
        }
        log::debug!(
            "frame {}: {} bricks requested, {:.0}% resident, {} queued",
            stats.frame_id,
            stats.wanted.len(),
            cache.hit_rate() * 100.0,
            cache.pending_count()
        );
        cache.pending_count()
    }

    /// Called once new bricks became resident.
    ///
    /// Asks for another frame when the data was requested for a different
    /// view than the current one. Returns whether a request was sent.
    pub fn data_updated(&mut self) -> bool {
        if self.config.synchronous_mode || self.received_frustum == self.frustum {
            return false;
        }
        self.request_redraw(RedrawReason::DataUpdated)
    }

    /// Composite received fragments into `fb`.
    ///
    /// A fragment that is not ready skips compositing for this frame and
    /// schedules a redraw.
    pub fn assemble(&mut self, fb: &mut Framebuffer, fragments: Vec<Fragment>) -> Result<CompositeStats> {
        let frame_id = self.status.current();
        let model_view = *self.frustum.model_view();
        match self
            .compositor
            .assemble(fb, fragments, &mut self.draw_range, &model_view, frame_id)
        {
            Err(Error::CompositeSkipped(reason)) => {
                log::warn!("composite skipped: {}", reason);
                self.request_redraw(RedrawReason::CompositeSkipped);
                Err(Error::CompositeSkipped(reason))
            }
            other => other,
        }
    }

    /// Hand the frame's frustum to the data loader
    pub fn finish_frame(&mut self) {
        self.received_frustum = self.frustum;
    }

    fn request_redraw(&self, reason: RedrawReason) -> bool {
        let frame_id = self.status.current();
        self.notifier
            .as_ref()
            .is_some_and(|n| n.request(frame_id, reason))
    }
}
