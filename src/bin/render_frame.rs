//! Simulate a small sort-last cluster and write the composited frame.
//!
//! Each node owns one depth slab of a uniform test volume and paints the
//! screen footprint of its render sets. Node 0 then assembles every node's
//! image and saves it as a PNG.
//!
//! Usage:
//!   cargo run --release --bin render_frame -- --nodes 4 --size 256 --out grabs
//!   cargo run --release --bin render_frame -- --config node.json --volume volume.json

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use sortlast::composite::{Fragment, Framebuffer, PixelBuffer, dump_frame};
use sortlast::core::types::{Mat4, PARTITION_AXIS, Result, Vec3, Vec4};
use sortlast::core::{NodeConfig, VolumeInfo, logging};
use sortlast::frame::{FrameDriver, FrameStatus, FrameWindow, advance_frame};
use sortlast::math::{Aabb, Frustum, PixelViewport, Range};
use sortlast::octree::{OctreeNodeId, ResidencyCache, UniformVolume, VolumeSource};
use sortlast::render::{RenderSet, SetRenderer};

fn parse_arg<T: FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

/// Fills the projected bounding rectangle of each set with a flat color
struct FootprintPainter<'a> {
    fb: &'a mut Framebuffer,
    view_proj: Mat4,
    color: Vec4,
}

impl FootprintPainter<'_> {
    fn footprint(&self, world_box: &Aabb) -> PixelViewport {
        let vp = self.fb.viewport();
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { world_box.min.x } else { world_box.max.x },
                if i & 2 == 0 { world_box.min.y } else { world_box.max.y },
                if i & 4 == 0 { world_box.min.z } else { world_box.max.z },
            );
            let ndc = self.view_proj.project_point3(corner);
            min = min.min(ndc);
            max = max.max(ndc);
        }
        let to_px = |ndc: f32, extent: i32| ((ndc * 0.5 + 0.5) * extent as f32) as i32;
        let (x0, y0) = (to_px(min.x, vp.w), to_px(min.y, vp.h));
        let (x1, y1) = (to_px(max.x, vp.w), to_px(max.y, vp.h));
        PixelViewport::new(x0, y0, x1 - x0, y1 - y0).intersection(&vp)
    }
}

impl SetRenderer for FootprintPainter<'_> {
    fn draw_set(&mut self, _frame_id: u64, set: &RenderSet) -> Result<()> {
        let rect = self.footprint(&set.world_box);
        if !rect.has_area() {
            return Ok(());
        }
        let image = PixelBuffer::filled(rect.w as u32, rect.h as u32, self.color);
        let viewport = self.fb.viewport();
        self.fb.blend_pixels(&image, &rect, &viewport);
        Ok(())
    }
}

fn slab_color(index: usize, count: usize) -> Vec4 {
    let t = (index as f32 + 0.5) / count as f32;
    Vec4::new(t, 0.3, 1.0 - t, 0.4)
}

fn main() -> Result<()> {
    logging::init();
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_arg::<PathBuf>(&args, "--config") {
        Some(path) => NodeConfig::load_sync(&path)?,
        None => NodeConfig::default(),
    };
    let nodes: usize = parse_arg(&args, "--nodes").unwrap_or(4).max(1);
    let size: i32 = parse_arg(&args, "--size").unwrap_or(256);
    let out_dir: PathBuf = parse_arg(&args, "--out").unwrap_or_else(|| PathBuf::from("."));
    let frame_id: u64 = parse_arg(&args, "--frame").unwrap_or(1);
    let info = match parse_arg::<PathBuf>(&args, "--volume") {
        Some(path) => VolumeInfo::load_sync(&path)?,
        None => VolumeInfo::default(),
    };
    config.viewport_height_px = size.max(1) as u32;
    config.world_space_per_voxel = info.world_space_per_voxel();

    let data_frames = FrameWindow::new(info.frames[0], info.frames[1]);
    let step = advance_frame(None, data_frames, FrameWindow::FULL, config.animation);
    let volume = UniformVolume::from_info(&info);
    let model_view = Mat4::look_at_rh(Vec3::new(1.5, 1.0, 2.5), Vec3::ZERO, Vec3::Y);
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_3, 1.0, 0.1, 100.0);
    let frustum = Frustum::new(model_view, projection);
    let viewport = PixelViewport::new(0, 0, size, size);

    println!(
        "=== Rendering frame {} (data frame {}, next {}) on {} nodes ({}x{}) ===",
        frame_id, step.current, step.next, nodes, size, size
    );

    let mut drivers = Vec::with_capacity(nodes);
    let mut images = Vec::with_capacity(nodes);
    for (index, range) in Range::slabs(nodes).into_iter().enumerate() {
        let node_config = NodeConfig {
            assigned_range: range,
            ..config.clone()
        };
        let mut driver = FrameDriver::new(node_config, Arc::new(FrameStatus::default()), volume.world_box())?;
        driver.begin_frame(frame_id);
        driver.update_frustum(frustum);

        // Only the root brick starts resident; the first pass queues the rest
        let mut cache = ResidencyCache::new();
        cache.mark_loaded(OctreeNodeId::ROOT, 0);
        let mut fb = Framebuffer::new(viewport);
        for pass in 0..2 {
            fb.clear_viewport(&viewport);
            let mut painter = FootprintPainter {
                fb: &mut fb,
                view_proj: projection * model_view,
                color: slab_color(index, nodes),
            };
            let stats = driver.draw(&volume, &cache, &mut painter)?;
            let queued = driver.request_bricks(&stats, &mut cache);
            println!(
                "  node {} {} pass {}: {} visible, {} bricks, {} sets, {:.0}% resident",
                index,
                range,
                pass,
                stats.visibles,
                stats.bricks,
                stats.sets,
                cache.hit_rate() * 100.0
            );
            if queued == 0 {
                break;
            }
            while let Some(id) = cache.pop_pending() {
                let slot = cache.loaded_count() as u32;
                cache.mark_loaded(id, slot);
            }
        }
        driver.finish_frame();

        drivers.push(driver);
        images.push(fb);
    }

    let mut images = images.into_iter();
    let Some(mut target) = images.next() else {
        return Ok(());
    };
    let world_box = volume.world_box();
    let fragments: Vec<Fragment> = images
        .enumerate()
        .map(|(i, fb)| {
            let node = i + 1;
            let range = drivers[node].config().assigned_range;
            let mut slab = world_box;
            slab.min[PARTITION_AXIS] = world_box.lerp_axis(PARTITION_AXIS, range.start);
            slab.max[PARTITION_AXIS] = world_box.lerp_axis(PARTITION_AXIS, range.end);
            let mut fragment = Fragment::remote(node as u32, range, slab, viewport, fb.pixels)
                .with_camera(model_view, projection);
            fragment.mark_ready();
            fragment
        })
        .collect();

    if let Some(assembler) = drivers.first_mut() {
        let stats = assembler.assemble(&mut target, fragments)?;
        println!(
            "  composited {} fragments (order {:?}), {} readbacks",
            stats.blended,
            stats.order,
            stats.readbacks
        );
    }

    let path = dump_frame(&target.pixels, &out_dir, frame_id)?;
    println!("Saved {}", path.display());
    Ok(())
}
