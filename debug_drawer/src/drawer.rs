//! Live primitive buffers.
//!
//! A producer keeps a [`PointBuffer`] or [`LineBuffer`], stages primitives
//! each iteration and flushes. The render thread holds a drawable created
//! from the same buffer and picks up the latest published snapshot every
//! frame, re-uploading only when a new generation was flushed.

use std::sync::Arc;

use threedbg_core::color::{Rgb, default_line_color, default_point_color};
use threedbg_core::scene::SceneBuffer;
use threedbg_core::sync::ContextGuard;

use crate::draw_api::{self, Segment};
use crate::drawable::{Drawable, DrawableFactory, MaterializeError};
use crate::frame::FrameParams;
use crate::points::DEFAULT_POINT_SIZE;
use crate::raster;
use crate::target::Framebuffer;
use crate::vertex::{ColoredLine, DebugVertex};

/// Pairs positions with colors, truncating to the shorter side.
fn zip_colored<P: Copy, T>(positions: &[P], colors: &[Rgb], what: &str, make: impl Fn(P, Rgb) -> T) -> Vec<T> {
    if positions.len() != colors.len() {
        log::warn!(
            "{} {} but {} colors; extra entries dropped",
            positions.len(),
            what,
            colors.len()
        );
    }
    positions.iter().zip(colors).map(|(&p, &c)| make(p, c)).collect()
}

/// Shared, double-buffered point cloud.
#[derive(Clone, Default)]
pub struct PointBuffer {
    scene: Arc<SceneBuffer<DebugVertex>>,
}

impl PointBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &SceneBuffer<DebugVertex> {
        &self.scene
    }

    pub fn clear(&self) {
        self.scene.clear();
    }

    /// Stages a point with the default color for its staging index.
    pub fn add(&self, position: [f32; 3]) {
        self.scene.stage_with(|staged| {
            let color = default_point_color(staged.len());
            staged.push(DebugVertex::new(position, color));
        });
    }

    pub fn add_colored(&self, position: [f32; 3], color: Rgb) {
        self.scene.add(DebugVertex::new(position, color));
    }

    /// Stages points with default colors.
    pub fn add_batch(&self, positions: &[[f32; 3]]) {
        self.scene.stage_with(|staged| {
            let first = staged.len();
            staged.extend(
                positions
                    .iter()
                    .enumerate()
                    .map(|(i, &p)| DebugVertex::new(p, default_point_color(first + i))),
            );
        });
    }

    /// Stages points with explicit colors. Mismatched lengths are truncated.
    pub fn add_colored_batch(&self, positions: &[[f32; 3]], colors: &[Rgb]) {
        let vertices = zip_colored(positions, colors, "points", DebugVertex::new);
        self.scene.add_batch(vertices);
    }

    pub fn flush(&self) {
        self.scene.flush();
    }

    pub fn staged_len(&self) -> usize {
        self.scene.staged_len()
    }

    pub fn published_len(&self) -> usize {
        self.scene.published_len()
    }

    /// Latest published points.
    pub fn snapshot(&self) -> Arc<[DebugVertex]> {
        self.scene.snapshot_for_draw()
    }

    /// Factory for a drawable that tracks this buffer.
    pub fn factory(&self) -> LivePointsFactory {
        LivePointsFactory {
            scene: Arc::clone(&self.scene),
            point_size: DEFAULT_POINT_SIZE,
        }
    }
}

impl std::fmt::Debug for PointBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PointBuffer").field(&self.scene).finish()
    }
}

/// Shared, double-buffered line set.
#[derive(Clone, Default)]
pub struct LineBuffer {
    scene: Arc<SceneBuffer<ColoredLine>>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &SceneBuffer<ColoredLine> {
        &self.scene
    }

    pub fn clear(&self) {
        self.scene.clear();
    }

    /// Stages a line with the default color for its staging index.
    pub fn add(&self, start: [f32; 3], end: [f32; 3]) {
        self.scene.stage_with(|staged| {
            let color = default_line_color(staged.len());
            staged.push(ColoredLine::new(start, end, color));
        });
    }

    pub fn add_colored(&self, start: [f32; 3], end: [f32; 3], color: Rgb) {
        self.scene.add(ColoredLine::new(start, end, color));
    }

    /// Stages a batch of lines sharing one default color.
    pub fn add_batch(&self, segments: &[Segment]) {
        self.scene.stage_with(|staged| {
            let color = default_line_color(staged.len());
            staged.extend(segments.iter().map(|&[a, b]| ColoredLine::new(a, b, color)));
        });
    }

    /// Stages lines with explicit colors. Mismatched lengths are truncated.
    pub fn add_colored_batch(&self, segments: &[Segment], colors: &[Rgb]) {
        let lines = zip_colored(segments, colors, "lines", |[a, b], c| ColoredLine::new(a, b, c));
        self.scene.add_batch(lines);
    }

    /// Starts a local batch that is appended to staging when dropped.
    pub fn context(&self) -> LineContext<'_> {
        LineContext {
            buffer: self,
            lines: Vec::new(),
        }
    }

    pub fn flush(&self) {
        self.scene.flush();
    }

    pub fn staged_len(&self) -> usize {
        self.scene.staged_len()
    }

    pub fn published_len(&self) -> usize {
        self.scene.published_len()
    }

    /// Latest published lines.
    pub fn snapshot(&self) -> Arc<[ColoredLine]> {
        self.scene.snapshot_for_draw()
    }

    /// Factory for a drawable that tracks this buffer.
    pub fn factory(&self) -> LiveLinesFactory {
        LiveLinesFactory {
            scene: Arc::clone(&self.scene),
        }
    }
}

impl std::fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("LineBuffer").field(&self.scene).finish()
    }
}

/// A short-lived line batch.
///
/// Collects lines locally and appends them to the parent buffer's staging
/// side in one lock on [`Drop`].
pub struct LineContext<'a> {
    buffer: &'a LineBuffer,
    lines: Vec<ColoredLine>,
}

impl LineContext<'_> {
    pub fn line(&mut self, start: [f32; 3], end: [f32; 3], color: Rgb) -> &mut Self {
        self.lines.push(ColoredLine::new(start, end, color));
        self
    }

    pub fn aabb(&mut self, min: [f32; 3], max: [f32; 3], color: Rgb) -> &mut Self {
        for [a, b] in draw_api::aabb_edges(min, max) {
            self.line(a, b, color);
        }
        self
    }

    pub fn axes(&mut self, origin: [f32; 3], length: f32) -> &mut Self {
        self.lines.extend(draw_api::axes(origin, length));
        self
    }

    pub fn cross(&mut self, center: [f32; 3], half_size: f32, color: Rgb) -> &mut Self {
        for [a, b] in draw_api::cross(center, half_size) {
            self.line(a, b, color);
        }
        self
    }
}

impl Drop for LineContext<'_> {
    fn drop(&mut self) {
        if !self.lines.is_empty() {
            self.buffer.scene.add_batch(self.lines.drain(..));
        }
    }
}

/// Factory for a drawable following a [`PointBuffer`].
pub struct LivePointsFactory {
    scene: Arc<SceneBuffer<DebugVertex>>,
    point_size: f32,
}

impl LivePointsFactory {
    pub fn with_point_size(mut self, point_size: f32) -> Self {
        self.point_size = point_size;
        self
    }
}

impl DrawableFactory for LivePointsFactory {
    fn materialize(self: Box<Self>, _ctx: &ContextGuard<'_>) -> Result<Box<dyn Drawable>, MaterializeError> {
        Ok(Box::new(LivePointsDrawable {
            scene: self.scene,
            uploaded: Arc::from(Vec::new()),
            generation: None,
            point_size: self.point_size,
        }))
    }
}

struct LivePointsDrawable {
    scene: Arc<SceneBuffer<DebugVertex>>,
    uploaded: Arc<[DebugVertex]>,
    generation: Option<u64>,
    point_size: f32,
}

impl Drawable for LivePointsDrawable {
    fn draw(&mut self, params: &FrameParams, target: &mut Framebuffer) {
        refresh(&self.scene, &mut self.uploaded, &mut self.generation);
        for vertex in self.uploaded.iter().filter(|v| v.is_finite()) {
            raster::splat_point(target, params, vertex, self.point_size);
        }
    }

    fn primitive_count(&self) -> usize {
        self.uploaded.len()
    }
}

/// Factory for a drawable following a [`LineBuffer`].
pub struct LiveLinesFactory {
    scene: Arc<SceneBuffer<ColoredLine>>,
}

impl DrawableFactory for LiveLinesFactory {
    fn materialize(self: Box<Self>, _ctx: &ContextGuard<'_>) -> Result<Box<dyn Drawable>, MaterializeError> {
        Ok(Box::new(LiveLinesDrawable {
            scene: self.scene,
            uploaded: Arc::from(Vec::new()),
            generation: None,
        }))
    }
}

struct LiveLinesDrawable {
    scene: Arc<SceneBuffer<ColoredLine>>,
    uploaded: Arc<[ColoredLine]>,
    generation: Option<u64>,
}

impl Drawable for LiveLinesDrawable {
    fn draw(&mut self, params: &FrameParams, target: &mut Framebuffer) {
        refresh(&self.scene, &mut self.uploaded, &mut self.generation);
        for line in self.uploaded.iter().filter(|l| l.is_finite()) {
            raster::draw_segment(target, params, line);
        }
    }

    fn primitive_count(&self) -> usize {
        self.uploaded.len()
    }
}

/// Swaps in the published snapshot if a newer generation exists.
fn refresh<T: Clone>(scene: &SceneBuffer<T>, uploaded: &mut Arc<[T]>, seen: &mut Option<u64>) {
    // Read before the snapshot so a racing flush is seen next frame.
    let generation = scene.generation();
    if *seen == Some(generation) {
        return;
    }
    *uploaded = scene.snapshot_for_draw();
    *seen = Some(generation);
    log::trace!("Re-uploaded {} primitives (generation {})", uploaded.len(), generation);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use threedbg_core::camera::Camera;
    use threedbg_core::sync::ContextArbiter;

    fn front_params() -> FrameParams {
        FrameParams::new(&Camera::new(Vec3::new(0.0, -3.0, 0.0), Vec3::ZERO), [64, 48])
    }

    #[test]
    fn batch_default_colors_follow_staging_index() {
        let points = PointBuffer::new();
        points.add([0.0; 3]);
        points.add_batch(&[[1.0; 3], [2.0; 3]]);
        points.flush();
        let snapshot = points.snapshot();
        let colors: Vec<Rgb> = snapshot.iter().map(|v| v.color).collect();
        assert_eq!(colors, (0..3).map(default_point_color).collect::<Vec<_>>());
    }

    #[test]
    fn colored_batch_truncates_mismatch() {
        let lines = LineBuffer::new();
        lines.add_colored_batch(&[[[0.0; 3], [1.0; 3]], [[0.0; 3], [2.0; 3]]], &[[1.0, 0.0, 0.0]]);
        assert_eq!(lines.staged_len(), 1);
    }

    #[test]
    fn line_context_appends_on_drop() {
        let lines = LineBuffer::new();
        {
            let mut ctx = lines.context();
            ctx.aabb([0.0; 3], [1.0; 3], [0.0, 1.0, 0.0]).axes([0.0; 3], 1.0);
            assert_eq!(lines.staged_len(), 0);
        }
        assert_eq!(lines.staged_len(), 15);
    }

    #[test]
    fn live_drawable_follows_flushes() {
        let arbiter = ContextArbiter::new();
        let ctx = arbiter.acquire();
        let points = PointBuffer::new();
        let mut drawable = Box::new(points.factory().with_point_size(0.5)).materialize(&ctx).unwrap();

        let params = front_params();
        let mut target = Framebuffer::new(64, 48);
        target.clear([0.0; 3]);
        drawable.draw(&params, &mut target);
        assert_eq!(drawable.primitive_count(), 0);

        points.add_colored([0.0; 3], [1.0, 0.0, 0.0]);
        drawable.draw(&params, &mut target);
        assert_eq!(drawable.primitive_count(), 0, "staged points are not drawn");

        points.flush();
        drawable.draw(&params, &mut target);
        assert_eq!(drawable.primitive_count(), 1);
        assert_eq!(target.pixel(32, 24), Some([255, 0, 0, 255]));
    }

    #[test]
    fn live_lines_skip_non_finite() {
        let arbiter = ContextArbiter::new();
        let ctx = arbiter.acquire();
        let lines = LineBuffer::new();
        let mut drawable = Box::new(lines.factory()).materialize(&ctx).unwrap();
        lines.add([f32::NAN; 3], [0.0; 3]);
        lines.add_colored([-1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]);
        lines.flush();

        let mut target = Framebuffer::new(64, 48);
        target.clear([0.0; 3]);
        drawable.draw(&front_params(), &mut target);
        assert_eq!(drawable.primitive_count(), 2);
        assert_eq!(target.pixel(32, 24), Some([0, 0, 255, 255]));
    }
}
