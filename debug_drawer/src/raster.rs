//! Point splatting and line rasterization into a [`Framebuffer`].

use glam::Vec4;

use crate::frame::FrameParams;
use crate::target::Framebuffer;
use crate::vertex::{ColoredLine, DebugVertex};

/// Fraction of the squared splat radius past which the rim is darkened.
const RIM_START: f32 = 0.6;
const RIM_SHADE: f32 = 0.1;

#[derive(Debug, Clone, Copy)]
struct ScreenPoint {
    x: f32,
    y: f32,
    /// Window depth in `[0, 1]` when inside the clip volume.
    depth: f32,
    /// Clip-space w (eye distance along the view axis).
    w: f32,
}

fn project(params: &FrameParams, position: [f32; 3]) -> Option<ScreenPoint> {
    let [x, y, z] = position;
    let clip = params.view_projection * Vec4::new(x, y, z, 1.0);
    if clip.w <= 0.0 {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    let width = params.width() as f32;
    let height = params.height() as f32;
    Some(ScreenPoint {
        x: (ndc.x * 0.5 + 0.5) * width,
        y: (0.5 - ndc.y * 0.5) * height,
        depth: ndc.z * 0.5 + 0.5,
        w: clip.w,
    })
}

/// Pixel diameter of a point splat of world size `point_size` at clip depth `w`.
pub fn splat_diameter(params: &FrameParams, point_size: f32, w: f32) -> f32 {
    let diameter = params.pixels_per_unit() * point_size / (w + 5.0 * point_size);
    let limit = params.width().max(params.height()) as f32;
    diameter.max(1.0).min(limit.max(1.0))
}

/// Draws one point as a depth-tested disc.
pub fn splat_point(target: &mut Framebuffer, params: &FrameParams, vertex: &DebugVertex, point_size: f32) {
    let Some(p) = project(params, vertex.position) else {
        return;
    };
    if !(0.0..=1.0).contains(&p.depth) {
        return;
    }

    let radius = (splat_diameter(params, point_size, p.w) * 0.5).max(0.75);
    let r2 = radius * radius;
    let x0 = ((p.x - radius).floor() as i32).max(0);
    let x1 = ((p.x + radius).ceil() as i32).min(target.width() as i32);
    let y0 = ((p.y - radius).floor() as i32).max(0);
    let y1 = ((p.y + radius).ceil() as i32).min(target.height() as i32);

    let rim = vertex.color.map(|c| c * RIM_SHADE);
    for py in y0..y1 {
        for px in x0..x1 {
            let dx = px as f32 + 0.5 - p.x;
            let dy = py as f32 + 0.5 - p.y;
            let d2 = dx * dx + dy * dy;
            if d2 > r2 {
                continue;
            }
            let color = if radius > 2.0 && d2 > RIM_START * r2 { rim } else { vertex.color };
            target.plot(px, py, p.depth, color);
        }
    }
}

/// Draws a one pixel wide segment. Segments with an endpoint behind the
/// eye are skipped.
pub fn draw_segment(target: &mut Framebuffer, params: &FrameParams, line: &ColoredLine) {
    let (Some(a), Some(b)) = (project(params, line.start), project(params, line.end)) else {
        return;
    };
    let Some((t0, t1)) = clip_segment(
        [a.x, a.y],
        [b.x, b.y],
        target.width() as f32,
        target.height() as f32,
    ) else {
        return;
    };

    let lerp = |u: f32, v: f32, t: f32| u + (v - u) * t;
    let (ax, ay) = (lerp(a.x, b.x, t0), lerp(a.y, b.y, t0));
    let (bx, by) = (lerp(a.x, b.x, t1), lerp(a.y, b.y, t1));
    let steps = (bx - ax).abs().max((by - ay).abs()).ceil().max(1.0) as usize;

    for i in 0..=steps {
        let s = i as f32 / steps as f32;
        let depth = lerp(a.depth, b.depth, lerp(t0, t1, s));
        if !(0.0..=1.0).contains(&depth) {
            continue;
        }
        let x = lerp(ax, bx, s).floor() as i32;
        let y = lerp(ay, by, s).floor() as i32;
        target.plot(x, y, depth, line.color);
    }
}

/// Liang-Barsky clip of `a -> b` against `[0, width] x [0, height]`.
/// Returns the visible parameter range.
fn clip_segment(a: [f32; 2], b: [f32; 2], width: f32, height: f32) -> Option<(f32, f32)> {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    for (p, q) in [(-dx, a[0]), (dx, width - a[0]), (-dy, a[1]), (dy, height - a[1])] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}
