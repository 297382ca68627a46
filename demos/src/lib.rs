//! # threedbg Demos
//!
//! Scene generators shared by the demo binaries.
//!
//! ## Available Demos
//!
//! - `orbit_demo`: a simulated particle lattice orbiting the origin, driven
//!   through the execution barrier

use glam::{Quat, Vec3};
use threedbg_drawer::Segment;

/// Demos library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `n * n * n` points filling the cube `[-half, half]^3`.
pub fn lattice(n: usize, half: f32) -> Vec<[f32; 3]> {
    if n == 0 {
        return Vec::new();
    }
    let step = if n > 1 { 2.0 * half / (n - 1) as f32 } else { 0.0 };
    let coord = |i: usize| if n > 1 { -half + step * i as f32 } else { 0.0 };
    let mut points = Vec::with_capacity(n * n * n);
    for x in 0..n {
        for y in 0..n {
            for z in 0..n {
                points.push([coord(x), coord(y), coord(z)]);
            }
        }
    }
    points
}

/// Rotates `points` about the Z axis by `angle` radians.
pub fn spin(points: &[[f32; 3]], angle: f32) -> Vec<[f32; 3]> {
    let rotation = Quat::from_rotation_z(angle);
    points
        .iter()
        .map(|&p| (rotation * Vec3::from_array(p)).to_array())
        .collect()
}

/// Polyline through `turns` turns of a helix of `radius` and `height`.
pub fn helix(turns: f32, radius: f32, height: f32, segments: usize) -> Vec<Segment> {
    let point = |i: usize| {
        let t = i as f32 / segments.max(1) as f32;
        let angle = t * turns * std::f32::consts::TAU;
        [radius * angle.cos(), radius * angle.sin(), height * (t - 0.5)]
    };
    (0..segments).map(|i| [point(i), point(i + 1)]).collect()
}
