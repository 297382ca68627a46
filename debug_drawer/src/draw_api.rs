//! Line shapes shared by [`LinesFactory`](crate::LinesFactory) and
//! [`LineBuffer`](crate::LineBuffer).

use threedbg_core::color::Rgb;

use crate::vertex::ColoredLine;

/// A segment as `[start, end]`.
pub type Segment = [[f32; 3]; 2];

/// Corner index pairs of the 12 box edges: bottom face, top face, verticals.
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Axis colors: x red, y green, z blue.
pub const AXIS_COLORS: [Rgb; 3] = [[1.0, 0.0, 0.0], [0.0, 0.8, 0.0], [0.0, 0.0, 1.0]];

/// The 12 edges of the axis-aligned box spanned by `min` and `max`.
pub fn aabb_edges(min: [f32; 3], max: [f32; 3]) -> [Segment; 12] {
    let c = [
        [min[0], min[1], min[2]],
        [max[0], min[1], min[2]],
        [max[0], max[1], min[2]],
        [min[0], max[1], min[2]],
        [min[0], min[1], max[2]],
        [max[0], min[1], max[2]],
        [max[0], max[1], max[2]],
        [min[0], max[1], max[2]],
    ];
    BOX_EDGES.map(|(a, b)| [c[a], c[b]])
}

/// Three axis arrows of `length` starting at `origin`.
pub fn axes(origin: [f32; 3], length: f32) -> [ColoredLine; 3] {
    std::array::from_fn(|axis| {
        let mut end = origin;
        end[axis] += length;
        ColoredLine::new(origin, end, AXIS_COLORS[axis])
    })
}

/// Three axis-aligned segments crossing at `center`.
pub fn cross(center: [f32; 3], half_size: f32) -> [Segment; 3] {
    std::array::from_fn(|axis| {
        let mut start = center;
        let mut end = center;
        start[axis] -= half_size;
        end[axis] += half_size;
        [start, end]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_has_twelve_unit_edges() {
        let edges = aabb_edges([0.0; 3], [1.0; 3]);
        for [a, b] in edges {
            let len: f32 = (0..3).map(|i| (b[i] - a[i]).powi(2)).sum::<f32>().sqrt();
            assert!((len - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn axes_point_along_each_axis() {
        let lines = axes([1.0, 1.0, 1.0], 2.0);
        assert_eq!(lines[0].end, [3.0, 1.0, 1.0]);
        assert_eq!(lines[1].end, [1.0, 3.0, 1.0]);
        assert_eq!(lines[2].end, [1.0, 1.0, 3.0]);
        assert_eq!(lines[2].color, AXIS_COLORS[2]);
    }

    #[test]
    fn cross_is_centered() {
        for [a, b] in cross([0.5, 0.0, -0.5], 0.25) {
            let mid: Vec<f32> = (0..3).map(|i| (a[i] + b[i]) * 0.5).collect();
            assert_eq!(mid, vec![0.5, 0.0, -0.5]);
        }
    }
}
