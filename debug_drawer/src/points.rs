use threedbg_core::color::{Rgb, default_point_color};
use threedbg_core::sync::ContextGuard;

use crate::drawable::{Drawable, DrawableFactory, MaterializeError};
use crate::frame::FrameParams;
use crate::raster;
use crate::target::Framebuffer;
use crate::vertex::DebugVertex;

/// World-space size of a point splat.
pub const DEFAULT_POINT_SIZE: f32 = 0.05;

/// Point cloud description.
///
/// Positions and colors are validated when the factory is materialized.
#[derive(Debug, Clone)]
pub struct PointsFactory {
    positions: Vec<[f32; 3]>,
    colors: Vec<Rgb>,
    point_size: f32,
}

impl Default for PointsFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl PointsFactory {
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            colors: Vec::new(),
            point_size: DEFAULT_POINT_SIZE,
        }
    }

    /// Builds a factory from parallel position and color arrays.
    pub fn from_parts(positions: Vec<[f32; 3]>, colors: Vec<Rgb>) -> Self {
        Self {
            positions,
            colors,
            ..Self::new()
        }
    }

    pub fn with_point_size(mut self, point_size: f32) -> Self {
        self.point_size = point_size;
        self
    }

    /// Adds a point with its default color.
    pub fn add_point(&mut self, position: [f32; 3]) -> &mut Self {
        let color = default_point_color(self.positions.len());
        self.add_colored_point(position, color)
    }

    pub fn add_colored_point(&mut self, position: [f32; 3], color: Rgb) -> &mut Self {
        self.positions.push(position);
        self.colors.push(color);
        self
    }

    /// Adds points with default colors.
    pub fn add_points(&mut self, positions: &[[f32; 3]]) -> &mut Self {
        for &p in positions {
            self.add_point(p);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl DrawableFactory for PointsFactory {
    fn materialize(self: Box<Self>, _ctx: &ContextGuard<'_>) -> Result<Box<dyn Drawable>, MaterializeError> {
        if self.positions.len() != self.colors.len() {
            return Err(MaterializeError::LengthMismatch {
                positions: self.positions.len(),
                colors: self.colors.len(),
            });
        }
        let vertices: Vec<DebugVertex> = self
            .positions
            .iter()
            .zip(&self.colors)
            .map(|(&p, &c)| DebugVertex::new(p, c))
            .collect();
        if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(MaterializeError::NonFinite { index });
        }
        log::debug!(
            "Uploaded {} points ({} bytes)",
            vertices.len(),
            std::mem::size_of_val(vertices.as_slice())
        );
        Ok(Box::new(PointsDrawable {
            vertices,
            point_size: self.point_size,
        }))
    }
}

/// Uploaded point cloud.
#[derive(Debug)]
pub struct PointsDrawable {
    vertices: Vec<DebugVertex>,
    point_size: f32,
}

impl PointsDrawable {
    pub fn vertices(&self) -> &[DebugVertex] {
        &self.vertices
    }
}

impl Drawable for PointsDrawable {
    fn draw(&mut self, params: &FrameParams, target: &mut Framebuffer) {
        for vertex in &self.vertices {
            raster::splat_point(target, params, vertex, self.point_size);
        }
    }

    fn primitive_count(&self) -> usize {
        self.vertices.len()
    }
}
