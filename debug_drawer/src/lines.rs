use threedbg_core::color::{Rgb, default_line_color};
use threedbg_core::sync::ContextGuard;

use crate::draw_api::{self, Segment};
use crate::drawable::{Drawable, DrawableFactory, MaterializeError};
use crate::frame::FrameParams;
use crate::raster;
use crate::target::Framebuffer;
use crate::vertex::ColoredLine;

/// Line set description.
#[derive(Debug, Clone, Default)]
pub struct LinesFactory {
    segments: Vec<Segment>,
    colors: Vec<Rgb>,
}

impl LinesFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a factory from parallel segment and color arrays.
    pub fn from_parts(segments: Vec<Segment>, colors: Vec<Rgb>) -> Self {
        Self { segments, colors }
    }

    /// Adds a line with its default color.
    pub fn add_line(&mut self, start: [f32; 3], end: [f32; 3]) -> &mut Self {
        let color = default_line_color(self.segments.len());
        self.add_colored_line(start, end, color)
    }

    pub fn add_colored_line(&mut self, start: [f32; 3], end: [f32; 3], color: Rgb) -> &mut Self {
        self.segments.push([start, end]);
        self.colors.push(color);
        self
    }

    /// Adds a batch of lines sharing one default color.
    pub fn add_lines(&mut self, segments: &[Segment]) -> &mut Self {
        let color = default_line_color(self.segments.len());
        for &[start, end] in segments {
            self.add_colored_line(start, end, color);
        }
        self
    }

    pub fn add_aabb(&mut self, min: [f32; 3], max: [f32; 3], color: Rgb) -> &mut Self {
        for [start, end] in draw_api::aabb_edges(min, max) {
            self.add_colored_line(start, end, color);
        }
        self
    }

    pub fn add_axes(&mut self, origin: [f32; 3], length: f32) -> &mut Self {
        for line in draw_api::axes(origin, length) {
            self.add_colored_line(line.start, line.end, line.color);
        }
        self
    }

    pub fn add_cross(&mut self, center: [f32; 3], half_size: f32, color: Rgb) -> &mut Self {
        for [start, end] in draw_api::cross(center, half_size) {
            self.add_colored_line(start, end, color);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl DrawableFactory for LinesFactory {
    fn materialize(self: Box<Self>, _ctx: &ContextGuard<'_>) -> Result<Box<dyn Drawable>, MaterializeError> {
        if self.segments.len() != self.colors.len() {
            return Err(MaterializeError::LengthMismatch {
                positions: self.segments.len(),
                colors: self.colors.len(),
            });
        }
        let lines: Vec<ColoredLine> = self
            .segments
            .iter()
            .zip(&self.colors)
            .map(|(&[start, end], &color)| ColoredLine::new(start, end, color))
            .collect();
        if let Some(index) = lines.iter().position(|l| !l.is_finite()) {
            return Err(MaterializeError::NonFinite { index });
        }
        log::debug!("Uploaded {} lines", lines.len());
        Ok(Box::new(LinesDrawable { lines }))
    }
}

/// Uploaded line set.
#[derive(Debug)]
pub struct LinesDrawable {
    lines: Vec<ColoredLine>,
}

impl Drawable for LinesDrawable {
    fn draw(&mut self, params: &FrameParams, target: &mut Framebuffer) {
        for line in &self.lines {
            raster::draw_segment(target, params, line);
        }
    }

    fn primitive_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threedbg_core::sync::ContextArbiter;

    #[test]
    fn batch_shares_one_color() {
        let mut factory = LinesFactory::new();
        factory.add_line([0.0; 3], [1.0; 3]);
        factory.add_lines(&[[[0.0; 3], [2.0; 3]], [[0.0; 3], [3.0; 3]]]);
        assert_eq!(factory.colors[0], default_line_color(0));
        assert_eq!(factory.colors[1], default_line_color(1));
        assert_eq!(factory.colors[2], default_line_color(1));
    }

    #[test]
    fn shapes_expand_to_segments() {
        let mut factory = LinesFactory::new();
        factory.add_aabb([0.0; 3], [1.0; 3], [1.0; 3]).add_axes([0.0; 3], 1.0);
        assert_eq!(factory.len(), 15);
    }

    #[test]
    fn materialize_checks_lengths_and_values() {
        let arbiter = ContextArbiter::new();
        let ctx = arbiter.acquire();

        let mismatched = LinesFactory::from_parts(vec![[[0.0; 3], [1.0; 3]]], vec![]);
        assert_eq!(
            Box::new(mismatched).materialize(&ctx).err(),
            Some(MaterializeError::LengthMismatch { positions: 1, colors: 0 })
        );

        let mut infinite = LinesFactory::new();
        infinite.add_line([0.0; 3], [f32::INFINITY, 0.0, 0.0]);
        assert_eq!(
            Box::new(infinite).materialize(&ctx).err(),
            Some(MaterializeError::NonFinite { index: 0 })
        );
    }
}
