use threedbg_core::color::Rgb;

/// A point vertex: position + color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 3],
    pub color: Rgb,
}

impl DebugVertex {
    pub fn new(position: [f32; 3], color: Rgb) -> Self {
        Self { position, color }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
    }
}

/// A line segment with a single color.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColoredLine {
    pub start: [f32; 3],
    pub end: [f32; 3],
    pub color: Rgb,
}

impl ColoredLine {
    pub fn new(start: [f32; 3], end: [f32; 3], color: Rgb) -> Self {
        Self { start, end, color }
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.start.iter().chain(self.end.iter()).all(|c| c.is_finite())
    }
}
