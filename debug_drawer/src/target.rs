//! Software render target.

use threedbg_core::color::Rgb;

/// Depth-tested RGBA8 color buffer.
///
/// Stands in for the bound framebuffer of a GPU context: drawables render
/// into it on the render thread and surfaces present it.
#[derive(Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<[u8; 4]>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            color: vec![[0, 0, 0, 255]; len],
            depth: vec![f32::INFINITY; len],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocates for a new size. No-op when the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        *self = Self::new(width, height);
    }

    /// Fills color with `color` and resets depth.
    pub fn clear(&mut self, color: Rgb) {
        let rgba = to_rgba8(color);
        self.color.fill(rgba);
        self.depth.fill(f32::INFINITY);
    }

    /// Writes a fragment if it is inside the target and closer than the
    /// stored depth. Returns whether it was written.
    pub fn plot(&mut self, x: i32, y: i32, depth: f32, color: Rgb) -> bool {
        let Some(index) = self.index(x, y) else {
            return false;
        };
        if depth >= self.depth[index] {
            return false;
        }
        self.depth[index] = depth;
        self.color[index] = to_rgba8(color);
        true
    }

    /// Color at `(x, y)`, origin top-left.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.index(x as i32, y as i32).map(|i| self.color[i])
    }

    /// Depth at `(x, y)`; `f32::INFINITY` where nothing was drawn.
    pub fn depth(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x as i32, y as i32).map(|i| self.depth[i])
    }

    /// Row-major RGBA8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.color)
    }

    /// Copies the color buffer into an image.
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.as_bytes().to_vec())
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

fn to_rgba8(color: Rgb) -> [u8; 4] {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(color[0]), channel(color[1]), channel(color[2]), 255]
}
