use glam::Mat4;
use threedbg_core::camera::Camera;

/// Per-frame parameters handed to every [`Drawable`](crate::Drawable).
#[derive(Debug, Clone, Copy)]
pub struct FrameParams {
    /// Column-major view-projection matrix (OpenGL depth range).
    pub view_projection: Mat4,
    /// Camera the matrix was built from.
    pub camera: Camera,
    /// Viewport size in pixels, `[width, height]`.
    pub viewport: [u32; 2],
}

impl FrameParams {
    pub fn new(camera: &Camera, viewport: [u32; 2]) -> Self {
        let aspect = viewport[0].max(1) as f32 / viewport[1].max(1) as f32;
        Self {
            view_projection: camera.view_projection(aspect),
            camera: *camera,
            viewport,
        }
    }

    pub fn width(&self) -> u32 {
        self.viewport[0]
    }

    pub fn height(&self) -> u32 {
        self.viewport[1]
    }

    /// Screen pixels covered by one world unit at unit clip depth.
    pub fn pixels_per_unit(&self) -> f32 {
        self.viewport[1] as f32 / self.camera.fovy
    }
}
