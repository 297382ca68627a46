use threedbg_core::camera::Camera;
use threedbg_core::color::Rgb;
use threedbg_core::sync::DEFAULT_TELEMETRY_CAPACITY;
use threedbg_drawer::DEFAULT_POINT_SIZE;

/// Viewer settings.
///
/// # Example
///
/// ```ignore
/// let config = ViewerConfig::new()
///     .with_title("particles")
///     .with_size(800, 600)
///     .with_frame_rate(30);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Target frames per second; 0 renders as fast as presents allow.
    pub frame_rate: u32,
    pub clear_color: Rgb,
    /// Number of samples kept by the barrier and frame telemetry rings.
    pub telemetry_capacity: usize,
    /// World-space size of the live scene points.
    pub point_size: f32,
    pub camera: Camera,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "3d debug".to_string(),
            width: 1280,
            height: 720,
            frame_rate: 60,
            clear_color: [0.9, 0.9, 0.9],
            telemetry_capacity: DEFAULT_TELEMETRY_CAPACITY,
            point_size: DEFAULT_POINT_SIZE,
            camera: Camera::default(),
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn with_clear_color(mut self, clear_color: Rgb) -> Self {
        self.clear_color = clear_color;
        self
    }

    pub fn with_telemetry_capacity(mut self, capacity: usize) -> Self {
        self.telemetry_capacity = capacity;
        self
    }

    pub fn with_point_size(mut self, point_size: f32) -> Self {
        self.point_size = point_size;
        self
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.title, "3d debug");
        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.frame_rate, 60);
        assert_eq!(config.telemetry_capacity, 50);
    }

    #[test]
    fn builder_overrides() {
        let config = ViewerConfig::new()
            .with_title("t")
            .with_size(64, 48)
            .with_frame_rate(0)
            .with_point_size(0.5);
        assert_eq!(config.title, "t");
        assert_eq!((config.width, config.height), (64, 48));
        assert_eq!(config.frame_rate, 0);
        assert_eq!(config.point_size, 0.5);
    }
}
