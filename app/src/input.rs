//! Input conversion utilities.
//!
//! Maps [`SurfaceEvent`]s to orbit camera movements.

use threedbg_core::camera::Camera;

use crate::surface::{MouseButton, SurfaceEvent};

/// Mouse-driven orbit controls.
///
/// Left drag orbits the eye, right drag pans, middle drag looks around in
/// place, the wheel zooms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitControls {
    /// Radians per dragged pixel.
    pub rotate_speed: f32,
    /// Zoom fraction per wheel line.
    pub zoom_step: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            rotate_speed: 0.01,
            zoom_step: 0.1,
        }
    }
}

impl OrbitControls {
    /// Applies `event` to `camera`. Returns true if the camera moved.
    pub fn apply(&self, camera: &mut Camera, event: &SurfaceEvent, viewport_height: u32) -> bool {
        match *event {
            SurfaceEvent::Drag { button, dx, dy } => {
                match button {
                    MouseButton::Left => {
                        camera.rotate_eye(-dx * self.rotate_speed, dy * self.rotate_speed)
                    }
                    MouseButton::Middle => {
                        camera.rotate_center(-dx * self.rotate_speed, -dy * self.rotate_speed)
                    }
                    MouseButton::Right => {
                        // One half-height of drag pans one visible half-height.
                        let half = viewport_height.max(1) as f32 * 0.5;
                        camera.translate(-dx / half, dy / half);
                    }
                }
                true
            }
            SurfaceEvent::Scroll(lines) => {
                camera.zoom(lines * self.zoom_step);
                true
            }
            _ => false,
        }
    }
}
