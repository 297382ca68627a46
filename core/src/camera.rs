//! Orbit camera

use glam::{Mat4, Quat, Vec3};

/// Smallest eye-to-center distance used for clip planes.
const MIN_DISTANCE: f32 = 1e-3;

/// Camera orbiting a center point.
///
/// Plain data: producers copy it in and out of the viewer to save and
/// restore a view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub center: Vec3,
    /// Unit up vector.
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fovy: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(3.0, 2.0, 1.0),
            center: Vec3::ZERO,
            up: Vec3::Z,
            fovy: 1.0,
        }
    }
}

impl Camera {
    pub fn new(eye: Vec3, center: Vec3) -> Self {
        Self {
            eye,
            center,
            ..Default::default()
        }
    }

    pub fn with_up(mut self, up: Vec3) -> Self {
        self.set_up(up);
        self
    }

    pub fn with_fovy(mut self, fovy: f32) -> Self {
        self.fovy = fovy;
        self
    }

    /// Sets the up vector, normalized.
    pub fn set_up(&mut self, up: Vec3) {
        self.up = up.normalize_or_zero();
        if self.up == Vec3::ZERO {
            self.up = Vec3::Z;
        }
    }

    /// Distance from eye to center.
    pub fn distance(&self) -> f32 {
        (self.eye - self.center).length()
    }

    /// Unit vector from eye towards center.
    pub fn direction(&self) -> Vec3 {
        (self.center - self.eye).normalize_or_zero()
    }

    /// Unit vector pointing right on screen.
    pub fn right(&self) -> Vec3 {
        self.direction().cross(self.up).normalize_or_zero()
    }

    /// Unit vector pointing up on screen.
    pub fn top(&self) -> Vec3 {
        self.right().cross(self.direction()).normalize_or_zero()
    }

    /// View matrix (right-handed look-at).
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.center, self.up)
    }

    /// Projection matrix with clip planes scaled to the orbit distance.
    ///
    /// Uses the OpenGL depth range `[-1, 1]`.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let dist = self.distance().max(MIN_DISTANCE);
        Mat4::perspective_rh_gl(self.fovy, aspect, 0.02 * dist, 50.0 * dist)
    }

    /// Combined view-projection matrix.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    /// Orbits the eye around the center.
    ///
    /// `horizontal` rotates about the up axis (radians), `vertical` tilts the
    /// view direction along up.
    pub fn rotate_eye(&mut self, horizontal: f32, vertical: f32) {
        let dist = self.distance();
        let dir = (self.eye - self.center).normalize_or_zero();
        let dir = Quat::from_axis_angle(self.up, horizontal) * dir + vertical * self.up;
        let dir = dir.normalize_or_zero();
        if dir != Vec3::ZERO {
            self.eye = self.center + dist * dir;
        }
    }

    /// Swings the center around the eye (looking around in place).
    pub fn rotate_center(&mut self, horizontal: f32, vertical: f32) {
        let dist = self.distance();
        let dir = (self.center - self.eye).normalize_or_zero();
        let dir = Quat::from_axis_angle(self.up, horizontal) * dir + vertical * self.up;
        let dir = dir.normalize_or_zero();
        if dir != Vec3::ZERO {
            self.center = self.eye + dist * dir;
        }
    }

    /// Pans eye and center together, in units of the visible half-height.
    pub fn translate(&mut self, right: f32, up: f32) {
        let scale = self.distance() * (self.fovy * 0.5).tan();
        let offset = (self.right() * right + self.top() * up) * scale;
        self.eye += offset;
        self.center += offset;
    }

    /// Moves the eye towards (`amount > 0`) or away from the center.
    ///
    /// The eye never reaches or passes the center.
    pub fn zoom(&mut self, amount: f32) {
        let factor = (1.0 - amount).max(0.05);
        self.eye = self.center + (self.eye - self.center) * factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn center_projects_to_screen_center() {
        let camera = Camera::default();
        let clip = camera.view_projection(4.0 / 3.0) * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.w > 0.0);
        assert!(approx(clip.x / clip.w, 0.0));
        assert!(approx(clip.y / clip.w, 0.0));
        let depth = clip.z / clip.w;
        assert!((-1.0..=1.0).contains(&depth));
    }

    #[test]
    fn rotate_eye_keeps_distance() {
        let mut camera = Camera::default();
        let before = camera.distance();
        camera.rotate_eye(0.7, 0.2);
        assert!(approx(camera.distance(), before));
        assert_eq!(camera.center, Vec3::ZERO);
    }

    #[test]
    fn translate_moves_eye_and_center_together() {
        let mut camera = Camera::default();
        let before = camera.eye - camera.center;
        camera.translate(0.5, -0.25);
        let after = camera.eye - camera.center;
        assert!((before - after).length() < 1e-4);
        assert_ne!(camera.center, Vec3::ZERO);
    }

    #[test]
    fn zoom_never_crosses_center() {
        let mut camera = Camera::default();
        camera.zoom(5.0);
        assert!(camera.distance() > 0.0);
        assert!((camera.eye - camera.center).dot(Vec3::new(3.0, 2.0, 1.0)) > 0.0);
    }

    #[test]
    fn set_up_normalizes() {
        let camera = Camera::default().with_up(Vec3::new(0.0, 0.0, 5.0));
        assert!(approx(camera.up.length(), 1.0));
        let degenerate = Camera::default().with_up(Vec3::ZERO);
        assert_eq!(degenerate.up, Vec3::Z);
    }
}
