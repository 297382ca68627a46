//! Presentation surface abstraction.
//!
//! A [`Surface`] is created on the render thread by a [`SurfaceFactory`]
//! and never leaves it.

use threedbg_drawer::Framebuffer;

use crate::error::SurfaceError;

/// Mouse buttons that drive the orbit controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input and window events delivered by [`Surface::poll_events`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// New framebuffer size in pixels.
    Resized { width: u32, height: u32 },
    CloseRequested,
    /// A typed character.
    Char(char),
    /// Cursor moved by `(dx, dy)` pixels with `button` held.
    Drag { button: MouseButton, dx: f32, dy: f32 },
    /// Wheel movement in lines; positive scrolls away from the user.
    Scroll(f32),
}

/// A window or offscreen target the render loop presents to.
pub trait Surface {
    /// Current size in pixels.
    fn size(&self) -> (u32, u32);

    /// Returns the events received since the last call.
    fn poll_events(&mut self) -> Vec<SurfaceEvent>;

    /// Presents a finished frame. May block (vsync).
    fn swap_buffers(&mut self, frame: &Framebuffer) -> Result<(), SurfaceError>;

    fn should_close(&self) -> bool;

    fn request_close(&mut self);
}

/// Creates a [`Surface`] on the render thread.
pub trait SurfaceFactory: Send + 'static {
    type Surface: Surface;

    fn create(self, width: u32, height: u32, title: &str) -> Result<Self::Surface, SurfaceError>;
}
