use thiserror::Error;
use threedbg_core::sync::ContextGuard;

use crate::frame::FrameParams;
use crate::target::Framebuffer;

/// Errors raised while turning a factory into a drawable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterializeError {
    #[error("{positions} positions but {colors} colors")]
    LengthMismatch { positions: usize, colors: usize },

    #[error("non-finite coordinate in primitive {index}")]
    NonFinite { index: usize },

    #[error("resource creation failed: {0}")]
    Backend(String),
}

/// A render-ready object. Only ever touched on the render thread.
pub trait Drawable {
    /// Renders into `target` with the current frame's camera.
    fn draw(&mut self, params: &FrameParams, target: &mut Framebuffer);

    /// Number of primitives uploaded, for diagnostics.
    fn primitive_count(&self) -> usize {
        0
    }
}

/// A deferred description of a [`Drawable`].
///
/// Built on any thread, then consumed on the thread that holds the rendering
/// context. The guard argument is proof of that.
pub trait DrawableFactory: Send {
    fn materialize(self: Box<Self>, ctx: &ContextGuard<'_>) -> Result<Box<dyn Drawable>, MaterializeError>;
}

impl<F> DrawableFactory for F
where
    F: FnOnce(&ContextGuard<'_>) -> Result<Box<dyn Drawable>, MaterializeError> + Send,
{
    fn materialize(self: Box<Self>, ctx: &ContextGuard<'_>) -> Result<Box<dyn Drawable>, MaterializeError> {
        (*self)(ctx)
    }
}

/// Boxes a closure as a factory.
pub fn factory_fn<F>(f: F) -> Box<dyn DrawableFactory>
where
    F: FnOnce(&ContextGuard<'_>) -> Result<Box<dyn Drawable>, MaterializeError> + Send + 'static,
{
    Box::new(f)
}
