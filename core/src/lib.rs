//! # threedbg Core
//!
//! Thread-safe building blocks shared by the render thread and any number of
//! producer threads:
//!
//! - [`sync::ContextArbiter`]: FIFO-fair exclusive ownership of the rendering context
//! - [`sync::ExecutionBarrier`]: run/pause/step rendezvous for simulation threads
//! - [`scene::SceneBuffer`]: staged/published double buffer of primitives
//! - [`camera::Camera`]: orbit camera producing view-projection matrices
//! - [`color`]: reproducible default colors for uncolored primitives

pub mod camera;
pub mod color;
pub mod scene;
pub mod sync;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core crate version.
pub fn init() {
    log::info!("threedbg core v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
