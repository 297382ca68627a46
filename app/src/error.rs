//! Error types for surfaces and the viewer subsystem.

use thiserror::Error;

/// Errors reported by a [`Surface`](crate::Surface) implementation.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("surface creation failed: {0}")]
    CreationFailed(String),

    #[error("surface lost")]
    Lost,
}

/// Errors returned by [`Viewer::start`](crate::Viewer::start).
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("surface initialization failed: {0}")]
    SurfaceInit(#[from] SurfaceError),

    #[error("failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("render thread exited before signalling readiness")]
    RenderThreadExited,
}
