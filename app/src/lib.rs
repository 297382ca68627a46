//! # threedbg App
//!
//! Runs the render thread of the live debug viewer and hands producers a
//! thread-safe API to it.
//!
//! ## Overview
//!
//! - [`Viewer`]: owns the render thread; `start` / `stop`
//! - [`ViewerHandle`]: producer API (geometry, camera, pause/step, snapshots)
//! - [`Surface`] / [`SurfaceFactory`]: where frames are presented
//! - [`HeadlessSurfaceFactory`]: in-memory surface for tests and CI
//! - [`ViewerConfig`] / [`ViewerArgs`]: settings and their CLI form
//!
//! ## Example
//!
//! ```ignore
//! use threedbg_app::{HeadlessSurfaceFactory, Viewer, ViewerConfig};
//!
//! let viewer = Viewer::start(ViewerConfig::default(), HeadlessSurfaceFactory::new())?;
//! let producer = viewer.handle();
//! std::thread::spawn(move || {
//!     while producer.is_running() {
//!         producer.points().clear();
//!         producer.points().add([0.0, 0.0, 0.0]);
//!         producer.points().flush();
//!         producer.barrier();
//!     }
//! });
//! viewer.stop(true);
//! ```

mod args;
mod config;
mod error;
mod headless;
mod input;
mod pacing;
mod render_loop;
mod surface;
mod viewer;

pub use args::{StartMode, ViewerArgs};
pub use config::ViewerConfig;
pub use error::{SurfaceError, ViewerError};
pub use headless::{HeadlessHandle, HeadlessSurface, HeadlessSurfaceFactory};
pub use input::OrbitControls;
pub use pacing::{FramePacer, next_deadline};
pub use render_loop::{FrameStats, LoopState};
pub use surface::{MouseButton, Surface, SurfaceEvent, SurfaceFactory};
pub use viewer::{SCENE_LINES, SCENE_POINTS, Viewer, ViewerHandle};

/// App library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the app subsystem.
///
/// Logs the version of every threedbg crate.
pub fn init() {
    threedbg_core::init();
    threedbg_drawer::init();
    log::info!("threedbg app v{} initialized", VERSION);
}

/// Installs `env_logger` (default filter `info`) and calls [`init`].
///
/// Safe to call more than once; later calls keep the first logger.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
    init();
}
