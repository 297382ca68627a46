//! Drawables for threedbg.
//!
//! Producers describe geometry on any thread as a [`DrawableFactory`]; the
//! render thread materializes pending factories while it holds the rendering
//! context and draws the resulting [`Drawable`]s into a [`Framebuffer`].
//!
//! # Architecture
//!
//! - [`PointsFactory`] / [`LinesFactory`]: one-shot geometry descriptions
//! - [`PointBuffer`] / [`LineBuffer`]: live, double-buffered geometry the
//!   render thread re-reads every frame
//! - [`MaterializationQueue`]: name-keyed pending factories
//! - [`DrawableRegistry`]: materialized drawables in draw order
//!
//! # Usage
//!
//! ```ignore
//! // Any thread:
//! let mut cloud = PointsFactory::new();
//! cloud.add_points(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
//! queue.submit("cloud", Box::new(cloud));
//!
//! // Render thread, each frame:
//! let ctx = arbiter.acquire();
//! queue.drain_and_materialize(&ctx, &mut registry);
//! target.clear(background);
//! registry.draw_all(&FrameParams::new(&camera, [width, height]), &mut target);
//! ```

mod draw_api;
mod drawable;
mod drawer;
mod frame;
mod lines;
mod points;
mod queue;
mod raster;
mod registry;
mod target;
mod vertex;

pub use draw_api::{AXIS_COLORS, Segment, aabb_edges, axes, cross};
pub use drawable::{Drawable, DrawableFactory, MaterializeError, factory_fn};
pub use drawer::{LineBuffer, LineContext, LiveLinesFactory, LivePointsFactory, PointBuffer};
pub use frame::FrameParams;
pub use lines::{LinesDrawable, LinesFactory};
pub use points::{DEFAULT_POINT_SIZE, PointsDrawable, PointsFactory};
pub use queue::{DrainReport, MaterializationQueue};
pub use raster::{draw_segment, splat_diameter, splat_point};
pub use registry::DrawableRegistry;
pub use target::Framebuffer;
pub use vertex::{ColoredLine, DebugVertex};

/// Drawer library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the drawer crate version.
pub fn init() {
    log::info!("threedbg drawer v{} initialized", VERSION);
}
