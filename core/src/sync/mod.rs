//! Blocking synchronization primitives for the render/producer split.
//!
//! - [`ContextArbiter`]: Exclusive, FIFO-ordered ownership of the rendering context
//! - [`ContextGuard`]: Scoped context ownership, released on drop
//! - [`ExecutionBarrier`]: Rendezvous point with run/pause/step control
//! - [`TimingRing`]: Bounded ring of recent durations for telemetry
//!
//! None of these hold their internal lock while blocking on another one, so
//! they can be combined in any order without lock cycles.

mod arbiter;
mod barrier;
mod timing;

pub use arbiter::{ContextArbiter, ContextGuard};
pub use barrier::{DEFAULT_TELEMETRY_CAPACITY, ExecutionBarrier, ExecutionMode};
pub use timing::TimingRing;
