//! The viewer subsystem handle.

use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use threedbg_core::camera::Camera;
use threedbg_core::color::Rgb;
use threedbg_core::sync::{ContextGuard, ExecutionBarrier, ExecutionMode};
use threedbg_drawer::{DrawableFactory, LineBuffer, LinesFactory, PointBuffer, PointsFactory, Segment};

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::render_loop::{self, Command, FrameStats, LoopState, Shared};
use crate::surface::SurfaceFactory;

/// Registry name of the live [`PointBuffer`].
pub const SCENE_POINTS: &str = "scene/points";
/// Registry name of the live [`LineBuffer`].
pub const SCENE_LINES: &str = "scene/lines";

/// Producer-side API. Cheap to clone and safe to use from any thread.
///
/// Calls made after the render loop stopped are ignored and report
/// `false` / `None`.
#[derive(Clone)]
pub struct ViewerHandle {
    shared: Arc<Shared>,
    commands: Sender<Command>,
}

impl ViewerHandle {
    pub fn is_running(&self) -> bool {
        self.shared.state() == LoopState::Running
    }

    pub fn state(&self) -> LoopState {
        self.shared.state()
    }

    /// Queues a factory for materialization under `name`.
    ///
    /// Returns false if the viewer is no longer running.
    pub fn submit(&self, name: impl Into<String>, factory: Box<dyn DrawableFactory>) -> bool {
        let name = name.into();
        if !self.is_running() {
            log::warn!("Viewer not running; dropping submission '{}'", name);
            return false;
        }
        self.shared.queue.submit(name, factory);
        true
    }

    /// Submits a point cloud. Without colors, points get default colors.
    pub fn submit_points(&self, name: impl Into<String>, positions: &[[f32; 3]], colors: Option<&[Rgb]>) -> bool {
        let factory = match colors {
            Some(colors) => PointsFactory::from_parts(positions.to_vec(), colors.to_vec()),
            None => {
                let mut factory = PointsFactory::new();
                factory.add_points(positions);
                factory
            }
        };
        self.submit(name, Box::new(factory.with_point_size(self.shared.point_size)))
    }

    /// Submits a line set. Without colors, lines share one default color.
    pub fn submit_lines(&self, name: impl Into<String>, segments: &[Segment], colors: Option<&[Rgb]>) -> bool {
        let factory = match colors {
            Some(colors) => LinesFactory::from_parts(segments.to_vec(), colors.to_vec()),
            None => {
                let mut factory = LinesFactory::new();
                factory.add_lines(segments);
                factory
            }
        };
        self.submit(name, Box::new(factory))
    }

    /// Live point buffer drawn as [`SCENE_POINTS`].
    pub fn points(&self) -> &PointBuffer {
        &self.shared.points
    }

    /// Live line buffer drawn as [`SCENE_LINES`].
    pub fn lines(&self) -> &LineBuffer {
        &self.shared.lines
    }

    pub fn camera(&self) -> Camera {
        *self.shared.camera.lock()
    }

    pub fn set_camera(&self, camera: Camera) {
        *self.shared.camera.lock() = camera;
    }

    /// Modifies the camera in place, atomically with respect to input.
    pub fn update_camera(&self, f: impl FnOnce(&mut Camera)) {
        f(&mut self.shared.camera.lock());
    }

    /// Rendezvous with the execution controller.
    ///
    /// Blocks while paused; see [`ExecutionBarrier::barrier`].
    pub fn barrier(&self) {
        self.shared.barrier.barrier();
    }

    pub fn pause(&self) {
        self.shared.barrier.pause();
    }

    pub fn resume(&self) {
        self.shared.barrier.resume();
    }

    pub fn step(&self) {
        self.shared.barrier.step();
    }

    pub fn mode(&self) -> ExecutionMode {
        self.shared.barrier.mode()
    }

    pub fn set_mode(&self, mode: ExecutionMode) {
        self.shared.barrier.set_mode(mode);
    }

    /// The execution barrier, for telemetry and waiting on arrivals.
    pub fn execution(&self) -> &ExecutionBarrier {
        &self.shared.barrier
    }

    /// Shows or hides a drawable from the next frame on.
    pub fn set_enabled(&self, name: impl Into<String>, enabled: bool) -> bool {
        self.send(Command::SetEnabled {
            name: name.into(),
            enabled,
        })
    }

    /// Drops a drawable on the render thread.
    pub fn remove(&self, name: impl Into<String>) -> bool {
        self.send(Command::Remove(name.into()))
    }

    /// Registered drawables with their enabled flags, in draw order.
    ///
    /// Waits for the render thread's next frame. Returns `None` once stopped
    /// or when the calling thread holds the rendering context.
    pub fn drawables(&self) -> Option<Vec<(String, bool)>> {
        let (reply, response) = crossbeam_channel::bounded(1);
        if !self.request(Command::ListDrawables(reply)) {
            return None;
        }
        response.recv().ok()
    }

    /// Copy of the last presented frame.
    ///
    /// Waits for the render thread's next frame. Returns `None` before the
    /// first present, once stopped, or when the calling thread holds the
    /// rendering context.
    pub fn snapshot_image(&self) -> Option<image::RgbaImage> {
        let (reply, response) = crossbeam_channel::bounded(1);
        if !self.request(Command::Snapshot(reply)) {
            return None;
        }
        response.recv().ok().flatten()
    }

    /// Last character typed into the surface, cleared by the call.
    pub fn take_char(&self) -> Option<char> {
        self.shared.last_char.lock().take()
    }

    pub fn frame_stats(&self) -> FrameStats {
        *self.shared.stats.lock()
    }

    /// Takes the rendering context from the render thread.
    ///
    /// The render loop waits at its next frame until the guard is dropped.
    pub fn context(&self) -> ContextGuard<'_> {
        self.shared.arbiter.acquire()
    }

    /// Asks the render loop to close the surface and exit.
    pub fn close(&self) {
        self.shared.close_requested.store(true, Ordering::Release);
    }

    fn send(&self, command: Command) -> bool {
        self.is_running() && self.commands.send(command).is_ok()
    }

    fn request(&self, command: Command) -> bool {
        if self.shared.arbiter.is_held_by_current_thread() {
            log::warn!("Render thread request made while holding the rendering context; ignored");
            return false;
        }
        self.send(command)
    }
}

/// Owns the render thread.
///
/// Dereferences to a [`ViewerHandle`]; clone that to hand the producer API
/// to other threads. Dropping the viewer is a forced [`stop`](Self::stop).
pub struct Viewer {
    handle: ViewerHandle,
    thread: Option<JoinHandle<()>>,
}

impl Viewer {
    /// Spawns the render thread and waits until its surface is up.
    pub fn start<F: SurfaceFactory>(config: ViewerConfig, factory: F) -> Result<Self, ViewerError> {
        let shared = Arc::new(Shared::new(&config));
        let (commands, command_rx) = crossbeam_channel::unbounded();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        shared.queue.submit(
            SCENE_POINTS,
            Box::new(shared.points.factory().with_point_size(config.point_size)),
        );
        shared.queue.submit(SCENE_LINES, Box::new(shared.lines.factory()));

        log::info!("Starting viewer '{}' ({}x{})", config.title, config.width, config.height);
        let thread = std::thread::Builder::new().name("threedbg-render".into()).spawn({
            let shared = Arc::clone(&shared);
            move || render_loop::run(shared, config, factory, command_rx, ready_tx)
        })?;

        let startup = ready_rx.recv();
        if !matches!(startup, Ok(Ok(()))) {
            if thread.join().is_err() {
                log::error!("Render thread panicked during start-up");
            }
            return Err(match startup {
                Ok(Err(err)) => ViewerError::SurfaceInit(err),
                _ => ViewerError::RenderThreadExited,
            });
        }

        Ok(Self {
            handle: ViewerHandle { shared, commands },
            thread: Some(thread),
        })
    }

    /// A clonable producer handle.
    pub fn handle(&self) -> ViewerHandle {
        self.handle.clone()
    }

    /// Stops the subsystem.
    ///
    /// With `force`, barrier waiters are released and the surface is closed
    /// immediately. Without it, waits for the surface to close on its own
    /// (the user closing the window).
    pub fn stop(mut self, force: bool) {
        self.shutdown(force);
    }

    fn shutdown(&mut self, force: bool) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        let shared = &self.handle.shared;
        if force {
            log::info!("Force-stopping viewer");
            shared.barrier.release();
            shared.close_requested.store(true, Ordering::Release);
        } else {
            log::info!("Waiting for viewer surface to close");
        }
        if thread.join().is_err() {
            log::error!("Render thread panicked");
        }
        shared.barrier.shutdown();
        log::info!("Viewer stopped");
    }
}

impl Deref for Viewer {
    type Target = ViewerHandle;

    fn deref(&self) -> &ViewerHandle {
        &self.handle
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.shutdown(true);
    }
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("state", &self.handle.state())
            .field("barrier", &self.handle.shared.barrier)
            .finish()
    }
}
