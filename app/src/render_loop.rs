//! The render thread.
//!
//! Each frame:
//!
//! 1. acquire the rendering context
//! 2. apply surface events and take pending viewer commands
//! 3. materialize pending factories, then apply the commands
//! 4. clear and draw every enabled drawable
//! 5. present, with the context released around the swap
//! 6. release the context and sleep until the next tick

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use threedbg_core::camera::Camera;
use threedbg_core::color::Rgb;
use threedbg_core::sync::{ContextArbiter, ExecutionBarrier, TimingRing};
use threedbg_drawer::{DrawableRegistry, FrameParams, Framebuffer, LineBuffer, MaterializationQueue, PointBuffer};

use crate::config::ViewerConfig;
use crate::error::SurfaceError;
use crate::input::OrbitControls;
use crate::pacing::FramePacer;
use crate::surface::{Surface, SurfaceEvent, SurfaceFactory};

/// Lifecycle of the render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
}

/// Render loop timing, refreshed after every presented frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Frames presented since start.
    pub frames: u64,
    /// Time between the last two frame starts.
    pub last_frame_time: Duration,
    /// Mean frame time over the telemetry window.
    pub average_frame_time: Duration,
    /// Drawables drawn in the last frame.
    pub drawn: usize,
}

impl FrameStats {
    /// Frames per second derived from the average frame time.
    pub fn frame_rate(&self) -> f32 {
        let secs = self.average_frame_time.as_secs_f32();
        if secs > 0.0 {
            1.0 / secs
        } else {
            0.0
        }
    }
}

/// Requests from viewer handles, applied at the start of the next frame.
pub(crate) enum Command {
    SetEnabled { name: String, enabled: bool },
    Remove(String),
    Snapshot(Sender<Option<image::RgbaImage>>),
    ListDrawables(Sender<Vec<(String, bool)>>),
}

/// State shared between the render thread and every viewer handle.
pub(crate) struct Shared {
    pub arbiter: ContextArbiter,
    pub barrier: ExecutionBarrier,
    pub queue: MaterializationQueue,
    pub points: PointBuffer,
    pub lines: LineBuffer,
    pub camera: Mutex<Camera>,
    pub state: Mutex<LoopState>,
    pub close_requested: AtomicBool,
    pub last_char: Mutex<Option<char>>,
    pub stats: Mutex<FrameStats>,
    pub point_size: f32,
}

impl Shared {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            arbiter: ContextArbiter::new(),
            barrier: ExecutionBarrier::with_telemetry_capacity(config.telemetry_capacity),
            queue: MaterializationQueue::new(),
            points: PointBuffer::new(),
            lines: LineBuffer::new(),
            camera: Mutex::new(config.camera),
            state: Mutex::new(LoopState::Idle),
            close_requested: AtomicBool::new(false),
            last_char: Mutex::new(None),
            stats: Mutex::new(FrameStats::default()),
            point_size: config.point_size,
        }
    }

    pub fn state(&self) -> LoopState {
        *self.state.lock()
    }

    pub fn set_state(&self, state: LoopState) {
        let mut current = self.state.lock();
        if *current != state {
            log::debug!("Render loop {:?} -> {:?}", *current, state);
            *current = state;
        }
    }
}

/// Marks the loop stopped and frees barrier waiters on every exit path,
/// including a panicking drawable.
struct ExitGuard(Arc<Shared>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        self.0.barrier.release();
        self.0.set_state(LoopState::Stopped);
        if std::thread::panicking() {
            log::error!("Render thread panicked");
        }
    }
}

/// Render thread entry point.
///
/// Creates the surface, reports the outcome on `ready`, then runs frames
/// until the surface closes or a close is requested.
pub(crate) fn run<F: SurfaceFactory>(
    shared: Arc<Shared>,
    config: ViewerConfig,
    factory: F,
    commands: Receiver<Command>,
    ready: Sender<Result<(), SurfaceError>>,
) {
    let _exit = ExitGuard(Arc::clone(&shared));
    shared.set_state(LoopState::Starting);

    let surface = match factory.create(config.width, config.height, &config.title) {
        Ok(surface) => surface,
        Err(err) => {
            log::error!("Failed to create surface: {}", err);
            let _ = ready.send(Err(err));
            return;
        }
    };

    let render_loop = RenderLoop::new(shared, &config, surface, commands);
    render_loop.shared.set_state(LoopState::Running);
    let _ = ready.send(Ok(()));
    render_loop.run();
}

/// Render-thread-owned state.
pub(crate) struct RenderLoop<S: Surface> {
    shared: Arc<Shared>,
    surface: S,
    commands: Receiver<Command>,
    registry: DrawableRegistry,
    target: Framebuffer,
    pacer: FramePacer,
    controls: OrbitControls,
    clear_color: Rgb,
    frame_times: TimingRing,
    last_frame_start: Option<Instant>,
    presented: u64,
}

impl<S: Surface> RenderLoop<S> {
    fn new(shared: Arc<Shared>, config: &ViewerConfig, surface: S, commands: Receiver<Command>) -> Self {
        let (width, height) = surface.size();
        Self {
            shared,
            surface,
            commands,
            registry: DrawableRegistry::new(),
            target: Framebuffer::new(width, height),
            pacer: FramePacer::new(config.frame_rate),
            controls: OrbitControls::default(),
            clear_color: config.clear_color,
            frame_times: TimingRing::new(config.telemetry_capacity),
            last_frame_start: None,
            presented: 0,
        }
    }

    fn run(mut self) {
        log::info!("Render loop running");
        while !self.should_stop() {
            self.frame();
            self.pacer.wait();
        }
        self.shared.set_state(LoopState::Stopping);
        self.teardown();
    }

    fn should_stop(&mut self) -> bool {
        if self.shared.close_requested.load(Ordering::Acquire) && !self.surface.should_close() {
            self.surface.request_close();
        }
        self.surface.should_close()
    }

    fn frame(&mut self) {
        let shared = Arc::clone(&self.shared);
        let mut ctx = shared.arbiter.acquire();
        let started = Instant::now();

        self.handle_events();
        // Commands are taken before the queue is drained and applied after
        // it, so a command always sees the submissions made before it.
        let commands: Vec<Command> = self.commands.try_iter().collect();
        shared.queue.drain_and_materialize(&ctx, &mut self.registry);
        self.handle_commands(commands);

        let (width, height) = self.surface.size();
        self.target.resize(width, height);
        self.target.clear(self.clear_color);
        let camera = *shared.camera.lock();
        let params = FrameParams::new(&camera, [width, height]);
        let drawn = self.registry.draw_all(&params, &mut self.target);

        let surface = &mut self.surface;
        let target = &self.target;
        match ctx.unlocked(|| surface.swap_buffers(target)) {
            Ok(()) => self.presented += 1,
            Err(err) => {
                log::error!("Present failed, closing: {}", err);
                self.surface.request_close();
            }
        }
        drop(ctx);

        self.record_frame(started, drawn);
    }

    fn handle_events(&mut self) {
        for event in self.surface.poll_events() {
            match event {
                SurfaceEvent::CloseRequested => self.surface.request_close(),
                SurfaceEvent::Char(c) => *self.shared.last_char.lock() = Some(c),
                SurfaceEvent::Resized { width, height } => {
                    log::debug!("Surface resized to {}x{}", width, height);
                }
                other => {
                    let height = self.surface.size().1;
                    self.controls.apply(&mut self.shared.camera.lock(), &other, height);
                }
            }
        }
    }

    fn handle_commands(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::SetEnabled { name, enabled } => {
                    if !self.registry.set_enabled(&name, enabled) {
                        log::warn!("set_enabled: no drawable named '{}'", name);
                    }
                }
                Command::Remove(name) => {
                    if self.registry.remove(&name).is_none() {
                        log::warn!("remove: no drawable named '{}'", name);
                    }
                }
                Command::Snapshot(reply) => {
                    // The target still holds the last presented frame.
                    let image = (self.presented > 0).then(|| self.target.to_image());
                    let _ = reply.send(image);
                }
                Command::ListDrawables(reply) => {
                    let _ = reply.send(self.registry.entries());
                }
            }
        }
    }

    fn record_frame(&mut self, started: Instant, drawn: usize) {
        if let Some(previous) = self.last_frame_start.replace(started) {
            self.frame_times.push(started - previous);
        }
        *self.shared.stats.lock() = FrameStats {
            frames: self.presented,
            last_frame_time: self.frame_times.latest().unwrap_or_default(),
            average_frame_time: self.frame_times.average().unwrap_or_default(),
            drawn,
        };
    }

    /// Destroys render-thread resources while holding the context.
    fn teardown(mut self) {
        let shared = Arc::clone(&self.shared);
        let ctx = shared.arbiter.acquire();
        let dropped = shared.queue.discard_pending();
        let drawables = self.registry.len();
        self.registry.clear();
        drop(ctx);
        log::info!(
            "Render loop stopped after {} frames ({} drawables released, {} pending factories dropped)",
            self.presented,
            drawables,
            dropped
        );
    }
}
