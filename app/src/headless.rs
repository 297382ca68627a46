//! In-memory surface for tests, CI and offscreen runs.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use threedbg_drawer::Framebuffer;

use crate::error::SurfaceError;
use crate::surface::{Surface, SurfaceEvent, SurfaceFactory};

#[derive(Default)]
struct HeadlessState {
    events: VecDeque<SurfaceEvent>,
    closed: bool,
    presented: u64,
}

#[derive(Default)]
struct Shared {
    state: Mutex<HeadlessState>,
    presented: Condvar,
}

/// Builds a [`HeadlessSurface`].
///
/// Grab a [`HeadlessHandle`] with [`handle`](Self::handle) before passing
/// the factory to the viewer to inject events and observe presents.
pub struct HeadlessSurfaceFactory {
    shared: Arc<Shared>,
    present_delay: Duration,
    failure: Option<String>,
}

impl Default for HeadlessSurfaceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessSurfaceFactory {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            present_delay: Duration::ZERO,
            failure: None,
        }
    }

    /// Makes `swap_buffers` block for `delay`, like a vsync-limited swap.
    pub fn with_present_delay(mut self, delay: Duration) -> Self {
        self.present_delay = delay;
        self
    }

    /// A factory whose `create` fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::new()
        }
    }

    pub fn handle(&self) -> HeadlessHandle {
        HeadlessHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    type Surface = HeadlessSurface;

    fn create(self, width: u32, height: u32, title: &str) -> Result<HeadlessSurface, SurfaceError> {
        if let Some(reason) = self.failure {
            return Err(SurfaceError::CreationFailed(reason));
        }
        if width == 0 || height == 0 {
            return Err(SurfaceError::CreationFailed(format!(
                "invalid size {}x{}",
                width, height
            )));
        }
        log::info!("Created headless surface '{}' ({}x{})", title, width, height);
        Ok(HeadlessSurface {
            shared: self.shared,
            width,
            height,
            present_delay: self.present_delay,
        })
    }
}

/// Surface that keeps presented frames in memory only.
pub struct HeadlessSurface {
    shared: Arc<Shared>,
    width: u32,
    height: u32,
    present_delay: Duration,
}

impl Surface for HeadlessSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        let events: Vec<SurfaceEvent> = self.shared.state.lock().events.drain(..).collect();
        for event in &events {
            if let SurfaceEvent::Resized { width, height } = *event {
                if width > 0 && height > 0 {
                    self.width = width;
                    self.height = height;
                }
            }
        }
        events
    }

    fn swap_buffers(&mut self, frame: &Framebuffer) -> Result<(), SurfaceError> {
        if !self.present_delay.is_zero() {
            std::thread::sleep(self.present_delay);
        }
        log::trace!("Presented {}x{} frame", frame.width(), frame.height());
        let mut state = self.shared.state.lock();
        state.presented += 1;
        self.shared.presented.notify_all();
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.shared.state.lock().closed
    }

    fn request_close(&mut self) {
        self.shared.state.lock().closed = true;
    }
}

/// Test-side view of a [`HeadlessSurface`].
#[derive(Clone)]
pub struct HeadlessHandle {
    shared: Arc<Shared>,
}

impl HeadlessHandle {
    /// Queues an event for the next `poll_events`.
    pub fn push_event(&self, event: SurfaceEvent) {
        self.shared.state.lock().events.push_back(event);
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.push_event(SurfaceEvent::Resized { width, height });
    }

    /// Simulates the user closing the window.
    pub fn close(&self) {
        self.push_event(SurfaceEvent::CloseRequested);
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().closed
    }

    /// Number of frames presented so far.
    pub fn presented_frames(&self) -> u64 {
        self.shared.state.lock().presented
    }

    /// Blocks until at least `count` frames were presented.
    ///
    /// Returns false on timeout.
    pub fn wait_for_frames(&self, count: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.state.lock();
        while state.presented < count {
            if self.shared.presented.wait_until(&mut state, deadline).timed_out() {
                return state.presented >= count;
            }
        }
        true
    }
}
