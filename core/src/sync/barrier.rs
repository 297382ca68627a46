use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use super::timing::TimingRing;

/// Number of barrier intervals kept for telemetry by default.
pub const DEFAULT_TELEMETRY_CAPACITY: usize = 50;

/// Execution mode driven by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// [`ExecutionBarrier::barrier`] never blocks.
    #[default]
    Running,
    /// [`ExecutionBarrier::barrier`] blocks until the mode changes.
    Paused,
    /// Exactly one [`ExecutionBarrier::barrier`] call passes, then the mode
    /// reverts to [`Paused`](ExecutionMode::Paused).
    Step,
}

struct BarrierState {
    mode: ExecutionMode,
    /// Threads currently inside `barrier()`.
    waiting: usize,
    /// Set once the barrier is torn down; pins the mode to `Running`.
    released: bool,
    last_return: Option<Instant>,
    intervals: TimingRing,
}

/// Rendezvous point letting a simulation thread advance one iteration at a
/// time under external control.
///
/// The simulation calls [`barrier`](Self::barrier) once per iteration. A
/// controller (UI, test, CLI) switches between running, paused and
/// single-step execution with [`set_mode`](Self::set_mode). The barrier also
/// records how long each iteration took between two rendezvous.
///
/// # Example
///
/// ```ignore
/// let barrier = Arc::new(ExecutionBarrier::new());
///
/// // Simulation thread
/// loop {
///     simulate_step();
///     barrier.barrier();
/// }
///
/// // Controller
/// barrier.set_mode(ExecutionMode::Paused);
/// barrier.set_mode(ExecutionMode::Step); // advance exactly one iteration
/// ```
pub struct ExecutionBarrier {
    state: Mutex<BarrierState>,
    changed: Condvar,
}

impl ExecutionBarrier {
    /// Creates a running barrier keeping [`DEFAULT_TELEMETRY_CAPACITY`] intervals.
    pub fn new() -> Self {
        Self::with_telemetry_capacity(DEFAULT_TELEMETRY_CAPACITY)
    }

    /// Creates a running barrier keeping the last `capacity` intervals.
    pub fn with_telemetry_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(BarrierState {
                mode: ExecutionMode::Running,
                waiting: 0,
                released: false,
                last_return: None,
                intervals: TimingRing::new(capacity),
            }),
            changed: Condvar::new(),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> ExecutionMode {
        self.state.lock().mode
    }

    /// Switches the mode and wakes every thread blocked in [`barrier`](Self::barrier).
    ///
    /// Ignored once the barrier has been [released](Self::release).
    pub fn set_mode(&self, mode: ExecutionMode) {
        let mut state = self.state.lock();
        if state.released {
            log::debug!("ignoring {:?} on a released execution barrier", mode);
            return;
        }
        state.mode = mode;
        drop(state);
        self.changed.notify_all();
    }

    pub fn pause(&self) {
        self.set_mode(ExecutionMode::Paused);
    }

    pub fn resume(&self) {
        self.set_mode(ExecutionMode::Running);
    }

    pub fn step(&self) {
        self.set_mode(ExecutionMode::Step);
    }

    /// Rendezvous with the controller.
    ///
    /// Records the time elapsed since the previous return, then blocks while
    /// the mode is [`Paused`](ExecutionMode::Paused). Passing through in
    /// [`Step`](ExecutionMode::Step) mode flips the mode back to paused.
    pub fn barrier(&self) {
        let mut state = self.state.lock();
        if let Some(last) = state.last_return {
            state.intervals.push(last.elapsed());
        }
        state.waiting += 1;
        self.changed.notify_all();

        while state.mode == ExecutionMode::Paused && !state.released {
            self.changed.wait(&mut state);
        }
        if state.mode == ExecutionMode::Step {
            state.mode = ExecutionMode::Paused;
        }

        state.waiting -= 1;
        state.last_return = Some(Instant::now());
        drop(state);
        self.changed.notify_all();
    }

    /// Returns whether some thread is currently inside [`barrier`](Self::barrier).
    pub fn is_waiting(&self) -> bool {
        self.state.lock().waiting > 0
    }

    /// Number of threads currently inside [`barrier`](Self::barrier).
    pub fn waiting(&self) -> usize {
        self.state.lock().waiting
    }

    /// Blocks until at least one thread is inside [`barrier`](Self::barrier)
    /// or the timeout elapses. Returns whether a thread arrived.
    pub fn wait_for_arrival(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.waiting == 0 {
            if self.changed.wait_until(&mut state, deadline).timed_out() {
                return state.waiting > 0;
            }
        }
        true
    }

    /// Average of the recorded intervals between rendezvous.
    pub fn average_interval(&self) -> Option<Duration> {
        self.state.lock().intervals.average()
    }

    /// Recorded intervals, oldest first.
    pub fn intervals(&self) -> Vec<Duration> {
        self.state.lock().intervals.to_vec()
    }

    /// Forces [`Running`](ExecutionMode::Running) permanently and wakes all
    /// waiters without waiting for them to leave.
    pub fn release(&self) {
        let mut state = self.state.lock();
        state.released = true;
        state.mode = ExecutionMode::Running;
        drop(state);
        self.changed.notify_all();
    }

    /// Returns whether [`release`](Self::release) has been called.
    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }

    /// Releases the barrier and blocks until no thread is mid-rendezvous.
    ///
    /// After this returns no caller can be left blocked: later
    /// [`barrier`](Self::barrier) calls pass straight through.
    pub fn shutdown(&self) {
        self.release();
        let mut state = self.state.lock();
        while state.waiting > 0 {
            self.changed.wait(&mut state);
        }
    }
}

impl Default for ExecutionBarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ExecutionBarrier {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ExecutionBarrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ExecutionBarrier")
            .field("mode", &state.mode)
            .field("waiting", &state.waiting)
            .field("released", &state.released)
            .finish()
    }
}
