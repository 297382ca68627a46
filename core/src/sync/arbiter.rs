use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};

struct ArbiterState {
    /// Thread currently owning the context.
    holder: Option<ThreadId>,
    /// Threads blocked in `acquire`, in arrival order.
    queue: VecDeque<ThreadId>,
}

/// Fair exclusive lock over a non-shareable rendering context.
///
/// Unlike `parking_lot::Mutex`, waiters are granted the context in strict
/// arrival order, so the render loop re-acquiring every frame cannot starve
/// a producer queued behind it.
///
/// Acquisition is re-entrant per thread: acquiring while the calling thread
/// already holds the context returns a null guard that releases nothing.
///
/// # Example
///
/// ```ignore
/// let arbiter = ContextArbiter::new();
/// {
///     let mut ctx = arbiter.acquire();
///     // ... touch context-bound resources ...
///     ctx.unlocked(|| surface.swap_buffers(&frame));
/// } // released here
/// ```
pub struct ContextArbiter {
    state: Mutex<ArbiterState>,
    changed: Condvar,
}

impl ContextArbiter {
    /// Creates an arbiter with no holder.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ArbiterState {
                holder: None,
                queue: VecDeque::new(),
            }),
            changed: Condvar::new(),
        }
    }

    /// Blocks until the calling thread owns the context.
    ///
    /// Returns a null guard (see [`ContextGuard::is_owner`]) if the calling
    /// thread already holds the context.
    pub fn acquire(&self) -> ContextGuard<'_> {
        let me = thread::current().id();
        if self.state.lock().holder == Some(me) {
            return ContextGuard::new(self, false);
        }
        self.wait_for_turn(me);
        ContextGuard::new(self, true)
    }

    /// Acquires the context only if it is free and nobody is queued for it.
    pub fn try_acquire(&self) -> Option<ContextGuard<'_>> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.holder == Some(me) {
            return Some(ContextGuard::new(self, false));
        }
        if state.holder.is_some() || !state.queue.is_empty() {
            return None;
        }
        state.holder = Some(me);
        Some(ContextGuard::new(self, true))
    }

    /// Returns whether the calling thread currently owns the context.
    pub fn is_held_by_current_thread(&self) -> bool {
        self.state.lock().holder == Some(thread::current().id())
    }

    /// Returns the thread currently owning the context.
    pub fn holder(&self) -> Option<ThreadId> {
        self.state.lock().holder
    }

    /// Number of threads blocked waiting for the context.
    pub fn waiting(&self) -> usize {
        self.state.lock().queue.len()
    }

    fn wait_for_turn(&self, me: ThreadId) {
        let mut state = self.state.lock();
        state.queue.push_back(me);
        while state.holder.is_some() || state.queue.front() != Some(&me) {
            self.changed.wait(&mut state);
        }
        state.queue.pop_front();
        state.holder = Some(me);
        log::trace!("context acquired by {:?}", me);
    }

    fn release(&self) {
        let me = thread::current().id();
        let mut state = self.state.lock();
        assert_eq!(
            state.holder,
            Some(me),
            "rendering context released by a thread that does not hold it"
        );
        state.holder = None;
        drop(state);
        log::trace!("context released by {:?}", me);
        // Every waiter re-checks its queue position; only the head proceeds.
        self.changed.notify_all();
    }
}

impl Default for ContextArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContextArbiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ContextArbiter")
            .field("holder", &state.holder)
            .field("waiting", &state.queue.len())
            .finish()
    }
}

/// RAII ownership of the rendering context.
///
/// Releases the context on drop, including during unwinding. A guard
/// obtained while the thread already held the context is a null guard and
/// releases nothing.
///
/// The guard is `!Send`: the context must be released by the thread that
/// acquired it.
pub struct ContextGuard<'a> {
    arbiter: &'a ContextArbiter,
    owner: bool,
    _not_send: PhantomData<*const ()>,
}

impl<'a> ContextGuard<'a> {
    fn new(arbiter: &'a ContextArbiter, owner: bool) -> Self {
        Self {
            arbiter,
            owner,
            _not_send: PhantomData,
        }
    }

    /// Returns `false` for a null guard from a nested acquisition.
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    /// Returns whether the calling thread holds the context.
    ///
    /// Always `true` for a live guard used on its own thread.
    pub fn is_held(&self) -> bool {
        self.arbiter.is_held_by_current_thread()
    }

    /// The arbiter this guard belongs to.
    pub fn arbiter(&self) -> &'a ContextArbiter {
        self.arbiter
    }

    /// Temporarily hands the context back while `f` runs.
    ///
    /// Used around blocking calls such as a vsync-limited buffer swap so
    /// other threads can make progress. The context is re-acquired (in FIFO
    /// order) before returning, also when `f` unwinds.
    pub fn unlocked<R>(&mut self, f: impl FnOnce() -> R) -> R {
        struct Reacquire<'b>(&'b ContextArbiter);

        impl Drop for Reacquire<'_> {
            fn drop(&mut self) {
                self.0.wait_for_turn(thread::current().id());
            }
        }

        self.arbiter.release();
        let _reacquire = Reacquire(self.arbiter);
        f()
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        if self.owner {
            self.arbiter.release();
        }
    }
}

impl fmt::Debug for ContextGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextGuard")
            .field("owner", &self.owner)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        cond()
    }

    #[test]
    fn acquire_and_release() {
        let arbiter = ContextArbiter::new();
        {
            let guard = arbiter.acquire();
            assert!(guard.is_owner());
            assert!(arbiter.is_held_by_current_thread());
        }
        assert!(arbiter.holder().is_none());
    }

    #[test]
    fn nested_acquire_is_null_guard() {
        let arbiter = ContextArbiter::new();
        let outer = arbiter.acquire();
        {
            let inner = arbiter.acquire();
            assert!(!inner.is_owner());
            assert!(inner.is_held());
        }
        // Dropping the null guard must not release the outer hold.
        assert!(arbiter.is_held_by_current_thread());
        drop(outer);
        assert!(!arbiter.is_held_by_current_thread());
    }

    #[test]
    fn try_acquire_contended() {
        let arbiter = Arc::new(ContextArbiter::new());
        let _guard = arbiter.acquire();

        let other = Arc::clone(&arbiter);
        let acquired = thread::spawn(move || other.try_acquire().is_some())
            .join()
            .unwrap();
        assert!(!acquired);
    }

    #[test]
    fn waiters_granted_in_arrival_order() {
        const THREADS: usize = 6;
        let arbiter = Arc::new(ContextArbiter::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let gate = arbiter.acquire();
        let mut handles = Vec::new();
        for i in 0..THREADS {
            let arbiter_clone = Arc::clone(&arbiter);
            let order_clone = Arc::clone(&order);
            handles.push(thread::spawn(move || {
                let _ctx = arbiter_clone.acquire();
                order_clone.lock().push(i);
            }));
            // Start the next thread only once this one is queued.
            assert!(wait_until(Duration::from_secs(5), || arbiter.waiting() == i + 1));
        }
        drop(gate);

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(*order.lock(), (0..THREADS).collect::<Vec<_>>());
    }

    #[test]
    fn releasing_thread_queues_behind_waiters() {
        let arbiter = Arc::new(ContextArbiter::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut guard = arbiter.acquire();
        let arbiter_clone = Arc::clone(&arbiter);
        let order_clone = Arc::clone(&order);
        let waiter = thread::spawn(move || {
            let _ctx = arbiter_clone.acquire();
            order_clone.lock().push("producer");
        });
        assert!(wait_until(Duration::from_secs(5), || arbiter.waiting() == 1));

        // Handing off and taking back must let the queued producer in first.
        guard.unlocked(|| {
            assert!(wait_until(Duration::from_secs(5), || !order.lock().is_empty()));
        });
        order.lock().push("render");
        assert!(guard.is_held());
        drop(guard);

        waiter.join().unwrap();
        assert_eq!(*order.lock(), vec!["producer", "render"]);
    }

    #[test]
    fn unlocked_reacquires_on_unwind() {
        let arbiter = ContextArbiter::new();
        let mut guard = arbiter.acquire();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            guard.unlocked(|| panic!("swap failed"));
        }));
        assert!(result.is_err());
        assert!(arbiter.is_held_by_current_thread());
        drop(guard);
        assert!(arbiter.holder().is_none());
    }

    #[test]
    fn blocked_acquire_proceeds_after_release() {
        let arbiter = Arc::new(ContextArbiter::new());
        let guard = arbiter.acquire();
        let (tx, rx) = mpsc::channel();

        let arbiter_clone = Arc::clone(&arbiter);
        let handle = thread::spawn(move || {
            let _ctx = arbiter_clone.acquire();
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        drop(guard);
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
        handle.join().unwrap();
    }

    #[test]
    #[should_panic(expected = "does not hold it")]
    fn release_without_holding_panics() {
        let arbiter = ContextArbiter::new();
        arbiter.release();
    }

    #[test]
    fn debug_format() {
        let arbiter = ContextArbiter::new();
        let s = format!("{arbiter:?}");
        assert!(s.contains("waiting"), "unexpected debug output: {s}");
    }
}
