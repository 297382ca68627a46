use std::collections::BTreeMap;

use parking_lot::Mutex;
use threedbg_core::sync::ContextGuard;

use crate::drawable::{DrawableFactory, MaterializeError};
use crate::registry::DrawableRegistry;

/// Outcome of one [`MaterializationQueue::drain_and_materialize`] pass.
#[derive(Debug, Default)]
pub struct DrainReport {
    /// Names now present in the registry with a fresh drawable.
    pub materialized: Vec<String>,
    /// Names whose factory failed; a drawable they already had is kept.
    pub failed: Vec<(String, MaterializeError)>,
}

impl DrainReport {
    pub fn is_empty(&self) -> bool {
        self.materialized.is_empty() && self.failed.is_empty()
    }
}

/// Pending factories keyed by name.
///
/// Any thread may [`submit`](Self::submit). Only the thread holding the
/// rendering context drains. The submission lock is never held while a
/// factory materializes.
#[derive(Default)]
pub struct MaterializationQueue {
    pending: Mutex<BTreeMap<String, Box<dyn DrawableFactory>>>,
}

impl MaterializationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `factory` under `name`, replacing a pending one of the same
    /// name. Returns true if a pending factory was replaced.
    pub fn submit(&self, name: impl Into<String>, factory: Box<dyn DrawableFactory>) -> bool {
        let name = name.into();
        let replaced = self.pending.lock().insert(name.clone(), factory).is_some();
        if replaced {
            log::debug!("Pending factory '{}' replaced before materialization", name);
        }
        replaced
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn pending_names(&self) -> Vec<String> {
        self.pending.lock().keys().cloned().collect()
    }

    /// Takes every pending factory and materializes it into `registry`.
    ///
    /// A failing factory is logged and skipped; the rest still materialize.
    /// A name that failed keeps the drawable and enabled flag it had before.
    ///
    /// # Panics
    ///
    /// If the calling thread does not hold the rendering context.
    pub fn drain_and_materialize(&self, ctx: &ContextGuard<'_>, registry: &mut DrawableRegistry) -> DrainReport {
        assert!(
            ctx.is_held(),
            "factories must be materialized by the thread holding the rendering context"
        );

        let pending = std::mem::take(&mut *self.pending.lock());
        let mut report = DrainReport::default();
        for (name, factory) in pending {
            match factory.materialize(ctx) {
                Ok(drawable) => {
                    registry.insert(name.clone(), drawable);
                    report.materialized.push(name);
                }
                Err(err) => {
                    log::error!("Failed to materialize '{}': {}", name, err);
                    report.failed.push((name, err));
                }
            }
        }
        report
    }

    /// Drops every pending factory without materializing it.
    pub fn discard_pending(&self) -> usize {
        let pending = std::mem::take(&mut *self.pending.lock());
        if !pending.is_empty() {
            log::debug!("Discarded {} pending factories", pending.len());
        }
        pending.len()
    }
}

impl std::fmt::Debug for MaterializationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaterializationQueue")
            .field("pending", &self.pending_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawable::{Drawable, factory_fn};
    use crate::frame::FrameParams;
    use crate::target::Framebuffer;
    use std::sync::Arc;
    use std::thread;
    use threedbg_core::sync::ContextArbiter;

    struct Tagged(usize);

    impl Drawable for Tagged {
        fn draw(&mut self, _params: &FrameParams, _target: &mut Framebuffer) {}

        fn primitive_count(&self) -> usize {
            self.0
        }
    }

    fn tagged(tag: usize) -> Box<dyn DrawableFactory> {
        factory_fn(move |_ctx| Ok(Box::new(Tagged(tag)) as Box<dyn Drawable>))
    }

    fn failing() -> Box<dyn DrawableFactory> {
        factory_fn(|_ctx| Err(MaterializeError::Backend("out of memory".into())))
    }

    #[test]
    fn second_submit_wins() {
        let queue = MaterializationQueue::new();
        let arbiter = ContextArbiter::new();
        let mut registry = DrawableRegistry::new();

        assert!(!queue.submit("cloud", tagged(1)));
        assert!(queue.submit("cloud", tagged(2)));
        assert_eq!(queue.pending_len(), 1);

        let ctx = arbiter.acquire();
        let report = queue.drain_and_materialize(&ctx, &mut registry);
        assert_eq!(report.materialized, vec!["cloud".to_string()]);
        assert_eq!(queue.pending_len(), 0);

        let drawn = registry.remove("cloud").map(|d| d.primitive_count());
        assert_eq!(drawn, Some(2));
    }

    #[test]
    fn resubmit_preserves_enabled_flag() {
        let queue = MaterializationQueue::new();
        let arbiter = ContextArbiter::new();
        let mut registry = DrawableRegistry::new();
        let ctx = arbiter.acquire();

        queue.submit("cloud", tagged(1));
        queue.drain_and_materialize(&ctx, &mut registry);
        registry.set_enabled("cloud", false);

        queue.submit("cloud", tagged(2));
        queue.submit("cloud", tagged(3));
        queue.drain_and_materialize(&ctx, &mut registry);

        assert_eq!(registry.is_enabled("cloud"), Some(false));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failure_does_not_affect_others() {
        let queue = MaterializationQueue::new();
        let arbiter = ContextArbiter::new();
        let mut registry = DrawableRegistry::new();

        queue.submit("a", tagged(1));
        queue.submit("b", failing());
        queue.submit("c", tagged(3));

        let ctx = arbiter.acquire();
        let report = queue.drain_and_materialize(&ctx, &mut registry);
        assert_eq!(report.materialized, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "b");
        assert!(!registry.contains("b"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn failure_keeps_previous_drawable() {
        let queue = MaterializationQueue::new();
        let arbiter = ContextArbiter::new();
        let mut registry = DrawableRegistry::new();
        let ctx = arbiter.acquire();

        queue.submit("cloud", tagged(1));
        queue.drain_and_materialize(&ctx, &mut registry);
        registry.set_enabled("cloud", false);

        queue.submit("cloud", failing());
        let report = queue.drain_and_materialize(&ctx, &mut registry);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(registry.is_enabled("cloud"), Some(false));

        let kept = registry.remove("cloud").map(|d| d.primitive_count());
        assert_eq!(kept, Some(1));
    }

    #[test]
    fn submit_from_many_threads() {
        let queue = Arc::new(MaterializationQueue::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    queue.submit(format!("item{}", i), tagged(i));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(queue.pending_len(), 8);
        assert_eq!(queue.discard_pending(), 8);
        assert_eq!(queue.pending_len(), 0);
    }
}
