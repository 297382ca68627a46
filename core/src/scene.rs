//! Staged/published double buffer of scene primitives.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Double-buffered collection of primitives of one kind.
///
/// - The *staging* side is filled by a producer with [`add`](Self::add),
///   [`add_batch`](Self::add_batch) and [`clear`](Self::clear).
/// - [`flush`](Self::flush) copies staging into a new *published* snapshot.
/// - The render thread reads the latest snapshot with
///   [`snapshot_for_draw`](Self::snapshot_for_draw).
///
/// The published snapshot is only ever replaced wholesale, so a reader sees
/// either the generation before a flush or the one after it, never a mix.
///
/// Staging assumes one producer at a time. The staging lock only keeps the
/// buffer sound when that discipline is broken; interleaved `add` calls from
/// several producers still interleave their items. Racing flushes publish
/// in the order they read staging, so the last flush always wins.
///
/// `flush` does not clear staging: a producer that rebuilds its data every
/// iteration calls `clear` first.
pub struct SceneBuffer<T> {
    staging: Mutex<Vec<T>>,
    published: Mutex<Arc<[T]>>,
    generation: AtomicU64,
}

impl<T: Clone> SceneBuffer<T> {
    /// Creates an empty buffer with an empty published snapshot.
    pub fn new() -> Self {
        Self {
            staging: Mutex::new(Vec::new()),
            published: Mutex::new(Arc::from(Vec::new())),
            generation: AtomicU64::new(0),
        }
    }

    /// Empties the staging side.
    pub fn clear(&self) {
        self.staging.lock().clear();
    }

    /// Appends one item to staging.
    pub fn add(&self, item: T) {
        self.staging.lock().push(item);
    }

    /// Appends a batch of items to staging.
    pub fn add_batch(&self, items: impl IntoIterator<Item = T>) {
        self.staging.lock().extend(items);
    }

    /// Runs `f` with mutable access to the staging items.
    ///
    /// Lets callers derive values from the current staging length (such as
    /// default colors) atomically with the append.
    pub fn stage_with<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> R {
        f(&mut self.staging.lock())
    }

    /// Number of staged (unpublished) items.
    pub fn staged_len(&self) -> usize {
        self.staging.lock().len()
    }

    /// Publishes a copy of the staging items.
    ///
    /// Staging keeps its contents. Calling `flush` twice without new adds
    /// publishes identical snapshots.
    pub fn flush(&self) {
        // Staging stays locked until the snapshot is published so racing
        // flushes publish in staging order.
        let staging = self.staging.lock();
        let snapshot: Arc<[T]> = Arc::from(staging.as_slice());
        *self.published.lock() = snapshot;
        self.generation.fetch_add(1, Ordering::Release);
    }

    /// Latest published snapshot.
    ///
    /// Cloning the `Arc` is cheap; the returned slice is immutable and stays
    /// valid regardless of later flushes.
    pub fn snapshot_for_draw(&self) -> Arc<[T]> {
        Arc::clone(&self.published.lock())
    }

    /// Number of items in the published snapshot.
    pub fn published_len(&self) -> usize {
        self.published.lock().len()
    }

    /// Number of flushes so far.
    ///
    /// Lets a drawer skip re-uploading an unchanged snapshot.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

impl<T: Clone> Default for SceneBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for SceneBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneBuffer")
            .field("staged", &self.staging.lock().len())
            .field("published", &self.published.lock().len())
            .field("generation", &self.generation.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    #[test]
    fn staged_items_invisible_until_flush() {
        let buffer = SceneBuffer::new();
        buffer.add(1u32);
        buffer.add(2);
        assert_eq!(buffer.staged_len(), 2);
        assert!(buffer.snapshot_for_draw().is_empty());

        buffer.flush();
        assert_eq!(&*buffer.snapshot_for_draw(), &[1, 2]);
    }

    #[test]
    fn flush_after_clear_publishes_empty() {
        let buffer = SceneBuffer::new();
        buffer.add_batch(vec![1u32, 2, 3]);
        buffer.flush();
        buffer.clear();
        buffer.flush();
        assert!(buffer.snapshot_for_draw().is_empty());
    }

    #[test]
    fn flush_accumulates_without_clear() {
        let buffer = SceneBuffer::new();
        buffer.add(1u32);
        buffer.flush();
        buffer.add(2);
        buffer.flush();
        assert_eq!(&*buffer.snapshot_for_draw(), &[1, 2]);

        // Idempotent without new adds.
        buffer.flush();
        assert_eq!(&*buffer.snapshot_for_draw(), &[1, 2]);
        assert_eq!(buffer.generation(), 3);
    }

    #[test]
    fn old_snapshot_survives_flush() {
        let buffer = SceneBuffer::new();
        buffer.add(7u32);
        buffer.flush();
        let old = buffer.snapshot_for_draw();

        buffer.clear();
        buffer.add(8);
        buffer.flush();
        assert_eq!(&*old, &[7]);
        assert_eq!(&*buffer.snapshot_for_draw(), &[8]);
    }

    #[test]
    fn thousand_items_round_trip() {
        let buffer = SceneBuffer::new();
        let input: Vec<[f32; 3]> = (0..1000).map(|i| [i as f32, 0.0, -(i as f32)]).collect();
        buffer.add_batch(input.iter().copied());
        buffer.flush();

        let snapshot = buffer.snapshot_for_draw();
        assert_eq!(snapshot.len(), 1000);
        assert_eq!(&*snapshot, input.as_slice());
    }

    #[test]
    fn concurrent_reader_never_sees_torn_generation() {
        const ITEMS: usize = 256;
        let buffer = SceneBuffer::new();
        let deadline = Instant::now() + Duration::from_millis(200);

        thread::scope(|scope| {
            scope.spawn(|| {
                let mut generation = 0u64;
                while Instant::now() < deadline {
                    generation += 1;
                    buffer.clear();
                    buffer.add_batch(std::iter::repeat(generation).take(ITEMS));
                    buffer.flush();
                }
            });

            scope.spawn(|| {
                while Instant::now() < deadline {
                    let snapshot = buffer.snapshot_for_draw();
                    if snapshot.is_empty() {
                        continue;
                    }
                    assert_eq!(snapshot.len(), ITEMS);
                    let first = snapshot[0];
                    assert!(snapshot.iter().all(|v| *v == first), "torn snapshot");
                }
            });
        });
    }

    #[test]
    fn racing_flushes_publish_latest_staging() {
        let buffer = SceneBuffer::new();

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for i in 0..500u32 {
                        buffer.add(i);
                        buffer.flush();
                    }
                });
            }
        });

        assert_eq!(buffer.published_len(), 2000);
        assert_eq!(buffer.generation(), 2000);
    }

    #[test]
    fn stage_with_sees_current_length() {
        let buffer = SceneBuffer::new();
        buffer.add(10usize);
        buffer.stage_with(|staging| {
            let index = staging.len();
            staging.push(index);
        });
        buffer.flush();
        assert_eq!(&*buffer.snapshot_for_draw(), &[10, 1]);
    }
}
