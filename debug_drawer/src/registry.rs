use crate::drawable::Drawable;
use crate::frame::FrameParams;
use crate::target::Framebuffer;

struct Entry {
    name: String,
    enabled: bool,
    drawable: Box<dyn Drawable>,
}

/// Named drawables owned by the render thread, kept in insertion order.
#[derive(Default)]
pub struct DrawableRegistry {
    entries: Vec<Entry>,
}

impl DrawableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `name`.
    ///
    /// A replacement keeps the old entry's position and enabled flag; a new
    /// name is appended enabled. Returns the replaced drawable, if any.
    pub fn insert(&mut self, name: impl Into<String>, drawable: Box<dyn Drawable>) -> Option<Box<dyn Drawable>> {
        let name = name.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => Some(std::mem::replace(&mut entry.drawable, drawable)),
            None => {
                self.entries.push(Entry {
                    name,
                    enabled: true,
                    drawable,
                });
                None
            }
        }
    }

    /// Returns false if `name` is not registered.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, name: &str) -> Option<bool> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.enabled)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Drawable>> {
        let index = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(index).drawable)
    }

    /// Names with their enabled flags, in draw order.
    pub fn entries(&self) -> Vec<(String, bool)> {
        self.entries.iter().map(|e| (e.name.clone(), e.enabled)).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draws every enabled entry. Returns the number drawn.
    pub fn draw_all(&mut self, params: &FrameParams, target: &mut Framebuffer) -> usize {
        let mut drawn = 0;
        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            entry.drawable.draw(params, target);
            drawn += 1;
        }
        drawn
    }

    /// Drops every drawable.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for DrawableRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.entries.iter().map(|e| (&e.name, e.enabled))).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        id: usize,
        draws: Arc<AtomicUsize>,
    }

    impl Drawable for Counting {
        fn draw(&mut self, _params: &FrameParams, _target: &mut Framebuffer) {
            self.draws.fetch_add(1, Ordering::SeqCst);
        }

        fn primitive_count(&self) -> usize {
            self.id
        }
    }

    fn counting(id: usize) -> (Box<dyn Drawable>, Arc<AtomicUsize>) {
        let draws = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Counting {
                id,
                draws: Arc::clone(&draws),
            }),
            draws,
        )
    }

    fn params() -> FrameParams {
        FrameParams::new(&Default::default(), [4, 4])
    }

    #[test]
    fn replace_keeps_enabled_flag_and_position() {
        let mut registry = DrawableRegistry::new();
        registry.insert("a", counting(1).0);
        registry.insert("b", counting(2).0);
        assert!(registry.set_enabled("a", false));

        let old = registry.insert("a", counting(3).0);
        assert_eq!(old.map(|d| d.primitive_count()), Some(1));
        assert_eq!(
            registry.entries(),
            vec![("a".to_string(), false), ("b".to_string(), true)]
        );
    }

    #[test]
    fn disabled_entries_are_not_drawn() {
        let mut registry = DrawableRegistry::new();
        let (a, a_draws) = counting(0);
        let (b, b_draws) = counting(0);
        registry.insert("a", a);
        registry.insert("b", b);
        registry.set_enabled("b", false);

        let mut target = Framebuffer::new(4, 4);
        assert_eq!(registry.draw_all(&params(), &mut target), 1);
        assert_eq!(a_draws.load(Ordering::SeqCst), 1);
        assert_eq!(b_draws.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_names() {
        let mut registry = DrawableRegistry::new();
        assert!(!registry.set_enabled("missing", true));
        assert!(registry.remove("missing").is_none());
        assert_eq!(registry.is_enabled("missing"), None);
    }

    #[test]
    fn remove_drops_entry() {
        let mut registry = DrawableRegistry::new();
        registry.insert("a", counting(0).0);
        assert!(registry.remove("a").is_some());
        assert!(registry.is_empty());
        assert!(!registry.contains("a"));
    }
}
