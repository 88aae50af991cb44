/// A lazily loaded value that is either absent or present.
///
/// There is no "stale" state: invalidation goes straight back to
/// `Unloaded`, and the next read reloads.
#[derive(Debug, Clone, Default)]
pub enum Cached<T> {
    #[default]
    Unloaded,
    Loaded(T),
}

impl<T> Cached<T> {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Cached::Loaded(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Cached::Loaded(v) => Some(v),
            Cached::Unloaded => None,
        }
    }

    /// Run `load` if nothing is cached yet. A failed load leaves the cache
    /// `Unloaded`.
    pub fn try_fill<E>(&mut self, load: impl FnOnce() -> Result<T, E>) -> Result<(), E> {
        if let Cached::Unloaded = self {
            *self = Cached::Loaded(load()?);
        }
        Ok(())
    }

    pub fn invalidate(&mut self) {
        *self = Cached::Unloaded;
    }
}
