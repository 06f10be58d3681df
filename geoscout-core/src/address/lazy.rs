//! Load-once child collections.

use std::{fmt, sync::Arc};

use parking_lot::RwLock;

/// A child collection that is either unloaded or fully loaded.
///
/// The first successful load is installed atomically and kept until
/// [`LazyChildren::clear`]. Concurrent first loads are serialised by the
/// write lock, so the loader runs at most once per successful population.
pub struct LazyChildren<T> {
    slot: RwLock<Option<Arc<[T]>>>,
}

impl<T> Default for LazyChildren<T> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }
}

impl<T> fmt::Debug for LazyChildren<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.slot.read() {
            Some(items) => write!(f, "LazyChildren::Loaded({})", items.len()),
            None => f.write_str("LazyChildren::Unloaded"),
        }
    }
}

impl<T> LazyChildren<T> {
    /// The loaded children, if any.
    #[must_use]
    pub fn get(&self) -> Option<Arc<[T]>> {
        self.slot.read().clone()
    }

    /// Whether a load has completed.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Drop the loaded children so the next access reloads.
    pub fn clear(&self) {
        self.slot.write().take();
    }

    /// Return the children, running `load` first if none are loaded.
    ///
    /// A failed load leaves the collection unloaded.
    ///
    /// # Errors
    ///
    /// Propagates the loader's error.
    pub fn get_or_try_load<E>(
        &self,
        load: impl FnOnce() -> Result<Vec<T>, E>,
    ) -> Result<Arc<[T]>, E> {
        if let Some(items) = self.get() {
            return Ok(items);
        }
        let mut slot = self.slot.write();
        if let Some(items) = &*slot {
            return Ok(Arc::clone(items));
        }
        let items: Arc<[T]> = load()?.into();
        *slot = Some(Arc::clone(&items));
        Ok(items)
    }
}
