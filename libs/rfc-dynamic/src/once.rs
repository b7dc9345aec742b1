use std::cell::Cell;
use std::fmt;

/// A value resolved at most once and cached thereafter.
///
/// Used for shape metadata (descriptor handles, field and row counts). A
/// failed resolution caches nothing, so the next access asks again.
///
/// Not safe for concurrent first access: the `Cell` inside keeps every
/// holder `!Sync`.
#[derive(Clone)]
pub struct OnceResolved<T: Copy> {
    slot: Cell<Option<T>>,
}

impl<T: Copy> OnceResolved<T> {
    pub const fn new() -> Self {
        Self { slot: Cell::new(None) }
    }

    /// Slot that starts out resolved.
    pub const fn resolved(value: T) -> Self {
        Self { slot: Cell::new(Some(value)) }
    }

    #[inline]
    pub fn get(&self) -> Option<T> {
        self.slot.get()
    }

    /// Return the cached value, or run `resolve` and cache its result.
    pub fn get_or_try_resolve<E>(&self, resolve: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        if let Some(value) = self.slot.get() {
            return Ok(value);
        }
        let value = resolve()?;
        self.slot.set(Some(value));
        Ok(value)
    }
}

impl<T: Copy> Default for OnceResolved<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for OnceResolved<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.slot.get() {
            Some(v) => write!(f, "Resolved({v:?})"),
            None => f.write_str("Unresolved"),
        }
    }
}
