//! Shared base state for request builders.

use std::sync::{Arc, PoisonError, RwLock};

use crate::{Error, Result};

/// Guarded cell holding a long-lived value read at call time.
///
/// Clones share the same value. [`StateCell::update`] runs the updater under
/// the write lock, so concurrent readers see either the old or the new value.
#[derive(Debug, Default)]
pub struct StateCell<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> StateCell<T> {
    /// Creates a cell holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Runs `f` with a shared borrow of the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Replaces the current value.
    pub fn set(&self, value: T) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = value;
    }

    /// Replaces the current value with a function of the previous one.
    ///
    /// `f` runs under the write lock, so concurrent updates never interleave.
    /// It must not read or write this cell (or anything sharing it, such as
    /// the `Api` that owns it): the lock is not reentrant and the call would
    /// deadlock. Read other cells freely, or take a [`StateCell::get`]
    /// snapshot before calling `update`.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let next = f(&guard);
        *guard = next;
    }
}

impl<T: Clone> StateCell<T> {
    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }
}

impl<T> From<T> for StateCell<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

/// How a builder holds one piece of base state.
#[derive(Debug)]
pub enum Binding<T> {
    /// Seeded once; setters fail with [`Error::MisconfiguredBuilder`].
    Fixed(Arc<T>),
    /// Backed by a [`StateCell`] shared with the owner.
    Shared(StateCell<T>),
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(value) => Self::Fixed(Arc::clone(value)),
            Self::Shared(cell) => Self::Shared(cell.clone()),
        }
    }
}

impl<T> Binding<T> {
    /// Fixed binding.
    pub fn fixed(value: T) -> Self {
        Self::Fixed(Arc::new(value))
    }

    /// Returns `true` if setters are available.
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        matches!(self, Self::Shared(_))
    }

    /// Runs `f` with a shared borrow of the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self {
            Self::Fixed(value) => f(value),
            Self::Shared(cell) => cell.with(f),
        }
    }

    pub(crate) fn set(&self, value: T, setter: &'static str) -> Result<()> {
        self.cell(setter)?.set(value);
        Ok(())
    }

    pub(crate) fn update(&self, f: impl FnOnce(&T) -> T, setter: &'static str) -> Result<()> {
        self.cell(setter)?.update(f);
        Ok(())
    }

    fn cell(&self, setter: &'static str) -> Result<&StateCell<T>> {
        match self {
            Self::Shared(cell) => Ok(cell),
            Self::Fixed(_) => Err(Error::misconfigured(setter)),
        }
    }
}

impl<T: Clone> Binding<T> {
    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }
}

impl<T> From<StateCell<T>> for Binding<T> {
    fn from(cell: StateCell<T>) -> Self {
        Self::Shared(cell)
    }
}
