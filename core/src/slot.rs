//! Caller-owned destination slots.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

/// A shared, writable destination for one option's value.
///
/// The caller keeps one handle and gives another to the command tree at
/// registration time. The tree writes decoded values and defaults through
/// it during a run; handlers read them back through their own clone.
/// Cloning a slot clones the handle, not the value, and two options may
/// never share one slot.
///
/// # Examples
///
/// ```
/// use cmdtree_core::Slot;
///
/// let port = Slot::new(8080u16);
/// let writer = port.clone();
/// writer.set(9090);
/// assert_eq!(port.get(), 9090);
/// assert!(port.same_as(&writer));
/// ```
pub struct Slot<T>(Rc<RefCell<T>>);

impl<T> Slot<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Overwrites the current value.
    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    /// Replaces the current value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }

    /// Borrows the current value.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Runs `f` with a shared reference to the value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow())
    }

    /// Runs `f` with a mutable reference to the value.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    /// Returns `true` if both handles point at the same destination.
    pub fn same_as(&self, other: &Slot<T>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the destination, used to reject double binding.
    pub(crate) fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl<T: Clone> Slot<T> {
    /// Returns a copy of the current value.
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T: Default> Slot<T> {
    /// Takes the value, leaving the default in its place.
    pub fn take(&self) -> T {
        self.0.take()
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Default> Default for Slot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&*self.0.borrow()).finish()
    }
}
