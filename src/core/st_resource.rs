use std::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    rc::{Rc, Weak},
};

/// A single-threaded, reference-counted resource with interior mutability.
///
/// `StResource` is how state that several owners on the render thread need to see is shared,
/// e.g. the listener table behind the [`EventRouter`](crate::application_state::subscription::EventRouter).
/// Everything in the viewer runs on one thread, so `Rc<RefCell<T>>` is all the
/// synchronisation required.
///
/// # Examples
///
/// ```
/// use voxel_viewer::core::StResource;
///
/// let counter = StResource::new(0);
/// let alias = counter.clone();
///
/// *alias.get_mut() += 1;
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// # Panics
/// - Panics if a shared borrow is held while trying to borrow mutably
/// - Panics if a mutable borrow is held while trying to borrow at all
pub struct StResource<T> {
    resource: Rc<RefCell<T>>,
}

impl<T> StResource<T> {
    /// Creates a new `StResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Rc::new(RefCell::new(resource)),
        }
    }

    /// Returns a guard that allows reading the contained value.
    pub fn get(&self) -> Ref<'_, T> {
        self.resource.borrow()
    }

    /// Returns a guard that allows modifying the contained value.
    pub fn get_mut(&self) -> RefMut<'_, T> {
        self.resource.borrow_mut()
    }

    /// Creates a non-owning handle to the same resource.
    ///
    /// Handles that must not keep their owner alive (subscriptions outliving a router,
    /// for instance) hold one of these instead of a clone.
    pub fn downgrade(&self) -> WeakStResource<T> {
        WeakStResource {
            resource: Rc::downgrade(&self.resource),
        }
    }
}

impl<T> Clone for StResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Default> Default for StResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for StResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StResource").field(&self.resource).finish()
    }
}

/// Non-owning counterpart of [`StResource`].
pub struct WeakStResource<T> {
    resource: Weak<RefCell<T>>,
}

impl<T> WeakStResource<T> {
    /// Upgrades back to a strong handle if the resource is still alive.
    pub fn upgrade(&self) -> Option<StResource<T>> {
        self.resource
            .upgrade()
            .map(|resource| StResource { resource })
    }
}

impl<T> fmt::Debug for WeakStResource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakStResource")
            .field("alive", &(self.resource.strong_count() > 0))
            .finish()
    }
}

impl<T> Clone for WeakStResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_value() {
        let resource = StResource::new(vec![1, 2, 3]);
        let clone = resource.clone();
        clone.get_mut().push(4);
        assert_eq!(resource.get().len(), 4);
    }

    #[test]
    fn weak_handle_does_not_keep_resource_alive() {
        let resource = StResource::new(7u32);
        let weak = resource.downgrade();
        let upgraded = weak.upgrade().expect("resource is still alive");
        assert_eq!(*upgraded.get(), 7);
        drop(upgraded);

        drop(resource);
        assert!(weak.upgrade().is_none());
    }
}
