//! # Event Subscriptions
//!
//! Revocable listener bindings for the input controller.
//!
//! An [`EventRouter`] keeps the table of live bindings; [`EventRouter::subscribe`] hands back
//! an owned [`Subscription`] handle. The controller only reacts to an event while a handle of
//! that event's [`EventKind`] is alive, so binding and unbinding listeners is just creating and
//! dropping handles. Cancelling is idempotent and also happens on drop, so a handle can never
//! leak a binding past its owner.

use std::collections::HashMap;

use log::trace;

use crate::core::{StResource, WeakStResource};

/// Every event the controller can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The platform granted or revoked pointer capture
    CaptureChange,
    MouseDown,
    MouseUp,
    KeyDown,
    KeyUp,
    /// Cursor moved over the surface
    MouseMove,
    /// Cursor left the surface
    MouseLeave,
    /// Raw, unaccelerated mouse motion
    MouseMotion,
}

#[derive(Debug, Default)]
struct BindingTable {
    next_id: u64,
    bindings: HashMap<u64, EventKind>,
}

/// Arena of live listener bindings.
#[derive(Debug, Default)]
pub struct EventRouter {
    table: StResource<BindingTable>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a listener for `kind` until the returned handle is cancelled or dropped.
    #[must_use = "dropping a Subscription immediately cancels it"]
    pub fn subscribe(&self, kind: EventKind) -> Subscription {
        let mut table = self.table.get_mut();
        let id = table.next_id;
        table.next_id += 1;
        table.bindings.insert(id, kind);
        trace!("Subscribed {kind:?} as #{id}");

        Subscription {
            id,
            kind,
            table: self.table.downgrade(),
            active: true,
        }
    }

    /// Whether at least one live handle listens for `kind`.
    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.table.get().bindings.values().any(|bound| *bound == kind)
    }

    /// Number of live handles of any kind.
    pub fn active_count(&self) -> usize {
        self.table.get().bindings.len()
    }
}

/// Owned handle to one listener binding.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    kind: EventKind,
    table: WeakStResource<BindingTable>,
    active: bool,
}

impl Subscription {
    /// Removes the binding. Calling this more than once has no further effect.
    pub fn cancel(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        // The router may already be gone, in which case there is nothing left to unbind.
        if let Some(table) = self.table.upgrade() {
            table.get_mut().bindings.remove(&self.id);
            trace!("Cancelled {:?} #{}", self.kind, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_binds_until_cancelled() {
        let router = EventRouter::new();
        let mut handle = router.subscribe(EventKind::KeyDown);
        assert!(router.is_subscribed(EventKind::KeyDown));
        assert!(!router.is_subscribed(EventKind::KeyUp));

        handle.cancel();
        assert!(!router.is_subscribed(EventKind::KeyDown));
        assert_eq!(router.active_count(), 0);
    }

    #[test]
    fn cancel_is_idempotent() {
        let router = EventRouter::new();
        let mut first = router.subscribe(EventKind::MouseMove);
        let _second = router.subscribe(EventKind::MouseMove);

        first.cancel();
        first.cancel();
        assert!(router.is_subscribed(EventKind::MouseMove));
        assert_eq!(router.active_count(), 1);
    }

    #[test]
    fn dropping_a_handle_releases_it() {
        let router = EventRouter::new();
        {
            let _handle = router.subscribe(EventKind::CaptureChange);
            assert_eq!(router.active_count(), 1);
        }
        assert_eq!(router.active_count(), 0);
    }

    #[test]
    fn handle_outliving_router_cancels_quietly() {
        let router = EventRouter::new();
        let mut handle = router.subscribe(EventKind::MouseDown);
        drop(router);
        handle.cancel();
        handle.cancel();
    }
}
