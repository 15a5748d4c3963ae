//! # Pointer Lock
//!
//! Platform side of pointer capture. The controller never assumes a capture request
//! succeeded; it waits for [`PointerLock::poll`] to report the platform's actual state.
//!
//! - Native: winit grabs the cursor synchronously, so a successful grab or release is reported
//!   straight away.
//! - Web: the browser decides later, and may refuse the lock or drop it on its own (Escape,
//!   tab switch). The document's `pointerlockchange` and `pointerlockerror` events are the only
//!   source of truth there.

use std::{cell::Cell, rc::Rc};

use log::warn;
use winit::window::{CursorGrabMode, Window};

/// Tracks the latest capture state reported by the platform.
pub struct PointerLock {
    /// Most recent report not yet handed to the controller; later reports overwrite earlier ones
    changed: Rc<Cell<Option<bool>>>,
    /// Kept alive so the document listeners stay attached
    #[cfg(target_family = "wasm")]
    _listeners: Option<web::DocumentListeners>,
}

impl PointerLock {
    pub fn new() -> Self {
        let changed = Rc::new(Cell::new(None));

        Self {
            #[cfg(target_family = "wasm")]
            _listeners: web::DocumentListeners::attach(Rc::clone(&changed)),
            changed,
        }
    }

    /// Asks the platform to capture the pointer.
    ///
    /// Locking is preferred; platforms without it fall back to confining the cursor.
    pub fn request(&self, window: &Window) {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));

        match grabbed {
            Ok(()) => {
                window.set_cursor_visible(false);
                #[cfg(not(target_family = "wasm"))]
                self.report(true);
            }
            Err(err) => warn!("Pointer capture refused: {err}"),
        }
    }

    /// Gives the pointer back to the platform.
    pub fn release(&self, window: &Window) {
        if let Err(err) = window.set_cursor_grab(CursorGrabMode::None) {
            warn!("Failed to release pointer capture: {err}");
        }
        window.set_cursor_visible(true);
        #[cfg(not(target_family = "wasm"))]
        self.report(false);
    }

    /// Records a capture state observed on the platform.
    pub fn report(&self, captured: bool) {
        self.changed.set(Some(captured));
    }

    /// The capture state reported since the last poll, if any.
    pub fn poll(&self) -> Option<bool> {
        self.changed.take()
    }
}

impl Default for PointerLock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_family = "wasm")]
mod web {
    use std::{cell::Cell, rc::Rc};

    use log::{debug, warn};
    use wasm_bindgen::{closure::Closure, JsCast};
    use web_sys::Document;

    const LOCK_CHANGE: &str = "pointerlockchange";
    const LOCK_ERROR: &str = "pointerlockerror";

    /// `pointerlockchange` / `pointerlockerror` listeners on the page's document.
    ///
    /// Both listeners are removed again on drop.
    pub(super) struct DocumentListeners {
        document: Document,
        on_change: Closure<dyn FnMut()>,
        on_error: Closure<dyn FnMut()>,
    }

    impl DocumentListeners {
        pub(super) fn attach(changed: Rc<Cell<Option<bool>>>) -> Option<Self> {
            let Some(document) = web_sys::window().and_then(|window| window.document()) else {
                warn!("No document to watch for pointer lock changes");
                return None;
            };

            let on_change = {
                let changed = Rc::clone(&changed);
                let document = document.clone();
                Closure::<dyn FnMut()>::new(move || {
                    let locked = document.pointer_lock_element().is_some();
                    debug!("Browser reports pointer lock {locked}");
                    changed.set(Some(locked));
                })
            };
            let on_error = Closure::<dyn FnMut()>::new(move || {
                warn!("Browser refused pointer lock");
                changed.set(Some(false));
            });

            for (event, callback) in [(LOCK_CHANGE, &on_change), (LOCK_ERROR, &on_error)] {
                if let Err(err) =
                    document.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
                {
                    warn!("Could not listen for {event}: {err:?}");
                }
            }

            Some(Self {
                document,
                on_change,
                on_error,
            })
        }
    }

    impl Drop for DocumentListeners {
        fn drop(&mut self) {
            for (event, callback) in [(LOCK_CHANGE, &self.on_change), (LOCK_ERROR, &self.on_error)] {
                let _ = self
                    .document
                    .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_to_report_initially() {
        assert_eq!(PointerLock::new().poll(), None);
    }

    #[test]
    fn latest_report_wins_and_is_consumed() {
        let lock = PointerLock::new();
        lock.report(true);
        lock.report(false);
        assert_eq!(lock.poll(), Some(false));
        assert_eq!(lock.poll(), None);
    }
}
