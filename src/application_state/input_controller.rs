//! # Input Controller
//!
//! Turns [`InputEvent`]s into camera velocity, mode switches, and pick-cursor updates.
//!
//! The controller is a small state machine over two axes:
//!
//! | mode \ capture | not captured               | captured                     |
//! |----------------|----------------------------|------------------------------|
//! | FirstPerson    | waits for a click          | keys, mouse and look bound   |
//! | Topdown        | listeners kept as they are | listeners kept as they are   |
//!
//! Listeners are [`Subscription`]s. The capture-change subscription is created with the
//! controller and lives only while in FirstPerson; a capture grant binds every other listener
//! and a revoke drops them again. Top-down mode never asks for capture.

use cgmath::{Vector2, Vector3};
use log::{debug, info, warn};
use phf::phf_map;

use crate::{config::ControlsConfig, engine_state::camera_state::CameraMode};

use super::{
    input_state::{InputEvent, InputState, CLEARED_PICK_CURSOR},
    subscription::{EventKind, EventRouter, Subscription},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum KeyBinding {
    Move { axis: Axis, direction: f32 },
    ToggleMode,
}

/// Lowercased logical key name to action.
static KEY_BINDINGS: phf::Map<&'static str, KeyBinding> = phf_map! {
    "w" => KeyBinding::Move { axis: Axis::Z, direction: 1.0 },
    "s" => KeyBinding::Move { axis: Axis::Z, direction: -1.0 },
    "a" => KeyBinding::Move { axis: Axis::X, direction: -1.0 },
    "d" => KeyBinding::Move { axis: Axis::X, direction: 1.0 },
    " " => KeyBinding::Move { axis: Axis::Y, direction: 1.0 },
    "shift" => KeyBinding::Move { axis: Axis::Y, direction: -1.0 },
    "t" => KeyBinding::ToggleMode,
};

/// Listeners bound while the pointer is captured.
const CAPTURED_LISTENERS: [EventKind; 7] = [
    EventKind::MouseDown,
    EventKind::MouseUp,
    EventKind::KeyDown,
    EventKind::KeyUp,
    EventKind::MouseMove,
    EventKind::MouseLeave,
    EventKind::MouseMotion,
];

/// Owns the [`InputState`] and every listener subscription.
#[derive(Debug)]
pub struct InputController {
    state: InputState,
    speed: f32,
    router: EventRouter,
    capture_change: Option<Subscription>,
    listeners: Vec<Subscription>,
}

impl InputController {
    /// Starts in FirstPerson, not captured, listening only for capture changes.
    pub fn new(controls: &ControlsConfig) -> Self {
        let router = EventRouter::new();
        let capture_change = Some(router.subscribe(EventKind::CaptureChange));

        Self {
            state: InputState::default(),
            speed: controls.speed,
            router,
            capture_change,
            listeners: Vec::with_capacity(CAPTURED_LISTENERS.len()),
        }
    }

    /// Feeds one event through the controller.
    ///
    /// Returns `false` when no listener for the event is bound and it was ignored.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        // Capture is a platform fact; record it even while nobody listens for the change.
        if let InputEvent::CaptureChanged { captured } = event {
            self.state.pointer_captured = *captured;
        }

        if !self.router.is_subscribed(event.kind()) {
            return false;
        }

        match event {
            InputEvent::KeyDown { key, repeat } => self.key_down(key, *repeat),
            InputEvent::KeyUp { key, repeat } => self.key_up(key, *repeat),
            InputEvent::MouseDown => self.state.holding = true,
            InputEvent::MouseUp => self.state.holding = false,
            InputEvent::MouseMove {
                position,
                surface_size,
            } => self.set_pick_cursor(*position, *surface_size),
            InputEvent::MouseLeave => self.state.pick_cursor = CLEARED_PICK_CURSOR,
            InputEvent::MouseMotion { delta } => {
                if self.state.mode == CameraMode::FirstPerson {
                    self.state.look_delta += Vector2::new(delta.x as f32, delta.y as f32);
                }
            }
            InputEvent::CaptureChanged { captured } => self.capture_changed(*captured),
        }
        true
    }

    /// Whether a click should ask the platform for pointer capture.
    pub fn request_capture(&self) -> bool {
        self.state.mode == CameraMode::FirstPerson && !self.state.pointer_captured
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.state.mode.toggled());
    }

    /// Switches navigation mode, running the exit and entry actions of the transition.
    pub fn set_mode(&mut self, mode: CameraMode) {
        if mode == self.state.mode {
            return;
        }
        self.state.mode = mode;
        debug!("Camera mode is now {mode:?}");

        match mode {
            CameraMode::Topdown => {
                if let Some(mut subscription) = self.capture_change.take() {
                    subscription.cancel();
                }
            }
            CameraMode::FirstPerson => {
                if self.capture_change.is_none() {
                    self.capture_change = Some(self.router.subscribe(EventKind::CaptureChange));
                }
                if !self.state.pointer_captured {
                    self.release_listeners();
                }
            }
        }
    }

    /// Applies the capture state the platform reports.
    ///
    /// # Arguments
    /// * `captured` - Whether the platform currently holds the pointer
    ///
    /// # Returns
    /// `true` if the report changed the controller's capture state and reached its listener;
    /// a report matching the known state is dropped.
    pub fn sync_capture(&mut self, captured: bool) -> bool {
        if captured == self.state.pointer_captured {
            return false;
        }
        self.handle_event(&InputEvent::CaptureChanged { captured })
    }

    /// Drops held keys and velocity after the window lost focus.
    pub fn focus_lost(&mut self) {
        self.state.reset_motion();
    }

    /// Mouse motion accumulated since the previous call.
    pub fn take_look_delta(&mut self) -> Vector2<f32> {
        std::mem::replace(&mut self.state.look_delta, Vector2::new(0.0, 0.0))
    }

    /// Cancels every subscription and forgets capture.
    ///
    /// Returns whether capture was held, in which case the caller must release it on the
    /// platform side.
    pub fn destroy(&mut self) -> bool {
        if let Some(mut subscription) = self.capture_change.take() {
            subscription.cancel();
        }
        for subscription in self.listeners.iter_mut() {
            subscription.cancel();
        }
        self.listeners.clear();
        self.state.reset_motion();

        if self.router.active_count() > 0 {
            warn!(
                "{} input subscriptions still live after teardown",
                self.router.active_count()
            );
        }
        info!("Input controller destroyed");

        std::mem::replace(&mut self.state.pointer_captured, false)
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn mode(&self) -> CameraMode {
        self.state.mode
    }

    pub fn velocity(&self) -> Vector3<f32> {
        self.state.velocity
    }

    /// Whether a listener for `kind` is currently bound.
    pub fn is_bound(&self, kind: EventKind) -> bool {
        self.router.is_subscribed(kind)
    }

    fn key_down(&mut self, key: &str, repeat: bool) {
        if repeat {
            return;
        }
        let name = key.to_lowercase();
        let Some(binding) = KEY_BINDINGS.get(name.as_str()).copied() else {
            return;
        };

        match binding {
            KeyBinding::Move { axis, direction } => {
                if !self.state.held_keys.insert(name) {
                    return;
                }
                self.set_axis(axis, direction * self.speed);
            }
            KeyBinding::ToggleMode => self.toggle_mode(),
        }
    }

    fn key_up(&mut self, key: &str, repeat: bool) {
        if repeat {
            return;
        }
        let name = key.to_lowercase();
        if let Some(KeyBinding::Move { axis, .. }) = KEY_BINDINGS.get(name.as_str()).copied() {
            self.state.held_keys.remove(&name);
            self.set_axis(axis, 0.0);
        }
    }

    fn set_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.state.velocity.x = value,
            Axis::Y => self.state.velocity.y = value,
            Axis::Z => self.state.velocity.z = value,
        }
    }

    fn set_pick_cursor(&mut self, position: Vector2<f64>, surface_size: Vector2<u32>) {
        if surface_size.x == 0 || surface_size.y == 0 {
            return;
        }
        let x = position.x / surface_size.x as f64 * 2.0 - 1.0;
        let y = position.y / surface_size.y as f64 * -2.0 + 1.0;
        self.state.pick_cursor = Vector2::new(x as f32, y as f32);
    }

    fn capture_changed(&mut self, captured: bool) {
        debug!("Pointer capture {}", if captured { "granted" } else { "revoked" });
        if captured {
            self.bind_listeners();
        } else {
            self.release_listeners();
        }
    }

    fn bind_listeners(&mut self) {
        self.listeners.clear();
        self.listeners.extend(
            CAPTURED_LISTENERS
                .iter()
                .map(|kind| self.router.subscribe(*kind)),
        );
    }

    fn release_listeners(&mut self) {
        self.listeners.clear();
        self.state.reset_motion();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_down(key: &str) -> InputEvent {
        InputEvent::KeyDown {
            key: key.to_string(),
            repeat: false,
        }
    }

    fn key_up(key: &str) -> InputEvent {
        InputEvent::KeyUp {
            key: key.to_string(),
            repeat: false,
        }
    }

    fn captured_controller() -> InputController {
        let mut controller = InputController::new(&ControlsConfig::default());
        controller.handle_event(&InputEvent::CaptureChanged { captured: true });
        controller
    }

    #[test]
    fn keys_are_ignored_before_capture() {
        let mut controller = InputController::new(&ControlsConfig::default());
        assert!(controller.request_capture());
        assert!(!controller.handle_event(&key_down("w")));
        assert_eq!(controller.velocity(), Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn capture_grant_binds_every_listener() {
        let controller = captured_controller();
        for kind in CAPTURED_LISTENERS {
            assert!(controller.is_bound(kind), "{kind:?} not bound");
        }
        assert!(!controller.request_capture());
    }

    #[test]
    fn shifted_letters_match() {
        let mut controller = captured_controller();
        controller.handle_event(&key_down("D"));
        assert_eq!(controller.velocity().x, 8.0);
        controller.handle_event(&key_up("d"));
        assert_eq!(controller.velocity().x, 0.0);
    }

    #[test]
    fn vertical_keys() {
        let mut controller = captured_controller();
        controller.handle_event(&key_down(" "));
        assert_eq!(controller.velocity().y, 8.0);
        controller.handle_event(&key_down("Shift"));
        assert_eq!(controller.velocity().y, -8.0);
        controller.handle_event(&key_up("shift"));
        assert_eq!(controller.velocity().y, 0.0);
    }

    #[test]
    fn os_repeat_is_ignored() {
        let mut controller = captured_controller();
        controller.handle_event(&key_down("w"));
        controller.handle_event(&key_down("s"));
        controller.handle_event(&InputEvent::KeyDown {
            key: "w".to_string(),
            repeat: true,
        });
        assert_eq!(controller.velocity().z, -8.0);
    }

    #[test]
    fn second_press_of_a_held_key_is_ignored() {
        let mut controller = captured_controller();
        controller.handle_event(&key_down("w"));
        controller.handle_event(&key_down("s"));
        controller.handle_event(&key_down("w"));
        assert_eq!(controller.velocity().z, -8.0);

        controller.handle_event(&key_up("w"));
        controller.handle_event(&key_down("w"));
        assert_eq!(controller.velocity().z, 8.0);
    }

    #[test]
    fn reported_capture_drives_the_listeners() {
        let mut controller = InputController::new(&ControlsConfig::default());
        assert!(controller.sync_capture(true));
        assert!(!controller.sync_capture(true));
        controller.handle_event(&key_down("w"));
        assert_eq!(controller.velocity().z, 8.0);

        // The platform dropped the lock on its own.
        assert!(controller.sync_capture(false));
        assert_eq!(controller.velocity(), Vector3::new(0.0, 0.0, 0.0));
        assert!(!controller.handle_event(&key_down("a")));
        assert!(controller.request_capture());
    }

    #[test]
    fn unknown_keys_fall_through() {
        let mut controller = captured_controller();
        controller.handle_event(&key_down("q"));
        controller.handle_event(&key_up("q"));
        assert_eq!(controller.velocity(), Vector3::new(0.0, 0.0, 0.0));
        assert!(controller.state().held_keys.is_empty());
    }

    #[test]
    fn revoke_unbinds_listeners_and_stops_motion() {
        let mut controller = captured_controller();
        controller.handle_event(&key_down("w"));
        controller.handle_event(&InputEvent::CaptureChanged { captured: false });

        assert_eq!(controller.velocity(), Vector3::new(0.0, 0.0, 0.0));
        assert!(!controller.is_bound(EventKind::KeyDown));
        assert!(controller.is_bound(EventKind::CaptureChange));
        assert!(controller.request_capture());
    }

    #[test]
    fn topdown_never_requests_capture() {
        let mut controller = captured_controller();
        controller.handle_event(&key_down("t"));
        assert_eq!(controller.mode(), CameraMode::Topdown);
        assert!(!controller.is_bound(EventKind::CaptureChange));

        controller.handle_event(&InputEvent::CaptureChanged { captured: false });
        assert!(!controller.request_capture());
        // The revoke went unheard, so topdown keys keep working.
        controller.handle_event(&key_down("a"));
        assert_eq!(controller.velocity().x, -8.0);
    }

    #[test]
    fn returning_to_first_person_without_capture_unbinds() {
        let mut controller = captured_controller();
        controller.handle_event(&key_down("t"));
        controller.handle_event(&InputEvent::CaptureChanged { captured: false });
        controller.handle_event(&key_down("w"));
        controller.handle_event(&key_down("t"));

        assert_eq!(controller.mode(), CameraMode::FirstPerson);
        assert!(!controller.is_bound(EventKind::KeyDown));
        assert_eq!(controller.velocity(), Vector3::new(0.0, 0.0, 0.0));
        assert!(controller.request_capture());
    }

    #[test]
    fn pick_cursor_tracks_pointer() {
        let mut controller = captured_controller();
        controller.handle_event(&InputEvent::MouseMove {
            position: Vector2::new(200.0, 150.0),
            surface_size: Vector2::new(800, 600),
        });
        assert_eq!(controller.state().pick_cursor, Vector2::new(-0.5, 0.5));

        controller.handle_event(&InputEvent::MouseLeave);
        assert_eq!(controller.state().pick_cursor, CLEARED_PICK_CURSOR);
    }

    #[test]
    fn mouse_buttons_set_holding() {
        let mut controller = captured_controller();
        controller.handle_event(&InputEvent::MouseDown);
        assert!(controller.state().holding);
        controller.handle_event(&InputEvent::MouseUp);
        assert!(!controller.state().holding);
    }

    #[test]
    fn look_delta_accumulates_until_taken() {
        let mut controller = captured_controller();
        controller.handle_event(&InputEvent::MouseMotion {
            delta: Vector2::new(3.0, -1.0),
        });
        controller.handle_event(&InputEvent::MouseMotion {
            delta: Vector2::new(2.0, 4.0),
        });
        assert_eq!(controller.take_look_delta(), Vector2::new(5.0, 3.0));
        assert_eq!(controller.take_look_delta(), Vector2::new(0.0, 0.0));
    }

    #[test]
    fn destroy_cancels_everything_and_reports_capture() {
        let mut controller = captured_controller();
        assert!(controller.destroy());
        for kind in CAPTURED_LISTENERS {
            assert!(!controller.is_bound(kind));
        }
        assert!(!controller.is_bound(EventKind::CaptureChange));
        assert!(!controller.destroy());
    }
}
