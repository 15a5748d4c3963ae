//! # Input State
//!
//! Platform-neutral input events and the state the input controller derives from them.

use std::collections::HashSet;

use cgmath::{Vector2, Vector3, Zero};

use crate::engine_state::camera_state::CameraMode;

use super::subscription::EventKind;

/// Pick cursor value meaning "no pointer over the surface".
pub const CLEARED_PICK_CURSOR: Vector2<f32> = Vector2 {
    x: -100_000.0,
    y: -100_000.0,
};

/// An input event after translation from the windowing system.
///
/// Keys are carried by their logical name: the produced character for printable keys
/// (`"w"`, `" "`), or a lowercase name for the rest (`"shift"`). Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyDown { key: String, repeat: bool },
    KeyUp { key: String, repeat: bool },
    MouseDown,
    MouseUp,
    /// Cursor position in surface pixels, with the surface size it is relative to
    MouseMove {
        position: Vector2<f64>,
        surface_size: Vector2<u32>,
    },
    MouseLeave,
    /// Raw motion in device units since the previous motion event
    MouseMotion { delta: Vector2<f64> },
    /// The platform granted (`true`) or revoked (`false`) pointer capture
    CaptureChanged { captured: bool },
}

impl InputEvent {
    /// The subscription kind that must be live for this event to be handled.
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::KeyDown { .. } => EventKind::KeyDown,
            InputEvent::KeyUp { .. } => EventKind::KeyUp,
            InputEvent::MouseDown => EventKind::MouseDown,
            InputEvent::MouseUp => EventKind::MouseUp,
            InputEvent::MouseMove { .. } => EventKind::MouseMove,
            InputEvent::MouseLeave => EventKind::MouseLeave,
            InputEvent::MouseMotion { .. } => EventKind::MouseMotion,
            InputEvent::CaptureChanged { .. } => EventKind::CaptureChange,
        }
    }
}

/// Everything the input controller tracks between events.
#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    /// Which camera is live
    pub mode: CameraMode,
    /// Whether the platform currently routes the pointer exclusively to the viewer
    pub pointer_captured: bool,
    /// Lowercased names of movement keys currently held
    pub held_keys: HashSet<String>,
    /// A mouse button is down; tracked but not acted on yet
    pub holding: bool,
    /// Cursor in normalized device coordinates, up positive
    pub pick_cursor: Vector2<f32>,
    /// Camera-relative velocity: `x` right, `y` up, `z` forward
    pub velocity: Vector3<f32>,
    /// Mouse motion accumulated since the last frame
    pub look_delta: Vector2<f32>,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            mode: CameraMode::FirstPerson,
            pointer_captured: false,
            held_keys: HashSet::new(),
            holding: false,
            pick_cursor: Vector2::zero(),
            velocity: Vector3::zero(),
            look_delta: Vector2::zero(),
        }
    }
}

impl InputState {
    /// Stops all motion and forgets held keys and buttons.
    pub fn reset_motion(&mut self) {
        self.held_keys.clear();
        self.holding = false;
        self.velocity = Vector3::zero();
        self.look_delta = Vector2::zero();
    }
}
