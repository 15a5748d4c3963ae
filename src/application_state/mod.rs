//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window and graphics initialization
//! - Translating winit events into [`input_state::InputEvent`]s
//! - Pointer capture on the platform side
//! - Frame scheduling and teardown

pub mod frame_scheduler;
pub mod graphics_resources_builder;
pub mod input_controller;
pub mod input_state;
pub mod pointer_lock;
pub mod subscription;

use std::sync::Arc;

use cgmath::Vector2;
use log::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoopProxy},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

use frame_scheduler::{FrameClock, FrameScheduler};
use graphics_resources_builder::{GraphicsBuilder, GraphicsResult, MaybeGraphics};
use input_controller::InputController;
use input_state::InputEvent;
use pointer_lock::PointerLock;

use crate::{config::ViewerConfig, engine_state::EngineState, error::ViewerError};

/// The main application state container that manages the application's lifecycle.
pub struct ApplicationState {
    /// The current graphics state, which may be initializing, ready, or handed over
    pub graphics: MaybeGraphics,
    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState>,
    /// Cached window size for web platforms during initialization
    pub web_window_size: Option<PhysicalSize<u32>>,
    config: ViewerConfig,
    fatal_error: Option<ViewerError>,
}

/// Represents the fully initialized and running state of the application.
pub struct InitializedApplicationState {
    /// The world and its renderer
    pub engine_state: EngineState,
    /// Handle to the application window
    pub window: Arc<Window>,
    /// Input state machine and listener subscriptions
    pub input_controller: InputController,
    /// Capture state as the platform reports it
    pub pointer_lock: PointerLock,
    /// The pending frame request
    pub frame_scheduler: FrameScheduler,
    /// Wall-clock delta between frames
    pub frame_clock: FrameClock,
}

impl ApplicationState {
    pub fn new(event_loop_proxy: EventLoopProxy<GraphicsResult>, config: ViewerConfig) -> Self {
        Self {
            graphics: MaybeGraphics::Builder(GraphicsBuilder::new(event_loop_proxy)),
            state: None,
            web_window_size: None,
            config,
            fatal_error: None,
        }
    }

    /// The error that stopped the viewer, if any.
    pub fn take_error(&mut self) -> Option<ViewerError> {
        self.fatal_error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        error!("Fatal initialization error: {err}");
        self.fatal_error = Some(err);
        self.teardown();
        event_loop.exit();
    }

    /// Handles window resize events during the initialization phase.
    fn resized(&mut self, event_loop: &ActiveEventLoop, size: PhysicalSize<u32>) {
        let MaybeGraphics::Graphics(gfx) = &mut self.graphics else {
            return;
        };
        if size.width == 0 || size.height == 0 {
            return;
        }

        gfx.surface_config.width = size.width;
        gfx.surface_config.height = size.height;
        gfx.surface.configure(&gfx.device, &gfx.surface_config);
        self.initialize_application_state(event_loop);
    }

    /// Builds the world on top of the initialized graphics and schedules the first frame.
    fn initialize_application_state(&mut self, event_loop: &ActiveEventLoop) {
        let MaybeGraphics::Graphics(gfx) = std::mem::replace(&mut self.graphics, MaybeGraphics::Moved)
        else {
            return;
        };

        let engine_state = match EngineState::new(
            gfx.surface,
            gfx.surface_config,
            gfx.device,
            gfx.queue,
            &self.config,
        ) {
            Ok(engine_state) => engine_state,
            Err(err) => return self.fail(event_loop, err),
        };

        let mut frame_scheduler = FrameScheduler::new();
        if frame_scheduler.arm() {
            gfx.window.request_redraw();
        }

        self.state = Some(InitializedApplicationState {
            engine_state,
            window: gfx.window,
            input_controller: InputController::new(&self.config.controls),
            pointer_lock: PointerLock::new(),
            frame_scheduler,
            frame_clock: FrameClock::new(),
        });
        info!("Viewer running");
    }

    /// Cancels the next frame, destroys the controller, then drops the GPU state.
    fn teardown(&mut self) {
        let Some(mut state) = self.state.take() else {
            return;
        };

        state.frame_scheduler.cancel();
        if state.input_controller.destroy() {
            state.pointer_lock.release(&state.window);
        }
        drop(state);
        info!("Viewer torn down");
    }
}

impl InitializedApplicationState {
    fn run_frame(&mut self) {
        if !self.frame_scheduler.fire() {
            return;
        }

        self.sync_capture();
        let dt = self.frame_clock.tick();
        self.engine_state.update(&mut self.input_controller, dt);
        self.engine_state.render(self.input_controller.mode());

        if self.frame_scheduler.arm() {
            self.window.request_redraw();
        }
    }

    fn keyboard_input(&mut self, event: &KeyEvent) {
        let pressed = event.state == ElementState::Pressed;

        if pressed && event.logical_key == Key::Named(NamedKey::Escape) {
            self.release_capture();
            return;
        }

        let Some(key) = key_name(&event.logical_key) else {
            return;
        };
        let input = if pressed {
            InputEvent::KeyDown {
                key,
                repeat: event.repeat,
            }
        } else {
            InputEvent::KeyUp {
                key,
                repeat: event.repeat,
            }
        };
        self.input_controller.handle_event(&input);
    }

    fn mouse_input(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.input_controller.request_capture() {
                    self.request_capture();
                }
                self.input_controller.handle_event(&InputEvent::MouseDown);
            }
            ElementState::Released => {
                self.input_controller.handle_event(&InputEvent::MouseUp);
            }
        }
    }

    /// Asks for capture. The controller hears about it only once the platform confirms.
    fn request_capture(&mut self) {
        self.pointer_lock.request(&self.window);
        self.sync_capture();
    }

    fn release_capture(&mut self) {
        if !self.input_controller.state().pointer_captured {
            return;
        }
        self.pointer_lock.release(&self.window);
        self.sync_capture();
    }

    /// Hands the platform's latest capture report to the controller.
    fn sync_capture(&mut self) {
        if let Some(captured) = self.pointer_lock.poll() {
            self.input_controller.sync_capture(captured);
        }
    }
}

impl ApplicationHandler<GraphicsResult> for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            self.teardown();
            event_loop.exit();
            return;
        }

        let Some(state) = &mut self.state else {
            if let WindowEvent::Resized(size) = event {
                self.web_window_size = Some(size);
                self.resized(event_loop, size);
            }
            return;
        };

        // The browser may have granted or dropped pointer lock since the last event.
        state.sync_capture();

        match event {
            WindowEvent::Resized(size) => {
                state.engine_state.resize(size.width, size.height);
            }
            WindowEvent::Focused(false) => {
                debug!("Window lost focus");
                state.release_capture();
                state.input_controller.focus_lost();
            }
            WindowEvent::RedrawRequested => state.run_frame(),
            WindowEvent::KeyboardInput { event, .. } => state.keyboard_input(&event),
            WindowEvent::MouseInput { state: button, .. } => state.mouse_input(button),
            WindowEvent::CursorMoved { position, .. } => {
                let size = state.window.inner_size();
                state.input_controller.handle_event(&InputEvent::MouseMove {
                    position: Vector2::new(position.x, position.y),
                    surface_size: Vector2::new(size.width, size.height),
                });
            }
            WindowEvent::CursorLeft { .. } => {
                state.input_controller.handle_event(&InputEvent::MouseLeave);
            }
            _ => (),
        }
    }

    /// Handles device-level input events such as mouse motion.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.input_controller.handle_event(&InputEvent::MouseMotion {
                    delta: Vector2::new(delta.0, delta.1),
                });
            }
        }
    }

    /// Starts graphics initialization the first time the application resumes.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop);
        }
    }

    /// Receives the outcome of graphics initialization.
    fn user_event(&mut self, event_loop: &ActiveEventLoop, graphics: GraphicsResult) {
        let graphics = match graphics {
            Ok(graphics) => graphics,
            Err(err) => return self.fail(event_loop, err),
        };
        let is_surface_configured = graphics.is_surface_configured;

        self.graphics = MaybeGraphics::Graphics(graphics);

        if is_surface_configured {
            self.initialize_application_state(event_loop);
        } else if let Some(size) = self.web_window_size {
            self.resized(event_loop, size);
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

/// Lowercase-insensitive logical name of the keys the controller understands.
fn key_name(key: &Key) -> Option<String> {
    match key {
        Key::Character(text) => Some(text.to_string()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        Key::Named(NamedKey::Shift) => Some("shift".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use winit::keyboard::SmolStr;

    use super::*;

    #[test]
    fn key_names_cover_the_bindings() {
        assert_eq!(key_name(&Key::Character(SmolStr::new("W"))).as_deref(), Some("W"));
        assert_eq!(key_name(&Key::Named(NamedKey::Space)).as_deref(), Some(" "));
        assert_eq!(key_name(&Key::Named(NamedKey::Shift)).as_deref(), Some("shift"));
        assert_eq!(key_name(&Key::Named(NamedKey::Tab)), None);
    }
}
