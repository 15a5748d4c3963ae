#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Viewer
//!
//! An interactive viewer for a procedurally generated, static voxel terrain, built with WGPU.
//!
//! On startup a finite grid of chunks is filled with one textured block per column, each lifted
//! to the height of a Perlin height field. The scene can be explored with two cameras:
//!
//! * a first-person camera driven by WASD, Space and Shift with pointer-locked mouse look,
//! * a top-down camera that pans over the map, toggled with `T`.
//!
//! Every frame the block under the centre of the view is picked and outlined with a
//! translucent highlight cube.
//!
//! ## Key Modules
//!
//! * `application_state` - Window lifecycle, input translation and frame scheduling
//! * `config` - Serde-backed tunables
//! * `core` - Single-threaded shared resource handles
//! * `engine_state` - Terrain, cameras, picking and rendering
//! * `error` - The crate-wide error type
//!
//! ## Usage
//!
//! ```no_run
//! fn main() -> Result<(), voxel_viewer::error::ViewerError> {
//!     voxel_viewer::run()
//! }
//! ```
//!
//! For web builds, call `run_web()` from JavaScript once the page contains a canvas with the
//! id `voxel-viewer`.

use application_state::ApplicationState;
use config::ViewerConfig;
use error::ViewerError;
#[cfg(target_family = "wasm")]
use wasm_bindgen::prelude::wasm_bindgen;

use winit::event_loop::EventLoop;

use log::info;

pub mod application_state;
pub mod config;
pub mod core;
pub mod engine_state;
pub mod error;

#[cfg(target_family = "wasm")]
const CANVAS_ID: &str = "voxel-viewer";

/// Runs the viewer until its window is closed.
///
/// # Errors
/// Returns the configuration, window or GPU error that prevented the viewer from starting.
#[cfg(not(target_family = "wasm"))]
pub fn run() -> Result<(), ViewerError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = ViewerConfig::load()?;
    let event_loop = EventLoop::with_user_event()
        .build()
        .map_err(|e| ViewerError::EventLoop(e.to_string()))?;

    let mut state = ApplicationState::new(event_loop.create_proxy(), config);
    event_loop
        .run_app(&mut state)
        .map_err(|e| ViewerError::EventLoop(e.to_string()))?;

    match state.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Starts the viewer inside the page's `voxel-viewer` canvas.
#[cfg(target_family = "wasm")]
#[wasm_bindgen]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    use winit::platform::web::EventLoopExtWebSys;

    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console_log::init_with_level(log::Level::Info)
        .map_err(|e| wasm_bindgen::JsValue::from_str(&e.to_string()))?;
    info!("Logger initialized");

    let event_loop = EventLoop::with_user_event()
        .build()
        .map_err(|e| wasm_bindgen::JsValue::from_str(&e.to_string()))?;

    let state = ApplicationState::new(event_loop.create_proxy(), ViewerConfig::default());
    event_loop.spawn_app(state);
    Ok(())
}
