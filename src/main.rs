//! # Voxel Viewer Entry Point
//!
//! Native entry point. It calls into the library's `run()` and turns a startup failure into a
//! non-zero exit code.
//!
//! For web builds, see the `run_web()` function in the library.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

#[cfg(not(target_family = "wasm"))]
fn main() -> std::process::ExitCode {
    match voxel_viewer::run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("voxel-viewer: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(target_family = "wasm")]
fn main() {}
