//! # Error Types
//!
//! Fatal initialization errors for the viewer.
//!
//! Only start-up can fail: a missing render surface, no usable GPU, or an unreadable
//! configuration file. Everything that happens once frames are running (ray misses,
//! unmatched keys, odd terrain layouts) is normal control flow and never reaches this type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort world construction and keep the frame loop from starting.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The drawing surface with the expected identifier does not exist.
    #[error("render surface `{0}` not found")]
    SurfaceNotFound(&'static str),

    /// The platform refused to create the viewer window.
    #[error("failed to create window: {0}")]
    WindowCreation(String),

    /// A GPU surface could not be created for the window.
    #[error("failed to create GPU surface: {0}")]
    Surface(String),

    /// No GPU adapter is compatible with the surface.
    #[error("no compatible GPU adapter: {0}")]
    Adapter(String),

    /// The adapter refused to hand out a device.
    #[error("failed to acquire GPU device: {0}")]
    Device(String),

    /// The configuration file exists but could not be read or parsed.
    #[error("invalid configuration at {}: {source}", path.display())]
    Config {
        /// Location of the offending file.
        path: PathBuf,
        /// What went wrong while reading it.
        #[source]
        source: ConfigSourceError,
    },

    /// The texture atlas image was present but could not be decoded.
    #[error("failed to load texture atlas {}: {source}", path.display())]
    Atlas {
        /// Location of the atlas image.
        path: PathBuf,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The windowing event loop could not be created or crashed.
    #[error("event loop failure: {0}")]
    EventLoop(String),
}

/// Underlying cause of a [`ViewerError::Config`].
#[derive(Debug, Error)]
pub enum ConfigSourceError {
    /// The file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The file is not valid configuration JSON.
    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}
