//! # Viewer Configuration
//!
//! All tunables of the viewer in one serde-deserialized document.
//!
//! Every field defaults to the reference value, so a partial (or empty) JSON file only
//! overrides what it names. The file is looked up in this order:
//!
//! 1. the path in the `VOXEL_VIEWER_CONFIG` environment variable,
//! 2. `viewer.json` in the working directory,
//! 3. built-in defaults.
//!
//! ```json
//! {
//!     "terrain": { "num_chunks": 36, "seed": 7 },
//!     "controls": { "speed": 12.0 }
//! }
//! ```

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::error::{ConfigSourceError, ViewerError};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "VOXEL_VIEWER_CONFIG";
/// Configuration file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "viewer.json";

/// Root configuration document.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Terrain generation parameters
    pub terrain: TerrainConfig,
    /// Movement and mouse-look tuning
    pub controls: ControlsConfig,
    /// Projection and initial camera placement
    pub camera: CameraConfig,
    /// Texture atlas location and the cell used for terrain blocks
    pub atlas: AtlasConfig,
}

/// Parameters of the finite chunk grid and of the height field sampled over it.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Blocks per chunk side
    pub chunk_size: u32,
    /// Nominal vertical extent of a chunk; heights outside `-chunk_height..=chunk_height`
    /// are reported but still placed
    pub chunk_height: u32,
    /// Total chunk count, laid out on a `⌊√num_chunks⌋`-wide grid
    pub num_chunks: u32,
    /// World units per noise unit on the horizontal axes
    pub noise_scale: f64,
    /// Multiplier turning a noise sample into a block height
    pub amplitude: f64,
    /// Upper bound of the random offset along the third noise axis
    pub jitter: f64,
    /// Seed for the jitter stream; `None` draws a fresh seed per run
    pub seed: Option<u64>,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            chunk_height: 16,
            num_chunks: 100,
            noise_scale: 22.0,
            amplitude: 12.0,
            jitter: 0.1,
            seed: None,
        }
    }
}

/// Movement tuning for the input controller and camera rig.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Units per second applied to each held movement axis
    pub speed: f32,
    /// Extra factor applied to all motion while in top-down mode
    pub topdown_speed_multiplier: f32,
    /// Radians of rotation per pixel of raw mouse motion
    pub mouse_sensitivity: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            speed: 8.0,
            topdown_speed_multiplier: 5.0,
            mouse_sensitivity: 0.002,
        }
    }
}

/// Projection settings shared by both cameras plus their starting positions.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub znear: f32,
    /// Far clipping plane distance
    pub zfar: f32,
    /// Where the first-person camera starts
    pub first_person_position: [f32; 3],
    /// Where the top-down camera starts
    pub topdown_position: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            znear: 0.1,
            zfar: 2000.0,
            first_person_position: [0.0, 0.0, 5.0],
            topdown_position: [0.0, 30.0, 0.0],
        }
    }
}

/// Texture atlas source.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AtlasConfig {
    /// PNG image laid out as a 32 x 32 grid of 16 px cells
    pub path: PathBuf,
    /// Atlas cell `(x, y)` used for every terrain block (stone by default)
    pub block_cell: [u32; 2],
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/textures/atlas.png"),
            block_cell: [19, 6],
        }
    }
}

impl ViewerConfig {
    /// Loads the configuration using the lookup order described in the module docs.
    ///
    /// # Errors
    /// Returns [`ViewerError::Config`] if a file was selected but cannot be read or parsed.
    /// An absent `viewer.json` is not an error.
    pub fn load() -> Result<Self, ViewerError> {
        if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
            return Self::from_file(Path::new(&explicit));
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::from_file(default_path);
        }

        info!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Reads and parses a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ViewerError> {
        let text = std::fs::read_to_string(path).map_err(|e| ViewerError::Config {
            path: path.to_path_buf(),
            source: ConfigSourceError::from(e),
        })?;
        let config = Self::from_json(&text).map_err(|e| ViewerError::Config {
            path: path.to_path_buf(),
            source: ConfigSourceError::from(e),
        })?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses a configuration document from a JSON string.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
