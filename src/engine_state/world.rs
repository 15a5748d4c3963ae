//! # World
//!
//! Everything the viewer simulates, with no GPU state attached: the frozen terrain, the
//! camera rig and the picking engine. One call to [`World::advance`] runs the camera and
//! picking halves of a frame in order.

use cgmath::{Vector2, Vector3};
use web_time::Duration;

use crate::config::ViewerConfig;

use super::{
    camera_state::{camera::Camera, CameraMode, CameraRig},
    picking::{PickResult, PickingEngine},
    voxels::{block::BlockCollection, terrain::TerrainGenerator},
};

/// Per-frame motion resolved by the input layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMotion {
    pub mode: CameraMode,
    pub velocity: Vector3<f32>,
    pub look_delta: Vector2<f32>,
}

pub struct World {
    blocks: BlockCollection,
    rig: CameraRig,
    picking: PickingEngine,
    mouse_sensitivity: f32,
}

impl World {
    /// Generates the terrain and places both cameras for a `width x height` viewport.
    pub fn new(config: &ViewerConfig, width: u32, height: u32) -> Self {
        let mut generator = TerrainGenerator::new(config.terrain.clone());
        let blocks = generator.generate();

        Self {
            blocks,
            rig: CameraRig::new(&config.camera, &config.controls, width, height),
            picking: PickingEngine::new(),
            mouse_sensitivity: config.controls.mouse_sensitivity,
        }
    }

    /// Moves the active camera, then re-picks from it.
    ///
    /// # Returns
    ///
    /// The pick made after the move, so callers can react to selection changes
    pub fn advance(&mut self, motion: FrameMotion, dt: Duration) -> PickResult {
        self.rig
            .look(motion.mode, motion.look_delta, self.mouse_sensitivity);
        self.rig.update(motion.mode, motion.velocity, dt);
        self.picking.pick(&self.blocks, self.rig.active(motion.mode))
    }

    pub fn blocks(&self) -> &BlockCollection {
        &self.blocks
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn active_camera(&self, mode: CameraMode) -> &Camera {
        self.rig.active(mode)
    }

    pub fn picking(&self) -> &PickingEngine {
        &self.picking
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.rig.resize(width, height);
    }
}
