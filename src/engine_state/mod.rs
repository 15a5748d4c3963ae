//! # Engine State Module
//!
//! The core of the viewer: the simulated world and the renderer that draws it.
//!
//! ## Key Components
//!
//! * `EngineState` - owns the [`world::World`], the [`rendering::RenderManager`] and the
//!   engine's [`rendering::atlas::ResourceCache`]
//! * `camera_state` - the first-person and top-down cameras
//! * `picking` - centre-screen block selection and its highlight
//! * `rendering` - wgpu pipelines and GPU buffers
//! * `voxels` - noise, chunks and terrain generation
//!
//! ## Frame order
//!
//! [`EngineState::update`] drains the input controller's motion and advances the world
//! (camera, then picking). [`EngineState::render`] then draws from the active camera.

use log::{debug, info, trace};
use web_time::Duration;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use crate::{
    application_state::input_controller::InputController, config::ViewerConfig,
    error::ViewerError,
};

use camera_state::CameraMode;

use rendering::{atlas::ResourceCache, RenderManager};
use world::{FrameMotion, World};

pub mod camera_state;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod voxels;
pub mod world;

/// The main state container for the viewer.
pub struct EngineState {
    /// Terrain, cameras and picking
    pub world: World,
    /// GPU resources and pipelines
    render_manager: RenderManager,
    /// Decoded textures shared by every consumer
    resources: ResourceCache,
    /// Instance index of the block picked last frame
    selected: Option<u32>,
}

impl EngineState {
    /// Generates the world and uploads it to the GPU.
    ///
    /// # Errors
    /// [`ViewerError::Atlas`] if the configured atlas exists but cannot be decoded.
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
        config: &ViewerConfig,
    ) -> Result<Self, ViewerError> {
        let world = World::new(config, surface_config.width, surface_config.height);

        let mut resources = ResourceCache::new();
        let atlas = resources.atlas(&config.atlas.path)?;

        let render_manager = RenderManager::new(
            surface,
            surface_config,
            device,
            queue,
            world.blocks(),
            &atlas,
            config.atlas.block_cell,
        );

        info!("Engine ready with {} block instances", world.blocks().len());
        Ok(Self {
            world,
            render_manager,
            resources,
            selected: None,
        })
    }

    /// Runs the simulation half of a frame: camera, then picking.
    ///
    /// # Arguments
    /// * `input` - The controller whose velocity, mode and pending mouse look drive the frame
    /// * `dt` - Wall-clock time since the previous frame
    pub fn update(&mut self, input: &mut InputController, dt: Duration) {
        let motion = FrameMotion {
            mode: input.mode(),
            velocity: input.velocity(),
            look_delta: input.take_look_delta(),
        };
        let pick = self.world.advance(motion, dt);

        let selected = pick.selected();
        if selected != self.selected {
            match selected {
                Some(index) => debug!("Selected block {index}"),
                None => debug!("Selection cleared"),
            }
            self.selected = selected;
        }
    }

    /// Draws the world from the camera `mode` selects, with the current highlight.
    pub fn render(&mut self, mode: CameraMode) {
        let camera = self.world.active_camera(mode);
        let highlight = self.world.picking().highlight();
        if !self
            .render_manager
            .render(camera, self.world.rig().projection(), highlight)
        {
            trace!("Frame skipped, no surface texture");
        }
    }

    /// Resizes the surface and the cameras' projection together.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.render_manager.resize(width, height);
        self.world.resize(width, height);
    }
}

impl Drop for EngineState {
    fn drop(&mut self) {
        if !self.resources.is_empty() {
            debug!("Releasing {} cached texture atlases", self.resources.len());
        }
        info!("Engine released {} block instances", self.world.blocks().len());
    }
}
