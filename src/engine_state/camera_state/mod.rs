//! # Camera State Management
//!
//! This module owns the two viewer cameras and moves them each frame:
//! - a first-person camera that walks along its horizontal look direction
//! - a top-down camera that pans over the terrain at an accelerated rate
//!
//! ## Core Components
//! - `CameraMode`: which of the two cameras is live
//! - `CameraRig`: both cameras plus the projection they share
//! - `camera::Camera`, `camera::Projection`, `camera::CameraUniform`: the building blocks
//!
//! The rig never fails: it only integrates whatever velocity the input layer resolved.

use cgmath::{Deg, InnerSpace, Point3, Rad, Vector2, Vector3};
use log::debug;
use web_time::Duration;

use crate::config::{CameraConfig, ControlsConfig};

use camera::{Camera, Projection};

pub mod camera;

/// The two mutually exclusive navigation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    /// Pointer-captured walking camera
    #[default]
    FirstPerson,
    /// Overhead camera that never needs pointer capture
    Topdown,
}

impl CameraMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            CameraMode::FirstPerson => CameraMode::Topdown,
            CameraMode::Topdown => CameraMode::FirstPerson,
        }
    }
}

/// Owns the first-person and top-down cameras.
///
/// Only the camera matching the current [`CameraMode`] moves; the other keeps its pose until
/// the mode flips back.
#[derive(Debug, Clone)]
pub struct CameraRig {
    first_person: Camera,
    topdown: Camera,
    projection: Projection,
    topdown_speed_multiplier: f32,
}

impl CameraRig {
    /// Places both cameras at their configured positions.
    ///
    /// The first-person camera looks down -Z. The top-down camera looks mostly straight down,
    /// tilted by half of `π - 0.5` from the horizon so that screen-up points toward -Z.
    pub fn new(camera: &CameraConfig, controls: &ControlsConfig, width: u32, height: u32) -> Self {
        let first_person = Camera::new(
            Point3::from(camera.first_person_position),
            Deg(-90.0),
            Deg(0.0),
        );
        let topdown = Camera::new(
            Point3::from(camera.topdown_position),
            Deg(-90.0),
            Rad((-std::f32::consts::PI + 0.5) / 2.0),
        );
        let projection = Projection::new(
            width,
            height,
            Deg(camera.fov_degrees),
            camera.znear,
            camera.zfar,
        );

        Self {
            first_person,
            topdown,
            projection,
            topdown_speed_multiplier: controls.topdown_speed_multiplier,
        }
    }

    /// Integrates `velocity` over `dt` into the camera selected by `mode`.
    ///
    /// `velocity` is in camera-relative axes: `x` strafes right, `y` rises, `z` moves forward.
    ///
    /// # Arguments
    ///
    /// * `mode` - Which camera to move; the other one is left untouched
    /// * `velocity` - Units per second along the camera-relative axes
    /// * `dt` - Time elapsed since the previous frame
    pub fn update(&mut self, mode: CameraMode, velocity: Vector3<f32>, dt: Duration) {
        let dt = dt.as_secs_f32();
        match mode {
            CameraMode::FirstPerson => {
                let camera = &mut self.first_person;
                let forward = camera.horizontal_forward();
                let right = camera.right();
                camera.position += forward * (velocity.z * dt);
                camera.position += right * (velocity.x * dt);
                camera.position.y += velocity.y * dt;
            }
            CameraMode::Topdown => {
                let m = self.topdown_speed_multiplier;
                let camera = &mut self.topdown;
                camera.position.x += velocity.x * dt * m;
                camera.position.y += velocity.y * dt * m;
                camera.position.z -= velocity.z * dt * m;
            }
        }
    }

    /// Applies accumulated mouse motion to the first-person camera.
    ///
    /// The top-down camera has a fixed orientation, so motion in that mode is discarded.
    pub fn look(&mut self, mode: CameraMode, delta: Vector2<f32>, sensitivity: f32) {
        if mode != CameraMode::FirstPerson || delta.magnitude2() == 0.0 {
            return;
        }
        self.first_person.rotate(delta, sensitivity);
    }

    /// The camera handed to the renderer and to picking for `mode`.
    pub fn active(&self, mode: CameraMode) -> &Camera {
        match mode {
            CameraMode::FirstPerson => &self.first_person,
            CameraMode::Topdown => &self.topdown,
        }
    }

    pub fn first_person(&self) -> &Camera {
        &self.first_person
    }

    pub fn topdown(&self) -> &Camera {
        &self.topdown
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Recomputes the shared aspect ratio after a viewport resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        debug!("Camera projection resized to {width}x{height}");
        self.projection.resize(width, height);
    }
}
