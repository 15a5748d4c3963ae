//! # Camera Implementation
//!
//! This module contains the core camera types:
//! - `Camera`: a position plus yaw/pitch orientation, with its derived basis vectors
//! - `Projection`: perspective projection shared by every camera
//! - `CameraUniform`: packed view-projection data for the GPU
//!
//! Yaw is measured from +X toward +Z and pitch from the horizon toward +Y, so a camera with
//! `yaw = -90°` and `pitch = 0` looks down the -Z axis.

use cgmath::*;
use std::f32::consts::FRAC_PI_2;

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// cgmath produces clip-space depth in `[-1, 1]`; wgpu expects `[0, 1]`. This matrix
/// scales depth by one half and shifts it by one half.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// A camera in 3D space.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// The camera's position in world space
    pub position: Point3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation (around X axis) in radians
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a new camera with the specified position and orientation.
    ///
    /// # Example
    /// ```rust
    /// use cgmath::{Deg, Point3};
    /// use voxel_viewer::engine_state::camera_state::camera::Camera;
    ///
    /// // Stand five units back from the origin, looking down -Z.
    /// let camera = Camera::new(Point3::new(0.0, 0.0, 5.0), Deg(-90.0), Deg(0.0));
    /// assert!(camera.forward().z < -0.99);
    /// ```
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    /// Normalized direction the camera is looking in.
    pub fn forward(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    /// Look direction projected onto the horizontal plane.
    pub fn horizontal_forward(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        Vector3::new(yaw_cos, 0.0, yaw_sin).normalize()
    }

    /// Horizontal vector pointing to the camera's right.
    pub fn right(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        Vector3::new(-yaw_sin, 0.0, yaw_cos).normalize()
    }

    /// Calculates the view matrix for this camera.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y())
    }

    /// Applies a raw mouse delta (in pixels) as a yaw/pitch rotation.
    ///
    /// Moving the mouse up looks up. Pitch is clamped just short of straight up or down.
    pub fn rotate(&mut self, delta: Vector2<f32>, sensitivity: f32) {
        self.yaw += Rad(delta.x * sensitivity);
        self.pitch += Rad(-delta.y * sensitivity);

        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }
    }
}

/// Represents a camera's projection matrix and related parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection for a `width x height` viewport.
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: Self::aspect_of(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = Self::aspect_of(width, height);
    }

    /// Calculates the projection matrix, already converted to wgpu clip space.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    // A minimised window reports a zero height; keep the last sane ratio shape instead of
    // dividing by zero.
    fn aspect_of(width: u32, height: u32) -> f32 {
        width.max(1) as f32 / height.max(1) as f32
    }
}

/// GPU-friendly representation of camera data for shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // cgmath types are not Pod, so the matrix is stored as a plain array
    view_proj: [[f32; 4]; 4],
    position: [f32; 4],
}

impl CameraUniform {
    /// Creates a new camera uniform with an identity matrix and zero position.
    pub fn new() -> Self {
        Self {
            view_proj: cgmath::Matrix4::identity().into(),
            position: [0.0, 0.0, 0.0, 0.0],
        }
    }

    /// Updates the view-projection matrix and position from `camera`.
    pub fn update_view_proj_and_pos(&mut self, camera: &Camera, projection: &Projection) {
        let view_proj = projection.calc_matrix() * camera.calc_matrix();
        self.view_proj = view_proj.into();
        self.position = [camera.position.x, camera.position.y, camera.position.z, 1.0];
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn basis_vectors_for_camera_facing_negative_z() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(-90.0), Deg(0.0));
        assert!(approx(camera.forward(), Vector3::new(0.0, 0.0, -1.0)));
        assert!(approx(camera.right(), Vector3::new(1.0, 0.0, 0.0)));
        assert!(approx(camera.horizontal_forward(), camera.forward()));
    }

    #[test]
    fn horizontal_forward_ignores_pitch() {
        let camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(-60.0));
        assert!(camera.forward().y < -0.8);
        assert!(approx(camera.horizontal_forward(), Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
        camera.rotate(Vector2::new(0.0, -100_000.0), 0.01);
        assert!(camera.pitch.0 <= SAFE_FRAC_PI_2);
        assert!(camera.pitch.0 > 1.5);

        camera.rotate(Vector2::new(0.0, 200_000.0), 0.01);
        assert!(camera.pitch.0 >= -SAFE_FRAC_PI_2);
    }

    #[test]
    fn view_projection_maps_forward_point_to_screen_centre() {
        let camera = Camera::new(Point3::new(1.0, 2.0, 3.0), Deg(30.0), Deg(-20.0));
        let projection = Projection::new(800, 600, Deg(75.0), 0.1, 2000.0);
        let target = camera.position + camera.forward() * 10.0;

        let clip = projection.calc_matrix() * camera.calc_matrix() * target.to_homogeneous();
        assert!((clip.x / clip.w).abs() < 1e-4);
        assert!((clip.y / clip.w).abs() < 1e-4);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn zero_height_viewport_keeps_finite_aspect() {
        let mut projection = Projection::new(800, 600, Deg(75.0), 0.1, 2000.0);
        projection.resize(800, 0);
        assert!(projection.aspect.is_finite());
        assert!(projection.calc_matrix().x.x.is_finite());
    }
}
