//! # Camera Implementation
//!
//! This module contains the core camera implementation including:
//! - First-person camera orientation in degrees
//! - Projection matrix handling
//! - GPU uniform buffer packing
//!
//! ## Key Components
//! - `Camera`: The player's eye and where it looks
//! - `Projection`: Manages perspective projection settings
//! - `CameraUniform`: Packed data structure for GPU shaders

use cgmath::*;

use crate::core::geometry::direction_from_angles;

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// Scales Z from [-1, 1] to [-0.5, 0.5] and then translates it to [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Pitch limit in degrees.
pub const PITCH_LIMIT: f32 = 89.0;

/// A first-person camera.
///
/// Yaw 0 looks down -Z and yaw 90 looks down +X; positive pitch looks up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Eye position in world space
    pub position: Point3<f32>,
    /// Heading in degrees
    pub yaw: f32,
    /// Elevation in degrees, within `±PITCH_LIMIT`
    pub pitch: f32,
}

impl Camera {
    /// Creates a camera at `position` with the given orientation in degrees.
    ///
    /// # Arguments
    /// * `position` - Eye position in world space
    /// * `yaw` - Heading in degrees
    /// * `pitch` - Elevation in degrees, clamped to `±PITCH_LIMIT`
    pub fn new<V: Into<Point3<f32>>>(position: V, yaw: f32, pitch: f32) -> Self {
        Self {
            position: position.into(),
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
        }
    }

    /// Unit vector the camera looks along.
    pub fn look_direction(&self) -> Vector3<f32> {
        direction_from_angles(self.yaw, self.pitch)
    }

    /// Applies a mouse-look delta.
    ///
    /// Moving the mouse right turns right and moving it down looks down.
    pub fn apply_look(&mut self, delta_x: f32, delta_y: f32, sensitivity: f32) {
        self.yaw += delta_x * sensitivity;
        self.pitch = (self.pitch - delta_y * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Calculates the view matrix for this camera.
    ///
    /// # Returns
    /// A 4x4 view matrix that can be used for rendering
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.look_direction(), Vector3::unit_y())
    }
}

/// Represents a camera's projection matrix and related parameters.
///
/// This handles the perspective projection used to render the 3D scene.
/// It manages the aspect ratio, field of view, and near/far clipping planes.
#[derive(Debug)]
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
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Calculates the projection matrix, already converted to WGPU clip space.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// GPU-friendly representation of camera data for shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // cgmath types are not Pod, so matrices are stored as plain arrays
    view_proj: [[f32; 4]; 4],
    view_proj_inverse: [[f32; 4]; 4],
    position: [f32; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Creates a new camera uniform with identity matrices and zero position.
    pub fn new() -> Self {
        Self {
            view_proj: cgmath::Matrix4::identity().into(),
            view_proj_inverse: cgmath::Matrix4::identity().into(),
            position: [0.0, 0.0, 0.0, 0.0],
        }
    }

    /// Updates the view-projection matrix and position based on the current camera state.
    ///
    /// A singular view-projection leaves the inverse at identity.
    pub fn update_view_proj_and_pos(&mut self, camera: &Camera, projection: &Projection) {
        let view_proj = projection.calc_matrix() * camera.calc_matrix();
        self.view_proj = view_proj.into();
        self.view_proj_inverse = view_proj
            .invert()
            .unwrap_or_else(Matrix4::identity)
            .into();
        let eye: [f32; 3] = camera.position.into();
        self.position = [eye[0], eye[1], eye[2], 0.0];
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.view_proj.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_clamped() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), 0.0, 0.0);
        camera.apply_look(0.0, -1000.0, 0.2);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        camera.apply_look(0.0, 1000.0, 0.2);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn test_look_right_increases_yaw() {
        let mut camera = Camera::new(Point3::new(0.0, 0.0, 0.0), 90.0, 0.0);
        camera.apply_look(50.0, 0.0, 0.2);
        assert!((camera.yaw - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_view_matrix_puts_look_target_ahead() {
        let camera = Camera::new(Point3::new(8.0, 3.7, 2.0), 90.0, 0.0);
        let target = camera.position + camera.look_direction() * 5.0;
        let in_view = camera.calc_matrix().transform_point(target);
        // Right-handed view space looks down -Z.
        assert!(in_view.x.abs() < 1e-4);
        assert!(in_view.y.abs() < 1e-4);
        assert!((in_view.z + 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_uniform_records_eye() {
        let camera = Camera::new(Point3::new(1.0, 2.0, 3.0), 0.0, 0.0);
        let projection = Projection::new(800, 600, Deg(70.0), 0.1, 100.0);
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj_and_pos(&camera, &projection);
        assert_eq!(uniform.position, [1.0, 2.0, 3.0, 0.0]);
        assert_ne!(uniform.view_proj(), Matrix4::identity());
    }
}
