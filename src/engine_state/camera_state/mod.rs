//! # Camera State Management
//!
//! This module follows the player's eye:
//! - Camera position and orientation tracking
//! - View and projection matrix calculations
//! - The render-facing camera pose
//!
//! ## Core Components
//! - `Camera`: The player's eye and orientation in degrees
//! - `Projection`: Manages the camera's projection matrix
//! - `CameraUniform`: GPU representation of camera data for shaders
//! - `CameraPose`: What the renderer and listeners need to know about the camera

use cgmath::{Point3, Vector3};

pub mod camera;

use camera::{Camera, CameraUniform, Projection};

/// Where the camera is and where it looks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    /// Eye position
    pub position: Point3<f32>,
    /// Heading in degrees
    pub yaw: f32,
    /// Elevation in degrees
    pub pitch: f32,
    /// Unit look direction
    pub direction: Vector3<f32>,
}

/// The camera, its projection and the packed uniform derived from them.
#[derive(Debug)]
pub struct CameraState {
    /// The player's eye
    pub camera: Camera,
    /// Perspective settings
    pub projection: Projection,
    /// Shader data, refreshed by `sync`
    pub camera_uniform: CameraUniform,
}

impl CameraState {
    /// Creates a camera state for a viewport of `width` by `height` pixels.
    pub fn new(camera: Camera, width: u32, height: u32) -> Self {
        let projection = Projection::new(width, height, cgmath::Deg(70.0), 0.1, 500.0);
        let mut camera_uniform = CameraUniform::new();
        camera_uniform.update_view_proj_and_pos(&camera, &projection);
        CameraState {
            camera,
            projection,
            camera_uniform,
        }
    }

    /// Moves the eye to `eye` and refreshes the uniform.
    pub fn sync(&mut self, eye: Point3<f32>) {
        self.camera.position = eye;
        self.camera_uniform
            .update_view_proj_and_pos(&self.camera, &self.projection);
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.camera.position,
            yaw: self.camera.yaw,
            pitch: self.camera.pitch,
            direction: self.camera.look_direction(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_moves_eye() {
        let mut state = CameraState::new(Camera::new(Point3::new(0.0, 0.0, 0.0), 90.0, 0.0), 640, 480);
        state.sync(Point3::new(8.0, 3.7, 2.0));
        let pose = state.pose();
        assert_eq!(pose.position, Point3::new(8.0, 3.7, 2.0));
        assert_eq!(pose.yaw, 90.0);
        assert!((pose.direction.x - 1.0).abs() < 1e-5);
    }
}
