//! Rendering system for the arena.
//!
//! The simulation hands the renderer plain snapshots: resident chunk meshes,
//! render-facing entity states, bullet-mark quads, clouds and the camera. This
//! module turns them into frames.
//!
//! - `meshing`: chunk blocks to face and outline vertices, off the main thread
//! - `render_state` / `sky`: the snapshot types the session produces
//! - `overlay`: CPU triangles for everything that is not terrain
//! - `pipeline_manager`: pipelines, camera bind group and the render pass

use wgpu::{Device, Queue, Surface, SurfaceConfiguration};

use super::{buffer_state::WgpuMeshBackend, EngineState};

pub mod meshing;
pub mod overlay;
mod pipeline_manager;
pub mod render_state;
pub mod sky;
mod texture;
pub mod vertex;

pub use pipeline_manager::SKY_COLOR;
pub use vertex::ColorVertex;

use overlay::build_overlay;
use pipeline_manager::PipelineManager;

/// WGSL source shared by every pipeline.
const WORLD_SHADER: &str = include_str!("../../../assets/shaders/world.wgsl");

/// Owns the surface and draws a session to it.
pub struct WorldRenderer {
    surface: Surface<'static>,
    surface_config: SurfaceConfiguration,
    device: Device,
    queue: Queue,
    pipeline_manager: PipelineManager,
}

impl WorldRenderer {
    /// Creates the renderer for a configured surface.
    ///
    /// # Arguments
    /// * `surface` - The surface to present to, already configured
    /// * `surface_config` - Configuration the surface was configured with
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue for buffer writes and submission
    pub fn new(
        surface: Surface<'static>,
        surface_config: SurfaceConfiguration,
        device: Device,
        queue: Queue,
    ) -> Self {
        let pipeline_manager = PipelineManager::new(&device, &surface_config, WORLD_SHADER);
        Self {
            surface,
            surface_config,
            device,
            queue,
            pipeline_manager,
        }
    }

    /// A mesh backend allocating on this renderer's device.
    pub fn mesh_backend(&self) -> WgpuMeshBackend {
        WgpuMeshBackend::new(self.device.clone())
    }

    /// Handles window resize events.
    ///
    /// Zero-sized windows are ignored; the surface cannot be configured with them.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.pipeline_manager.resize(&self.device, &self.surface_config);
    }

    /// Draws `session` as seen from its camera.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    ///
    /// # Errors
    /// Any other surface error, which the caller should treat as fatal.
    pub fn render(&mut self, session: &EngineState<WgpuMeshBackend>) -> Result<(), wgpu::SurfaceError> {
        self.pipeline_manager
            .update_camera(&self.queue, &session.camera_state().camera_uniform);
        let overlay = build_overlay(&session.overlay_scene(), &session.camera_pose());
        self.pipeline_manager
            .update_overlay(&self.device, &self.queue, &overlay);

        let chunks = session.chunk_meshes().map(|(_, mesh)| mesh);
        match self
            .pipeline_manager
            .render(&self.surface, &self.device, &self.queue, chunks)
        {
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                Ok(())
            }
            Err(wgpu::SurfaceError::Timeout) => Ok(()),
            other => other,
        }
    }
}
