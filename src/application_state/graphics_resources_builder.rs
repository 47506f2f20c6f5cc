//! # Graphics Resources Builder
//!
//! Creates the window and the WebGPU context the renderer draws with.
//!
//! The main components are:
//! - `Graphics`: The window, surface, device and queue once they exist
//! - `GraphicsBuilder`: Builds `Graphics` on resume and hands it back through
//!   the event loop
//! - `MaybeGraphics`: Where initialization currently stands

use std::sync::Arc;

use log::{error, info};
use wgpu::{Device, Queue, Surface, SurfaceConfiguration};
use winit::{
    event_loop::{ActiveEventLoop, EventLoopProxy},
    window::Window,
};

use crate::core::error::GraphicsError;

/// Title of the game window.
const WINDOW_TITLE: &str = "voxel-arena";

/// Everything the renderer needs from the platform.
pub struct Graphics {
    pub window: Arc<Window>,
    pub surface: Surface<'static>,
    pub surface_config: SurfaceConfiguration,
    pub device: Device,
    pub queue: Queue,
}

/// Creates the window, configures its surface and opens a device.
///
/// # Arguments
/// * `event_loop` - The active event loop used to create the window
///
/// # Errors
/// Any failure along the way; none of them are recoverable.
fn create_graphics(event_loop: &ActiveEventLoop) -> Result<Graphics, GraphicsError> {
    let window_attrs = Window::default_attributes().with_title(WINDOW_TITLE);
    let window = Arc::new(event_loop.create_window(window_attrs)?);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::PRIMARY,
        flags: wgpu::InstanceFlags::empty(),
        backend_options: wgpu::BackendOptions::from_env_or_default(),
    });
    let surface = instance.create_surface(window.clone())?;

    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
    }))?;
    info!("Using adapter {:?}", adapter.get_info().name);

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("Arena Device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default(),
        memory_hints: wgpu::MemoryHints::MemoryUsage,
        trace: wgpu::Trace::Off,
    }))?;

    let size = window.inner_size();
    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .find(|f| f.is_srgb())
        .or_else(|| surface_caps.formats.first())
        .copied()
        .ok_or(GraphicsError::NoSurfaceFormat)?;
    let surface_config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto),
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    };
    surface.configure(&device, &surface_config);

    Ok(Graphics {
        window,
        surface,
        surface_config,
        device,
        queue,
    })
}

/// Builds `Graphics` once the event loop is running.
pub struct GraphicsBuilder {
    event_loop_proxy: Option<EventLoopProxy<Graphics>>,
}

/// The possible states of graphics initialization.
pub enum MaybeGraphics {
    /// Waiting for the first resume
    Builder(GraphicsBuilder),
    /// Handed over to the running application
    Moved,
}

impl GraphicsBuilder {
    /// Creates a builder that delivers its result through `event_loop_proxy`.
    pub fn new(event_loop_proxy: EventLoopProxy<Graphics>) -> Self {
        Self {
            event_loop_proxy: Some(event_loop_proxy),
        }
    }

    /// Builds the graphics resources and sends them back as a user event.
    ///
    /// Does nothing after the first call. On failure the error is logged and
    /// the event loop asked to exit.
    pub fn build_and_send(&mut self, event_loop: &ActiveEventLoop) {
        let Some(event_loop_proxy) = self.event_loop_proxy.take() else {
            return;
        };

        match create_graphics(event_loop) {
            Ok(gfx) => {
                if event_loop_proxy.send_event(gfx).is_err() {
                    error!("Event loop closed before graphics were delivered");
                    event_loop.exit();
                }
            }
            Err(err) => {
                error!("Graphics initialization failed: {}", err);
                event_loop.exit();
            }
        }
    }
}
