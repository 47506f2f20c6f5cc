//! Manages the WebGPU render pipelines and associated rendering resources.
//!
//! One shader serves three pipelines that share the camera bind group:
//!
//! - `faces`: chunk face vertices as a triangle list
//! - `edges`: chunk outline vertices as a line list, drawn over the faces
//! - `overlay`: the per-frame entity, effect and sky triangles
//!
//! Chunk buffers hold their face vertices first and their edge vertices after,
//! so both chunk pipelines bind the same buffer and draw different ranges.

use wgpu::util::DeviceExt;

use crate::engine_state::{
    buffer_state::MeshResource, camera_state::camera::CameraUniform,
};

use super::{texture::DepthTexture, vertex::ColorVertex};

/// Background colour of the sky.
pub const SKY_COLOR: wgpu::Color = wgpu::Color {
    r: 0.53,
    g: 0.81,
    b: 0.92,
    a: 1.0,
};

/// Vertices the overlay buffer holds before it first has to grow.
const INITIAL_OVERLAY_VERTICES: u64 = 4096;

/// Render pipelines, the camera bind group and the buffers they read.
pub struct PipelineManager {
    faces: wgpu::RenderPipeline,
    edges: wgpu::RenderPipeline,
    overlay: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    depth_texture: DepthTexture,
    overlay_buffer: wgpu::Buffer,
    overlay_capacity: u64,
    overlay_vertex_count: u32,
}

impl PipelineManager {
    /// Creates the pipelines for `config`'s surface format.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - Surface configuration containing size and format
    /// * `shader_source` - WGSL source with `vs_main` and `fs_main`
    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, shader_source: &str) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("World Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::new()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("World Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let create_pipeline = |label: &str, topology: wgpu::PrimitiveTopology| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[ColorVertex::desc()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: config.format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(DepthTexture::depth_stencil_state()),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
        };

        let faces = create_pipeline("Chunk Face Pipeline", wgpu::PrimitiveTopology::TriangleList);
        let edges = create_pipeline("Chunk Edge Pipeline", wgpu::PrimitiveTopology::LineList);
        let overlay = create_pipeline("Overlay Pipeline", wgpu::PrimitiveTopology::TriangleList);

        let overlay_buffer = Self::create_overlay_buffer(device, INITIAL_OVERLAY_VERTICES);

        Self {
            faces,
            edges,
            overlay,
            camera_buffer,
            camera_bind_group,
            depth_texture: DepthTexture::new(device, config, "Depth Texture"),
            overlay_buffer,
            overlay_capacity: INITIAL_OVERLAY_VERTICES,
            overlay_vertex_count: 0,
        }
    }

    fn create_overlay_buffer(device: &wgpu::Device, vertices: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Overlay Vertex Buffer"),
            size: vertices * std::mem::size_of::<ColorVertex>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Writes the camera uniform for the next frame.
    pub fn update_camera(&self, queue: &wgpu::Queue, uniform: &CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }

    /// Replaces the overlay vertices, growing the buffer when they no longer fit.
    pub fn update_overlay(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, vertices: &[ColorVertex]) {
        let needed = vertices.len() as u64;
        if needed > self.overlay_capacity {
            self.overlay_capacity = needed.next_power_of_two();
            self.overlay_buffer = Self::create_overlay_buffer(device, self.overlay_capacity);
            log::debug!("Overlay buffer grown to {} vertices", self.overlay_capacity);
        }
        if !vertices.is_empty() {
            queue.write_buffer(&self.overlay_buffer, 0, bytemuck::cast_slice(vertices));
        }
        self.overlay_vertex_count = vertices.len() as u32;
    }

    /// Renders chunk meshes and the overlay to the next surface frame.
    ///
    /// # Errors
    /// Returns the surface error when no frame could be acquired; the caller
    /// decides whether to reconfigure the surface or skip the frame.
    pub fn render<'a>(
        &self,
        surface: &wgpu::Surface,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        chunks: impl Iterator<Item = &'a MeshResource<wgpu::Buffer>>,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("World Encoder"),
        });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("World Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SKY_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            rpass.set_bind_group(0, &self.camera_bind_group, &[]);

            let chunks: Vec<_> = chunks.filter(|mesh| mesh.face_vertex_count > 0).collect();
            rpass.set_pipeline(&self.faces);
            for mesh in &chunks {
                rpass.set_vertex_buffer(0, mesh.handle.slice(..));
                rpass.draw(0..mesh.face_vertex_count, 0..1);
            }
            rpass.set_pipeline(&self.edges);
            for mesh in &chunks {
                let start = mesh.face_vertex_count;
                rpass.set_vertex_buffer(0, mesh.handle.slice(..));
                rpass.draw(start..start + mesh.edge_vertex_count, 0..1);
            }

            if self.overlay_vertex_count > 0 {
                rpass.set_pipeline(&self.overlay);
                rpass.set_vertex_buffer(0, self.overlay_buffer.slice(..));
                rpass.draw(0..self.overlay_vertex_count, 0..1);
            }
        }
        queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }

    /// Recreates the depth texture for a resized surface.
    pub fn resize(&mut self, device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) {
        self.depth_texture = DepthTexture::new(device, config, "Depth Texture");
    }
}
