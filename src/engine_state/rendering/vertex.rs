//! Vertex data structures and layouts for chunk rendering.
//!
//! Chunk meshes are flat lists of interleaved position + colour vertices:
//! six `f32`s per vertex, uploaded as-is into a single vertex buffer.

/// A coloured vertex of a chunk mesh.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Color: [f32; 3] (12 bytes)
///
/// Total size: 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex {
    /// Position in world space
    pub position: [f32; 3],
    /// RGB colour
    pub color: [f32; 3],
}

impl ColorVertex {
    /// Number of `f32` components per vertex.
    pub const FLOATS: usize = 6;

    /// Creates a new vertex.
    pub fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        ColorVertex { position, color }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>)
    /// - `location = 1`: color (vec3<f32>)
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}
