//! # Buffer State Module
//!
//! This module owns the per-chunk GPU mesh resources. The streamer decides when
//! a chunk's mesh is created, replaced or destroyed; this module makes sure each
//! of those transitions happens exactly once and on the thread that owns the
//! rendering context.
//!
//! ## Architecture
//!
//! * `MeshBackend` - how vertex data becomes a GPU resource and how it is freed
//! * `WgpuMeshBackend` - uploads vertex buffers through a `wgpu::Device`
//! * `HeadlessMeshBackend` - numbered handles with no GPU behind them, for
//!   servers and tests
//! * `MeshResourceTable` - the chunk -> resource registry with allocation analytics
//!
//! ## Invariants
//!
//! Every chunk has at most one live resource. Replacing a chunk's mesh releases
//! the previous handle before the new one is recorded.

use std::collections::{HashMap, HashSet};

use wgpu::util::DeviceExt;

use super::{rendering::meshing::ChunkMesh, voxels::chunk::ChunkCoord};

/// Creates and destroys the GPU resource backing a chunk mesh.
///
/// Implementations are only ever called from the main thread.
pub trait MeshBackend {
    /// Handle to an uploaded mesh.
    type Handle;

    /// Uploads `mesh` and returns a handle to the new resource.
    fn upload(&mut self, chunk: ChunkCoord, mesh: &ChunkMesh) -> Self::Handle;

    /// Frees a resource previously returned by `upload`.
    fn release(&mut self, handle: Self::Handle);
}

/// Uploads chunk meshes as `wgpu` vertex buffers.
///
/// The buffer holds the face vertices followed by the edge vertices; draw the
/// first `face_vertex_count` as a triangle list and the rest as a line list.
pub struct WgpuMeshBackend {
    device: wgpu::Device,
}

impl WgpuMeshBackend {
    /// Creates a backend that allocates on `device`.
    pub fn new(device: wgpu::Device) -> Self {
        WgpuMeshBackend { device }
    }
}

impl MeshBackend for WgpuMeshBackend {
    type Handle = wgpu::Buffer;

    fn upload(&mut self, chunk: ChunkCoord, mesh: &ChunkMesh) -> wgpu::Buffer {
        let vertices = mesh.interleaved();
        let label = format!("Chunk Mesh ({}, {})", chunk.x, chunk.z);
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&label),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
    }

    fn release(&mut self, handle: wgpu::Buffer) {
        handle.destroy();
    }
}

/// A backend that hands out numbered handles without touching a GPU.
#[derive(Debug, Default)]
pub struct HeadlessMeshBackend {
    next_handle: u64,
    live: HashSet<u64>,
    uploads: usize,
}

impl HeadlessMeshBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles uploaded and not yet released.
    pub fn live_handles(&self) -> usize {
        self.live.len()
    }

    /// Total number of uploads performed.
    pub fn total_uploads(&self) -> usize {
        self.uploads
    }
}

impl MeshBackend for HeadlessMeshBackend {
    type Handle = u64;

    fn upload(&mut self, _chunk: ChunkCoord, _mesh: &ChunkMesh) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.uploads += 1;
        self.live.insert(handle);
        handle
    }

    fn release(&mut self, handle: u64) {
        if !self.live.remove(&handle) {
            log::warn!("Released unknown mesh handle {}", handle);
        }
    }
}

/// A live mesh resource and the counts the renderer needs to draw it.
#[derive(Debug)]
pub struct MeshResource<H> {
    /// Backend handle
    pub handle: H,
    /// Number of triangle-list vertices at the start of the buffer
    pub face_vertex_count: u32,
    /// Number of line-list vertices following the faces
    pub edge_vertex_count: u32,
    /// Size of the uploaded vertex data in bytes
    pub size_bytes: u64,
}

/// Registry of per-chunk mesh resources.
///
/// # Examples
///
/// ```
/// use voxel_arena::engine_state::buffer_state::{HeadlessMeshBackend, MeshResourceTable};
/// use voxel_arena::engine_state::rendering::meshing::ChunkMesh;
/// use voxel_arena::engine_state::voxels::chunk::ChunkCoord;
///
/// let mut table = MeshResourceTable::new(HeadlessMeshBackend::new());
/// table.replace(ChunkCoord::new(0, 0), &ChunkMesh::default());
/// table.replace(ChunkCoord::new(0, 0), &ChunkMesh::default());
/// assert_eq!(table.backend().live_handles(), 1);
/// ```
pub struct MeshResourceTable<B: MeshBackend> {
    backend: B,
    resources: HashMap<ChunkCoord, MeshResource<B::Handle>>,
    allocated_bytes: u64,
}

impl<B: MeshBackend> MeshResourceTable<B> {
    /// Creates an empty table uploading through `backend`.
    pub fn new(backend: B) -> Self {
        MeshResourceTable {
            backend,
            resources: HashMap::new(),
            allocated_bytes: 0,
        }
    }

    /// Uploads `mesh` as the resource for `chunk`, releasing any previous one.
    pub fn replace(&mut self, chunk: ChunkCoord, mesh: &ChunkMesh) {
        self.release(chunk);

        let size_bytes = ((mesh.face_vertices.len() + mesh.edge_vertices.len())
            * std::mem::size_of::<super::rendering::vertex::ColorVertex>())
            as u64;
        let handle = self.backend.upload(chunk, mesh);
        self.allocated_bytes += size_bytes;
        self.resources.insert(
            chunk,
            MeshResource {
                handle,
                face_vertex_count: mesh.face_vertices.len() as u32,
                edge_vertex_count: mesh.edge_vertices.len() as u32,
                size_bytes,
            },
        );
    }

    /// Releases the resource for `chunk`.
    ///
    /// # Returns
    /// `true` if a resource existed.
    pub fn release(&mut self, chunk: ChunkCoord) -> bool {
        match self.resources.remove(&chunk) {
            Some(resource) => {
                self.allocated_bytes -= resource.size_bytes;
                self.backend.release(resource.handle);
                true
            }
            None => false,
        }
    }

    /// The resource for `chunk`, if one is live.
    pub fn get(&self, chunk: ChunkCoord) -> Option<&MeshResource<B::Handle>> {
        self.resources.get(&chunk)
    }

    /// Returns true if `chunk` has a live resource.
    pub fn contains(&self, chunk: ChunkCoord) -> bool {
        self.resources.contains_key(&chunk)
    }

    /// Iterates over every live resource.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, &MeshResource<B::Handle>)> {
        self.resources.iter().map(|(chunk, resource)| (*chunk, resource))
    }

    /// Number of live resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Returns true if no resource is live.
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Total bytes of vertex data currently uploaded.
    pub fn get_total_allocated_memory(&self) -> u64 {
        self.allocated_bytes
    }

    /// The backend resources are uploaded through.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: MeshBackend> Drop for MeshResourceTable<B> {
    fn drop(&mut self) {
        for (_, resource) in self.resources.drain() {
            self.backend.release(resource.handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::rendering::meshing::build_chunk_mesh;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use cgmath::Point3;

    fn single_block_mesh() -> ChunkMesh {
        build_chunk_mesh(&[(Point3::new(0, 0, 0), BlockType::SOLID)])
    }

    #[test]
    fn test_replace_keeps_one_resource_per_chunk() {
        let mut table = MeshResourceTable::new(HeadlessMeshBackend::new());
        let chunk = ChunkCoord::new(1, 1);
        table.replace(chunk, &single_block_mesh());
        table.replace(chunk, &single_block_mesh());

        assert_eq!(table.len(), 1);
        assert_eq!(table.backend().live_handles(), 1);
        assert_eq!(table.backend().total_uploads(), 2);
    }

    #[test]
    fn test_counts_and_memory_tracking() {
        let mut table = MeshResourceTable::new(HeadlessMeshBackend::new());
        let chunk = ChunkCoord::new(0, 0);
        table.replace(chunk, &single_block_mesh());

        let resource = table.get(chunk).unwrap();
        assert_eq!(resource.face_vertex_count, 36);
        assert_eq!(resource.edge_vertex_count, 48);
        assert_eq!(table.get_total_allocated_memory(), 84 * 24);

        assert!(table.release(chunk));
        assert!(!table.release(chunk));
        assert_eq!(table.get_total_allocated_memory(), 0);
        assert_eq!(table.backend().live_handles(), 0);
    }
}
