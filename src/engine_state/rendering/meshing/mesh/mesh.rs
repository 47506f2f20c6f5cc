//! Chunk mesh construction.
//!
//! Turns the blocks of one chunk into face and edge vertex lists. For every
//! block and each of its six sides, a face is emitted only when the
//! neighbouring cell on that side is empty. Neighbours are looked up in the
//! chunk's own block set, so faces on the chunk border are always emitted.
//!
//! The builder is a pure function and runs on generation workers as well as
//! on the main thread for rebuilds after block removal.

use std::collections::HashSet;

use cgmath::Point3;

use super::face::Face;
use crate::engine_state::{
    rendering::vertex::ColorVertex,
    voxels::block::{block_side::BlockSide, block_type::BlockType},
};

/// Triangle vertices emitted per visible face.
pub const FACE_VERTICES_PER_FACE: usize = 6;

/// Line vertices emitted per visible face.
pub const EDGE_VERTICES_PER_FACE: usize = 8;

/// Renderable geometry for one chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    /// Triangle-list vertices, two triangles per visible face
    pub face_vertices: Vec<ColorVertex>,
    /// Line-list vertices, four segments per visible face
    pub edge_vertices: Vec<ColorVertex>,
}

impl ChunkMesh {
    /// Number of triangles in the face list.
    pub fn triangle_count(&self) -> usize {
        self.face_vertices.len() / 3
    }

    /// Number of line segments in the edge list.
    pub fn line_count(&self) -> usize {
        self.edge_vertices.len() / 2
    }

    /// Returns true if the chunk has nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.face_vertices.is_empty()
    }

    /// The upload layout: all face vertices followed by all edge vertices.
    pub fn interleaved(&self) -> Vec<ColorVertex> {
        let mut vertices = Vec::with_capacity(self.face_vertices.len() + self.edge_vertices.len());
        vertices.extend_from_slice(&self.face_vertices);
        vertices.extend_from_slice(&self.edge_vertices);
        vertices
    }
}

/// Builds the mesh for the given blocks of a chunk.
///
/// # Arguments
/// * `blocks` - Every block in the chunk, in the order faces should be emitted
///
/// # Returns
/// The face and edge vertex lists. A block with all six neighbours occupied
/// contributes nothing.
pub fn build_chunk_mesh(blocks: &[(Point3<i32>, BlockType)]) -> ChunkMesh {
    let occupied: HashSet<Point3<i32>> = blocks.iter().map(|(position, _)| *position).collect();
    let mut mesh = ChunkMesh::default();

    for (position, block_type) in blocks {
        for side in BlockSide::all() {
            if occupied.contains(&side.neighbor_of(*position)) {
                continue;
            }
            let face = Face::new(position.x, position.y, position.z, *block_type, side);
            mesh.face_vertices.extend_from_slice(&face.triangle_vertices());
            mesh.edge_vertices.extend_from_slice(&face.edge_vertices());
        }
    }

    mesh
}
