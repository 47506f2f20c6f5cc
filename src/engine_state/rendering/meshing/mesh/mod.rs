//! Core chunk mesh construction: per-face quads and the builder that culls hidden faces.

mod face;
mod mesh;

pub use face::Face;
pub use mesh::{build_chunk_mesh, ChunkMesh, EDGE_VERTICES_PER_FACE, FACE_VERTICES_PER_FACE};
