//! Mesh generation for chunk rendering.
//!
//! Chunks are drawn as flat-coloured triangles with a black outline around
//! every visible face. Hidden-face elimination is the only optimisation:
//! faces between two occupied cells are never emitted.

mod mesh;

pub use mesh::*;
