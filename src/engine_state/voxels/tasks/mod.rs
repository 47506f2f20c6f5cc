//! # Voxel Task System
//!
//! Background work for the voxel world. Chunk generation and meshing run on
//! the worker pool so the main loop never stalls on them.

pub mod chunk_generation_task;
