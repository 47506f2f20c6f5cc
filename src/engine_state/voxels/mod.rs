//! # Voxel World
//!
//! Block storage, chunk partitioning and chunk content generation.
//!
//! ## Architecture
//!
//! * **Block**: block kinds, face directions and palettes
//! * **World**: the sparse block map every other subsystem reads from
//! * **Chunk**: column partitioning and the deterministic per-chunk generator
//! * **Terrain**: the block map plus decals and dirty-chunk tracking, the only
//!   place gameplay removes blocks through
//! * **Tasks**: the generation + meshing work item run on background workers
//!
//! ## Data Flow
//!
//! 1. The streamer publishes a `ChunkGenerationTask` for a needed chunk
//! 2. A worker generates the chunk and meshes it without touching shared state
//! 3. The main thread merges the result into `Terrain` and uploads the mesh
//! 4. Block removals mark chunks dirty; dirty resident chunks are re-meshed at
//!    the end of the tick

pub mod block;
pub mod bullet_marks;
pub mod chunk;
pub mod tasks;
pub mod terrain;
pub mod world;
