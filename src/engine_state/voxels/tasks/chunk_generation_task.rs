//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask` which produces a chunk's
//! content and its mesh on a background worker. The task owns a clone of the
//! generator and touches no shared state; everything it computes travels back
//! to the main thread in a `ChunkGenerationResult`.

use crate::engine_state::{
    rendering::meshing::{build_chunk_mesh, ChunkMesh},
    task_management::task::Task,
    voxels::chunk::{
        generation::{ChunkGenerator, GeneratedChunk},
        ChunkCoord,
    },
};

/// A task that generates and meshes one chunk.
#[derive(Clone, Debug)]
pub struct ChunkGenerationTask {
    /// The generator to run, cloned from the streamer
    generator: ChunkGenerator,
    /// The chunk to generate
    position: ChunkCoord,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `generator` - The session's chunk generator
    /// * `position` - The chunk to generate
    pub fn new(generator: ChunkGenerator, position: ChunkCoord) -> Self {
        ChunkGenerationTask {
            generator,
            position,
        }
    }

    /// Runs the generation on the calling thread.
    pub fn run(generator: &ChunkGenerator, position: ChunkCoord) -> ChunkGenerationResult {
        let chunk = generator.generate(position);
        let mesh = build_chunk_mesh(&chunk.blocks);
        ChunkGenerationResult { chunk, mesh }
    }
}

impl Task for ChunkGenerationTask {
    type Output = ChunkGenerationResult;

    /// Generates the chunk content and builds its mesh.
    fn process(self) -> ChunkGenerationResult {
        Self::run(&self.generator, self.position)
    }
}

/// The output of a chunk generation task.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkGenerationResult {
    /// Generated blocks and spawns
    pub chunk: GeneratedChunk,
    /// Mesh built over `chunk.blocks`
    pub mesh: ChunkMesh,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::chunk::ChunkLayout;

    #[test]
    fn test_task_output_matches_inline_run() {
        let generator = ChunkGenerator::new(ChunkLayout::new(16), 0, None);
        let position = ChunkCoord::new(-2, 9);
        let from_task = ChunkGenerationTask::new(generator.clone(), position).process();
        assert_eq!(from_task, ChunkGenerationTask::run(&generator, position));
        assert!(!from_task.mesh.is_empty());
        assert_eq!(from_task.chunk.coord, position);
    }
}
