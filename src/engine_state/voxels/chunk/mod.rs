//! # Chunk Module
//!
//! Chunks partition block space into fixed-size vertical columns. A chunk owns
//! no blocks: it is a view over the `VoxelWorld` plus the bookkeeping the
//! streamer attaches to it (generation seed, mesh resource, spawned entities).
//!
//! ## Coordinates
//!
//! A block at world `(x, y, z)` belongs to chunk `(floor(x / size), floor(z / size))`.
//! Height is unbounded, so every block belongs to exactly one chunk.

use std::ops::RangeInclusive;

use cgmath::Point3;

pub mod generation;

/// Column coordinate of a chunk, measured in chunks rather than blocks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Chunk index along X
    pub x: i32,
    /// Chunk index along Z
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoord { x, z }
    }

    /// Chebyshev distance in chunks, which is what the square streaming window uses.
    pub fn chebyshev_distance(&self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }
}

/// The horizontal size of chunks for a session, and the conversions that depend on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkLayout {
    size: i32,
}

impl ChunkLayout {
    /// Creates a layout with `size` x `size` block columns.
    ///
    /// # Panics
    /// Panics if `size` is not positive. Sizes come from a validated config.
    pub fn new(size: i32) -> Self {
        assert!(size > 0, "chunk size must be positive");
        ChunkLayout { size }
    }

    /// Width and depth of a chunk in blocks.
    pub fn size(&self) -> i32 {
        self.size
    }

    /// The chunk owning the block column at world `(x, z)`.
    pub fn chunk_coords_from_world(&self, x: i32, z: i32) -> ChunkCoord {
        ChunkCoord::new(x.div_euclid(self.size), z.div_euclid(self.size))
    }

    /// The chunk owning the block cell at `position`.
    pub fn chunk_of_block(&self, position: Point3<i32>) -> ChunkCoord {
        self.chunk_coords_from_world(position.x, position.z)
    }

    /// The chunk containing a continuous world position.
    pub fn chunk_of_point(&self, position: Point3<f32>) -> ChunkCoord {
        self.chunk_coords_from_world(position.x.floor() as i32, position.z.floor() as i32)
    }

    /// World X/Z of the chunk's minimum corner.
    pub fn origin(&self, chunk: ChunkCoord) -> (i32, i32) {
        (chunk.x * self.size, chunk.z * self.size)
    }

    /// Inclusive world X and Z ranges covered by the chunk.
    pub fn column_ranges(&self, chunk: ChunkCoord) -> (RangeInclusive<i32>, RangeInclusive<i32>) {
        let (base_x, base_z) = self.origin(chunk);
        (
            base_x..=base_x + self.size - 1,
            base_z..=base_z + self.size - 1,
        )
    }

    /// Every chunk in the square window of `radius` chunks around `center`.
    pub fn window(&self, center: ChunkCoord, radius: i32) -> impl Iterator<Item = ChunkCoord> {
        (-radius..=radius).flat_map(move |dx| {
            (-radius..=radius).map(move |dz| ChunkCoord::new(center.x + dx, center.z + dz))
        })
    }
}
