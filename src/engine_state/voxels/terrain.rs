//! # Terrain
//!
//! Pairs the `VoxelWorld` with everything that must change whenever a block
//! disappears: the bullet marks stuck to it and the mesh of the chunk that owns
//! it. Gameplay code removes blocks through `Terrain::remove_block`, so a block
//! can never vanish without its decals going with it and its chunk being
//! queued for a rebuild.
//!
//! Terrain also indexes its blocks by owning chunk, so loading, unloading and
//! re-meshing a chunk only touch that chunk's cells.

use std::collections::{BTreeSet, HashMap, HashSet};

use cgmath::Point3;

use super::{
    block::block_type::BlockType,
    bullet_marks::{BulletMark, BulletMarks},
    chunk::{generation::GeneratedChunk, ChunkCoord, ChunkLayout},
    world::VoxelWorld,
};

/// The block map, its decals and the set of chunks whose meshes are out of date.
#[derive(Debug)]
pub struct Terrain {
    layout: ChunkLayout,
    world: VoxelWorld,
    /// Occupied cells of each chunk; mirrors `world` exactly
    chunk_blocks: HashMap<ChunkCoord, HashSet<Point3<i32>>>,
    bullet_marks: BulletMarks,
    dirty_chunks: BTreeSet<ChunkCoord>,
}

impl Terrain {
    /// Creates empty terrain partitioned by `layout`.
    pub fn new(layout: ChunkLayout) -> Self {
        Terrain {
            layout,
            world: VoxelWorld::new(),
            chunk_blocks: HashMap::new(),
            bullet_marks: BulletMarks::new(),
            dirty_chunks: BTreeSet::new(),
        }
    }

    /// The chunk layout blocks are partitioned by.
    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    /// Read access to the block map.
    pub fn world(&self) -> &VoxelWorld {
        &self.world
    }

    /// Every bullet mark currently attached to a block.
    pub fn bullet_marks(&self) -> &BulletMarks {
        &self.bullet_marks
    }

    /// Attaches a bullet mark to `block`. Marks on air are ignored.
    pub fn add_bullet_mark(&mut self, block: Point3<i32>, mark: BulletMark) {
        if self.world.contains(block) {
            self.bullet_marks.add(block, mark);
        }
    }

    /// Places a block and queues its chunk for a mesh rebuild.
    pub fn place_block(&mut self, position: Point3<i32>, block_type: BlockType) {
        let chunk = self.set_indexed(position, block_type);
        self.dirty_chunks.insert(chunk);
    }

    /// Removes a block, purges its bullet marks and queues its chunk for a mesh rebuild.
    ///
    /// # Returns
    /// The removed block's kind, or `None` if the cell was already air.
    pub fn remove_block(&mut self, position: Point3<i32>) -> Option<BlockType> {
        let removed = self.world.remove(position)?;
        let chunk = self.layout.chunk_of_block(position);
        if let Some(cells) = self.chunk_blocks.get_mut(&chunk) {
            cells.remove(&position);
            if cells.is_empty() {
                self.chunk_blocks.remove(&chunk);
            }
        }
        self.bullet_marks.remove_for_block(position);
        self.dirty_chunks.insert(chunk);
        Some(removed)
    }

    /// Replaces the contents of a chunk with freshly generated blocks.
    ///
    /// Whatever the chunk held before is cleared first. The chunk's mesh comes
    /// with the generated payload, so the chunk is not marked dirty.
    pub fn insert_chunk(&mut self, chunk: &GeneratedChunk) {
        self.clear_chunk(chunk.coord);
        for (position, block_type) in &chunk.blocks {
            self.set_indexed(*position, *block_type);
        }
    }

    /// Removes every block and bullet mark in the chunk's columns.
    ///
    /// # Returns
    /// The number of blocks removed.
    pub fn clear_chunk(&mut self, chunk: ChunkCoord) -> usize {
        self.dirty_chunks.remove(&chunk);
        let Some(cells) = self.chunk_blocks.remove(&chunk) else {
            return 0;
        };
        for position in &cells {
            self.world.remove(*position);
            self.bullet_marks.remove_for_block(*position);
        }
        cells.len()
    }

    /// The current blocks of a chunk, sorted by position.
    pub fn chunk_blocks(&self, chunk: ChunkCoord) -> Vec<(Point3<i32>, BlockType)> {
        let mut blocks: Vec<_> = self
            .chunk_blocks
            .get(&chunk)
            .into_iter()
            .flatten()
            .filter_map(|position| Some((*position, self.world.get(*position)?)))
            .collect();
        blocks.sort_by_key(|(position, _)| (position.x, position.y, position.z));
        blocks
    }

    /// Sets a block in the world and records it under its chunk.
    fn set_indexed(&mut self, position: Point3<i32>, block_type: BlockType) -> ChunkCoord {
        let chunk = self.layout.chunk_of_block(position);
        self.world.set(position, block_type);
        self.chunk_blocks.entry(chunk).or_default().insert(position);
        chunk
    }

    /// Returns and clears the set of chunks whose blocks changed since the last call.
    pub fn take_dirty_chunks(&mut self) -> Vec<ChunkCoord> {
        std::mem::take(&mut self.dirty_chunks).into_iter().collect()
    }

    /// Returns true if any chunk is waiting for a mesh rebuild.
    pub fn has_dirty_chunks(&self) -> bool {
        !self.dirty_chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn terrain_with(blocks: &[Point3<i32>]) -> Terrain {
        let mut terrain = Terrain::new(ChunkLayout::new(16));
        for block in blocks {
            terrain.set_indexed(*block, BlockType::SOLID);
        }
        terrain
    }

    #[test]
    fn test_remove_block_purges_marks_and_marks_chunk_dirty() {
        let block = Point3::new(17, 0, -1);
        let mut terrain = terrain_with(&[block]);
        terrain.add_bullet_mark(
            block,
            BulletMark {
                point: Point3::new(17.5, 1.0, -0.5),
                normal: Vector3::unit_y(),
            },
        );
        assert_eq!(terrain.bullet_marks().count(), 1);

        assert_eq!(terrain.remove_block(block), Some(BlockType::SOLID));
        assert_eq!(terrain.bullet_marks().count(), 0);
        assert_eq!(terrain.take_dirty_chunks(), vec![ChunkCoord::new(1, -1)]);
        assert!(!terrain.has_dirty_chunks());
    }

    #[test]
    fn test_removing_air_changes_nothing() {
        let mut terrain = terrain_with(&[]);
        assert_eq!(terrain.remove_block(Point3::new(0, 0, 0)), None);
        assert!(!terrain.has_dirty_chunks());
    }

    #[test]
    fn test_marks_on_air_are_ignored() {
        let mut terrain = terrain_with(&[]);
        terrain.add_bullet_mark(
            Point3::new(0, 0, 0),
            BulletMark {
                point: Point3::new(0.0, 1.0, 0.0),
                normal: Vector3::unit_y(),
            },
        );
        assert_eq!(terrain.bullet_marks().count(), 0);
    }

    #[test]
    fn test_clear_chunk_leaves_neighbours() {
        let mut terrain = terrain_with(&[
            Point3::new(0, 0, 0),
            Point3::new(15, 7, 15),
            Point3::new(16, 0, 0),
        ]);
        assert_eq!(terrain.clear_chunk(ChunkCoord::new(0, 0)), 2);
        assert_eq!(terrain.world().len(), 1);
        assert!(terrain.world().contains(Point3::new(16, 0, 0)));
    }

    #[test]
    fn test_chunk_blocks_sorted() {
        let terrain = terrain_with(&[Point3::new(3, 1, 0), Point3::new(1, 0, 0), Point3::new(1, 0, 16)]);
        let blocks: Vec<_> = terrain
            .chunk_blocks(ChunkCoord::new(0, 0))
            .into_iter()
            .map(|(position, _)| position)
            .collect();
        assert_eq!(blocks, vec![Point3::new(1, 0, 0), Point3::new(3, 1, 0)]);
    }

    #[test]
    fn test_clear_chunk_only_touches_that_chunk() {
        let mut terrain = terrain_with(&[Point3::new(-1, 3, -1), Point3::new(0, 0, 0)]);
        let marked = Point3::new(-1, 3, -1);
        terrain.add_bullet_mark(
            marked,
            BulletMark {
                point: Point3::new(-0.5, 4.0, -0.5),
                normal: Vector3::unit_y(),
            },
        );
        terrain.remove_block(Point3::new(0, 0, 0));
        terrain.take_dirty_chunks();

        assert_eq!(terrain.clear_chunk(ChunkCoord::new(0, 0)), 0);
        assert_eq!(terrain.bullet_marks().count(), 1);
        assert_eq!(terrain.clear_chunk(ChunkCoord::new(-1, -1)), 1);
        assert!(terrain.world().is_empty());
        assert_eq!(terrain.bullet_marks().count(), 0);
        assert!(terrain.chunk_blocks(ChunkCoord::new(-1, -1)).is_empty());
    }

    #[test]
    fn test_insert_chunk_replaces_previous_contents() {
        let coord = ChunkCoord::new(2, 0);
        let mut terrain = terrain_with(&[]);
        terrain.place_block(Point3::new(33, 5, 1), BlockType::LEAF);
        let chunk = GeneratedChunk {
            coord,
            blocks: vec![(Point3::new(32, 0, 0), BlockType::SOLID)],
            pickups: Vec::new(),
            enemies: Vec::new(),
        };

        terrain.insert_chunk(&chunk);
        assert_eq!(
            terrain.chunk_blocks(coord),
            vec![(Point3::new(32, 0, 0), BlockType::SOLID)]
        );
        assert_eq!(terrain.world().len(), 1);
        assert!(!terrain.has_dirty_chunks());
    }
}
