//! # World Module
//!
//! This module provides the `VoxelWorld` struct, the sparse map from integer cell
//! coordinates to block kinds that every other subsystem reads from.
//!
//! ## Architecture
//!
//! The world stores only occupied cells: a coordinate key exists iff a block is
//! there, and absence means air. It knows nothing about chunks, meshes or
//! entities. Removing a block never cascades; callers that remove blocks are
//! responsible for rebuilding meshes and purging decals.
//!
//! ## Performance Considerations
//!
//! - Point lookups are O(1) using a hash map
//! - Box queries check each cell of the box, so they suit the small regions
//!   collision and line-of-sight work with

use std::collections::HashMap;
use std::ops::RangeInclusive;

use cgmath::Point3;

use super::block::block_type::BlockType;

/// Sparse voxel storage keyed by world cell coordinate.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_arena::engine_state::voxels::{block::block_type::BlockType, world::VoxelWorld};
///
/// let mut world = VoxelWorld::new();
/// world.set(Point3::new(8, 0, 8), BlockType::SOLID);
/// assert_eq!(world.get(Point3::new(8, 0, 8)), Some(BlockType::SOLID));
/// assert!(world.remove(Point3::new(8, 0, 8)).is_some());
/// assert!(world.is_empty());
/// ```
#[derive(Debug, Default, Clone)]
pub struct VoxelWorld {
    blocks: HashMap<Point3<i32>, BlockType>,
}

impl VoxelWorld {
    /// Creates a new, empty world.
    pub fn new() -> Self {
        VoxelWorld {
            blocks: HashMap::new(),
        }
    }

    /// Returns the kind of block at `position`, or `None` for air.
    pub fn get(&self, position: Point3<i32>) -> Option<BlockType> {
        self.blocks.get(&position).copied()
    }

    /// Returns true if any block occupies `position`.
    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.blocks.contains_key(&position)
    }

    /// Places a block, replacing whatever was there.
    pub fn set(&mut self, position: Point3<i32>, block_type: BlockType) {
        self.blocks.insert(position, block_type);
    }

    /// Removes the block at `position` and returns its kind.
    ///
    /// Removing air is a no-op that returns `None`.
    pub fn remove(&mut self, position: Point3<i32>) -> Option<BlockType> {
        self.blocks.remove(&position)
    }

    /// Tests whether any cell in the inclusive box spanned by the three ranges is occupied.
    ///
    /// This is the query collision detection is built on.
    pub fn contains_any_in(
        &self,
        x_range: RangeInclusive<i32>,
        y_range: RangeInclusive<i32>,
        z_range: RangeInclusive<i32>,
    ) -> bool {
        for x in x_range {
            for y in y_range.clone() {
                for z in z_range.clone() {
                    if self.blocks.contains_key(&Point3::new(x, y, z)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Iterates over every occupied cell.
    pub fn iter(&self) -> impl Iterator<Item = (Point3<i32>, BlockType)> + '_ {
        self.blocks.iter().map(|(position, block_type)| (*position, *block_type))
    }

    /// Number of occupied cells.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if no cell is occupied.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
