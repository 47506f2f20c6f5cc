//! # Block Type Module
//!
//! This module defines the different kinds of blocks in the voxel world and the
//! colour palette each kind is drawn with.

use super::block_side::BlockSide;

/// An RGB colour with components in `0.0..=1.0`.
pub type Color = [f32; 3];

/// Enumerates every kind of block that can occupy a cell.
///
/// Air is not a kind: an empty cell simply has no entry in the world map.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// Ground, trunks and any other opaque filler. Drawn as grass on top and dirt elsewhere.
    SOLID,

    /// Tree foliage. Drawn in shades of green on every face.
    LEAF,
}

/// Per-face colours of a block kind.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockPalette {
    /// Colour of the +Y face
    pub top: Color,
    /// Colour of the -Y face
    pub bottom: Color,
    /// Colour of the four vertical faces
    pub side: Color,
}

const SOLID_PALETTE: BlockPalette = BlockPalette {
    top: [0.0, 1.0, 0.0],
    bottom: [0.3, 0.2, 0.1],
    side: [0.5, 0.3, 0.1],
};

const LEAF_PALETTE: BlockPalette = BlockPalette {
    top: [0.0, 0.8, 0.0],
    bottom: [0.0, 0.5, 0.0],
    side: [0.0, 0.6, 0.0],
};

/// Colour of the outline drawn around every visible face.
pub const EDGE_COLOR: Color = [0.0, 0.0, 0.0];

impl BlockType {
    /// The palette this kind is drawn with.
    pub fn palette(&self) -> &'static BlockPalette {
        match self {
            BlockType::SOLID => &SOLID_PALETTE,
            BlockType::LEAF => &LEAF_PALETTE,
        }
    }

    /// The colour of one face of a block of this kind.
    pub fn face_color(&self, side: BlockSide) -> Color {
        let palette = self.palette();
        match side {
            BlockSide::TOP => palette.top,
            BlockSide::BOTTOM => palette.bottom,
            _ => palette.side,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_faces_use_grass_and_dirt() {
        assert_eq!(BlockType::SOLID.face_color(BlockSide::TOP), [0.0, 1.0, 0.0]);
        assert_eq!(BlockType::SOLID.face_color(BlockSide::BOTTOM), [0.3, 0.2, 0.1]);
        assert_eq!(BlockType::SOLID.face_color(BlockSide::LEFT), [0.5, 0.3, 0.1]);
    }

    #[test]
    fn test_leaf_sides_are_green() {
        assert_eq!(BlockType::LEAF.face_color(BlockSide::FRONT), [0.0, 0.6, 0.0]);
    }
}
