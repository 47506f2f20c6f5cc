use cgmath::Point3;

use crate::engine_state::{
    rendering::vertex::ColorVertex,
    voxels::block::{
        block_side::BlockSide,
        block_type::{BlockType, EDGE_COLOR},
    },
};

/// Represents a single visible quad face of a voxel.
///
/// A face is defined by four corner points in loop order (lower-left,
/// lower-right, upper-right, upper-left as seen from outside the block) and
/// carries the block type and side it was built for, which decide its colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner of the face in world coordinates
    pub ll: Point3<i32>,
    /// Lower-right corner of the face in world coordinates
    pub lr: Point3<i32>,
    /// Upper-right corner of the face in world coordinates
    pub ur: Point3<i32>,
    /// Upper-left corner of the face in world coordinates
    pub ul: Point3<i32>,
    /// The kind of the block this face belongs to
    pub block_type: BlockType,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates the face of the voxel at `(i, j, k)` on the given side.
    ///
    /// # Arguments
    /// * `i`, `j`, `k` - The world coordinates of the voxel
    /// * `block_type` - The kind of the block, used for colouring
    /// * `block_side` - Which side of the block this face represents
    pub fn new(i: i32, j: i32, k: i32, block_type: BlockType, block_side: BlockSide) -> Self {
        let (ll, lr, ur, ul) = match block_side {
            BlockSide::FRONT => (
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i, j + 1, k + 1),
            ),
            BlockSide::BACK => (
                Point3::new(i, j, k),
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i, j + 1, k),
            ),
            BlockSide::BOTTOM => (
                Point3::new(i, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j, k),
            ),
            BlockSide::TOP => (
                Point3::new(i, j + 1, k),
                Point3::new(i + 1, j + 1, k),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i, j + 1, k + 1),
            ),
            BlockSide::LEFT => (
                Point3::new(i, j, k),
                Point3::new(i, j, k + 1),
                Point3::new(i, j + 1, k + 1),
                Point3::new(i, j + 1, k),
            ),
            BlockSide::RIGHT => (
                Point3::new(i + 1, j, k),
                Point3::new(i + 1, j, k + 1),
                Point3::new(i + 1, j + 1, k + 1),
                Point3::new(i + 1, j + 1, k),
            ),
        };

        Face {
            ll,
            lr,
            ur,
            ul,
            block_type,
            block_side,
        }
    }

    /// The two triangles covering the face, coloured by the block palette.
    pub fn triangle_vertices(&self) -> [ColorVertex; 6] {
        let color = self.block_type.face_color(self.block_side);
        [self.ll, self.lr, self.ur, self.ll, self.ur, self.ul]
            .map(|corner| ColorVertex::new(to_floats(corner), color))
    }

    /// The four outline segments around the face, as line-list vertex pairs.
    pub fn edge_vertices(&self) -> [ColorVertex; 8] {
        [
            self.ll, self.lr, self.lr, self.ur, self.ur, self.ul, self.ul, self.ll,
        ]
        .map(|corner| ColorVertex::new(to_floats(corner), EDGE_COLOR))
    }
}

fn to_floats(point: Point3<i32>) -> [f32; 3] {
    [point.x as f32, point.y as f32, point.z as f32]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_lies_on_its_side_plane() {
        for side in BlockSide::all() {
            let face = Face::new(2, 3, 4, BlockType::SOLID, side);
            let normal = side.normal();
            let corners = [face.ll, face.lr, face.ur, face.ul];
            let plane = |p: Point3<i32>| p.x * normal.x + p.y * normal.y + p.z * normal.z;
            let outward = if normal.x + normal.y + normal.z > 0 { 1 } else { 0 };
            let expected = plane(Point3::new(2, 3, 4)) + outward;
            assert!(corners.iter().all(|c| plane(*c) == expected), "{:?}", side);
        }
    }

    #[test]
    fn test_edges_are_black_and_closed() {
        let edges = Face::new(0, 0, 0, BlockType::LEAF, BlockSide::TOP).edge_vertices();
        assert!(edges.iter().all(|v| v.color == EDGE_COLOR));
        assert_eq!(edges[0].position, edges[7].position);
    }
}
