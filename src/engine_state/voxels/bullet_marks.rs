//! # Bullet Marks
//!
//! Surface decals left by bullets, keyed by the block they are stuck to. A
//! block's marks live exactly as long as the block: every removal path goes
//! through `remove_for_block`.

use std::collections::HashMap;

use cgmath::{InnerSpace, Point3, Vector3};

use crate::core::geometry::SurfaceHit;

/// Distance a decal is lifted off its surface.
const SURFACE_OFFSET: f32 = 0.001;

/// Half extent of a decal quad.
const HALF_SIZE: f32 = 0.02;

/// Below this length a basis vector is left unnormalised.
const DEGENERATE_LENGTH: f32 = 1e-9;

/// A single impact on a block face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletMark {
    /// Point on the surface that was hit
    pub point: Point3<f32>,
    /// Outward normal of the face that was hit
    pub normal: Vector3<f32>,
}

impl BulletMark {
    /// The four corners of the decal quad, wound consistently around the normal.
    ///
    /// The quad is centred just in front of the surface and spans a tangent
    /// basis built from world up (or world X for floor/ceiling hits).
    pub fn quad_corners(&self) -> [Point3<f32>; 4] {
        let n = self.normal;
        let center = self.point + n * SURFACE_OFFSET;
        let up = if n.y.abs() > 0.9 {
            Vector3::unit_x()
        } else {
            Vector3::unit_y()
        };

        let mut t1 = up.cross(n);
        if t1.magnitude() > DEGENERATE_LENGTH {
            t1 = t1.normalize();
        }
        let mut t2 = n.cross(t1);
        if t2.magnitude() > DEGENERATE_LENGTH {
            t2 = t2.normalize();
        }
        let t1 = t1 * HALF_SIZE;
        let t2 = t2 * HALF_SIZE;

        [
            center + t1 + t2,
            center + t1 - t2,
            center - t1 - t2,
            center - t1 + t2,
        ]
    }
}

impl From<SurfaceHit> for BulletMark {
    fn from(hit: SurfaceHit) -> Self {
        BulletMark {
            point: hit.point,
            normal: hit.normal,
        }
    }
}

/// Every bullet mark in the world, grouped by block.
#[derive(Debug, Default)]
pub struct BulletMarks {
    by_block: HashMap<Point3<i32>, Vec<BulletMark>>,
}

impl BulletMarks {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches `mark` to `block`.
    pub fn add(&mut self, block: Point3<i32>, mark: BulletMark) {
        self.by_block.entry(block).or_default().push(mark);
    }

    /// Drops every mark on `block`, returning how many there were.
    pub fn remove_for_block(&mut self, block: Point3<i32>) -> usize {
        self.by_block.remove(&block).map_or(0, |marks| marks.len())
    }

    /// Marks attached to `block`.
    pub fn marks_on(&self, block: Point3<i32>) -> &[BulletMark] {
        self.by_block.get(&block).map_or(&[], Vec::as_slice)
    }

    /// Iterates over every mark with the block it belongs to.
    pub fn iter(&self) -> impl Iterator<Item = (Point3<i32>, &BulletMark)> {
        self.by_block
            .iter()
            .flat_map(|(block, marks)| marks.iter().map(move |mark| (*block, mark)))
    }

    /// Total number of marks.
    pub fn count(&self) -> usize {
        self.by_block.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(normal: Vector3<f32>) -> BulletMark {
        BulletMark {
            point: Point3::new(1.0, 0.5, 0.5),
            normal,
        }
    }

    #[test]
    fn test_remove_for_block_only_touches_that_block() {
        let mut marks = BulletMarks::new();
        marks.add(Point3::new(0, 0, 0), mark(Vector3::unit_x()));
        marks.add(Point3::new(0, 0, 0), mark(Vector3::unit_x()));
        marks.add(Point3::new(1, 0, 0), mark(Vector3::unit_y()));

        assert_eq!(marks.remove_for_block(Point3::new(0, 0, 0)), 2);
        assert_eq!(marks.count(), 1);
        assert_eq!(marks.marks_on(Point3::new(1, 0, 0)).len(), 1);
    }

    #[test]
    fn test_quad_lies_in_face_plane() {
        let corners = mark(Vector3::unit_x()).quad_corners();
        for corner in corners {
            assert!((corner.x - 1.001).abs() < 1e-6);
            assert!((corner.y - 0.5).abs() <= 0.02 + 1e-6);
            assert!((corner.z - 0.5).abs() <= 0.02 + 1e-6);
        }
        assert_ne!(corners[0], corners[2]);
    }

    #[test]
    fn test_floor_hit_uses_x_as_up() {
        let corners = mark(Vector3::unit_y()).quad_corners();
        for corner in corners {
            assert!((corner.y - 0.501).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_normal_does_not_produce_nan() {
        let corners = mark(Vector3::new(0.0, 0.0, 0.0)).quad_corners();
        assert!(corners.iter().all(|c| c.x.is_finite() && c.y.is_finite() && c.z.is_finite()));
    }
}
