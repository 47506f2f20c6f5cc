//! # Geometry Helpers
//!
//! Segment intersection tests shared by projectiles, enemies and decals.
//! Everything here works on the segment `p1 -> p2` parameterised over
//! `t ∈ [0, 1]` using the slab method.

use cgmath::{InnerSpace, Point3, Vector3};

/// Below this magnitude a segment component is treated as parallel to a slab.
const PARALLEL_EPSILON: f32 = 1e-9;

/// Tolerance used to decide which cube face a hit point lies on.
const FACE_EPSILON: f32 = 1e-5;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Point3<f32>,
    /// Maximum corner
    pub max: Point3<f32>,
}

impl Aabb {
    /// Builds a box from a centre point and half extents.
    pub fn from_center(center: [f32; 3], half: [f32; 3]) -> Self {
        Aabb {
            min: Point3::new(
                center[0] - half[0],
                center[1] - half[1],
                center[2] - half[2],
            ),
            max: Point3::new(
                center[0] + half[0],
                center[1] + half[1],
                center[2] + half[2],
            ),
        }
    }

    /// The unit cube occupied by the voxel at `block`.
    pub fn unit_cube(block: Point3<i32>) -> Self {
        let min = Point3::new(block.x as f32, block.y as f32, block.z as f32);
        Aabb {
            min,
            max: min + Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// A point where a segment enters a box, with the outward normal of the face it crossed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Entry point on the box surface
    pub point: Point3<f32>,
    /// Outward face normal, or zero when the segment started inside the box
    pub normal: Vector3<f32>,
}

/// Clips the segment against each slab of `aabb`.
///
/// # Returns
/// The entry parameter `t_min` when the segment overlaps the box, `None` otherwise.
fn clip_segment(p1: Point3<f32>, p2: Point3<f32>, aabb: &Aabb) -> Option<f32> {
    let mut t_min = 0.0f32;
    let mut t_max = 1.0f32;
    let delta = p2 - p1;

    for axis in 0..3 {
        let start = p1[axis];
        let d = delta[axis];
        let (b_min, b_max) = (aabb.min[axis], aabb.max[axis]);

        if d.abs() < PARALLEL_EPSILON {
            if start < b_min || start > b_max {
                return None;
            }
            continue;
        }

        let mut t0 = (b_min - start) / d;
        let mut t1 = (b_max - start) / d;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t1 < t_min || t0 > t_max {
            return None;
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_min)
}

/// Tests whether the segment `p1 -> p2` overlaps `aabb`.
pub fn segment_intersects_aabb(p1: Point3<f32>, p2: Point3<f32>, aabb: &Aabb) -> bool {
    clip_segment(p1, p2, aabb).is_some()
}

/// Computes where the segment `p1 -> p2` enters the unit cube of `block`.
///
/// The normal is chosen by checking the hit point against the cube faces in
/// the order -X, +X, -Y, +Y, -Z, +Z. A segment starting inside the cube hits
/// at `p1` and, unless `p1` sits on a face, gets a zero normal.
pub fn segment_unit_cube_hit(
    p1: Point3<f32>,
    p2: Point3<f32>,
    block: Point3<i32>,
) -> Option<SurfaceHit> {
    let cube = Aabb::unit_cube(block);
    let t = clip_segment(p1, p2, &cube)?;
    let point = p1 + (p2 - p1) * t;

    let faces = [
        (point.x - cube.min.x, Vector3::new(-1.0, 0.0, 0.0)),
        (point.x - cube.max.x, Vector3::new(1.0, 0.0, 0.0)),
        (point.y - cube.min.y, Vector3::new(0.0, -1.0, 0.0)),
        (point.y - cube.max.y, Vector3::new(0.0, 1.0, 0.0)),
        (point.z - cube.min.z, Vector3::new(0.0, 0.0, -1.0)),
        (point.z - cube.max.z, Vector3::new(0.0, 0.0, 1.0)),
    ];
    let normal = faces
        .iter()
        .find(|(gap, _)| gap.abs() < FACE_EPSILON)
        .map(|(_, normal)| *normal)
        .unwrap_or(Vector3::new(0.0, 0.0, 0.0));

    Some(SurfaceHit { point, normal })
}

/// Normalises `v`, or returns `fallback` when `v` is too short to have a direction.
pub fn normalize_or(v: Vector3<f32>, fallback: Vector3<f32>) -> Vector3<f32> {
    let length = v.magnitude();
    if length > PARALLEL_EPSILON {
        v / length
    } else {
        fallback
    }
}

/// Unit direction for a heading of `yaw_degrees` and an elevation of `pitch_degrees`.
///
/// Yaw 0 looks down -Z and yaw 90 looks down +X; positive pitch looks up.
pub fn direction_from_angles(yaw_degrees: f32, pitch_degrees: f32) -> Vector3<f32> {
    let (yaw_sin, yaw_cos) = yaw_degrees.to_radians().sin_cos();
    let (pitch_sin, pitch_cos) = pitch_degrees.to_radians().sin_cos();
    Vector3::new(yaw_sin * pitch_cos, pitch_sin, -yaw_cos * pitch_cos)
}

/// Rotates `v` about the Y axis into the local frame of something facing `yaw_degrees`.
pub fn rotate_into_yaw_frame(v: Vector3<f32>, yaw_degrees: f32) -> Vector3<f32> {
    let (sin, cos) = yaw_degrees.to_radians().sin_cos();
    Vector3::new(v.x * cos + v.z * sin, v.y, -v.x * sin + v.z * cos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_through_box_hits() {
        let aabb = Aabb::from_center([0.0, 0.0, 0.0], [0.5, 0.5, 0.5]);
        assert!(segment_intersects_aabb(
            Point3::new(-2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            &aabb
        ));
    }

    #[test]
    fn test_segment_short_of_box_misses() {
        let aabb = Aabb::from_center([0.0, 0.0, 0.0], [0.5, 0.5, 0.5]);
        assert!(!segment_intersects_aabb(
            Point3::new(-2.0, 0.0, 0.0),
            Point3::new(-0.6, 0.0, 0.0),
            &aabb
        ));
    }

    #[test]
    fn test_parallel_segment_outside_slab_misses() {
        let aabb = Aabb::from_center([0.0, 0.0, 0.0], [0.5, 0.5, 0.5]);
        assert!(!segment_intersects_aabb(
            Point3::new(-2.0, 1.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            &aabb
        ));
    }

    #[test]
    fn test_unit_cube_hit_from_above_has_up_normal() {
        let hit = segment_unit_cube_hit(
            Point3::new(0.5, 3.0, 0.5),
            Point3::new(0.5, 0.5, 0.5),
            Point3::new(0, 0, 0),
        )
        .unwrap();
        assert!((hit.point.y - 1.0).abs() < 1e-6);
        assert_eq!(hit.normal, Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_unit_cube_hit_from_negative_x() {
        let hit = segment_unit_cube_hit(
            Point3::new(2.0, 0.5, 0.5),
            Point3::new(3.5, 0.5, 0.5),
            Point3::new(3, 0, 0),
        )
        .unwrap();
        assert!((hit.point.x - 3.0).abs() < 1e-6);
        assert_eq!(hit.normal, Vector3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_unit_cube_missed() {
        assert!(segment_unit_cube_hit(
            Point3::new(0.0, 5.0, 0.0),
            Point3::new(1.0, 5.0, 0.0),
            Point3::new(0, 0, 0),
        )
        .is_none());
    }

    #[test]
    fn test_normalize_or_falls_back_on_zero() {
        let fallback = Vector3::new(0.0, 0.0, -1.0);
        assert_eq!(normalize_or(Vector3::new(0.0, 0.0, 0.0), fallback), fallback);
        assert_eq!(normalize_or(Vector3::new(0.0, 4.0, 0.0), fallback), Vector3::unit_y());
    }

    #[test]
    fn test_direction_from_angles() {
        let forward = direction_from_angles(0.0, 0.0);
        assert!((forward.z + 1.0).abs() < 1e-6);
        let east = direction_from_angles(90.0, 0.0);
        assert!((east.x - 1.0).abs() < 1e-6);
        let up = direction_from_angles(0.0, 90.0);
        assert!((up.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_yaw_frame_rotation_quarter_turn() {
        let v = rotate_into_yaw_frame(Vector3::new(1.0, 0.0, 0.0), 90.0);
        assert!(v.x.abs() < 1e-6);
        assert!((v.z + 1.0).abs() < 1e-6);
    }
}
