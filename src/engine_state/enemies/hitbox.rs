//! Oriented hit boxes.
//!
//! Each enemy kind is approximated by a handful of boxes fixed in its own
//! frame (origin at the enemy's position, facing +Z at yaw 0). A segment is
//! tested by moving it into that frame and running the slab test against every
//! box.

use cgmath::{Point3, Vector3};

use crate::core::geometry::{rotate_into_yaw_frame, segment_intersects_aabb, Aabb};

/// Body, head and four legs of the ground enemy.
pub fn robot_dog_boxes() -> [Aabb; 6] {
    [
        Aabb::from_center([0.0, 0.72, 0.0], [0.25, 0.12, 0.5]),
        Aabb::from_center([0.0, 0.9, 0.62], [0.12, 0.12, 0.12]),
        Aabb::from_center([-0.2, 0.3, 0.45], [0.05, 0.3, 0.05]),
        Aabb::from_center([0.2, 0.3, 0.45], [0.05, 0.3, 0.05]),
        Aabb::from_center([-0.2, 0.3, -0.45], [0.05, 0.3, 0.05]),
        Aabb::from_center([0.2, 0.3, -0.45], [0.05, 0.3, 0.05]),
    ]
}

/// Body and four rotor housings of the flying enemy.
pub fn drone_boxes() -> [Aabb; 5] {
    [
        Aabb::from_center([0.0, 0.0, 0.0], [0.15, 0.1, 0.4]),
        Aabb::from_center([0.15, 0.125, 0.4], [0.3, 0.025, 0.3]),
        Aabb::from_center([-0.15, 0.125, 0.4], [0.3, 0.025, 0.3]),
        Aabb::from_center([0.15, 0.125, -0.4], [0.3, 0.025, 0.3]),
        Aabb::from_center([-0.15, 0.125, -0.4], [0.3, 0.025, 0.3]),
    ]
}

/// Tests the world-space segment `p1 -> p2` against `boxes` placed at `origin` facing `yaw`.
pub fn segment_hits_boxes(
    p1: Point3<f32>,
    p2: Point3<f32>,
    origin: Point3<f32>,
    yaw: f32,
    boxes: &[Aabb],
) -> bool {
    let to_local = |p: Point3<f32>| -> Point3<f32> {
        let v: Vector3<f32> = rotate_into_yaw_frame(p - origin, yaw);
        Point3::new(v.x, v.y, v.z)
    };
    let (local_p1, local_p2) = (to_local(p1), to_local(p2));
    boxes
        .iter()
        .any(|aabb| segment_intersects_aabb(local_p1, local_p2, aabb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shot_through_dog_body_hits() {
        let origin = Point3::new(10.0, 1.0, 10.0);
        let hit = segment_hits_boxes(
            Point3::new(8.0, 1.72, 10.0),
            Point3::new(12.0, 1.72, 10.0),
            origin,
            0.0,
            &robot_dog_boxes(),
        );
        assert!(hit);
    }

    #[test]
    fn test_shot_over_dog_misses() {
        let origin = Point3::new(10.0, 1.0, 10.0);
        let hit = segment_hits_boxes(
            Point3::new(8.0, 3.0, 10.0),
            Point3::new(12.0, 3.0, 10.0),
            origin,
            0.0,
            &robot_dog_boxes(),
        );
        assert!(!hit);
    }

    #[test]
    fn test_rotation_is_applied() {
        // A long box along local Z is crossed at yaw 0 and missed once turned a quarter.
        let origin = Point3::new(0.0, 0.0, 0.0);
        let boxes = [Aabb::from_center([0.0, 0.0, 0.0], [0.1, 0.1, 1.0])];
        let p1 = Point3::new(-2.0, 0.0, 0.8);
        let p2 = Point3::new(2.0, 0.0, 0.8);
        assert!(segment_hits_boxes(p1, p2, origin, 0.0, &boxes));
        assert!(!segment_hits_boxes(p1, p2, origin, 90.0, &boxes));
    }

    #[test]
    fn test_drone_body_hit_from_below() {
        let origin = Point3::new(0.5, 8.0, 0.5);
        assert!(segment_hits_boxes(
            Point3::new(0.5, 6.0, 0.5),
            Point3::new(0.5, 9.0, 0.5),
            origin,
            123.0,
            &drone_boxes(),
        ));
    }
}
