//! # Player Physics
//!
//! Continuous integration of the player's body against the voxel world.
//!
//! The player is an axis-aligned box `collision_radius` wide on each side of
//! the feet position and `height` tall. A position is blocked when any voxel
//! overlapping that box exists. Horizontal movement slides along walls by
//! retrying each axis on its own; vertical movement is driven by gravity and
//! a fixed jump impulse.
//!
//! ## Example
//!
//! ```ignore
//! let mut controller = PlayerController::new(&config.player, spawn);
//! controller.move_player(&world, 1.0, 0.0, false, false, yaw, dt);
//! controller.apply_gravity(&world, dt);
//! ```

use cgmath::Point3;

use crate::{
    core::{config::PlayerConfig, geometry::Aabb},
    engine_state::voxels::world::VoxelWorld,
};

/// Position and vertical state of the player's body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerBody {
    /// Feet position
    pub position: Point3<f32>,
    /// Vertical speed in blocks per second, positive upward
    pub vertical_velocity: f32,
    /// Whether the player is standing on a block
    pub on_ground: bool,
}

/// Moves the player's body through the world.
#[derive(Clone, Debug)]
pub struct PlayerController {
    body: PlayerBody,
    radius: f32,
    height: f32,
    move_speed: f32,
    sprint_multiplier: f32,
    jump_speed: f32,
    gravity: f32,
}

impl PlayerController {
    /// Creates a controller with the player's feet at `spawn`, airborne.
    pub fn new(config: &PlayerConfig, spawn: Point3<f32>) -> Self {
        PlayerController {
            body: PlayerBody {
                position: spawn,
                vertical_velocity: 0.0,
                on_ground: false,
            },
            radius: config.collision_radius,
            height: config.height,
            move_speed: config.move_speed,
            sprint_multiplier: config.sprint_multiplier,
            jump_speed: config.jump_speed,
            gravity: config.gravity,
        }
    }

    pub fn body(&self) -> &PlayerBody {
        &self.body
    }

    pub fn position(&self) -> Point3<f32> {
        self.body.position
    }

    pub fn on_ground(&self) -> bool {
        self.body.on_ground
    }

    /// Returns true if the player's box at feet position `(x, y, z)` overlaps any voxel.
    pub fn check_collision(&self, world: &VoxelWorld, x: f32, y: f32, z: f32) -> bool {
        world.contains_any_in(
            (x - self.radius).floor() as i32..=(x + self.radius).floor() as i32,
            y.floor() as i32..=(y + self.height).floor() as i32,
            (z - self.radius).floor() as i32..=(z + self.radius).floor() as i32,
        )
    }

    /// Moves horizontally to `(new_x, new_z)`, sliding along whatever blocks the way.
    ///
    /// The combined move is tried first. If it is blocked, the X-only move is
    /// tried, then the Z-only move from wherever X ended up.
    pub fn slide_movement(&mut self, world: &VoxelWorld, new_x: f32, new_z: f32) {
        let Point3 { y, z, .. } = self.body.position;
        if !self.check_collision(world, new_x, y, new_z) {
            self.body.position.x = new_x;
            self.body.position.z = new_z;
            return;
        }
        if !self.check_collision(world, new_x, y, z) {
            self.body.position.x = new_x;
        }
        if !self.check_collision(world, self.body.position.x, y, new_z) {
            self.body.position.z = new_z;
        }
    }

    /// Applies one tick of walking input.
    ///
    /// # Arguments
    /// * `world` - Blocks to collide with
    /// * `forward` - Forward input in `[-1, 1]`, positive along the view heading
    /// * `strafe` - Strafe input in `[-1, 1]`, positive to the right
    /// * `jump` - Starts a jump when standing on the ground
    /// * `sprint` - Multiplies the walking speed
    /// * `yaw` - View heading in degrees
    /// * `dt` - Seconds since the last tick
    #[allow(clippy::too_many_arguments)]
    pub fn move_player(
        &mut self,
        world: &VoxelWorld,
        forward: f32,
        strafe: f32,
        jump: bool,
        sprint: bool,
        yaw: f32,
        dt: f32,
    ) {
        let speed = if sprint {
            self.move_speed * self.sprint_multiplier
        } else {
            self.move_speed
        };
        let (sin, cos) = yaw.to_radians().sin_cos();
        let velocity_x = (sin * forward + cos * strafe) * speed * dt;
        let velocity_z = (-cos * forward + sin * strafe) * speed * dt;

        if velocity_x != 0.0 || velocity_z != 0.0 {
            let target_x = self.body.position.x + velocity_x;
            let target_z = self.body.position.z + velocity_z;
            self.slide_movement(world, target_x, target_z);
        }

        if jump && self.body.on_ground {
            self.body.vertical_velocity = self.jump_speed;
            self.body.on_ground = false;
        }
    }

    /// Applies one tick of gravity and re-derives whether the player is standing.
    pub fn apply_gravity(&mut self, world: &VoxelWorld, dt: f32) {
        self.body.vertical_velocity -= self.gravity * dt;
        let Point3 { x, y, z } = self.body.position;
        let new_y = y + self.body.vertical_velocity * dt;

        if self.check_collision(world, x, new_y, z) {
            self.body.vertical_velocity = 0.0;
            self.body.on_ground = true;
            return;
        }

        self.body.position.y = new_y;
        self.body.on_ground = world.contains(Point3::new(
            x.floor() as i32,
            (new_y - 0.01).floor() as i32,
            z.floor() as i32,
        ));
    }

    /// The player's collision box in world space.
    pub fn aabb(&self) -> Aabb {
        let Point3 { x, y, z } = self.body.position;
        Aabb {
            min: Point3::new(x - self.radius, y, z - self.radius),
            max: Point3::new(x + self.radius, y + self.height, z + self.radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use proptest::prelude::*;

    fn controller_at(x: f32, y: f32, z: f32) -> PlayerController {
        PlayerController::new(&PlayerConfig::default(), Point3::new(x, y, z))
    }

    fn flat_world(half: i32) -> VoxelWorld {
        let mut world = VoxelWorld::new();
        for x in -half..=half {
            for z in -half..=half {
                world.set(Point3::new(x, 0, z), BlockType::SOLID);
            }
        }
        world
    }

    #[test]
    fn test_known_solid_blocks_and_air_does_not() {
        let mut world = VoxelWorld::new();
        world.set(Point3::new(8, 0, 8), BlockType::SOLID);
        let controller = controller_at(0.0, 0.0, 0.0);

        assert!(controller.check_collision(&world, 8.5, 0.0, 8.5));
        assert!(!controller.check_collision(&world, 8.5, 1.0, 8.5));
        assert!(!controller.check_collision(&world, 2.5, 0.0, 2.5));
    }

    #[test]
    fn test_radius_reaches_neighbouring_cells() {
        let mut world = VoxelWorld::new();
        world.set(Point3::new(1, 1, 0), BlockType::SOLID);
        let controller = controller_at(0.0, 0.0, 0.0);

        assert!(controller.check_collision(&world, 0.8, 1.0, 0.5));
        assert!(!controller.check_collision(&world, 0.6, 1.0, 0.5));
    }

    #[test]
    fn test_slide_along_wall_keeps_free_axis() {
        let mut world = flat_world(4);
        for z in -4..=4 {
            world.set(Point3::new(2, 1, z), BlockType::SOLID);
        }
        let mut controller = controller_at(1.5, 1.0, 0.5);

        controller.slide_movement(&world, 1.9, 1.0);
        assert_eq!(controller.position().x, 1.5);
        assert_eq!(controller.position().z, 1.0);
    }

    #[test]
    fn test_slide_blocked_on_both_axes_stays_put() {
        let mut world = flat_world(4);
        world.set(Point3::new(1, 1, 1), BlockType::SOLID);
        world.set(Point3::new(1, 1, 0), BlockType::SOLID);
        world.set(Point3::new(0, 1, 1), BlockType::SOLID);
        let mut controller = controller_at(0.5, 1.0, 0.5);

        controller.slide_movement(&world, 0.9, 0.9);
        assert_eq!(controller.position(), Point3::new(0.5, 1.0, 0.5));
    }

    #[test]
    fn test_forward_follows_yaw() {
        let world = VoxelWorld::new();
        let mut controller = controller_at(0.0, 10.0, 0.0);
        controller.move_player(&world, 1.0, 0.0, false, false, 90.0, 0.5);
        let position = controller.position();
        assert!((position.x - 3.0).abs() < 1e-4);
        assert!(position.z.abs() < 1e-4);

        controller.move_player(&world, 0.0, 1.0, false, true, 0.0, 0.5);
        assert!((controller.position().x - 9.0).abs() < 1e-4);
    }

    #[test]
    fn test_falls_lands_and_jumps() {
        let world = flat_world(4);
        let mut controller = controller_at(0.5, 3.0, 0.5);
        for _ in 0..120 {
            controller.apply_gravity(&world, 1.0 / 60.0);
        }
        assert!(controller.on_ground());
        let landed = controller.position().y;
        assert!((1.0..1.2).contains(&landed));

        controller.move_player(&world, 0.0, 0.0, true, false, 0.0, 1.0 / 60.0);
        assert!(!controller.on_ground());
        controller.apply_gravity(&world, 1.0 / 60.0);
        assert!(controller.position().y > landed);

        controller.move_player(&world, 0.0, 0.0, true, false, 0.0, 1.0 / 60.0);
        assert!((controller.body().vertical_velocity - 11.4).abs() < 1e-4);
    }

    #[test]
    fn test_aabb_matches_dimensions() {
        let controller = controller_at(2.0, 1.0, -3.0);
        let aabb = controller.aabb();
        let expected_min = [1.7, 1.0, -3.3];
        let expected_max = [2.3, 2.7, -2.7];
        for axis in 0..3 {
            assert!((aabb.min[axis] - expected_min[axis]).abs() < 1e-5);
            assert!((aabb.max[axis] - expected_max[axis]).abs() < 1e-5);
        }
    }

    proptest! {
        #[test]
        fn prop_walking_never_enters_blocks(
            inputs in prop::collection::vec((-1.0f32..1.0, -1.0f32..1.0, 0.0f32..360.0), 1..60),
        ) {
            let mut world = flat_world(6);
            for (x, z) in [(2, 2), (-2, 1), (0, -3), (3, -1)] {
                world.set(Point3::new(x, 1, z), BlockType::SOLID);
                world.set(Point3::new(x, 2, z), BlockType::SOLID);
            }
            let mut controller = controller_at(0.5, 1.0, 0.5);
            for (forward, strafe, yaw) in inputs {
                controller.move_player(&world, forward, strafe, false, false, yaw, 1.0 / 30.0);
                let p = controller.position();
                prop_assert!(!controller.check_collision(&world, p.x, p.y, p.z));
            }
        }
    }
}
