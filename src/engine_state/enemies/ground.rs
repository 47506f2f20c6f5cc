//! # Ground Enemy
//!
//! The robot dog wanders: it turns toward a randomly picked heading, walks
//! for a while, and picks a new heading every few seconds or as soon as it
//! bumps into the terrain. Its pistol turret tracks the player independently
//! of the body and fires whenever the player is in range, visible and the
//! weapon has cooled down.

use cgmath::{Point3, Vector3};
use fastrand::Rng;

use super::{
    draw_state, forward_of,
    hitbox::{robot_dog_boxes, segment_hits_boxes},
    line_of_sight_blocked, turn_toward, EnemyBehavior, EnemyEvents, EnemyId, EnemyKind,
    EnemyStatus, EnemyTick,
};
use crate::{
    core::geometry::normalize_or,
    engine_state::{
        audio::SoundId,
        entities::projectile::{Bullet, Shooter},
        rendering::render_state::{EntityDrawState, Health},
        voxels::world::VoxelWorld,
    },
};

const MAX_HEALTH: i32 = 50;
const WALK_SPEED: f32 = 6.0;
const TURN_RATE: f32 = 30.0;
const GRAVITY: f32 = 36.0;

/// Seconds between heading changes, picked uniformly from this range.
const CHANGE_INTERVAL: (f32, f32) = (3.0, 6.0);

/// Seconds of walking after a heading change, picked uniformly from this range.
const WALK_TIME: (f32, f32) = (2.0, 4.0);

/// Chance of standing still after an unforced heading change.
const IDLE_CHANCE: f32 = 0.2;

/// Random headings tried when looking for a free direction.
const HEADING_TRIES: usize = 10;

/// How far ahead a candidate heading is checked for obstacles.
const HEADING_LOOKAHEAD: f32 = 0.5;

const HALF_WIDTH: f32 = 0.25;
const HALF_LENGTH: f32 = 0.5;
const HEIGHT: f32 = 1.1;

const FIRE_DELAY: f64 = 5.0;
const SHOOT_RANGE: f32 = 30.0;

/// Height the line of sight is traced from.
const SIGHT_HEIGHT: f32 = 0.5;

/// Height the aim direction is measured from.
const AIM_HEIGHT: f32 = 1.05;

/// Height of the muzzle before the barrel offset.
const MUZZLE_HEIGHT: f32 = 0.8;

/// Distance along the aim direction a bullet spawns at.
const MUZZLE_OFFSET: f32 = 0.6;

/// Tests the dog's body box at `(x, y, z)` against the world.
fn collides_with_world(world: &VoxelWorld, x: f32, y: f32, z: f32) -> bool {
    world.contains_any_in(
        (x - HALF_WIDTH).floor() as i32..=(x + HALF_WIDTH).floor() as i32,
        y.floor() as i32..=(y + HEIGHT).floor() as i32,
        (z - HALF_LENGTH).floor() as i32..=(z + HALF_LENGTH).floor() as i32,
    )
}

fn has_ground_below(world: &VoxelWorld, position: Point3<f32>) -> bool {
    world.contains(Point3::new(
        position.x.floor() as i32,
        (position.y - 0.1).floor() as i32,
        position.z.floor() as i32,
    ))
}

fn uniform(rng: &mut Rng, (low, high): (f32, f32)) -> f32 {
    low + rng.f32() * (high - low)
}

/// Wandering quadruped with a pistol turret.
#[derive(Debug)]
pub struct RobotDog {
    id: EnemyId,
    position: Point3<f32>,
    yaw: f32,
    target_yaw: f32,
    vertical_velocity: f32,
    health: i32,
    walk_time: f32,
    walk_timer: f32,
    change_interval: f32,
    since_change: f32,
    last_shot: Option<f64>,
    turret_yaw: f32,
    rng: Rng,
}

impl RobotDog {
    /// Creates a dog already committed to walking somewhere.
    pub fn new(id: EnemyId, position: Point3<f32>, yaw: f32, seed: u64) -> Self {
        let mut dog = RobotDog {
            id,
            position,
            yaw,
            target_yaw: yaw,
            vertical_velocity: 0.0,
            health: MAX_HEALTH,
            walk_time: 0.0,
            walk_timer: 0.0,
            change_interval: 0.0,
            since_change: 0.0,
            last_shot: None,
            turret_yaw: 0.0,
            rng: Rng::with_seed(seed),
        };
        dog.pick_new_direction(true, None);
        dog
    }

    /// Heading of the turret relative to the body, in degrees.
    pub fn turret_yaw(&self) -> f32 {
        self.turret_yaw
    }

    fn free_heading(&mut self, world: &VoxelWorld) -> f32 {
        for _ in 0..HEADING_TRIES {
            let attempt = self.rng.f32() * 360.0;
            let (fx, fz) = forward_of(attempt);
            let x = self.position.x + fx * HEADING_LOOKAHEAD;
            let z = self.position.z + fz * HEADING_LOOKAHEAD;
            if !collides_with_world(world, x, self.position.y, z) {
                return attempt;
            }
        }
        self.rng.f32() * 360.0
    }

    /// Picks a new heading and walk time.
    ///
    /// A forced pick always walks; otherwise the dog may decide to idle.
    fn pick_new_direction(&mut self, force_move: bool, world: Option<&VoxelWorld>) {
        self.target_yaw = match world {
            Some(world) => self.free_heading(world),
            None => self.rng.f32() * 360.0,
        };
        self.walk_time = if !force_move && self.rng.f32() < IDLE_CHANCE {
            0.0
        } else {
            uniform(&mut self.rng, WALK_TIME)
        };
        self.walk_timer = 0.0;
        self.since_change = 0.0;
        self.change_interval = uniform(&mut self.rng, CHANGE_INTERVAL);
    }

    fn apply_gravity(&mut self, world: &VoxelWorld, dt: f32) {
        if has_ground_below(world, self.position) {
            self.vertical_velocity = self.vertical_velocity.max(0.0);
            return;
        }
        self.vertical_velocity -= GRAVITY * dt;
        let new_y = self.position.y + self.vertical_velocity * dt;
        if collides_with_world(world, self.position.x, new_y, self.position.z) {
            self.vertical_velocity = 0.0;
        } else {
            self.position.y = new_y;
        }
    }

    fn walk(&mut self, world: &VoxelWorld, dt: f32) {
        if self.walk_time <= 0.0 {
            return;
        }
        let (fx, fz) = forward_of(self.yaw);
        let x = self.position.x + fx * WALK_SPEED * dt;
        let z = self.position.z + fz * WALK_SPEED * dt;
        if collides_with_world(world, x, self.position.y, z) {
            self.pick_new_direction(true, Some(world));
            return;
        }
        self.position.x = x;
        self.position.z = z;
        self.walk_timer += dt;
        if self.walk_timer >= self.walk_time {
            self.walk_time = 0.0;
        }
    }

    /// Points the turret at the player and fires if possible.
    fn aim_and_fire(&mut self, tick: &EnemyTick, events: &mut EnemyEvents) {
        let eye = tick.target.eye;
        let dx = eye.x - self.position.x;
        let dz = eye.z - self.position.z;

        let (sin, cos) = (-self.yaw.to_radians()).sin_cos();
        let local_x = -(dx * cos - dz * sin);
        let local_z = dx * sin + dz * cos;
        self.turret_yaw = -local_x.atan2(local_z).to_degrees();

        if (dx * dx + dz * dz).sqrt() >= SHOOT_RANGE {
            return;
        }
        let sight_from = Point3::new(
            self.position.x,
            self.position.y + SIGHT_HEIGHT,
            self.position.z,
        );
        if line_of_sight_blocked(tick.world, sight_from, eye) {
            return;
        }
        if let Some(last) = self.last_shot {
            if tick.now - last <= FIRE_DELAY {
                return;
            }
        }

        let aim = Vector3::new(dx, eye.y - (self.position.y + AIM_HEIGHT), dz);
        let direction = normalize_or(aim, aim);
        let muzzle = Point3::new(
            self.position.x + direction.x * MUZZLE_OFFSET,
            self.position.y + MUZZLE_HEIGHT + direction.y * MUZZLE_OFFSET,
            self.position.z + direction.z * MUZZLE_OFFSET,
        );
        events
            .bullets
            .push(Bullet::new(muzzle, direction, Shooter::Enemy(self.id)));
        events.sounds.push((SoundId::EnemyPistol, self.position));
        self.last_shot = Some(tick.now);
        log::trace!("Enemy {} fired at the player", self.id);
    }
}

impl EnemyBehavior for RobotDog {
    fn update(&mut self, tick: &EnemyTick, events: &mut EnemyEvents) -> EnemyStatus {
        if self.health <= 0 {
            return EnemyStatus::Dead;
        }

        self.apply_gravity(tick.world, tick.dt);
        self.yaw = turn_toward(self.yaw, self.target_yaw, TURN_RATE * tick.dt);
        self.walk(tick.world, tick.dt);

        self.since_change += tick.dt;
        if self.since_change >= self.change_interval {
            self.pick_new_direction(false, Some(tick.world));
        }

        self.aim_and_fire(tick, events);
        EnemyStatus::Alive
    }

    fn take_damage(&mut self, amount: i32) {
        self.health -= amount;
    }

    fn position(&self) -> Point3<f32> {
        self.position
    }

    fn yaw(&self) -> f32 {
        self.yaw
    }

    fn health(&self) -> Health {
        Health {
            current: self.health,
            max: MAX_HEALTH,
        }
    }

    fn is_hit_by_segment(&self, p1: Point3<f32>, p2: Point3<f32>) -> bool {
        segment_hits_boxes(p1, p2, self.position, self.yaw, &robot_dog_boxes())
    }

    fn render_state(&self) -> EntityDrawState {
        draw_state(
            EnemyKind::Ground,
            self.position,
            self.yaw,
            Some(self.turret_yaw),
            self.health(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        enemies::PlayerTarget, voxels::block::block_type::BlockType,
    };

    fn floor(half: i32) -> VoxelWorld {
        let mut world = VoxelWorld::new();
        for x in -half..=half {
            for z in -half..=half {
                world.set(Point3::new(x, 0, z), BlockType::SOLID);
            }
        }
        world
    }

    fn target_at(x: f32, z: f32) -> PlayerTarget {
        PlayerTarget {
            feet: Point3::new(x, 1.0, z),
            eye: Point3::new(x, 2.7, z),
        }
    }

    fn step(dog: &mut RobotDog, world: &VoxelWorld, now: f64, target: PlayerTarget) -> EnemyEvents {
        let mut events = EnemyEvents::default();
        let tick = EnemyTick {
            dt: 1.0 / 60.0,
            now,
            world,
            target,
        };
        dog.update(&tick, &mut events);
        events
    }

    #[test]
    fn test_fires_with_clear_sight_and_respects_cooldown() {
        let world = floor(20);
        let mut dog = RobotDog::new(1, Point3::new(0.5, 1.0, 0.5), 0.0, 3);
        let target = target_at(10.5, 0.5);

        let first = step(&mut dog, &world, 0.0, target);
        assert_eq!(first.bullets.len(), 1);
        assert_eq!(first.bullets[0].owner(), Shooter::Enemy(1));
        assert_eq!(first.sounds[0].0, SoundId::EnemyPistol);

        assert!(step(&mut dog, &world, 1.0, target).bullets.is_empty());
        assert!(step(&mut dog, &world, 5.0, target).bullets.is_empty());
        assert_eq!(step(&mut dog, &world, 5.5, target).bullets.len(), 1);
    }

    #[test]
    fn test_wall_blocks_fire() {
        let mut world = floor(20);
        for y in 1..=5 {
            for z in -6..=6 {
                world.set(Point3::new(5, y, z), BlockType::SOLID);
            }
        }
        let mut dog = RobotDog::new(1, Point3::new(0.5, 1.0, 0.5), 0.0, 3);
        let events = step(&mut dog, &world, 0.0, target_at(10.5, 0.5));
        assert!(events.bullets.is_empty());
    }

    #[test]
    fn test_out_of_range_does_not_fire() {
        let world = floor(2);
        let mut dog = RobotDog::new(1, Point3::new(0.5, 1.0, 0.5), 0.0, 3);
        let events = step(&mut dog, &world, 0.0, target_at(40.5, 0.5));
        assert!(events.bullets.is_empty());
    }

    #[test]
    fn test_falls_and_lands_on_floor() {
        let world = floor(40);
        let mut dog = RobotDog::new(1, Point3::new(0.5, 5.0, 0.5), 0.0, 8);
        let far = target_at(200.0, 200.0);
        for tick in 0..200 {
            step(&mut dog, &world, tick as f64 / 60.0, far);
        }
        let y = dog.position().y;
        assert!((1.0..1.2).contains(&y), "dog settled at {y}");
    }

    #[test]
    fn test_never_walks_into_blocks() {
        let mut world = floor(6);
        for x in -6..=6 {
            world.set(Point3::new(x, 1, 3), BlockType::SOLID);
            world.set(Point3::new(x, 1, -3), BlockType::SOLID);
        }
        for z in -6..=6 {
            world.set(Point3::new(3, 1, z), BlockType::SOLID);
            world.set(Point3::new(-3, 1, z), BlockType::SOLID);
        }
        let mut dog = RobotDog::new(1, Point3::new(0.5, 1.0, 0.5), 0.0, 21);
        let far = target_at(200.0, 200.0);
        for tick in 0..600 {
            step(&mut dog, &world, tick as f64 / 60.0, far);
            let p = dog.position();
            assert!(!collides_with_world(&world, p.x, p.y, p.z));
        }
    }

    #[test]
    fn test_dead_dog_reports_dead() {
        let world = floor(2);
        let mut dog = RobotDog::new(1, Point3::new(0.5, 1.0, 0.5), 0.0, 3);
        dog.take_damage(50);
        let mut events = EnemyEvents::default();
        let tick = EnemyTick {
            dt: 1.0 / 60.0,
            now: 0.0,
            world: &world,
            target: target_at(2.5, 0.5),
        };
        assert_eq!(dog.update(&tick, &mut events), EnemyStatus::Dead);
        assert!(events.bullets.is_empty());
    }

    #[test]
    fn test_turret_tracks_player_relative_to_body() {
        let world = floor(20);
        let mut dog = RobotDog::new(1, Point3::new(0.5, 1.0, 0.5), 0.0, 3);
        // Facing +Z with the player straight ahead.
        dog.target_yaw = 0.0;
        dog.walk_time = 0.0;
        step(&mut dog, &world, 0.0, target_at(0.5, 10.5));
        assert!(dog.turret_yaw().abs() < 1e-3);
    }
}
