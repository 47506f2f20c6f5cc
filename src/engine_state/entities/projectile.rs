//! # Projectiles
//!
//! Bullets and rockets are straight-line movers. Each tick a projectile
//! advances along its unit direction, dies once it has flown its maximum
//! distance, and otherwise resolves the segment it just swept: enemies first,
//! then the player (enemy bullets only), then the voxel cell it landed in.
//!
//! `update` reports what happened instead of reaching into the rest of the
//! world, so the session decides how a hit turns into decals, sounds and
//! explosions.

use cgmath::{Point3, Vector3};

use crate::{
    core::geometry::{normalize_or, segment_intersects_aabb, segment_unit_cube_hit, Aabb, SurfaceHit},
    engine_state::{
        enemies::{Enemy, EnemyId},
        voxels::world::VoxelWorld,
    },
};

/// Bullet speed in blocks per second.
pub const BULLET_SPEED: f32 = 30.0;

/// Distance after which a bullet disappears.
pub const BULLET_RANGE: f32 = 20.0;

/// Damage dealt by a bullet or pellet.
pub const BULLET_DAMAGE: i32 = 10;

/// Draw radius of a bullet.
pub const BULLET_RADIUS: f32 = 0.05;

/// Rocket speed in blocks per second.
pub const ROCKET_SPEED: f32 = 18.0;

/// Distance after which a rocket fizzles without exploding.
pub const ROCKET_RANGE: f32 = 50.0;

/// Radius in blocks of a rocket's explosion.
pub const ROCKET_BLAST_RADIUS: i32 = 3;

/// Direction used when a projectile is spawned with a zero-length direction.
const DEFAULT_DIRECTION: Vector3<f32> = Vector3::new(0.0, 0.0, -1.0);

/// Who fired a bullet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shooter {
    /// The player; never hits the player
    Player,
    /// An enemy; never hits that enemy
    Enemy(EnemyId),
}

/// What happened to a bullet this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BulletOutcome {
    /// Still in flight
    Flying,
    /// Flew its full range
    Expired,
    /// Struck an enemy, which has already taken the damage
    HitEnemy(EnemyId),
    /// Struck the player
    HitPlayer,
    /// Landed inside a block
    HitBlock {
        /// The block that was hit
        block: Point3<i32>,
        /// Where the bullet's path entered the block, if it did this tick
        surface: Option<SurfaceHit>,
    },
}

/// A bullet or shotgun pellet.
#[derive(Clone, Debug)]
pub struct Bullet {
    position: Point3<f32>,
    direction: Vector3<f32>,
    distance_traveled: f32,
    owner: Shooter,
}

impl Bullet {
    /// Creates a bullet at `position` heading along `direction`.
    pub fn new(position: Point3<f32>, direction: Vector3<f32>, owner: Shooter) -> Self {
        Bullet {
            position,
            direction: normalize_or(direction, DEFAULT_DIRECTION),
            distance_traveled: 0.0,
            owner,
        }
    }

    /// Current position.
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    /// Unit direction of travel.
    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    /// Who fired the bullet.
    pub fn owner(&self) -> Shooter {
        self.owner
    }

    /// Advances the bullet and resolves what it hit.
    ///
    /// # Arguments
    /// * `dt` - Seconds since the last tick
    /// * `world` - Blocks to collide with
    /// * `enemies` - Live enemies; a hit enemy takes `BULLET_DAMAGE`
    /// * `player` - The player's collision box, if the player is in the world
    pub fn update(
        &mut self,
        dt: f32,
        world: &VoxelWorld,
        enemies: &mut [Enemy],
        player: Option<&Aabb>,
    ) -> BulletOutcome {
        let previous = self.position;
        let step = BULLET_SPEED * dt;
        self.position += self.direction * step;
        self.distance_traveled += step;
        if self.distance_traveled >= BULLET_RANGE {
            return BulletOutcome::Expired;
        }

        for enemy in enemies.iter_mut() {
            if enemy.health() <= 0 || self.owner == Shooter::Enemy(enemy.id()) {
                continue;
            }
            if enemy.is_hit_by_segment(previous, self.position) {
                enemy.take_damage(BULLET_DAMAGE);
                return BulletOutcome::HitEnemy(enemy.id());
            }
        }

        if let (Shooter::Enemy(_), Some(player)) = (self.owner, player) {
            if segment_intersects_aabb(previous, self.position, player) {
                return BulletOutcome::HitPlayer;
            }
        }

        let block = block_at(self.position);
        if world.contains(block) {
            return BulletOutcome::HitBlock {
                block,
                surface: segment_unit_cube_hit(previous, self.position, block),
            };
        }

        BulletOutcome::Flying
    }
}

/// What happened to a rocket this tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RocketOutcome {
    /// Still in flight
    Flying,
    /// Flew its full range without hitting anything
    Expired,
    /// Hit an enemy or a block; the explosion centre is given
    Detonated(Point3<f32>),
}

/// A rocket.
#[derive(Clone, Debug)]
pub struct Rocket {
    position: Point3<f32>,
    direction: Vector3<f32>,
    distance_traveled: f32,
}

impl Rocket {
    /// Creates a rocket at `position` heading along `direction`.
    pub fn new(position: Point3<f32>, direction: Vector3<f32>) -> Self {
        Rocket {
            position,
            direction: normalize_or(direction, DEFAULT_DIRECTION),
            distance_traveled: 0.0,
        }
    }

    /// Current position.
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    /// Unit direction of travel.
    pub fn direction(&self) -> Vector3<f32> {
        self.direction
    }

    /// Heading and elevation of the rocket body in degrees, for drawing.
    pub fn orientation(&self) -> (f32, f32) {
        let d = self.direction;
        let horizontal = (d.x * d.x + d.z * d.z).sqrt();
        let yaw = d.x.atan2(-d.z).to_degrees();
        let pitch = d.y.atan2(horizontal).to_degrees();
        (yaw, pitch)
    }

    /// Advances the rocket and resolves what it hit.
    ///
    /// Rockets hit any enemy with health left, including ones that are about
    /// to die this tick.
    pub fn update(&mut self, dt: f32, world: &VoxelWorld, enemies: &[Enemy]) -> RocketOutcome {
        let previous = self.position;
        let step = ROCKET_SPEED * dt;
        self.position += self.direction * step;
        self.distance_traveled += step;
        if self.distance_traveled > ROCKET_RANGE {
            return RocketOutcome::Expired;
        }

        let hit_enemy = enemies
            .iter()
            .filter(|enemy| enemy.health() > 0)
            .any(|enemy| enemy.is_hit_by_segment(previous, self.position));
        if hit_enemy || world.contains(block_at(self.position)) {
            return RocketOutcome::Detonated(self.position);
        }

        RocketOutcome::Flying
    }
}

/// The voxel cell containing `position`.
pub fn block_at(position: Point3<f32>) -> Point3<i32> {
    Point3::new(
        position.x.floor() as i32,
        position.y.floor() as i32,
        position.z.floor() as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    fn wall_world() -> VoxelWorld {
        let mut world = VoxelWorld::new();
        world.set(Point3::new(5, 0, 0), BlockType::SOLID);
        world
    }

    #[test]
    fn test_bullet_expires_at_range() {
        let world = VoxelWorld::new();
        let mut bullet = Bullet::new(Point3::new(0.5, 0.5, 0.5), Vector3::unit_y(), Shooter::Player);
        let mut ticks = 0;
        while bullet.update(0.1, &world, &mut [], None) == BulletOutcome::Flying {
            ticks += 1;
        }
        assert!((5..=7).contains(&ticks), "expired after {ticks} ticks");
    }

    #[test]
    fn test_bullet_hits_block_and_reports_face() {
        let world = wall_world();
        let mut bullet = Bullet::new(Point3::new(0.5, 0.5, 0.5), Vector3::unit_x(), Shooter::Player);
        let outcome = loop {
            let outcome = bullet.update(1.0 / 60.0, &world, &mut [], None);
            if outcome != BulletOutcome::Flying {
                break outcome;
            }
        };
        match outcome {
            BulletOutcome::HitBlock { block, surface } => {
                assert_eq!(block, Point3::new(5, 0, 0));
                let surface = surface.unwrap();
                assert!((surface.point.x - 5.0).abs() < 1e-4);
                assert_eq!(surface.normal, Vector3::new(-1.0, 0.0, 0.0));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_enemy_bullet_hits_player_box() {
        let world = VoxelWorld::new();
        let player = Aabb::from_center([0.0, 1.0, -3.0], [0.3, 0.85, 0.3]);
        let mut bullet = Bullet::new(Point3::new(0.0, 1.0, 0.0), -Vector3::unit_z(), Shooter::Enemy(7));
        let outcome = loop {
            let outcome = bullet.update(1.0 / 60.0, &world, &mut [], Some(&player));
            if outcome != BulletOutcome::Flying {
                break outcome;
            }
        };
        assert_eq!(outcome, BulletOutcome::HitPlayer);
    }

    #[test]
    fn test_player_bullet_passes_through_player() {
        let world = VoxelWorld::new();
        let player = Aabb::from_center([0.0, 1.0, -1.0], [0.3, 0.85, 0.3]);
        let mut bullet = Bullet::new(Point3::new(0.0, 1.0, 0.0), -Vector3::unit_z(), Shooter::Player);
        assert_eq!(
            bullet.update(0.1, &world, &mut [], Some(&player)),
            BulletOutcome::Flying
        );
    }

    #[test]
    fn test_rocket_detonates_on_block() {
        let world = wall_world();
        let mut rocket = Rocket::new(Point3::new(0.5, 0.5, 0.5), Vector3::unit_x());
        let outcome = loop {
            let outcome = rocket.update(1.0 / 60.0, &world, &[]);
            if outcome != RocketOutcome::Flying {
                break outcome;
            }
        };
        match outcome {
            RocketOutcome::Detonated(center) => assert_eq!(block_at(center), Point3::new(5, 0, 0)),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_rocket_expires_beyond_range() {
        let world = VoxelWorld::new();
        let mut rocket = Rocket::new(Point3::new(0.0, 10.0, 0.0), Vector3::unit_z());
        let mut outcome = RocketOutcome::Flying;
        for _ in 0..200 {
            outcome = rocket.update(0.1, &world, &[]);
            if outcome != RocketOutcome::Flying {
                break;
            }
        }
        assert_eq!(outcome, RocketOutcome::Expired);
    }

    #[test]
    fn test_zero_direction_falls_back() {
        let rocket = Rocket::new(Point3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(rocket.direction(), DEFAULT_DIRECTION);
        let (yaw, pitch) = rocket.orientation();
        assert!(yaw.abs() < 1e-4 && pitch.abs() < 1e-4);
    }
}
