//! # Enemies
//!
//! Two enemy kinds share one capability set, [`EnemyBehavior`]:
//!
//! - [`ground::RobotDog`] wanders the terrain and shoots at the player when it
//!   has a clear line of sight.
//! - [`flying::RoboDrone`] patrols in the air, dives at the player once close
//!   and self-destructs on contact.
//!
//! [`Enemy`] wraps either kind with the identity and spawning chunk the
//! session needs for hit attribution and eviction. Enemies never touch the
//! session directly: bullets they fire, explosions they trigger and sounds
//! they make are written into [`EnemyEvents`] and applied after the update
//! loop.

pub mod flying;
pub mod ground;
pub mod hitbox;

use cgmath::{Point3, Vector3};

use crate::engine_state::{
    audio::SoundId,
    entities::projectile::Bullet,
    rendering::render_state::{EntityDrawState, EntityKind, Health},
    voxels::{
        chunk::{generation::EnemySpawn, ChunkCoord},
        world::VoxelWorld,
    },
};

use self::{flying::RoboDrone, ground::RobotDog};

/// Unique id of an enemy within a session.
pub type EnemyId = u64;

/// Which kind of enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    /// Quadruped with a mounted pistol
    Ground,
    /// Self-destructing drone
    Flying,
}

/// Result of an enemy's update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyStatus {
    /// Keep simulating
    Alive,
    /// Remove from the live list
    Dead,
}

/// Where the player is, as enemies see it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerTarget {
    /// Player's feet
    pub feet: Point3<f32>,
    /// Player's eye
    pub eye: Point3<f32>,
}

/// Shared inputs to every enemy update in a tick.
#[derive(Clone, Copy, Debug)]
pub struct EnemyTick<'a> {
    /// Tick length in seconds
    pub dt: f32,
    /// Session time in seconds
    pub now: f64,
    /// The voxel world, read-only
    pub world: &'a VoxelWorld,
    /// The player
    pub target: PlayerTarget,
}

/// An explosion an enemy asked for.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detonation {
    /// Epicentre
    pub center: Point3<f32>,
    /// Radius in blocks
    pub radius: i32,
}

/// Side effects produced by enemies during one tick.
#[derive(Debug, Default)]
pub struct EnemyEvents {
    /// Bullets fired
    pub bullets: Vec<Bullet>,
    /// Self-destructions to resolve against terrain and enemies
    pub detonations: Vec<Detonation>,
    /// Sounds to request, at their source positions
    pub sounds: Vec<(SoundId, Point3<f32>)>,
}

/// What every enemy kind can do.
pub trait EnemyBehavior {
    /// Advances the enemy by one tick, recording side effects into `events`.
    fn update(&mut self, tick: &EnemyTick, events: &mut EnemyEvents) -> EnemyStatus;

    /// Subtracts `amount` from health. Health may go negative.
    fn take_damage(&mut self, amount: i32);

    /// Current position of the enemy's origin.
    fn position(&self) -> Point3<f32>;

    /// Heading in degrees.
    fn yaw(&self) -> f32;

    /// Current and maximum health.
    fn health(&self) -> Health;

    /// Tests a world-space segment against the enemy's hit boxes.
    fn is_hit_by_segment(&self, p1: Point3<f32>, p2: Point3<f32>) -> bool;

    /// Snapshot for the renderer.
    fn render_state(&self) -> EntityDrawState;
}

#[derive(Debug)]
enum EnemyBody {
    Ground(RobotDog),
    Flying(RoboDrone),
}

/// A live enemy of either kind.
#[derive(Debug)]
pub struct Enemy {
    id: EnemyId,
    chunk: ChunkCoord,
    body: EnemyBody,
}

impl Enemy {
    /// Creates the enemy described by a generated spawn.
    pub fn from_spawn(id: EnemyId, spawn: &EnemySpawn) -> Self {
        let body = match spawn.kind {
            EnemyKind::Ground => EnemyBody::Ground(RobotDog::new(
                id,
                spawn.position,
                spawn.yaw,
                spawn.rng_seed,
            )),
            EnemyKind::Flying => {
                EnemyBody::Flying(RoboDrone::new(spawn.position, spawn.yaw, spawn.rng_seed))
            }
        };
        Enemy {
            id,
            chunk: spawn.chunk,
            body,
        }
    }

    fn behavior(&self) -> &dyn EnemyBehavior {
        match &self.body {
            EnemyBody::Ground(dog) => dog,
            EnemyBody::Flying(drone) => drone,
        }
    }

    fn behavior_mut(&mut self) -> &mut dyn EnemyBehavior {
        match &mut self.body {
            EnemyBody::Ground(dog) => dog,
            EnemyBody::Flying(drone) => drone,
        }
    }

    pub fn id(&self) -> EnemyId {
        self.id
    }

    pub fn kind(&self) -> EnemyKind {
        match self.body {
            EnemyBody::Ground(_) => EnemyKind::Ground,
            EnemyBody::Flying(_) => EnemyKind::Flying,
        }
    }

    /// The chunk that spawned this enemy.
    pub fn chunk(&self) -> ChunkCoord {
        self.chunk
    }

    pub fn position(&self) -> Point3<f32> {
        self.behavior().position()
    }

    pub fn yaw(&self) -> f32 {
        self.behavior().yaw()
    }

    pub fn health(&self) -> i32 {
        self.behavior().health().current
    }

    pub fn max_health(&self) -> i32 {
        self.behavior().health().max
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.behavior_mut().take_damage(amount);
    }

    pub fn is_hit_by_segment(&self, p1: Point3<f32>, p2: Point3<f32>) -> bool {
        self.behavior().is_hit_by_segment(p1, p2)
    }

    pub fn update(&mut self, tick: &EnemyTick, events: &mut EnemyEvents) -> EnemyStatus {
        self.behavior_mut().update(tick, events)
    }

    pub fn render_state(&self) -> EntityDrawState {
        self.behavior().render_state()
    }
}

/// Builds the draw state shared by both kinds.
fn draw_state(
    kind: EnemyKind,
    position: Point3<f32>,
    yaw: f32,
    turret_yaw: Option<f32>,
    health: Health,
) -> EntityDrawState {
    EntityDrawState {
        kind: EntityKind::Enemy(kind),
        position,
        yaw,
        pitch: 0.0,
        turret_yaw,
        health: Some(health),
    }
}

/// Marches from `from` to `to` in half-block steps looking for an occupied cell.
///
/// The cell containing `to` itself is ignored so a target standing against a
/// wall is still visible.
pub fn line_of_sight_blocked(world: &VoxelWorld, from: Point3<f32>, to: Point3<f32>) -> bool {
    let delta = to - from;
    let longest = delta.x.abs().max(delta.y.abs()).max(delta.z.abs());
    let steps = ((longest * 2.0) as usize).max(1);
    let step: Vector3<f32> = delta / steps as f32;
    (0..steps).any(|i| {
        let point = from + step * i as f32;
        world.contains(Point3::new(
            point.x.floor() as i32,
            point.y.floor() as i32,
            point.z.floor() as i32,
        ))
    })
}

/// Turns `yaw` toward `target` along the shorter arc, at most `max_step` degrees.
///
/// # Returns
/// The new heading, in `[0, 360)`.
pub fn turn_toward(yaw: f32, target: f32, max_step: f32) -> f32 {
    let mut difference = (target - yaw).rem_euclid(360.0);
    if difference > 180.0 {
        difference -= 360.0;
    }
    let turned = if difference.abs() < max_step {
        target
    } else if difference > 0.0 {
        yaw + max_step
    } else {
        yaw - max_step
    };
    turned.rem_euclid(360.0)
}

/// Horizontal unit vector an enemy facing `yaw_degrees` walks along.
pub fn forward_of(yaw_degrees: f32) -> (f32, f32) {
    let (sin, cos) = yaw_degrees.to_radians().sin_cos();
    (-sin, cos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;

    #[test]
    fn test_turn_takes_shortest_arc() {
        assert_eq!(turn_toward(350.0, 10.0, 5.0), 355.0);
        assert_eq!(turn_toward(10.0, 350.0, 5.0), 5.0);
        assert_eq!(turn_toward(0.0, 2.0, 5.0), 2.0);
        assert_eq!(turn_toward(2.0, 358.0, 5.0), 358.0);
    }

    #[test]
    fn test_line_of_sight_ignores_target_cell() {
        let mut world = VoxelWorld::new();
        world.set(Point3::new(5, 0, 0), BlockType::SOLID);
        let from = Point3::new(0.5, 0.5, 0.5);
        assert!(!line_of_sight_blocked(&world, from, Point3::new(5.2, 0.5, 0.5)));
        assert!(line_of_sight_blocked(&world, from, Point3::new(9.5, 0.5, 0.5)));
    }

    #[test]
    fn test_line_of_sight_clear_in_open_air() {
        let world = VoxelWorld::new();
        assert!(!line_of_sight_blocked(
            &world,
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(10.0, 3.0, -4.0)
        ));
    }

    #[test]
    fn test_from_spawn_keeps_chunk_and_kind() {
        let spawn = EnemySpawn {
            kind: EnemyKind::Flying,
            position: Point3::new(3.5, 8.0, 3.5),
            yaw: 45.0,
            rng_seed: 11,
            chunk: ChunkCoord::new(2, -1),
        };
        let enemy = Enemy::from_spawn(4, &spawn);
        assert_eq!(enemy.id(), 4);
        assert_eq!(enemy.kind(), EnemyKind::Flying);
        assert_eq!(enemy.chunk(), ChunkCoord::new(2, -1));
        assert_eq!(enemy.health(), 5);
        assert_eq!(enemy.max_health(), 5);
    }
}
