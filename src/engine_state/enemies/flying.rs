//! # Flying Enemy
//!
//! The drone patrols at a hovering altitude until the player comes close,
//! then commits to an attack run: it turns toward the player, closes the
//! vertical gap and flies straight at them. It self-destructs on contact or
//! as soon as it has no health left, with the same blast a rocket makes.

use cgmath::{InnerSpace, Point3};
use fastrand::Rng;

use super::{
    draw_state, forward_of,
    hitbox::{drone_boxes, segment_hits_boxes},
    turn_toward, Detonation, EnemyBehavior, EnemyEvents, EnemyKind, EnemyStatus, EnemyTick,
};
use crate::engine_state::{
    audio::SoundId,
    entities::projectile::ROCKET_BLAST_RADIUS,
    rendering::render_state::{EntityDrawState, Health},
};

const MAX_HEALTH: i32 = 5;
const PATROL_SPEED: f32 = 6.0;
const ATTACK_SPEED: f32 = 10.0;
const TURN_RATE: f32 = 30.0;

/// Distance to the player's eye that starts an attack run.
const ATTACK_THRESHOLD: f32 = 20.0;

/// Distance to the player's eye at which the drone blows up.
const MELEE_RANGE: f32 = 1.5;

/// Fraction of the vertical gap closed per second while attacking.
const CLIMB_RATE: f32 = 0.8;

const HOVER_AMPLITUDE: f32 = 0.5;
const HOVER_SPEED: f32 = 2.0;

/// Seconds between patrol heading changes, picked uniformly from this range.
const CHANGE_INTERVAL: (f32, f32) = (3.0, 6.0);

/// What the drone is doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DroneState {
    Patrol,
    Attack,
}

/// Self-destructing drone.
#[derive(Debug)]
pub struct RoboDrone {
    position: Point3<f32>,
    yaw: f32,
    target_yaw: f32,
    health: i32,
    state: DroneState,
    since_change: f32,
    change_interval: f32,
    hover_base: f32,
    hover_timer: f32,
    rng: Rng,
}

impl RoboDrone {
    pub fn new(position: Point3<f32>, yaw: f32, seed: u64) -> Self {
        let mut rng = Rng::with_seed(seed);
        let change_interval = CHANGE_INTERVAL.0 + rng.f32() * (CHANGE_INTERVAL.1 - CHANGE_INTERVAL.0);
        RoboDrone {
            position,
            yaw,
            target_yaw: yaw,
            health: MAX_HEALTH,
            state: DroneState::Patrol,
            since_change: 0.0,
            change_interval,
            hover_base: position.y,
            hover_timer: 0.0,
            rng,
        }
    }

    pub fn state(&self) -> DroneState {
        self.state
    }

    fn pick_new_heading(&mut self) {
        self.target_yaw = self.rng.f32() * 360.0;
        self.since_change = 0.0;
        self.change_interval =
            CHANGE_INTERVAL.0 + self.rng.f32() * (CHANGE_INTERVAL.1 - CHANGE_INTERVAL.0);
    }

    fn fly_forward(&mut self, speed: f32, dt: f32) {
        let (fx, fz) = forward_of(self.yaw);
        self.position.x += fx * speed * dt;
        self.position.z += fz * speed * dt;
    }

    fn explode(&mut self, events: &mut EnemyEvents) {
        self.health = 0;
        events.detonations.push(Detonation {
            center: self.position,
            radius: ROCKET_BLAST_RADIUS,
        });
        events.sounds.push((SoundId::DroneExplosion, self.position));
        log::debug!("Drone self-destructed at {:?}", self.position);
    }
}

impl EnemyBehavior for RoboDrone {
    fn update(&mut self, tick: &EnemyTick, events: &mut EnemyEvents) -> EnemyStatus {
        if self.health <= 0 {
            self.explode(events);
            return EnemyStatus::Dead;
        }

        let to_player = tick.target.eye - self.position;
        let distance = to_player.magnitude();

        match self.state {
            DroneState::Patrol if distance < ATTACK_THRESHOLD => {
                self.state = DroneState::Attack;
            }
            DroneState::Patrol => {
                self.since_change += tick.dt;
                if self.since_change >= self.change_interval {
                    self.pick_new_heading();
                }
                self.yaw = turn_toward(self.yaw, self.target_yaw, TURN_RATE * tick.dt);
                self.fly_forward(PATROL_SPEED, tick.dt);
            }
            DroneState::Attack => {
                if distance < MELEE_RANGE {
                    self.explode(events);
                    return EnemyStatus::Dead;
                }
                let heading = (-to_player.x).atan2(to_player.z).to_degrees().rem_euclid(360.0);
                self.yaw = turn_toward(self.yaw, heading, TURN_RATE * tick.dt);
                self.position.y += to_player.y * tick.dt * CLIMB_RATE;
                self.fly_forward(ATTACK_SPEED, tick.dt);
            }
        }

        self.hover_timer += tick.dt * HOVER_SPEED;
        if self.state == DroneState::Patrol {
            self.position.y = self.hover_base + self.hover_timer.sin() * HOVER_AMPLITUDE;
        }
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
        segment_hits_boxes(p1, p2, self.position, self.yaw, &drone_boxes())
    }

    fn render_state(&self) -> EntityDrawState {
        draw_state(EnemyKind::Flying, self.position, self.yaw, None, self.health())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{enemies::PlayerTarget, voxels::world::VoxelWorld};
    use cgmath::MetricSpace;

    fn target(eye: Point3<f32>) -> PlayerTarget {
        PlayerTarget {
            feet: Point3::new(eye.x, eye.y - 1.7, eye.z),
            eye,
        }
    }

    fn run(drone: &mut RoboDrone, eye: Point3<f32>, ticks: usize) -> (EnemyStatus, EnemyEvents) {
        let world = VoxelWorld::new();
        let mut events = EnemyEvents::default();
        let mut status = EnemyStatus::Alive;
        for i in 0..ticks {
            let tick = EnemyTick {
                dt: 1.0 / 60.0,
                now: i as f64 / 60.0,
                world: &world,
                target: target(eye),
            };
            status = drone.update(&tick, &mut events);
            if status == EnemyStatus::Dead {
                break;
            }
        }
        (status, events)
    }

    #[test]
    fn test_patrol_hovers_around_base_height() {
        let mut drone = RoboDrone::new(Point3::new(0.0, 8.0, 0.0), 0.0, 5);
        let far = Point3::new(500.0, 2.7, 500.0);
        for _ in 0..300 {
            run(&mut drone, far, 1);
            assert_eq!(drone.state(), DroneState::Patrol);
            assert!((drone.position().y - 8.0).abs() <= HOVER_AMPLITUDE + 1e-4);
        }
    }

    #[test]
    fn test_attacks_and_closes_distance() {
        let mut drone = RoboDrone::new(Point3::new(0.0, 8.0, 0.0), 0.0, 5);
        let eye = Point3::new(0.0, 2.7, 15.0);
        let start = drone.position().distance(eye);

        run(&mut drone, eye, 1);
        assert_eq!(drone.state(), DroneState::Attack);
        run(&mut drone, eye, 30);
        assert!(drone.position().distance(eye) < start);
    }

    #[test]
    fn test_self_destructs_in_melee_range() {
        let mut drone = RoboDrone::new(Point3::new(0.0, 3.0, 0.0), 0.0, 5);
        let eye = Point3::new(0.0, 2.7, 1.0);
        let (status, events) = run(&mut drone, eye, 2);

        assert_eq!(status, EnemyStatus::Dead);
        assert_eq!(events.detonations.len(), 1);
        assert_eq!(events.detonations[0].radius, 3);
        assert_eq!(events.sounds, vec![(SoundId::DroneExplosion, drone.position())]);
    }

    #[test]
    fn test_destroyed_drone_explodes_on_next_update() {
        let mut drone = RoboDrone::new(Point3::new(0.0, 8.0, 0.0), 0.0, 5);
        drone.take_damage(10);
        let (status, events) = run(&mut drone, Point3::new(500.0, 2.7, 500.0), 1);
        assert_eq!(status, EnemyStatus::Dead);
        assert_eq!(events.detonations.len(), 1);
    }
}
