//! # Engine State Module
//!
//! The simulation session: every subsystem of the arena and the ordered tick
//! that drives them.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the terrain, the chunk streamer, the player, the
//!   weapons and every live entity list
//! * `TickInput` - What the player asked for during one tick
//! * `streaming` - Chunk window maintenance and worker coordination
//! * `physics` - Player movement and collision
//! * `entities` / `enemies` - Projectiles, explosions, pickups and enemy AI
//! * `rendering` - Meshing, render-facing snapshots and the GPU renderer
//!
//! ## Tick Order
//!
//! 1. Reconcile the chunk window and merge at most the per-tick budget of
//!    generated chunks, spawning their pickups and enemies
//! 2. Hold everything else until the window around the spawn is fully meshed
//! 3. Look, weapon selection and firing
//! 4. Player movement and gravity, then pickups
//! 5. Reconcile around the player's new position
//! 6. Bullets, rockets, explosions and enemies, in that order
//! 7. Rebuild meshes of chunks whose blocks changed
//!
//! Entities spawned during a tick are first drawn after it.

use cgmath::{InnerSpace, MetricSpace, Point2, Point3, Vector3};
use fastrand::Rng;
use log::{info, trace};

use crate::core::{config::GameConfig, error::StreamerError};

use audio::{SoundId, SoundQueue, SoundRequest};
use buffer_state::{MeshBackend, MeshResource};
use camera_state::{camera::Camera, CameraPose, CameraState};
use enemies::{Enemy, EnemyEvents, EnemyId, EnemyStatus, EnemyTick, PlayerTarget};
use entities::{
    explosion::{detonate, Explosion},
    pickup::{collect_pickups, AmmoPickup},
    projectile::{Bullet, BulletOutcome, Rocket, RocketOutcome, BULLET_DAMAGE, ROCKET_BLAST_RADIUS},
    weapon::{Arsenal, WeaponKind},
};
use physics::PlayerController;
use rendering::{
    overlay::OverlayScene,
    render_state::{DecalQuad, EntityDrawState, EntityKind, ExplosionDrawState, Health, HealthBar},
    sky::{clouds_around, Cloud},
};
use streaming::ChunkStreamer;
use voxels::{
    chunk::{
        generation::{ChunkGenerator, GeneratedChunk},
        ChunkCoord, ChunkLayout,
    },
    terrain::Terrain,
};

pub mod audio;
pub mod buffer_state;
pub mod camera_state;
pub mod enemies;
pub mod entities;
pub mod physics;
pub mod rendering;
pub mod streaming;
pub mod task_management;
pub mod voxels;

/// Health bars are only shown for enemies this close to the camera.
const HEALTH_BAR_RANGE: f32 = 20.0;

/// Height of a health bar above the enemy's origin.
const HEALTH_BAR_HEIGHT: f32 = 1.2;

/// Viewport assumed until the window reports its size.
const DEFAULT_VIEWPORT: (u32, u32) = (1280, 720);

/// What the player asked for during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickInput {
    /// Forward walk in `[-1, 1]`
    pub forward: f32,
    /// Strafe in `[-1, 1]`, positive to the right
    pub strafe: f32,
    /// Jump held
    pub jump: bool,
    /// Sprint held
    pub sprint: bool,
    /// Mouse movement since the last tick, in pixels
    pub look_delta: (f32, f32),
    /// Trigger pulled this tick
    pub fire: bool,
    /// Weapon picked directly this tick
    pub select: Option<WeaponKind>,
    /// Wheel steps this tick, positive for the next weapon
    pub cycle: i32,
}

/// The running arena session.
///
/// Generic over the mesh backend so the whole tick can run without a GPU.
///
/// # Examples
///
/// ```ignore
/// let mut session = EngineState::new(GameConfig::default(), HeadlessMeshBackend::new());
/// loop {
///     session.tick(&input, dt)?;
///     for request in session.drain_sound_requests() { /* play it */ }
/// }
/// ```
pub struct EngineState<B: MeshBackend> {
    config: GameConfig,
    terrain: Terrain,
    streamer: ChunkStreamer<B>,
    player: PlayerController,
    player_health: i32,
    camera_state: CameraState,
    arsenal: Arsenal,
    bullets: Vec<Bullet>,
    rockets: Vec<Rocket>,
    explosions: Vec<Explosion>,
    pickups: Vec<AmmoPickup>,
    enemies: Vec<Enemy>,
    next_enemy_id: EnemyId,
    sounds: SoundQueue,
    rng: Rng,
    clock: f64,
    player_in_world: bool,
}

impl<B: MeshBackend> EngineState<B> {
    /// Starts a session with a randomly seeded effects stream.
    pub fn new(config: GameConfig, backend: B) -> Self {
        Self::with_seed(config, backend, fastrand::u64(..))
    }

    /// Starts a session and requests the chunk window around the spawn point.
    ///
    /// # Arguments
    /// * `config` - Session constants
    /// * `backend` - Uploads chunk meshes
    /// * `seed` - Seed for shotgun spread and explosion particles
    pub fn with_seed(config: GameConfig, backend: B, seed: u64) -> Self {
        let layout = ChunkLayout::new(config.world.chunk_size);
        let spawn = Point3::from(config.player.spawn);
        let spawn_chunk = layout.chunk_of_point(spawn);
        let generator = ChunkGenerator::new(layout, config.world.ground_level, Some(spawn_chunk));

        let mut terrain = Terrain::new(layout);
        let mut streamer = ChunkStreamer::new(&config.world, generator, backend);
        streamer.reconcile(spawn_chunk, &mut terrain);

        let eye = Point3::new(spawn.x, spawn.y + config.player.eye_height, spawn.z);
        let camera = Camera::new(eye, config.player.spawn_yaw, config.player.spawn_pitch);
        let camera_state = CameraState::new(camera, DEFAULT_VIEWPORT.0, DEFAULT_VIEWPORT.1);

        info!(
            "Session started: spawn {:?} in chunk {:?}, {} chunk(s) requested",
            spawn,
            spawn_chunk,
            streamer.pending_count()
        );

        EngineState {
            player: PlayerController::new(&config.player, spawn),
            player_health: config.player.max_health,
            arsenal: Arsenal::new(&config.weapons),
            config,
            terrain,
            streamer,
            camera_state,
            bullets: Vec::new(),
            rockets: Vec::new(),
            explosions: Vec::new(),
            pickups: Vec::new(),
            enemies: Vec::new(),
            next_enemy_id: 0,
            sounds: SoundQueue::new(),
            rng: Rng::with_seed(seed),
            clock: 0.0,
            player_in_world: false,
        }
    }

    /// Advances the session by `dt` seconds.
    ///
    /// Until every chunk around the spawn is meshed only streaming runs and
    /// the player stays out of the world.
    ///
    /// # Errors
    /// `StreamerError::WorkersDisconnected` if the generation workers died.
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Result<(), StreamerError> {
        self.clock += f64::from(dt);

        self.stream_around_player();
        let merged = self.streamer.drain(&mut self.terrain)?;
        self.spawn_from(&merged);

        if !self.player_in_world {
            if !self.streamer.is_booted() {
                return Ok(());
            }
            self.player_in_world = true;
            info!(
                "Boot barrier released after {:.2}s with {} chunk(s) resident",
                self.clock,
                self.streamer.loaded_chunks().len()
            );
        }

        self.apply_look_and_weapons(input);
        self.move_player(input, dt);
        self.stream_around_player();

        self.update_bullets(dt);
        self.update_rockets(dt);
        self.explosions.retain_mut(|explosion| explosion.update(dt));
        self.update_enemies(dt);

        self.streamer.rebuild_dirty(&mut self.terrain);
        self.camera_state.sync(self.eye());
        Ok(())
    }

    /// Reconciles the chunk window and evicts everything spawned by unloaded chunks.
    fn stream_around_player(&mut self) {
        let center = self.terrain.layout().chunk_of_point(self.player.position());
        let unloaded = self.streamer.reconcile(center, &mut self.terrain);
        if unloaded.is_empty() {
            return;
        }
        self.pickups.retain(|pickup| !unloaded.contains(&pickup.chunk));
        self.enemies.retain(|enemy| !unloaded.contains(&enemy.chunk()));
    }

    fn spawn_from(&mut self, merged: &[GeneratedChunk]) {
        for chunk in merged {
            self.pickups.extend(
                chunk
                    .pickups
                    .iter()
                    .map(|spawn| AmmoPickup::from_spawn(spawn, self.clock)),
            );
            for spawn in &chunk.enemies {
                self.enemies.push(Enemy::from_spawn(self.next_enemy_id, spawn));
                self.next_enemy_id += 1;
            }
        }
    }

    fn apply_look_and_weapons(&mut self, input: &TickInput) {
        let (dx, dy) = input.look_delta;
        self.camera_state
            .camera
            .apply_look(dx, dy, self.config.player.mouse_sensitivity);

        if let Some(kind) = input.select {
            self.arsenal.select(kind);
        }
        for _ in 0..input.cycle.unsigned_abs() {
            self.arsenal.cycle(input.cycle.signum());
        }

        if input.fire {
            let eye = self.eye();
            let Camera { yaw, pitch, .. } = self.camera_state.camera;
            if let Some(volley) = self.arsenal.fire(self.clock, eye, yaw, pitch, &mut self.rng) {
                self.sounds.play_at(volley.weapon.fire_sound(), volley.origin, eye);
                self.bullets.extend(volley.bullets);
                self.rockets.extend(volley.rockets);
            }
        }
    }

    fn move_player(&mut self, input: &TickInput, dt: f32) {
        let world = self.terrain.world();
        self.player.move_player(
            world,
            input.forward,
            input.strafe,
            input.jump,
            input.sprint,
            self.camera_state.camera.yaw,
            dt,
        );
        self.player.apply_gravity(world, dt);

        let collected = collect_pickups(&mut self.pickups, self.player.position(), &mut self.arsenal);
        let eye = self.eye();
        for pickup in collected {
            self.sounds.play_at(SoundId::Ammo, pickup.position, eye);
        }
    }

    fn update_bullets(&mut self, dt: f32) {
        let player_box = self.player.aabb();
        let listener = self.eye();
        let mut flying = Vec::with_capacity(self.bullets.len());
        for mut bullet in std::mem::take(&mut self.bullets) {
            match bullet.update(dt, self.terrain.world(), &mut self.enemies, Some(&player_box)) {
                BulletOutcome::Flying => flying.push(bullet),
                BulletOutcome::Expired => {}
                BulletOutcome::HitEnemy(id) => trace!("Bullet hit enemy {}", id),
                BulletOutcome::HitPlayer => {
                    self.player_health = (self.player_health - BULLET_DAMAGE).max(0);
                    trace!("Player hit, health {}", self.player_health);
                }
                BulletOutcome::HitBlock { block, surface } => {
                    self.sounds.play_at(SoundId::Hit, bullet.position(), listener);
                    if let Some(surface) = surface {
                        self.terrain.add_bullet_mark(block, surface.into());
                    }
                }
            }
        }
        self.bullets = flying;
    }

    fn update_rockets(&mut self, dt: f32) {
        let listener = self.eye();
        let mut flying = Vec::with_capacity(self.rockets.len());
        for mut rocket in std::mem::take(&mut self.rockets) {
            match rocket.update(dt, self.terrain.world(), &self.enemies) {
                RocketOutcome::Flying => flying.push(rocket),
                RocketOutcome::Expired => {}
                RocketOutcome::Detonated(center) => {
                    self.sounds.play_at(SoundId::Explosion, center, listener);
                    self.explode(center, ROCKET_BLAST_RADIUS);
                }
            }
        }
        self.rockets = flying;
    }

    fn update_enemies(&mut self, dt: f32) {
        let feet = self.player.position();
        let listener = self.eye();
        let tick = EnemyTick {
            dt,
            now: self.clock,
            world: self.terrain.world(),
            target: PlayerTarget { feet, eye: listener },
        };
        let mut events = EnemyEvents::default();
        self.enemies.retain_mut(|enemy| {
            enemy.update(&tick, &mut events) == EnemyStatus::Alive && enemy.health() > 0
        });

        for (id, source) in events.sounds {
            self.sounds.play_at(id, source, listener);
        }
        self.bullets.extend(events.bullets);
        // Resolved after the loop, so blasts never chain within one tick. A
        // drone caught in another's blast stays listed and self-destructs on
        // its next update.
        for detonation in events.detonations {
            self.explode(detonation.center, detonation.radius);
        }
    }

    fn explode(&mut self, center: Point3<f32>, radius: i32) {
        detonate(center, radius, &mut self.terrain, &mut self.enemies);
        self.explosions.push(Explosion::new(center, &mut self.rng));
    }

    fn eye(&self) -> Point3<f32> {
        let feet = self.player.position();
        Point3::new(feet.x, feet.y + self.config.player.eye_height, feet.z)
    }

    /// Updates the projection for a resized viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera_state.projection.resize(width, height);
        self.camera_state.camera_uniform.update_view_proj_and_pos(
            &self.camera_state.camera,
            &self.camera_state.projection,
        );
    }

    /// Returns true once the player has been placed into the world.
    pub fn is_booted(&self) -> bool {
        self.player_in_world
    }

    /// Session time in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn player_health(&self) -> Health {
        Health {
            current: self.player_health,
            max: self.config.player.max_health,
        }
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn arsenal(&self) -> &Arsenal {
        &self.arsenal
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn streamer(&self) -> &ChunkStreamer<B> {
        &self.streamer
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn pickups(&self) -> &[AmmoPickup] {
        &self.pickups
    }

    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    pub fn camera_state(&self) -> &CameraState {
        &self.camera_state
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.camera_state.pose()
    }

    /// Resident chunk meshes. Chunks still waiting for a mesh are absent.
    pub fn chunk_meshes(&self) -> impl Iterator<Item = (ChunkCoord, &MeshResource<B::Handle>)> {
        self.streamer.meshes()
    }

    /// Takes the sound requests queued since the last call.
    pub fn drain_sound_requests(&mut self) -> Vec<SoundRequest> {
        self.sounds.drain()
    }

    /// Draw states for bullets, rockets, pickups and enemies.
    pub fn entity_draw_states(&self) -> Vec<EntityDrawState> {
        let bullets = self.bullets.iter().map(|bullet| {
            let d = bullet.direction();
            EntityDrawState {
                kind: EntityKind::Bullet,
                position: bullet.position(),
                yaw: d.x.atan2(-d.z).to_degrees(),
                pitch: d.y.clamp(-1.0, 1.0).asin().to_degrees(),
                turret_yaw: None,
                health: None,
            }
        });
        let rockets = self.rockets.iter().map(|rocket| {
            let (yaw, pitch) = rocket.orientation();
            EntityDrawState {
                kind: EntityKind::Rocket,
                position: rocket.position(),
                yaw,
                pitch,
                turret_yaw: None,
                health: None,
            }
        });
        let pickups = self.pickups.iter().map(|pickup| EntityDrawState {
            kind: EntityKind::Pickup(pickup.ammo),
            position: pickup.position + Vector3::new(0.0, pickup.bob_offset(self.clock), 0.0),
            yaw: 0.0,
            pitch: 0.0,
            turret_yaw: None,
            health: None,
        });
        let enemies = self.enemies.iter().map(Enemy::render_state);

        bullets.chain(rockets).chain(pickups).chain(enemies).collect()
    }

    pub fn explosion_draw_states(&self) -> Vec<ExplosionDrawState> {
        self.explosions
            .iter()
            .map(|explosion| ExplosionDrawState {
                center: explosion.center(),
                fireball_radius: explosion.fireball_radius(),
                fireball_opacity: explosion.fireball_life().clamp(0.0, 1.0),
                particles: explosion
                    .visible_particles()
                    .map(|particle| (particle.position, particle.life.clamp(0.0, 1.0)))
                    .collect(),
            })
            .collect()
    }

    /// Health bars for living enemies near and in front of the camera.
    pub fn health_bars(&self) -> Vec<HealthBar> {
        let pose = self.camera_state.pose();
        self.enemies
            .iter()
            .filter(|enemy| enemy.health() > 0)
            .filter_map(|enemy| {
                let position = enemy.position();
                let distance = position.distance(pose.position);
                let in_front = (position - pose.position).dot(pose.direction) > 0.0;
                (distance <= HEALTH_BAR_RANGE && in_front).then(|| HealthBar {
                    anchor: Point3::new(position.x, position.y + HEALTH_BAR_HEIGHT, position.z),
                    health: Health {
                        current: enemy.health(),
                        max: enemy.max_health(),
                    },
                    distance,
                })
            })
            .collect()
    }

    pub fn decal_quads(&self) -> Vec<DecalQuad> {
        self.terrain
            .bullet_marks()
            .iter()
            .map(|(_, mark)| DecalQuad {
                corners: mark.quad_corners(),
            })
            .collect()
    }

    /// Everything the renderer draws besides chunk terrain.
    pub fn overlay_scene(&self) -> OverlayScene {
        OverlayScene {
            entities: self.entity_draw_states(),
            explosions: self.explosion_draw_states(),
            decals: self.decal_quads(),
            health_bars: self.health_bars(),
            clouds: self.clouds(),
        }
    }

    /// Clouds around the camera.
    pub fn clouds(&self) -> Vec<Cloud> {
        let eye = self.camera_state.camera.position;
        clouds_around(
            self.terrain.layout(),
            Point2::new(eye.x, eye.z),
            self.streamer.render_distance(),
        )
    }
}
