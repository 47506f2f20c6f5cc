//! # Explosions
//!
//! `detonate` is the splash-damage rule shared by rockets and self-destructing
//! drones: it carves a sphere of blocks out of the terrain around the
//! epicentre cell and damages every enemy close to the continuous epicentre.
//! `Explosion` is the visual left behind, a fireball plus a burst of particles
//! that fade out together.

use cgmath::{MetricSpace, Point3, Vector3};
use fastrand::Rng;

use super::projectile::block_at;
use crate::{
    core::geometry::normalize_or,
    engine_state::{enemies::Enemy, voxels::terrain::Terrain},
};

/// Damage dealt to every enemy inside the blast.
pub const BLAST_DAMAGE: i32 = 100;

/// Enemies are measured from this height above their origin.
const ENEMY_CENTER_HEIGHT: f32 = 0.5;

/// Particles per explosion.
const PARTICLE_COUNT: usize = 40;

/// Particle speed range in blocks per second.
const PARTICLE_SPEED: (f32, f32) = (6.0, 18.0);

/// Life lost per second by particles and the fireball.
const LIFE_DECAY_PER_SEC: f32 = 1.2;

/// Fireball radius at full life.
const FIREBALL_RADIUS: f32 = 1.5;

/// Every cell within Euclidean `radius` of the cell containing `center`.
pub fn blast_cells(center: Point3<f32>, radius: i32) -> Vec<Point3<i32>> {
    let origin = block_at(center);
    let limit = (radius * radius) as i64;
    let mut cells = Vec::new();
    for x in -radius..=radius {
        for y in -radius..=radius {
            for z in -radius..=radius {
                let squared = (x * x + y * y + z * z) as i64;
                if squared <= limit {
                    cells.push(Point3::new(origin.x + x, origin.y + y, origin.z + z));
                }
            }
        }
    }
    cells
}

/// Applies an explosion at `center` to the terrain and enemies.
///
/// Removed blocks take their bullet marks with them and leave their chunks
/// marked for a mesh rebuild.
///
/// # Returns
/// The blocks that were removed.
pub fn detonate(
    center: Point3<f32>,
    radius: i32,
    terrain: &mut Terrain,
    enemies: &mut [Enemy],
) -> Vec<Point3<i32>> {
    let removed: Vec<_> = blast_cells(center, radius)
        .into_iter()
        .filter(|cell| terrain.remove_block(*cell).is_some())
        .collect();

    for enemy in enemies.iter_mut() {
        let position = enemy.position();
        let enemy_center = Point3::new(position.x, position.y + ENEMY_CENTER_HEIGHT, position.z);
        if enemy_center.distance(center) <= radius as f32 {
            enemy.take_damage(BLAST_DAMAGE);
        }
    }

    log::debug!(
        "Explosion at ({:.1}, {:.1}, {:.1}) removed {} block(s)",
        center.x,
        center.y,
        center.z,
        removed.len()
    );
    removed
}

/// One spark of an explosion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Current position
    pub position: Point3<f32>,
    /// Velocity in blocks per second
    pub velocity: Vector3<f32>,
    /// Remaining life in `[0, 1]`; the particle is drawn while positive
    pub life: f32,
}

/// The fading visual of an explosion.
#[derive(Clone, Debug)]
pub struct Explosion {
    center: Point3<f32>,
    particles: Vec<Particle>,
    fireball_life: f32,
    alive: bool,
}

impl Explosion {
    /// Creates an explosion visual with a fresh burst of particles.
    pub fn new(center: Point3<f32>, rng: &mut Rng) -> Self {
        let particles = (0..PARTICLE_COUNT)
            .map(|_| {
                let raw = Vector3::new(
                    rng.f32() * 2.0 - 1.0,
                    rng.f32() * 2.0 - 1.0,
                    rng.f32() * 2.0 - 1.0,
                );
                let speed = PARTICLE_SPEED.0 + rng.f32() * (PARTICLE_SPEED.1 - PARTICLE_SPEED.0);
                Particle {
                    position: center,
                    velocity: normalize_or(raw, raw) * speed,
                    life: 1.0,
                }
            })
            .collect();

        Explosion {
            center,
            particles,
            fireball_life: 1.0,
            alive: true,
        }
    }

    /// Advances particles and fades the fireball.
    ///
    /// # Returns
    /// `false` once every particle and the fireball have faded.
    pub fn update(&mut self, dt: f32) -> bool {
        if !self.alive {
            return false;
        }
        let decay = LIFE_DECAY_PER_SEC * dt;
        let mut any_particle_alive = false;
        for particle in self.particles.iter_mut().filter(|p| p.life > 0.0) {
            particle.position += particle.velocity * dt;
            particle.life -= decay;
            any_particle_alive |= particle.life > 0.0;
        }
        self.fireball_life = (self.fireball_life - decay).max(0.0);
        if !any_particle_alive && self.fireball_life <= 0.0 {
            self.alive = false;
        }
        self.alive
    }

    /// Returns true while anything is still visible.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Where the explosion happened.
    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    /// Particles that are still visible.
    pub fn visible_particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|particle| particle.life > 0.0)
    }

    /// Current fireball radius, shrinking to zero as it fades.
    pub fn fireball_radius(&self) -> f32 {
        FIREBALL_RADIUS * self.fireball_life
    }

    /// Remaining fireball life in `[0, 1]`, used as its opacity.
    pub fn fireball_life(&self) -> f32 {
        self.fireball_life
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::{block::block_type::BlockType, chunk::ChunkLayout};
    use cgmath::InnerSpace;
    use proptest::prelude::*;

    fn solid_cube(half: i32) -> Terrain {
        let mut terrain = Terrain::new(ChunkLayout::new(16));
        for x in -half..=half {
            for y in -half..=half {
                for z in -half..=half {
                    terrain.place_block(Point3::new(x, y, z), BlockType::SOLID);
                }
            }
        }
        terrain.take_dirty_chunks();
        terrain
    }

    #[test]
    fn test_boundary_cell_removed_and_beyond_kept() {
        let mut terrain = solid_cube(5);
        let removed = detonate(Point3::new(0.5, 0.5, 0.5), 3, &mut terrain, &mut []);

        assert!(removed.contains(&Point3::new(3, 0, 0)));
        assert!(!terrain.world().contains(Point3::new(3, 0, 0)));
        assert!(terrain.world().contains(Point3::new(4, 0, 0)));
        assert!(terrain.world().contains(Point3::new(3, 1, 0)));
        assert!(terrain.world().contains(Point3::new(2, 2, 2)));
        assert!(!terrain.world().contains(Point3::new(2, 2, 1)));
    }

    #[test]
    fn test_detonation_marks_touched_chunks_dirty() {
        let mut terrain = solid_cube(5);
        detonate(Point3::new(0.5, 0.5, 0.5), 3, &mut terrain, &mut []);
        let dirty = terrain.take_dirty_chunks();
        assert_eq!(dirty.len(), 4);
    }

    #[test]
    fn test_explosion_fades_after_lifetime() {
        let mut explosion = Explosion::new(Point3::new(0.0, 0.0, 0.0), &mut Rng::with_seed(9));
        assert!(explosion.is_alive());
        assert_eq!(explosion.visible_particles().count(), 40);

        let mut elapsed = 0.0;
        while explosion.update(1.0 / 60.0) {
            elapsed += 1.0 / 60.0;
            assert!(elapsed < 2.0, "explosion never faded");
        }
        assert!(!explosion.is_alive());
        assert_eq!(explosion.fireball_radius(), 0.0);
        assert!(elapsed > 0.75);
    }

    #[test]
    fn test_particle_speeds_in_range() {
        let explosion = Explosion::new(Point3::new(0.0, 0.0, 0.0), &mut Rng::with_seed(1));
        for particle in explosion.visible_particles() {
            let speed = particle.velocity.magnitude();
            assert!(speed <= 18.0 + 1e-3);
        }
    }

    proptest! {
        #[test]
        fn prop_blast_cells_within_radius(
            cx in -50.0f32..50.0,
            cy in -10.0f32..10.0,
            cz in -50.0f32..50.0,
            radius in 0i32..5,
        ) {
            let center = Point3::new(cx, cy, cz);
            let origin = block_at(center);
            for cell in blast_cells(center, radius) {
                let d = (((cell.x - origin.x).pow(2) + (cell.y - origin.y).pow(2) + (cell.z - origin.z).pow(2)) as f32).sqrt();
                prop_assert!(d <= radius as f32);
            }
        }
    }
}
