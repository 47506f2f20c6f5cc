//! # Chunk Generation
//!
//! Deterministic per-chunk content. The random stream for a chunk is seeded
//! from its coordinate alone, so generating the same chunk twice yields the
//! same blocks and the same spawn lists. Chunks are unloaded and reloaded
//! freely as the player moves, and this is what keeps them stable.
//!
//! ## Algorithm
//!
//! 1. Fill one Solid layer at ground level across the whole footprint
//! 2. Place 0-3 trees: a Solid trunk 2-5 blocks tall topped by a 5-cell Leaf
//!    cross (leaf cells that would land in a neighbouring chunk are dropped)
//! 3. Scatter 0-2 ammo pickups of random kind above free ground columns
//! 4. Roll for a ground enemy and a flying enemy, unless the chunk is the
//!    protected spawn chunk

use std::collections::{HashMap, HashSet};

use cgmath::Point3;
use fastrand::Rng;

use super::{ChunkCoord, ChunkLayout};
use crate::engine_state::{
    enemies::EnemyKind, entities::weapon::WeaponKind, voxels::block::block_type::BlockType,
};

/// Multiplier combining the chunk X index into the seed.
const SEED_PRIME: i64 = 99_999;

/// Maximum trees per chunk.
const MAX_TREES: u32 = 3;

/// Trunk height bounds (inclusive).
const TRUNK_HEIGHT: std::ops::RangeInclusive<i32> = 2..=5;

/// Maximum pickups per chunk.
const MAX_PICKUPS: u32 = 2;

/// Height of a pickup above the ground layer.
const PICKUP_HEIGHT: f32 = 1.5;

/// Chance of a chunk spawning a ground enemy.
const GROUND_ENEMY_CHANCE: f32 = 0.25;

/// Chance of a chunk spawning a flying enemy.
const FLYING_ENEMY_CHANCE: f32 = 0.15;

/// Hover height of freshly spawned flying enemies above the ground layer.
const FLYING_SPAWN_HEIGHT: f32 = 8.0;

/// A pickup the streamer should create when the chunk is merged.
#[derive(Clone, Debug, PartialEq)]
pub struct PickupSpawn {
    /// World position of the pickup
    pub position: Point3<f32>,
    /// Which weapon's ammo it carries
    pub ammo: WeaponKind,
    /// The chunk that spawned it
    pub chunk: ChunkCoord,
}

/// An enemy the streamer should create when the chunk is merged.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySpawn {
    /// Ground or flying
    pub kind: EnemyKind,
    /// World position of the enemy's origin
    pub position: Point3<f32>,
    /// Initial heading in degrees
    pub yaw: f32,
    /// Seed for the enemy's own random stream
    pub rng_seed: u64,
    /// The chunk that spawned it
    pub chunk: ChunkCoord,
}

/// Everything generated for one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedChunk {
    /// Chunk the content belongs to
    pub coord: ChunkCoord,
    /// Blocks, sorted by position
    pub blocks: Vec<(Point3<i32>, BlockType)>,
    /// Pickups to spawn
    pub pickups: Vec<PickupSpawn>,
    /// Enemies to spawn
    pub enemies: Vec<EnemySpawn>,
}

/// Seed of the random stream for a chunk.
pub fn chunk_seed(chunk: ChunkCoord) -> u64 {
    (chunk.x as i64)
        .wrapping_mul(SEED_PRIME)
        .wrapping_add(chunk.z as i64) as u64
}

/// Generates chunk content. Cheap to clone and safe to move onto a worker thread.
#[derive(Clone, Debug)]
pub struct ChunkGenerator {
    layout: ChunkLayout,
    ground_level: i32,
    enemy_free_chunk: Option<ChunkCoord>,
}

impl ChunkGenerator {
    /// Creates a generator.
    ///
    /// # Arguments
    /// * `layout` - Chunk size for the session
    /// * `ground_level` - Y of the ground layer
    /// * `enemy_free_chunk` - A chunk that never spawns enemies, usually the player's spawn
    pub fn new(layout: ChunkLayout, ground_level: i32, enemy_free_chunk: Option<ChunkCoord>) -> Self {
        ChunkGenerator {
            layout,
            ground_level,
            enemy_free_chunk,
        }
    }

    /// The layout chunks are generated for.
    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    /// Generates the content of `coord`.
    ///
    /// Pure: the result depends only on `coord` and the generator's settings.
    pub fn generate(&self, coord: ChunkCoord) -> GeneratedChunk {
        let seed = chunk_seed(coord);
        let mut rng = Rng::with_seed(seed);
        let size = self.layout.size();
        let (base_x, base_z) = self.layout.origin(coord);
        let (x_range, z_range) = self.layout.column_ranges(coord);

        let mut blocks = HashMap::new();
        for x in x_range.clone() {
            for z in z_range.clone() {
                blocks.insert(Point3::new(x, self.ground_level, z), BlockType::SOLID);
            }
        }

        let mut occupied_columns = HashSet::new();
        for _ in 0..rng.u32(0..=MAX_TREES) {
            let ox = base_x + rng.i32(0..size);
            let oz = base_z + rng.i32(0..size);
            let height = rng.i32(TRUNK_HEIGHT);
            occupied_columns.insert((ox, oz));

            for y in 1..=height {
                blocks.insert(Point3::new(ox, self.ground_level + y, oz), BlockType::SOLID);
            }

            let leaf_y = self.ground_level + height + 1;
            for (lx, lz) in [(ox, oz), (ox + 1, oz), (ox - 1, oz), (ox, oz + 1), (ox, oz - 1)] {
                if x_range.contains(&lx) && z_range.contains(&lz) {
                    blocks.insert(Point3::new(lx, leaf_y, lz), BlockType::LEAF);
                }
            }
        }

        let mut pickups = Vec::new();
        for _ in 0..rng.u32(0..=MAX_PICKUPS) {
            let px = base_x + rng.i32(0..size);
            let pz = base_z + rng.i32(0..size);
            let ammo = WeaponKind::ALL[rng.usize(0..WeaponKind::ALL.len())];
            if occupied_columns.insert((px, pz)) {
                pickups.push(PickupSpawn {
                    position: Point3::new(
                        px as f32 + 0.5,
                        self.ground_level as f32 + PICKUP_HEIGHT,
                        pz as f32 + 0.5,
                    ),
                    ammo,
                    chunk: coord,
                });
            }
        }

        let mut enemies = Vec::new();
        if self.enemy_free_chunk != Some(coord) {
            let rolls = [
                (EnemyKind::Ground, GROUND_ENEMY_CHANCE, 1.0),
                (EnemyKind::Flying, FLYING_ENEMY_CHANCE, FLYING_SPAWN_HEIGHT),
            ];
            for (kind, chance, height) in rolls {
                if rng.f32() >= chance {
                    continue;
                }
                let ex = base_x + rng.i32(0..size);
                let ez = base_z + rng.i32(0..size);
                let yaw = rng.f32() * 360.0;
                if kind == EnemyKind::Ground && !occupied_columns.insert((ex, ez)) {
                    continue;
                }
                enemies.push(EnemySpawn {
                    kind,
                    position: Point3::new(
                        ex as f32 + 0.5,
                        self.ground_level as f32 + height,
                        ez as f32 + 0.5,
                    ),
                    yaw,
                    rng_seed: seed ^ rng.u64(..),
                    chunk: coord,
                });
            }
        }

        let mut blocks: Vec<_> = blocks.into_iter().collect();
        blocks.sort_by_key(|(position, _)| (position.x, position.y, position.z));

        GeneratedChunk {
            coord,
            blocks,
            pickups,
            enemies,
        }
    }
}
