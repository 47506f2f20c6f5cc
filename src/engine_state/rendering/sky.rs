//! Procedural clouds.
//!
//! Every chunk owns one cloud, placed from a seed derived only from the chunk
//! coordinate, so the sky stays put as the player walks around.

use cgmath::{Point2, Point3};
use fastrand::Rng;

use crate::engine_state::voxels::chunk::{ChunkCoord, ChunkLayout};

/// Cloud height range in blocks.
const CLOUD_HEIGHT: (f32, f32) = (15.0, 20.0);

/// Cloud half-size range in blocks.
const CLOUD_SIZE: (f32, f32) = (5.0, 10.0);

/// A flat square cloud.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cloud {
    /// Centre of the cloud
    pub position: Point3<f32>,
    /// Half the side length
    pub size: f32,
}

impl Cloud {
    /// Corners of the cloud quad.
    pub fn corners(&self) -> [Point3<f32>; 4] {
        let Point3 { x, y, z } = self.position;
        let s = self.size;
        [
            Point3::new(x - s, y, z - s),
            Point3::new(x + s, y, z - s),
            Point3::new(x + s, y, z + s),
            Point3::new(x - s, y, z + s),
        ]
    }
}

/// Seed of the cloud owned by `chunk`.
pub fn cloud_seed(chunk: ChunkCoord) -> u64 {
    let mixed = (chunk.x as i64)
        .wrapping_mul(374_761_393)
        .wrapping_add((chunk.z as i64).wrapping_mul(668_265_263));
    (mixed ^ 0x1234_5678) as u64
}

fn uniform(rng: &mut Rng, low: f32, high: f32) -> f32 {
    low + rng.f32() * (high - low)
}

/// The cloud owned by `chunk`.
pub fn chunk_cloud(layout: ChunkLayout, chunk: ChunkCoord) -> Cloud {
    let mut rng = Rng::with_seed(cloud_seed(chunk));
    let (base_x, base_z) = layout.origin(chunk);
    let size = layout.size() as f32;
    let x = uniform(&mut rng, base_x as f32, base_x as f32 + size);
    let z = uniform(&mut rng, base_z as f32, base_z as f32 + size);
    let y = uniform(&mut rng, CLOUD_HEIGHT.0, CLOUD_HEIGHT.1);
    Cloud {
        position: Point3::new(x, y, z),
        size: uniform(&mut rng, CLOUD_SIZE.0, CLOUD_SIZE.1),
    }
}

/// Clouds of the chunks around `viewer`, limited to those within
/// `chunk_size * (render_distance + 1)` horizontally.
pub fn clouds_around(layout: ChunkLayout, viewer: Point2<f32>, render_distance: i32) -> Vec<Cloud> {
    let center = layout.chunk_of_point(Point3::new(viewer.x, 0.0, viewer.y));
    let reach = (layout.size() * (render_distance + 1)) as f32;
    layout
        .window(center, render_distance)
        .map(|chunk| chunk_cloud(layout, chunk))
        .filter(|cloud| {
            let dx = cloud.position.x - viewer.x;
            let dz = cloud.position.z - viewer.y;
            (dx * dx + dz * dz).sqrt() < reach
        })
        .collect()
}
