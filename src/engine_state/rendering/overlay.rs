//! # Overlay Geometry
//!
//! Everything that is not chunk terrain is rebuilt on the CPU every frame as
//! one triangle list: entities, explosions, bullet marks, clouds and enemy
//! health bars. The lists are short, so a single dynamic vertex buffer is
//! enough.

use cgmath::{Point3, Vector3};

use crate::{
    core::geometry::{rotate_into_yaw_frame, Aabb},
    engine_state::{
        camera_state::CameraPose,
        enemies::{
            hitbox::{drone_boxes, robot_dog_boxes},
            EnemyKind,
        },
        entities::weapon::WeaponKind,
    },
};

use super::{
    render_state::{DecalQuad, EntityDrawState, EntityKind, ExplosionDrawState, HealthBar},
    sky::Cloud,
    vertex::ColorVertex,
};

const BULLET_COLOR: [f32; 3] = [1.0, 0.9, 0.2];
const ROCKET_COLOR: [f32; 3] = [0.6, 0.15, 0.1];
const GROUND_ENEMY_COLOR: [f32; 3] = [0.35, 0.35, 0.4];
const FLYING_ENEMY_COLOR: [f32; 3] = [0.7, 0.1, 0.1];
const TURRET_COLOR: [f32; 3] = [0.1, 0.1, 0.1];
const FIREBALL_COLOR: [f32; 3] = [1.0, 0.5, 0.0];
const PARTICLE_COLOR: [f32; 3] = [1.0, 0.8, 0.2];
const DECAL_COLOR: [f32; 3] = [0.05, 0.05, 0.05];
const CLOUD_COLOR: [f32; 3] = [0.95, 0.95, 0.97];
const BAR_BACK_COLOR: [f32; 3] = [0.6, 0.0, 0.0];
const BAR_FILL_COLOR: [f32; 3] = [0.0, 0.8, 0.0];

const BULLET_HALF: f32 = 0.05;
const PICKUP_HALF: f32 = 0.25;
const PARTICLE_HALF: f32 = 0.08;
const BAR_HALF_WIDTH: f32 = 0.5;
const BAR_HALF_HEIGHT: f32 = 0.06;

fn pickup_color(kind: WeaponKind) -> [f32; 3] {
    match kind {
        WeaponKind::Pistol => [0.9, 0.9, 0.2],
        WeaponKind::Shotgun => [0.9, 0.5, 0.1],
        WeaponKind::RocketLauncher => [0.8, 0.1, 0.1],
    }
}

/// Blends `color` towards black as `opacity` drops.
fn faded(color: [f32; 3], opacity: f32) -> [f32; 3] {
    color.map(|channel| channel * opacity.clamp(0.0, 1.0))
}

/// Accumulates overlay triangles.
#[derive(Debug, Default)]
pub struct OverlayBuilder {
    vertices: Vec<ColorVertex>,
}

impl OverlayBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a quad as two triangles. Corners go around the quad in order.
    pub fn push_quad(&mut self, corners: [Point3<f32>; 4], color: [f32; 3]) {
        for index in [0, 1, 2, 0, 2, 3] {
            self.vertices.push(ColorVertex::new(corners[index].into(), color));
        }
    }

    /// Adds `aabb`, given in a local frame, placed at `origin` and turned by `yaw` degrees.
    pub fn push_box(&mut self, origin: Point3<f32>, yaw: f32, aabb: &Aabb, color: [f32; 3]) {
        let corner = |x: f32, y: f32, z: f32| -> Point3<f32> {
            origin + rotate_into_yaw_frame(Vector3::new(x, y, z), -yaw)
        };
        let (min, max) = (aabb.min, aabb.max);
        let faces = [
            [(min.x, min.y, max.z), (max.x, min.y, max.z), (max.x, max.y, max.z), (min.x, max.y, max.z)],
            [(max.x, min.y, min.z), (min.x, min.y, min.z), (min.x, max.y, min.z), (max.x, max.y, min.z)],
            [(min.x, max.y, max.z), (max.x, max.y, max.z), (max.x, max.y, min.z), (min.x, max.y, min.z)],
            [(min.x, min.y, min.z), (max.x, min.y, min.z), (max.x, min.y, max.z), (min.x, min.y, max.z)],
            [(max.x, min.y, max.z), (max.x, min.y, min.z), (max.x, max.y, min.z), (max.x, max.y, max.z)],
            [(min.x, min.y, min.z), (min.x, min.y, max.z), (min.x, max.y, max.z), (min.x, max.y, min.z)],
        ];
        for face in faces {
            self.push_quad(face.map(|(x, y, z)| corner(x, y, z)), color);
        }
    }

    /// Adds an upright quad centred on `center` that faces along the camera's view.
    pub fn push_billboard(
        &mut self,
        center: Point3<f32>,
        right: Vector3<f32>,
        half_width: f32,
        half_height: f32,
        color: [f32; 3],
    ) {
        let across = right * half_width;
        let up = Vector3::new(0.0, half_height, 0.0);
        self.push_quad(
            [
                center - across - up,
                center + across - up,
                center + across + up,
                center - across + up,
            ],
            color,
        );
    }

    pub fn push_entity(&mut self, entity: &EntityDrawState) {
        let origin = entity.position;
        match entity.kind {
            EntityKind::Bullet => {
                let aabb = Aabb::from_center([0.0; 3], [BULLET_HALF; 3]);
                self.push_box(origin, entity.yaw, &aabb, BULLET_COLOR);
            }
            EntityKind::Rocket => {
                let aabb = Aabb::from_center([0.0; 3], [0.08, 0.08, 0.3]);
                self.push_box(origin, entity.yaw + 180.0, &aabb, ROCKET_COLOR);
            }
            EntityKind::Pickup(kind) => {
                let aabb = Aabb::from_center([0.0; 3], [PICKUP_HALF; 3]);
                self.push_box(origin, 0.0, &aabb, pickup_color(kind));
            }
            EntityKind::Enemy(EnemyKind::Ground) => {
                for aabb in robot_dog_boxes() {
                    self.push_box(origin, entity.yaw, &aabb, GROUND_ENEMY_COLOR);
                }
                if let Some(turret) = entity.turret_yaw {
                    let barrel = Aabb::from_center([0.0, 1.0, 0.25], [0.04, 0.04, 0.25]);
                    self.push_box(origin, entity.yaw + turret, &barrel, TURRET_COLOR);
                }
            }
            EntityKind::Enemy(EnemyKind::Flying) => {
                for aabb in drone_boxes() {
                    self.push_box(origin, entity.yaw, &aabb, FLYING_ENEMY_COLOR);
                }
            }
        }
    }

    pub fn push_explosion(&mut self, explosion: &ExplosionDrawState) {
        if explosion.fireball_radius > 0.0 {
            let r = explosion.fireball_radius;
            let fireball = Aabb::from_center([0.0; 3], [r, r, r]);
            let color = faded(FIREBALL_COLOR, explosion.fireball_opacity);
            self.push_box(explosion.center, 0.0, &fireball, color);
        }
        let spark = Aabb::from_center([0.0; 3], [PARTICLE_HALF; 3]);
        for (position, opacity) in &explosion.particles {
            self.push_box(*position, 0.0, &spark, faded(PARTICLE_COLOR, *opacity));
        }
    }

    pub fn push_health_bar(&mut self, bar: &HealthBar, right: Vector3<f32>) {
        self.push_billboard(bar.anchor, right, BAR_HALF_WIDTH, BAR_HALF_HEIGHT, BAR_BACK_COLOR);
        let ratio = bar.health.ratio();
        if ratio <= 0.0 {
            return;
        }
        // Fill grows from the left edge, nudged towards the camera so it wins the depth test.
        let left = bar.anchor - right * BAR_HALF_WIDTH;
        let center = left + right * (BAR_HALF_WIDTH * ratio) + right.cross(Vector3::unit_y()) * 0.01;
        self.push_billboard(
            center,
            right,
            BAR_HALF_WIDTH * ratio,
            BAR_HALF_HEIGHT,
            BAR_FILL_COLOR,
        );
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn finish(self) -> Vec<ColorVertex> {
        self.vertices
    }
}

/// The camera's horizontal right vector.
pub fn camera_right(pose: &CameraPose) -> Vector3<f32> {
    let (sin, cos) = pose.yaw.to_radians().sin_cos();
    Vector3::new(cos, 0.0, sin)
}

/// Snapshot of everything drawn through the overlay in one frame.
#[derive(Debug, Default)]
pub struct OverlayScene {
    pub entities: Vec<EntityDrawState>,
    pub explosions: Vec<ExplosionDrawState>,
    pub decals: Vec<DecalQuad>,
    pub health_bars: Vec<HealthBar>,
    pub clouds: Vec<Cloud>,
}

/// Builds the overlay triangle list for `scene` as seen from `pose`.
pub fn build_overlay(scene: &OverlayScene, pose: &CameraPose) -> Vec<ColorVertex> {
    let mut builder = OverlayBuilder::new();
    for cloud in &scene.clouds {
        builder.push_quad(cloud.corners(), CLOUD_COLOR);
    }
    for decal in &scene.decals {
        builder.push_quad(decal.corners, DECAL_COLOR);
    }
    for entity in &scene.entities {
        builder.push_entity(entity);
    }
    for explosion in &scene.explosions {
        builder.push_explosion(explosion);
    }
    let right = camera_right(pose);
    for bar in &scene.health_bars {
        builder.push_health_bar(bar, right);
    }
    builder.finish()
}
