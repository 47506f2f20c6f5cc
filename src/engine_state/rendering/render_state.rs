//! Render-facing snapshots of simulation state.
//!
//! The renderer never reads entity internals. Each tick it asks the session
//! for these plain values and draws them however it likes.

use cgmath::Point3;

use crate::engine_state::{enemies::EnemyKind, entities::weapon::WeaponKind};

/// What an entity draw state depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    /// A bullet or shotgun pellet
    Bullet,
    /// A rocket in flight
    Rocket,
    /// An ammo crate for the given weapon
    Pickup(WeaponKind),
    /// An enemy
    Enemy(EnemyKind),
}

/// Current and maximum health of something that can be damaged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    /// Health left
    pub current: i32,
    /// Health when undamaged
    pub max: i32,
}

impl Health {
    /// Fraction of health left, clamped to `[0, 1]`.
    pub fn ratio(&self) -> f32 {
        if self.max <= 0 {
            return 0.0;
        }
        (self.current as f32 / self.max as f32).clamp(0.0, 1.0)
    }
}

/// Where and how to draw one entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityDrawState {
    /// What to draw
    pub kind: EntityKind,
    /// World position of the entity's origin
    pub position: Point3<f32>,
    /// Heading in degrees
    pub yaw: f32,
    /// Elevation in degrees
    pub pitch: f32,
    /// Heading of a mounted weapon relative to the body, if the entity has one
    pub turret_yaw: Option<f32>,
    /// Health, for entities that can be damaged
    pub health: Option<Health>,
}

/// Where and how to draw a fading explosion.
#[derive(Clone, Debug, PartialEq)]
pub struct ExplosionDrawState {
    /// Centre of the fireball
    pub center: Point3<f32>,
    /// Fireball radius
    pub fireball_radius: f32,
    /// Fireball opacity in `[0, 1]`
    pub fireball_opacity: f32,
    /// Visible particles as (position, opacity)
    pub particles: Vec<(Point3<f32>, f32)>,
}

/// A floating health bar above an enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HealthBar {
    /// World position the bar is anchored at
    pub anchor: Point3<f32>,
    /// Health to display
    pub health: Health,
    /// Distance from the camera, for sizing and sorting
    pub distance: f32,
}

/// A bullet-mark quad ready to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecalQuad {
    /// Corners in winding order
    pub corners: [Point3<f32>; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_ratio_clamps() {
        assert_eq!(Health { current: 25, max: 50 }.ratio(), 0.5);
        assert_eq!(Health { current: -10, max: 50 }.ratio(), 0.0);
        assert_eq!(Health { current: 5, max: 0 }.ratio(), 0.0);
    }
}
