//! # Ammo Pickups
//!
//! Stationary ammo crates scattered by the chunk generator. A pickup is
//! collected whole the first time the player comes within reach of it.

use cgmath::{MetricSpace, Point3};

use super::weapon::{Arsenal, WeaponKind};
use crate::engine_state::voxels::chunk::{generation::PickupSpawn, ChunkCoord};

/// Distance from the player's feet at which a pickup is collected.
pub const PICKUP_RADIUS: f32 = 1.0;

/// Bob frequency in radians per second.
const BOB_SPEED: f64 = 4.0;

/// Bob amplitude in blocks.
const BOB_AMPLITUDE: f32 = 0.25;

/// An ammo crate lying in the world.
#[derive(Clone, Debug, PartialEq)]
pub struct AmmoPickup {
    /// Resting position
    pub position: Point3<f32>,
    /// Which weapon the ammo is for
    pub ammo: WeaponKind,
    /// The chunk that spawned the pickup
    pub chunk: ChunkCoord,
    /// Session time the pickup appeared, which phases its bob
    pub spawned_at: f64,
}

impl AmmoPickup {
    /// Creates a pickup from a generated spawn.
    pub fn from_spawn(spawn: &PickupSpawn, now: f64) -> Self {
        AmmoPickup {
            position: spawn.position,
            ammo: spawn.ammo,
            chunk: spawn.chunk,
            spawned_at: now,
        }
    }

    /// Rounds granted on collection.
    pub fn amount(&self) -> u32 {
        self.ammo.pickup_amount()
    }

    /// Vertical draw offset at session time `now`.
    pub fn bob_offset(&self, now: f64) -> f32 {
        (((now - self.spawned_at) * BOB_SPEED).sin() as f32) * BOB_AMPLITUDE
    }
}

/// Collects every pickup within reach of `player`, crediting the ammo to `arsenal`.
///
/// # Returns
/// The collected pickups, already removed from `pickups`.
pub fn collect_pickups(
    pickups: &mut Vec<AmmoPickup>,
    player: Point3<f32>,
    arsenal: &mut Arsenal,
) -> Vec<AmmoPickup> {
    let mut collected = Vec::new();
    pickups.retain(|pickup| {
        if pickup.position.distance(player) <= PICKUP_RADIUS {
            arsenal.add_ammo(pickup.ammo, pickup.amount());
            log::trace!("Collected {:?} ammo at {:?}", pickup.ammo, pickup.position);
            collected.push(pickup.clone());
            false
        } else {
            true
        }
    });
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WeaponConfig;

    fn pickup(x: f32, ammo: WeaponKind) -> AmmoPickup {
        AmmoPickup {
            position: Point3::new(x, 1.5, 0.5),
            ammo,
            chunk: ChunkCoord::new(0, 0),
            spawned_at: 0.0,
        }
    }

    #[test]
    fn test_collects_only_nearby_pickups() {
        let mut arsenal = Arsenal::new(&WeaponConfig::default());
        let mut pickups = vec![
            pickup(0.5, WeaponKind::RocketLauncher),
            pickup(4.5, WeaponKind::Shotgun),
        ];

        let collected = collect_pickups(&mut pickups, Point3::new(0.5, 1.0, 0.5), &mut arsenal);
        assert_eq!(collected.len(), 1);
        assert_eq!(pickups.len(), 1);
        assert_eq!(arsenal.slot(WeaponKind::RocketLauncher).ammo, 10);
        assert_eq!(arsenal.slot(WeaponKind::Shotgun).ammo, 10);
    }

    #[test]
    fn test_pickup_collected_once() {
        let mut arsenal = Arsenal::new(&WeaponConfig::default());
        let mut pickups = vec![pickup(0.5, WeaponKind::Pistol)];
        let player = Point3::new(0.5, 1.0, 0.5);
        collect_pickups(&mut pickups, player, &mut arsenal);
        collect_pickups(&mut pickups, player, &mut arsenal);
        assert_eq!(arsenal.slot(WeaponKind::Pistol).ammo, 100);
    }

    #[test]
    fn test_bob_is_bounded() {
        let pickup = pickup(0.0, WeaponKind::Pistol);
        for step in 0..100 {
            assert!(pickup.bob_offset(step as f64 * 0.05).abs() <= 0.25);
        }
    }
}
