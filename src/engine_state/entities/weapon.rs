//! # Weapons
//!
//! The player's arsenal: one inventory slot per weapon, per-weapon cooldowns
//! measured on the session clock, and the spawn pattern of each weapon.

use cgmath::Point3;
use fastrand::Rng;

use super::projectile::{Bullet, Rocket, Shooter};
use crate::{
    core::{
        config::{WeaponConfig, WeaponStats},
        geometry::direction_from_angles,
    },
    engine_state::audio::SoundId,
};

/// The three weapons the player can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponKind {
    /// Single bullet, no cooldown
    Pistol,
    /// A spread of pellets
    Shotgun,
    /// A single rocket with splash damage
    RocketLauncher,
}

impl WeaponKind {
    /// Every weapon in selection order.
    pub const ALL: [WeaponKind; 3] = [
        WeaponKind::Pistol,
        WeaponKind::Shotgun,
        WeaponKind::RocketLauncher,
    ];

    /// Position of the weapon in selection order.
    pub fn index(self) -> usize {
        match self {
            WeaponKind::Pistol => 0,
            WeaponKind::Shotgun => 1,
            WeaponKind::RocketLauncher => 2,
        }
    }

    /// Ammo granted by a pickup of this kind.
    pub fn pickup_amount(self) -> u32 {
        match self {
            WeaponKind::Pistol => 50,
            WeaponKind::Shotgun => 10,
            WeaponKind::RocketLauncher => 5,
        }
    }

    /// Sound played when the weapon fires.
    pub fn fire_sound(self) -> SoundId {
        match self {
            WeaponKind::Pistol => SoundId::Pistol,
            WeaponKind::Shotgun => SoundId::Shotgun,
            WeaponKind::RocketLauncher => SoundId::RocketLauncher,
        }
    }
}

/// Ammo and ownership for one weapon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InventorySlot {
    /// Rounds left
    pub ammo: u32,
    /// Whether the weapon can be selected by cycling and fired
    pub owned: bool,
}

/// Everything spawned by one trigger pull.
#[derive(Debug)]
pub struct Volley {
    /// The weapon that fired
    pub weapon: WeaponKind,
    /// Where the projectiles start
    pub origin: Point3<f32>,
    /// Bullets or pellets
    pub bullets: Vec<Bullet>,
    /// Rockets
    pub rockets: Vec<Rocket>,
}

/// The player's weapons, ammo and selection.
#[derive(Debug, Clone)]
pub struct Arsenal {
    slots: [InventorySlot; 3],
    last_fired: [Option<f64>; 3],
    current: usize,
    config: WeaponConfig,
}

impl Arsenal {
    /// Creates an arsenal holding every weapon with its configured starting ammo.
    pub fn new(config: &WeaponConfig) -> Self {
        let slots = WeaponKind::ALL.map(|kind| InventorySlot {
            ammo: Self::stats_in(config, kind).starting_ammo,
            owned: true,
        });
        Arsenal {
            slots,
            last_fired: [None; 3],
            current: 0,
            config: config.clone(),
        }
    }

    fn stats_in(config: &WeaponConfig, kind: WeaponKind) -> WeaponStats {
        match kind {
            WeaponKind::Pistol => config.pistol,
            WeaponKind::Shotgun => config.shotgun,
            WeaponKind::RocketLauncher => config.rocket,
        }
    }

    /// The selected weapon.
    pub fn current(&self) -> WeaponKind {
        WeaponKind::ALL[self.current]
    }

    /// The inventory slot of `kind`.
    pub fn slot(&self, kind: WeaponKind) -> InventorySlot {
        self.slots[kind.index()]
    }

    /// Selects `kind` directly.
    pub fn select(&mut self, kind: WeaponKind) {
        self.current = kind.index();
    }

    /// Steps the selection by `step` (negative for backwards), skipping weapons not owned.
    ///
    /// If nothing is owned the selection ends where it started.
    pub fn cycle(&mut self, step: i32) {
        if step == 0 {
            return;
        }
        let len = WeaponKind::ALL.len() as i32;
        for _ in 0..len {
            self.current = (self.current as i32 + step.signum()).rem_euclid(len) as usize;
            if self.slots[self.current].owned {
                break;
            }
        }
    }

    /// Adds ammo from a pickup. Picking up ammo also grants the weapon.
    pub fn add_ammo(&mut self, kind: WeaponKind, amount: u32) {
        let slot = &mut self.slots[kind.index()];
        slot.ammo = slot.ammo.saturating_add(amount);
        slot.owned = true;
    }

    /// Returns true if `kind`'s cooldown has elapsed at session time `now`.
    pub fn is_ready(&self, kind: WeaponKind, now: f64) -> bool {
        match self.last_fired[kind.index()] {
            Some(last) => now - last >= Self::stats_in(&self.config, kind).cooldown as f64,
            None => true,
        }
    }

    /// Fires the selected weapon if it is owned, loaded and off cooldown.
    ///
    /// # Arguments
    /// * `now` - Session time in seconds
    /// * `eye` - Position projectiles spawn at
    /// * `yaw` - Aim heading in degrees
    /// * `pitch` - Aim elevation in degrees
    /// * `rng` - Random stream for pellet spread
    ///
    /// # Returns
    /// The spawned projectiles, or `None` if the weapon could not fire.
    pub fn fire(
        &mut self,
        now: f64,
        eye: Point3<f32>,
        yaw: f32,
        pitch: f32,
        rng: &mut Rng,
    ) -> Option<Volley> {
        let weapon = self.current();
        if !self.is_ready(weapon, now) {
            return None;
        }
        let slot = &mut self.slots[weapon.index()];
        if !slot.owned || slot.ammo == 0 {
            return None;
        }
        slot.ammo -= 1;
        self.last_fired[weapon.index()] = Some(now);

        let mut volley = Volley {
            weapon,
            origin: eye,
            bullets: Vec::new(),
            rockets: Vec::new(),
        };
        let aim = direction_from_angles(yaw, pitch);
        match weapon {
            WeaponKind::Pistol => volley.bullets.push(Bullet::new(eye, aim, Shooter::Player)),
            WeaponKind::Shotgun => {
                let spread_h = self.config.shotgun_spread_horizontal;
                let spread_v = self.config.shotgun_spread_vertical;
                for _ in 0..self.config.shotgun_pellets {
                    let offset_h = (rng.f32() * 2.0 - 1.0) * spread_h;
                    let offset_v = (rng.f32() * 2.0 - 1.0) * spread_v;
                    let direction = direction_from_angles(yaw + offset_h, pitch + offset_v);
                    volley.bullets.push(Bullet::new(eye, direction, Shooter::Player));
                }
            }
            WeaponKind::RocketLauncher => volley.rockets.push(Rocket::new(eye, aim)),
        }
        Some(volley)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arsenal() -> Arsenal {
        Arsenal::new(&WeaponConfig::default())
    }

    fn eye() -> Point3<f32> {
        Point3::new(8.0, 2.7, 2.0)
    }

    #[test]
    fn test_starting_inventory() {
        let arsenal = arsenal();
        assert_eq!(arsenal.current(), WeaponKind::Pistol);
        assert_eq!(arsenal.slot(WeaponKind::Pistol).ammo, 50);
        assert_eq!(arsenal.slot(WeaponKind::Shotgun).ammo, 10);
        assert_eq!(arsenal.slot(WeaponKind::RocketLauncher).ammo, 5);
    }

    #[test]
    fn test_fire_consumes_ammo() {
        let mut arsenal = arsenal();
        let mut rng = Rng::with_seed(1);
        let volley = arsenal.fire(0.0, eye(), 90.0, 0.0, &mut rng).unwrap();
        assert_eq!(volley.bullets.len(), 1);
        assert_eq!(arsenal.slot(WeaponKind::Pistol).ammo, 49);
    }

    #[test]
    fn test_cooldown_blocks_refire() {
        let mut arsenal = arsenal();
        let mut rng = Rng::with_seed(1);
        arsenal.select(WeaponKind::RocketLauncher);
        assert!(arsenal.fire(10.0, eye(), 0.0, 0.0, &mut rng).is_some());
        assert!(arsenal.fire(10.5, eye(), 0.0, 0.0, &mut rng).is_none());
        assert!(arsenal.fire(11.0, eye(), 0.0, 0.0, &mut rng).is_some());
        assert_eq!(arsenal.slot(WeaponKind::RocketLauncher).ammo, 3);
    }

    #[test]
    fn test_empty_weapon_does_not_fire() {
        let mut config = WeaponConfig::default();
        config.shotgun.starting_ammo = 0;
        let mut arsenal = Arsenal::new(&config);
        arsenal.select(WeaponKind::Shotgun);
        assert!(arsenal
            .fire(0.0, eye(), 0.0, 0.0, &mut Rng::with_seed(3))
            .is_none());
    }

    #[test]
    fn test_shotgun_fires_configured_pellets() {
        let mut arsenal = arsenal();
        arsenal.select(WeaponKind::Shotgun);
        let volley = arsenal
            .fire(0.0, eye(), 0.0, 0.0, &mut Rng::with_seed(42))
            .unwrap();
        assert_eq!(volley.bullets.len(), 8);
        assert!(volley.rockets.is_empty());
    }

    #[test]
    fn test_cycle_wraps_and_skips_unowned() {
        let mut arsenal = arsenal();
        arsenal.cycle(-1);
        assert_eq!(arsenal.current(), WeaponKind::RocketLauncher);
        arsenal.cycle(1);
        assert_eq!(arsenal.current(), WeaponKind::Pistol);

        arsenal.slots[WeaponKind::Shotgun.index()].owned = false;
        arsenal.cycle(1);
        assert_eq!(arsenal.current(), WeaponKind::RocketLauncher);
    }

    #[test]
    fn test_pickup_grants_weapon() {
        let mut arsenal = arsenal();
        arsenal.slots[WeaponKind::Shotgun.index()].owned = false;
        arsenal.add_ammo(WeaponKind::Shotgun, WeaponKind::Shotgun.pickup_amount());
        let slot = arsenal.slot(WeaponKind::Shotgun);
        assert!(slot.owned);
        assert_eq!(slot.ammo, 20);
    }
}
