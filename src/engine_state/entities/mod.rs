//! # Entities
//!
//! Everything in the world that is not a block or an enemy: the player's
//! weapons, the projectiles they fire, explosions and ammo pickups.
//!
//! Each kind lives in a plain `Vec` owned by the session. A per-tick update
//! reports whether the entity is still alive, and dropping it from its list is
//! the only way an entity is destroyed.

pub mod explosion;
pub mod pickup;
pub mod projectile;
pub mod weapon;
