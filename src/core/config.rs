//! # Session Configuration
//!
//! Tunable constants for a play session, loaded once at startup from a JSON
//! file and never hot-reloaded. Every field has a default, so a partial file
//! (or no file at all) yields a playable session.
//!
//! ## Layout
//!
//! * `PlayerConfig` - movement, look and collision constants for the player
//! * `WorldConfig` - chunk geometry, streaming window and worker pool sizing
//! * `WeaponConfig` - per-weapon cooldowns, starting ammo and shotgun spread

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Top-level session configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Player movement and collision settings.
    pub player: PlayerConfig,
    /// Chunk streaming settings.
    pub world: WorldConfig,
    /// Weapon settings.
    pub weapons: WeaponConfig,
}

/// Player movement, look and collision constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// Walking speed in blocks per second.
    pub move_speed: f32,
    /// Multiplier applied to `move_speed` while sprinting.
    pub sprint_multiplier: f32,
    /// Degrees of rotation per unit of mouse delta.
    pub mouse_sensitivity: f32,
    /// Upward velocity applied by a jump.
    pub jump_speed: f32,
    /// Downward acceleration in blocks per second squared.
    pub gravity: f32,
    /// Camera height above the feet.
    pub eye_height: f32,
    /// Horizontal half-width of the collision box.
    pub collision_radius: f32,
    /// Height of the collision box.
    pub height: f32,
    /// Starting and maximum health.
    pub max_health: i32,
    /// Feet position the player is placed at once the world has booted.
    pub spawn: [f32; 3],
    /// Initial yaw in degrees.
    pub spawn_yaw: f32,
    /// Initial pitch in degrees.
    pub spawn_pitch: f32,
}

/// Chunk geometry and streaming constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Width and depth of a chunk column in blocks.
    pub chunk_size: i32,
    /// Radius of the square chunk window kept around the player.
    pub render_distance: i32,
    /// Y level of the generated ground layer.
    pub ground_level: i32,
    /// Maximum number of generated chunks merged per tick.
    pub loads_per_frame: usize,
    /// Number of background generation workers.
    pub generation_workers: usize,
    /// Number of unmodified generated chunks kept for fast reloads.
    pub generated_cache_capacity: usize,
}

/// Weapon tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeaponConfig {
    /// Pistol settings.
    pub pistol: WeaponStats,
    /// Shotgun settings.
    pub shotgun: WeaponStats,
    /// Rocket launcher settings.
    pub rocket: WeaponStats,
    /// Pellets spawned per shotgun shot.
    pub shotgun_pellets: usize,
    /// Maximum horizontal pellet deviation in degrees.
    pub shotgun_spread_horizontal: f32,
    /// Maximum vertical pellet deviation in degrees.
    pub shotgun_spread_vertical: f32,
}

/// Stats shared by every weapon.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeaponStats {
    /// Minimum seconds between shots.
    pub cooldown: f32,
    /// Ammo the player starts with.
    pub starting_ammo: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 6.0,
            sprint_multiplier: 2.0,
            mouse_sensitivity: 0.2,
            jump_speed: 12.0,
            gravity: 36.0,
            eye_height: 1.7,
            collision_radius: 0.3,
            height: 1.7,
            max_health: 100,
            spawn: [8.0, 2.0, 2.0],
            spawn_yaw: 90.0,
            spawn_pitch: 0.0,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            render_distance: 4,
            ground_level: 0,
            loads_per_frame: 1,
            generation_workers: 1,
            generated_cache_capacity: 64,
        }
    }
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            pistol: WeaponStats {
                cooldown: 0.0,
                starting_ammo: 50,
            },
            shotgun: WeaponStats {
                cooldown: 0.5,
                starting_ammo: 10,
            },
            rocket: WeaponStats {
                cooldown: 1.0,
                starting_ammo: 5,
            },
            shotgun_pellets: 8,
            shotgun_spread_horizontal: 10.0,
            shotgun_spread_vertical: 2.0,
        }
    }
}

impl Default for WeaponStats {
    fn default() -> Self {
        Self {
            cooldown: 0.0,
            starting_ammo: 0,
        }
    }
}

impl GameConfig {
    /// Loads and validates a config from a JSON file.
    ///
    /// # Arguments
    /// * `path` - Location of the JSON file
    ///
    /// # Returns
    /// The parsed config, or a `ConfigError` if the file cannot be read,
    /// is not valid JSON, or holds values the session cannot run with.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads the config at `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Parses and validates a config from a JSON string.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would stall or break the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.chunk_size < 1 {
            return Err(ConfigError::Invalid(format!(
                "chunk_size must be at least 1, got {}",
                self.world.chunk_size
            )));
        }
        if self.world.render_distance < 0 {
            return Err(ConfigError::Invalid(format!(
                "render_distance must not be negative, got {}",
                self.world.render_distance
            )));
        }
        if self.world.loads_per_frame < 1 {
            return Err(ConfigError::Invalid(
                "loads_per_frame must be at least 1".to_string(),
            ));
        }
        if self.world.generation_workers < 1 {
            return Err(ConfigError::Invalid(
                "generation_workers must be at least 1".to_string(),
            ));
        }
        let speeds = [
            ("move_speed", self.player.move_speed),
            ("jump_speed", self.player.jump_speed),
            ("gravity", self.player.gravity),
            ("collision_radius", self.player.collision_radius),
            ("height", self.player.height),
        ];
        for (name, value) in speeds {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tuned_constants() {
        let config = GameConfig::default();
        assert_eq!(config.player.move_speed, 6.0);
        assert_eq!(config.player.gravity, 36.0);
        assert_eq!(config.world.chunk_size, 16);
        assert_eq!(config.world.render_distance, 4);
        assert_eq!(config.world.loads_per_frame, 1);
        assert_eq!(config.weapons.shotgun_pellets, 8);
        assert_eq!(config.weapons.rocket.cooldown, 1.0);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config = GameConfig::from_json(r#"{ "player": { "move_speed": 9.0 } }"#).unwrap();
        assert_eq!(config.player.move_speed, 9.0);
        assert_eq!(config.player.jump_speed, 12.0);
        assert_eq!(config.world, WorldConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        assert!(GameConfig::from_json(r#"{ "future_setting": true }"#).is_ok());
    }

    #[test]
    fn test_invalid_json_produces_error() {
        let result = GameConfig::from_json("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let result = GameConfig::from_json(r#"{ "world": { "chunk_size": 0 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_zero_load_budget_rejected() {
        let result = GameConfig::from_json(r#"{ "world": { "loads_per_frame": 0 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!(
            "voxel-arena-config-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "world": { "render_distance": 2 } }"#).unwrap();
        let config = GameConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.world.render_distance, 2);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let path = std::env::temp_dir().join("voxel-arena-definitely-missing.json");
        assert!(matches!(
            GameConfig::load(&path),
            Err(ConfigError::Read(_))
        ));
        assert!(GameConfig::load_or_default(&path).is_ok());
    }
}
