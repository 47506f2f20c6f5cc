//! # Core Module
//!
//! Crate-wide building blocks that do not belong to any single engine
//! subsystem.
//!
//! ## Key Components
//! - `config`: Session configuration loaded from JSON at startup
//! - `error`: Error types for configuration, graphics setup and the streaming pipeline
//! - `geometry`: Segment vs. box intersection tests used by projectiles and decals

pub mod config;
pub mod error;
pub mod geometry;

pub use config::GameConfig;
pub use error::{ConfigError, GraphicsError, StreamerError};
