#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Arena
//!
//! A first-person arena shooter played on an endless voxel terrain, built
//! with Rust and WGPU.
//!
//! ## Key Modules
//!
//! * `application_state` - Window, graphics and input, and the event loop glue
//! * `core` - Configuration, errors and shared geometry
//! * `engine_state` - The session: terrain, chunk streaming, the player,
//!   weapons, projectiles, enemies, and what the renderer draws
//!
//! ## Architecture
//!
//! The session is stepped once per event-loop iteration with the input
//! gathered since the previous step. Chunk generation and meshing run on a
//! worker pool; results are merged back on the main thread. Everything the
//! renderer needs is read from the session after the step, so the whole
//! simulation also runs headless.
//!
//! ## Usage
//!
//! ```no_run
//! voxel_arena::run();
//! ```

use std::path::PathBuf;

use application_state::ApplicationState;
use crate::core::config::GameConfig;
use log::{error, info};
use winit::event_loop::EventLoop;

pub mod application_state;
pub mod core;
pub mod engine_state;

/// Settings file read when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "arena.json";

/// Starts the game and blocks until its window closes.
///
/// The first command line argument names the settings file; without one
/// `arena.json` in the working directory is used when present.
pub fn run() {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = match GameConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load {}: {}", config_path.display(), err);
            return;
        }
    };

    let event_loop = match EventLoop::with_user_event().build() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!("Could not create the event loop: {}", err);
            return;
        }
    };

    let mut state = ApplicationState::new(config, event_loop.create_proxy());
    if let Err(err) = event_loop.run_app(&mut state) {
        error!("Event loop terminated with an error: {}", err);
    }
}
