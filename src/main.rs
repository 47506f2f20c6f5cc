//! # Voxel Arena Entry Point
//!
//! Calls into the library's `run()` function to start the game.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- arena.json
//! ```

fn main() {
    voxel_arena::run();
}
