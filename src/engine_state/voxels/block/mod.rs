//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel world:
//! block kind definitions with their palettes, and block face handling.

pub mod block_side;
pub mod block_type;
