//! Viewer data structures: geometry, materials, GPU parts and textures.
//!
//! - `geometry` holds CPU-side parts with fully populated vertex channels
//! - `material` composes default, parsed and overridden materials
//! - `model` contains the GPU part, vertex layout and draw helper
//! - `texture` contains the GPU texture wrapper and creation utilities

pub mod geometry;
pub mod material;
pub mod model;
pub mod texture;
