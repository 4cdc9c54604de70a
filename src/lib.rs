//! obj-viewer
//!
//! An interactive viewer for a single textured OBJ/MTL mesh, running natively
//! and in the browser (WebGL through wgpu). The mesh is centered, lit with one
//! directional light and spun slowly; dragging with the mouse rotates it.
//!
//! High-level modules
//! - `camera`: projection, the fixed camera rig and the per-frame uniform
//! - `config`: viewer configuration and the bundled scene preset
//! - `context`: window, surface, device and the shared GPU objects
//! - `controls`: mouse drag rotation and spin pause/resume
//! - `data_structures`: geometry, materials, GPU parts and textures
//! - `pipelines`: the mesh render pipeline and its shader
//! - `resources`: loading OBJ/MTL files and textures
//! - `scene`: framing the model and building the drawable parts
//! - `viewer`: the winit event loop
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod pipelines;
pub mod resources;
pub mod scene;
pub mod viewer;

pub use config::ViewerConfig;
pub use viewer::run;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run(config::barbel_scene()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
