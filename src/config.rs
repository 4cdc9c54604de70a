//! Viewer configuration.
//!
//! Everything scene specific lives here as plain data: which mesh to show,
//! how its materials are adjusted and how the camera, light and controls are
//! tuned. [`barbel_scene`] is the bundled scene.

use cgmath::{Deg, Point3, Vector3};

use crate::{
    data_structures::material::{MapRef, MaterialOverride, MaterialOverrides, MaterialPatch},
    resources::AssetSource,
};

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub title: String,
    pub assets: AssetSource,
    /// Relative to the asset root.
    pub obj_path: String,
    pub overrides: MaterialOverrides,
    pub camera: CameraConfig,
    pub controls: ControlConfig,
    pub light: LightConfig,
    pub clear_colour: wgpu::Color,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "obj-viewer".to_string(),
            assets: AssetSource::default(),
            obj_path: "data/newbarbel.obj".to_string(),
            overrides: MaterialOverrides::default(),
            camera: CameraConfig::default(),
            controls: ControlConfig::default(),
            light: LightConfig::default(),
            clear_colour: wgpu::Color::WHITE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    pub fovy: Deg<f32>,
    pub target: Point3<f32>,
    /// Camera distance as a multiple of the bounding box diagonal.
    pub radius_factor: f32,
    pub near_divisor: f32,
    pub far_factor: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy: Deg(60.0),
            target: Point3::new(0.0, 0.0, 0.05),
            radius_factor: 0.8,
            near_divisor: 100.0,
            far_factor: 3.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ControlConfig {
    /// Radians of rotation per pixel of drag.
    pub rotation_sensitivity: f32,
    pub start_animated: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            rotation_sensitivity: 0.01,
            start_animated: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightConfig {
    /// Direction towards the light. Normalized before use.
    pub direction: Vector3<f32>,
    pub ambient: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: Vector3::new(-0.5, 0.5, 1.0),
            ambient: [0.35, 0.35, 0.35],
        }
    }
}

/// The bundled barbell scene with its material adjustments.
pub fn barbel_scene() -> ViewerConfig {
    let overrides = MaterialOverrides::new()
        .with(
            "Base.001",
            MaterialOverride::replacing(
                MaterialPatch::default()
                    .diffuse([0.0, 0.0, 0.0])
                    .shininess(250.0)
                    .render_order(1),
            ),
        )
        .with(
            "Mesh",
            MaterialOverride::layered(
                MaterialPatch::default()
                    .diffuse_map(MapRef::at_root("data/material/images.jpg"))
                    .shininess(250.0)
                    .specular([0.3, 0.3, 0.3]),
            ),
        );

    ViewerConfig {
        title: "Barbell".to_string(),
        overrides,
        ..Default::default()
    }
}
