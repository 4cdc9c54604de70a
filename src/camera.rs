//! Camera rig and the per-frame uniform shared by every part.
//!
//! The camera orbits nothing: it sits at a fixed distance in front of its
//! target and the model is rotated instead (see [`world_matrix`]).

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use wgpu::util::DeviceExt;

use crate::{config::LightConfig, controls::DragRotation};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// A camera looking down -Z at `target` from `radius` away.
///
/// The radius is fixed after the scene is framed; there is no zoom.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub radius: f32,
}

impl OrbitCamera {
    pub fn new(target: Point3<f32>, radius: f32) -> Self {
        Self { target, radius }
    }

    pub fn position(&self) -> Point3<f32> {
        self.target + Vector3::new(0.0, 0.0, self.radius)
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }
}

/// Model transform: spin and drag rotation around the centered model.
///
/// While the spin runs the elapsed seconds are added to the drag's Y angle.
pub fn world_matrix(
    rotation: &DragRotation,
    elapsed_secs: f32,
    center_offset: Vector3<f32>,
) -> Matrix4<f32> {
    let spin = if rotation.animation_running() {
        elapsed_secs + rotation.rotation_y()
    } else {
        rotation.rotation_y()
    };
    Matrix4::from_angle_y(Rad(spin))
        * Matrix4::from_angle_x(Rad(rotation.rotation_x()))
        * Matrix4::from_translation(center_offset)
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub world: [[f32; 4]; 4],
    pub light_direction: [f32; 3],
    _padding: u32,
    pub ambient_light: [f32; 3],
    _padding2: u32,
    pub view_world_position: [f32; 3],
    _padding3: u32,
}

impl FrameUniform {
    pub fn new(
        projection: &Projection,
        camera: &OrbitCamera,
        world: Matrix4<f32>,
        light: &LightConfig,
    ) -> Self {
        Self {
            projection: projection.calc_matrix().into(),
            view: camera.view_matrix().into(),
            world: world.into(),
            light_direction: light.direction.normalize().into(),
            _padding: 0,
            ambient_light: light.ambient,
            _padding2: 0,
            view_world_position: camera.position().into(),
            _padding3: 0,
        }
    }
}

/// GPU side of [`FrameUniform`], bound at group 0.
#[derive(Debug)]
pub struct FrameResources {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl FrameResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Buffer"),
            contents: bytemuck::cast_slice(&[<FrameUniform as bytemuck::Zeroable>::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("frame_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("frame_bind_group"),
        });

        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniform: &FrameUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[*uniform]));
    }
}
